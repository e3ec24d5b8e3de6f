use serde::{Deserialize, Serialize};

/// A showroom employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub slug: String,

    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: String,

    pub phone_number: String,

    pub showroom_id: String,

    /// Dismissed flag. Restricted employees stay on record for their
    /// sales history.
    #[serde(default)]
    pub is_restricted: bool,

    /// Hire date.
    pub created_at: String,
    pub updated_at: String,
}

/// Input for hiring an employee.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub patronymic: String,
    pub phone_number: String,
}
