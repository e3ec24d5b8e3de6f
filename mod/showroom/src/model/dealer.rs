use serde::{Deserialize, Serialize};

/// A goods supplier attached to a showroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dealer {
    pub id: String,
    pub slug: String,

    /// Unique within a showroom.
    pub name: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub showroom_id: String,

    pub created_at: String,
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

/// Input for adding a dealer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDealer {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}
