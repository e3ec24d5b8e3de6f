use serde::{Deserialize, Serialize};

/// A product category. Names are unique within a showroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: String,
    pub slug: String,

    pub name: String,

    pub showroom_id: String,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
}
