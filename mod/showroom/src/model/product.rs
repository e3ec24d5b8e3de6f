use serde::{Deserialize, Serialize};

/// A product on the showroom floor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,

    pub title: String,

    /// List price per unit. Never negative.
    pub price: i64,

    /// Units in stock. Never negative.
    #[serde(default)]
    pub quantity: i64,

    pub category_id: String,
    pub showroom_id: String,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a product. The category is addressed by slug,
/// like everything else in the URL space.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub title: String,
    pub price: i64,
    #[serde(default)]
    pub quantity: i64,
    pub category_slug: String,
}

/// Input for selling a product.
#[derive(Debug, Clone, Deserialize)]
pub struct SellRequest {
    pub quantity: i64,

    /// Employee credited with the sale, if any.
    #[serde(default)]
    pub employee_slug: Option<String>,

    /// Existing sale to append to; a new sale is opened when absent.
    #[serde(default)]
    pub sale_slug: Option<String>,
}
