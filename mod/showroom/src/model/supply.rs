use serde::{Deserialize, Serialize};

/// A delivery of goods from a dealer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSupply {
    pub id: String,
    pub slug: String,

    pub showroom_id: String,
    pub dealer_id: String,

    /// Supply date.
    pub created_at: String,
}

/// Input for recording a supply.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupply {
    pub dealer_slug: String,
}

/// One supplied product within a supply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSupplyItem {
    pub id: String,
    pub slug: String,

    pub supply_id: String,
    pub product_id: String,

    /// Units supplied. Positive.
    pub quantity: i64,

    /// Per-unit purchase price.
    pub supply_price: i64,

    pub created_at: String,
}

/// Input for adding an item to a supply.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSupplyItem {
    pub product_slug: String,
    pub quantity: i64,
    pub supply_price: i64,
}
