use serde::{Deserialize, Serialize};

/// A sale event. Items hang off it as [`ProductSaleItem`] rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSale {
    pub id: String,
    pub slug: String,

    pub showroom_id: String,

    /// Employee credited with the sale. May dangle after the employee
    /// record is deleted; readers treat an unresolvable id as none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,

    /// Sale date.
    pub created_at: String,
}

/// Input for opening a sale.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateSale {
    #[serde(default)]
    pub employee_slug: Option<String>,
}

/// One sold product within a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSaleItem {
    pub id: String,
    pub slug: String,

    pub sale_id: String,
    pub product_id: String,

    /// Units sold. Positive.
    pub quantity: i64,

    /// Per-unit price captured at sale time.
    pub sale_price: i64,

    pub created_at: String,
}

/// Input for adding an item to a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleItem {
    pub product_slug: String,
    pub quantity: i64,

    /// Per-unit price override; defaults to the product's current price.
    #[serde(default)]
    pub sale_price: Option<i64>,
}
