use serde::{Deserialize, Serialize};

/// A dealership — the tenant entity. Owns employees, categories,
/// products, sales, supplies and dealers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showroom {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// URL identifier, e.g. `showroom-alfa-motors-48213`.
    pub slug: String,

    pub title: String,

    /// Contact phone number.
    pub phone_number: String,

    /// Set by service staff once the dealership is vetted. Not
    /// editable through the owner API.
    #[serde(default)]
    pub is_verified: bool,

    /// Owning user id.
    pub owner_id: String,

    pub created_at: String,
    pub updated_at: String,
}

/// Input for creating a showroom.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShowroom {
    pub title: String,
    pub phone_number: String,
}
