use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::carts::CartStatus;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveFromCartRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemDto {
    pub product_id: Uuid,
    /// Name snapshot taken when the item was added.
    pub product_name: String,
    /// Price snapshot in minor units, decoupled from later catalog edits.
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartDto {
    pub id: Uuid,
    pub client_id: Uuid,
    pub status: CartStatus,
    pub items: Vec<CartItemDto>,
    /// Recomputed on every read, never stored.
    pub total: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub cart_id: Uuid,
    pub total: i64,
    pub status: CartStatus,
}
