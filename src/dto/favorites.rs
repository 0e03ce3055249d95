use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::Product;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ToggleFavoriteRequest {
    pub product_id: Uuid,
}

/// The caller's full favorite-id set after a toggle.
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteSet {
    pub favorites: Vec<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteProductList {
    pub items: Vec<Product>,
}
