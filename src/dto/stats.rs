use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductFavoriteCount {
    pub product_id: Uuid,
    pub favorites: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TopQuery {
    pub take: Option<u64>,
    pub only_active: Option<bool>,
}

#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub favorites: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopProductList {
    pub items: Vec<TopProduct>,
}

/// One owned product with its favorite count, zero included.
#[derive(Debug, Serialize, FromQueryResult, ToSchema)]
pub struct OwnedProductStats {
    pub product_id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub stock: i32,
    pub price: i64,
    pub favorites: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OwnedProductStatsList {
    pub items: Vec<OwnedProductStats>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyStats {
    pub company_id: Uuid,
    pub products: Vec<OwnedProductStats>,
}
