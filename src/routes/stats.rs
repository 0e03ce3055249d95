use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::stats::{
        CompanyStats, OwnedProductStatsList, ProductFavoriteCount, TopProductList, TopQuery,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::stats_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product/{id}", get(product_count))
        .route("/top", get(top_products))
        .route("/mine", get(my_products))
        .route("/company/{id}", get(by_company))
}

#[utoipa::path(
    get,
    path = "/api/favorites/stats/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Favorite count for the product", body = ApiResponse<ProductFavoriteCount>)
    ),
    tag = "Favorite stats"
)]
pub async fn product_count(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductFavoriteCount>>> {
    let resp = stats_service::product_count(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/stats/top",
    params(
        ("take" = Option<u64>, Query, description = "How many rows, clamped to [1, 100], default 10"),
        ("only_active" = Option<bool>, Query, description = "Exclude inactive products, default true"),
    ),
    responses(
        (status = 200, description = "Most favorited products", body = ApiResponse<TopProductList>)
    ),
    tag = "Favorite stats"
)]
pub async fn top_products(
    State(state): State<AppState>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<ApiResponse<TopProductList>>> {
    let resp = stats_service::top_products(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/stats/mine",
    responses(
        (status = 200, description = "Favorite counts for the caller's products", body = ApiResponse<OwnedProductStatsList>),
        (status = 403, description = "Caller is not a company"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorite stats"
)]
pub async fn my_products(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<OwnedProductStatsList>>> {
    let resp = stats_service::my_products(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/favorites/stats/company/{id}",
    params(
        ("id" = Uuid, Path, description = "Company user ID")
    ),
    responses(
        (status = 200, description = "Favorite counts for a company's products", body = ApiResponse<CompanyStats>),
        (status = 403, description = "Requires a root or company token"),
    ),
    security(("bearer_auth" = [])),
    tag = "Favorite stats"
)]
pub async fn by_company(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CompanyStats>>> {
    let resp = stats_service::by_company(&state, &user, id).await?;
    Ok(Json(resp))
}
