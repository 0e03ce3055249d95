use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::favorites::{FavoriteProductList, FavoriteSet, ToggleFavoriteRequest},
    entity::{
        favorites::{ActiveModel as FavoriteActive, Column as FavCol, Entity as Favorites},
        products::{Column as ProdCol, Entity as Products, Relation as ProdRel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_client},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

async fn favorite_ids(state: &AppState, user_id: Uuid) -> AppResult<Vec<Uuid>> {
    let ids = Favorites::find()
        .filter(FavCol::UserId.eq(user_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|fav| fav.product_id)
        .collect();
    Ok(ids)
}

/// Flip membership of the product in the caller's favorite set and return the
/// resulting set. The favorites relation is the single source of truth; the
/// per-product counts in the stats service read the same rows.
pub async fn toggle_favorite(
    state: &AppState,
    user: &AuthUser,
    payload: ToggleFavoriteRequest,
) -> AppResult<ApiResponse<FavoriteSet>> {
    ensure_client(user)?;
    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::IsActive.eq(true))
        .one(&state.orm)
        .await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    let existing = Favorites::find_by_id((user.user_id, payload.product_id))
        .one(&state.orm)
        .await?;

    let favorited = match existing {
        Some(_) => {
            Favorites::delete_by_id((user.user_id, payload.product_id))
                .exec(&state.orm)
                .await?;
            false
        }
        None => {
            FavoriteActive {
                user_id: Set(user.user_id),
                product_id: Set(payload.product_id),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?;
            true
        }
    };

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "favorite_toggle",
        Some("favorites"),
        Some(serde_json::json!({ "product_id": payload.product_id, "favorited": favorited })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let favorites = favorite_ids(state, user.user_id).await?;
    Ok(ApiResponse::success(
        if favorited {
            "Added to favorites"
        } else {
            "Removed from favorites"
        },
        FavoriteSet { favorites },
        Some(Meta::empty()),
    ))
}

/// Active products in the caller's favorite set. Rows pointing at products
/// that have since gone inactive stay stored but are not listed.
pub async fn list_favorites(
    state: &AppState,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<FavoriteProductList>> {
    ensure_client(user)?;
    let (page, limit, offset) = pagination.normalize();

    let finder = Products::find()
        .join(JoinType::InnerJoin, ProdRel::Favorites.def())
        .filter(FavCol::UserId.eq(user.user_id))
        .filter(ProdCol::IsActive.eq(true))
        .order_by_desc(FavCol::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Product::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "OK",
        FavoriteProductList { items },
        Some(meta),
    ))
}
