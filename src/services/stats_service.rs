use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

use crate::{
    dto::stats::{
        CompanyStats, OwnedProductStats, OwnedProductStatsList, ProductFavoriteCount, TopProduct,
        TopProductList, TopQuery,
    },
    entity::{
        favorites::{Column as FavCol, Entity as Favorites, Relation as FavRel},
        products::{Column as ProdCol, Entity as Products, Relation as ProdRel},
    },
    error::AppResult,
    middleware::auth::{AuthUser, ensure_company, ensure_root_or_company},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// How many users currently favorite the product. Public.
pub async fn product_count(
    state: &AppState,
    product_id: Uuid,
) -> AppResult<ApiResponse<ProductFavoriteCount>> {
    let favorites = Favorites::find()
        .filter(FavCol::ProductId.eq(product_id))
        .count(&state.orm)
        .await? as i64;

    Ok(ApiResponse::success(
        "OK",
        ProductFavoriteCount {
            product_id,
            favorites,
        },
        Some(Meta::empty()),
    ))
}

/// Products ranked by favorite count descending. `take` is clamped to [1, 100].
pub async fn top_products(
    state: &AppState,
    query: TopQuery,
) -> AppResult<ApiResponse<TopProductList>> {
    let take = query.take.unwrap_or(10).clamp(1, 100);
    let only_active = query.only_active.unwrap_or(true);

    let mut finder = Favorites::find()
        .select_only()
        .column_as(FavCol::ProductId, "product_id")
        .column_as(ProdCol::Name, "name")
        .column_as(ProdCol::OwnerId, "owner_id")
        .column_as(FavCol::ProductId.count(), "favorites")
        .join(JoinType::InnerJoin, FavRel::Product.def())
        .group_by(FavCol::ProductId)
        .group_by(ProdCol::Name)
        .group_by(ProdCol::OwnerId)
        .order_by_desc(FavCol::ProductId.count())
        .limit(take);

    if only_active {
        finder = finder.filter(ProdCol::IsActive.eq(true));
    }

    let items = finder.into_model::<TopProduct>().all(&state.orm).await?;

    Ok(ApiResponse::success(
        "Top favorited",
        TopProductList { items },
        Some(Meta::empty()),
    ))
}

/// Every product the company owns with its favorite count, zero included,
/// inactive included, most favorited first.
async fn owned_product_stats(
    state: &AppState,
    company_id: Uuid,
) -> AppResult<Vec<OwnedProductStats>> {
    let rows = Products::find()
        .select_only()
        .column_as(ProdCol::Id, "product_id")
        .column_as(ProdCol::Name, "name")
        .column_as(ProdCol::IsActive, "is_active")
        .column_as(ProdCol::Stock, "stock")
        .column_as(ProdCol::Price, "price")
        .column_as(FavCol::UserId.count(), "favorites")
        .join(JoinType::LeftJoin, ProdRel::Favorites.def())
        .filter(ProdCol::OwnerId.eq(company_id))
        .group_by(ProdCol::Id)
        .order_by_desc(FavCol::UserId.count())
        .into_model::<OwnedProductStats>()
        .all(&state.orm)
        .await?;
    Ok(rows)
}

pub async fn my_products(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<OwnedProductStatsList>> {
    ensure_company(user)?;
    let items = owned_product_stats(state, user.user_id).await?;
    Ok(ApiResponse::success(
        "My product stats",
        OwnedProductStatsList { items },
        Some(Meta::empty()),
    ))
}

pub async fn by_company(
    state: &AppState,
    user: &AuthUser,
    company_id: Uuid,
) -> AppResult<ApiResponse<CompanyStats>> {
    ensure_root_or_company(user)?;
    let products = owned_product_stats(state, company_id).await?;
    Ok(ApiResponse::success(
        "Company stats",
        CompanyStats {
            company_id,
            products,
        },
        Some(Meta::empty()),
    ))
}
