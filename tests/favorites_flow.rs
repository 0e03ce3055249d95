mod common;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};

use marketplace_api::{
    dto::{favorites::ToggleFavoriteRequest, stats::TopQuery},
    entity::{products::ActiveModel as ProductActive, users::Role},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::Pagination,
    services::{favorite_service, stats_service},
};

// Toggle semantics, inactive filtering, and the aggregate count endpoints.
#[tokio::test]
async fn favorites_and_stats_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let company_id = common::create_user(&state, Role::Company, "shop@example.com").await?;
    let alice_id = common::create_user(&state, Role::Client, "alice@example.com").await?;
    let bob_id = common::create_user(&state, Role::Client, "bob@example.com").await?;

    let hoodie = common::create_product(&state, company_id, "Hoodie", 5500, 50).await?;
    let mug = common::create_product(&state, company_id, "Mug", 1200, 100).await?;
    let sticker = common::create_product(&state, company_id, "Sticker", 500, 200).await?;

    let alice = AuthUser {
        user_id: alice_id,
        role: Role::Client,
    };
    let bob = AuthUser {
        user_id: bob_id,
        role: Role::Client,
    };
    let company = AuthUser {
        user_id: company_id,
        role: Role::Company,
    };

    // Toggle twice is an involution.
    let set = favorite_service::toggle_favorite(
        &state,
        &alice,
        ToggleFavoriteRequest {
            product_id: hoodie.id,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(set.favorites, vec![hoodie.id]);

    let set = favorite_service::toggle_favorite(
        &state,
        &alice,
        ToggleFavoriteRequest {
            product_id: hoodie.id,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(set.favorites.is_empty());

    // Build up counts: hoodie 2, mug 1, sticker 0.
    for (user, product_id) in [(&alice, hoodie.id), (&alice, mug.id), (&bob, hoodie.id)] {
        favorite_service::toggle_favorite(&state, user, ToggleFavoriteRequest { product_id })
            .await?;
    }

    let count = stats_service::product_count(&state, hoodie.id)
        .await?
        .data
        .unwrap();
    assert_eq!(count.favorites, 2);

    // take is honored and clamped into [1, 100].
    let top = stats_service::top_products(
        &state,
        TopQuery {
            take: Some(1),
            only_active: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(top.items.len(), 1);
    assert_eq!(top.items[0].product_id, hoodie.id);
    assert_eq!(top.items[0].favorites, 2);

    let top = stats_service::top_products(
        &state,
        TopQuery {
            take: Some(0),
            only_active: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(top.items.len(), 1);

    // Deactivate the mug: it drops out of listings and the top board, but the
    // stored favorite row and its raw count stay.
    let mut active: ProductActive = mug.clone().into();
    active.is_active = Set(false);
    active.updated_at = Set(Utc::now().into());
    active.update(&state.orm).await?;

    let listed = favorite_service::list_favorites(
        &state,
        &alice,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(listed.items.len(), 1);
    assert_eq!(listed.items[0].id, hoodie.id);

    let top = stats_service::top_products(
        &state,
        TopQuery {
            take: None,
            only_active: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert!(top.items.iter().all(|row| row.product_id != mug.id));

    let count = stats_service::product_count(&state, mug.id).await?.data.unwrap();
    assert_eq!(count.favorites, 1);

    // Toggling an inactive product is refused.
    let err = favorite_service::toggle_favorite(
        &state,
        &alice,
        ToggleFavoriteRequest { product_id: mug.id },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Company dashboard: every owned product, zero counts and inactive rows
    // included, most favorited first.
    let mine = stats_service::my_products(&state, &company).await?.data.unwrap();
    assert_eq!(mine.items.len(), 3);
    assert_eq!(mine.items[0].product_id, hoodie.id);
    assert_eq!(mine.items[0].favorites, 2);
    let sticker_row = mine
        .items
        .iter()
        .find(|row| row.product_id == sticker.id)
        .expect("sticker row");
    assert_eq!(sticker_row.favorites, 0);
    assert!(mine.items.iter().any(|row| !row.is_active));

    // The per-company view is for root and company tokens only.
    let err = stats_service::by_company(&state, &alice, company_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let root = AuthUser {
        user_id: uuid::Uuid::new_v4(),
        role: Role::Root,
    };
    let stats = stats_service::by_company(&state, &root, company_id)
        .await?
        .data
        .unwrap();
    assert_eq!(stats.company_id, company_id);
    assert_eq!(stats.products.len(), 3);

    Ok(())
}
