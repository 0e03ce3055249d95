mod common;

use sea_orm::EntityTrait;
use uuid::Uuid;

use marketplace_api::{
    dto::cart::{AddToCartRequest, RemoveFromCartRequest},
    entity::{carts::CartStatus, products::Entity as Products, users::Role},
    error::AppError,
    middleware::auth::AuthUser,
    services::cart_service,
    state::AppState,
};

async fn product_stock(state: &AppState, id: Uuid) -> anyhow::Result<i32> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .expect("product row");
    Ok(product.stock)
}

// Reservation flow: stock moves into the cart at add time, back out on
// remove/clear, and stays committed through checkout.
#[tokio::test]
async fn stock_reservation_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let company_id = common::create_user(&state, Role::Company, "shop@example.com").await?;
    let client_id = common::create_user(&state, Role::Client, "client@example.com").await?;
    let product = common::create_product(&state, company_id, "Limited Widget", 1000, 5).await?;

    let client = AuthUser {
        user_id: client_id,
        role: Role::Client,
    };

    // Cart endpoints are client-only.
    let company = AuthUser {
        user_id: company_id,
        role: Role::Company,
    };
    let err = cart_service::get_cart(&state, &company).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    // Add 3: stock 5 -> 2, item quantity 3, price snapshotted.
    let cart = cart_service::add_to_cart(
        &state,
        &client,
        AddToCartRequest {
            product_id: product.id,
            quantity: 3,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(product_stock(&state, product.id).await?, 2);
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].unit_price, 1000);
    assert_eq!(cart.total, 3000);

    // Adding 4 more overdraws: the call fails and nothing moves.
    let err = cart_service::add_to_cart(
        &state,
        &client,
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));
    assert_eq!(product_stock(&state, product.id).await?, 2);
    let cart = cart_service::get_cart(&state, &client).await?.data.unwrap();
    assert_eq!(cart.items[0].quantity, 3);

    // Non-positive quantities are rejected outright.
    let err = cart_service::add_to_cart(
        &state,
        &client,
        AddToCartRequest {
            product_id: product.id,
            quantity: 0,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // Remove 2: stock 2 -> 4, item quantity 1.
    let cart = cart_service::remove_from_cart(
        &state,
        &client,
        RemoveFromCartRequest {
            product_id: product.id,
            quantity: 2,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(product_stock(&state, product.id).await?, 4);
    assert_eq!(cart.items[0].quantity, 1);
    assert_eq!(cart.total, 1000);

    // Checkout: terminal for this cart, stock untouched.
    let receipt = cart_service::checkout(&state, &client).await?.data.unwrap();
    assert_eq!(receipt.status, CartStatus::CheckedOut);
    assert_eq!(receipt.total, 1000);
    assert_eq!(product_stock(&state, product.id).await?, 4);

    // A fresh empty active cart appears lazily afterwards.
    let fresh = cart_service::get_cart(&state, &client).await?.data.unwrap();
    assert_ne!(fresh.id, receipt.cart_id);
    assert!(fresh.items.is_empty());
    assert_eq!(fresh.total, 0);

    // Checkout on the empty cart is refused.
    let err = cart_service::checkout(&state, &client).await.unwrap_err();
    assert!(matches!(err, AppError::EmptyCart));

    // Add-then-remove of more than reserved returns exactly the reserved
    // amount and drops the item.
    cart_service::add_to_cart(
        &state,
        &client,
        AddToCartRequest {
            product_id: product.id,
            quantity: 4,
        },
    )
    .await?;
    assert_eq!(product_stock(&state, product.id).await?, 0);
    let cart = cart_service::remove_from_cart(
        &state,
        &client,
        RemoveFromCartRequest {
            product_id: product.id,
            quantity: 99,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(product_stock(&state, product.id).await?, 4);
    assert!(cart.items.is_empty());

    // The item is gone, so another remove is NotFound.
    let err = cart_service::remove_from_cart(
        &state,
        &client,
        RemoveFromCartRequest {
            product_id: product.id,
            quantity: 1,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // Clear returns every reservation, skipping products deleted in the
    // meantime: their snapshot lines still leave the cart.
    let kept = common::create_product(&state, company_id, "Kept", 100, 8).await?;
    let doomed = common::create_product(&state, company_id, "Doomed", 100, 8).await?;
    for product_id in [kept.id, doomed.id] {
        cart_service::add_to_cart(
            &state,
            &client,
            AddToCartRequest {
                product_id,
                quantity: 3,
            },
        )
        .await?;
    }
    assert_eq!(product_stock(&state, kept.id).await?, 5);
    Products::delete_by_id(doomed.id).exec(&state.orm).await?;

    let cart = cart_service::clear_cart(&state, &client).await?.data.unwrap();
    assert!(cart.items.is_empty());
    assert_eq!(cart.total, 0);
    assert_eq!(product_stock(&state, kept.id).await?, 8);

    Ok(())
}
