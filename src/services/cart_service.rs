use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::LockType;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::OrmConn,
    dto::cart::{AddToCartRequest, CartDto, CartItemDto, CheckoutResponse, RemoveFromCartRequest},
    entity::{
        cart_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as CartItems,
            Model as ItemModel,
        },
        carts::{
            ActiveModel as CartActive, CartStatus, Column as CartCol, Entity as Carts,
            Model as CartModel,
        },
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_client},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Sum of unit_price x quantity over the current items. Always derived, never
/// persisted.
pub fn cart_total(items: &[ItemModel]) -> i64 {
    items
        .iter()
        .map(|item| item.unit_price * item.quantity as i64)
        .sum()
}

fn cart_dto(cart: &CartModel, items: Vec<ItemModel>) -> CartDto {
    let total = cart_total(&items);
    CartDto {
        id: cart.id,
        client_id: cart.client_id,
        status: cart.status,
        total,
        items: items
            .into_iter()
            .map(|item| CartItemDto {
                product_id: item.product_id,
                product_name: item.product_name,
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect(),
        updated_at: cart.updated_at.with_timezone(&Utc),
    }
}

async fn find_active_cart<C: ConnectionTrait>(
    conn: &C,
    client_id: Uuid,
) -> Result<Option<CartModel>, DbErr> {
    Carts::find()
        .filter(CartCol::ClientId.eq(client_id))
        .filter(CartCol::Status.eq(CartStatus::Active))
        .one(conn)
        .await
}

/// Sole creation path for carts. The partial unique index on
/// (client_id) WHERE status = 'active' turns the lookup-then-insert race into a
/// unique violation for the loser, which falls back to the winner's row.
pub async fn get_or_create_active_cart(conn: &OrmConn, client_id: Uuid) -> AppResult<CartModel> {
    if let Some(cart) = find_active_cart(conn, client_id).await? {
        return Ok(cart);
    }

    let insert = CartActive {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        status: Set(CartStatus::Active),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await;

    match insert {
        Ok(cart) => Ok(cart),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            find_active_cart(conn, client_id)
                .await?
                .ok_or(AppError::NotFound)
        }
        Err(err) => Err(err.into()),
    }
}

async fn touch<C: ConnectionTrait>(conn: &C, cart: CartModel) -> Result<CartModel, DbErr> {
    let mut active: CartActive = cart.into();
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await
}

async fn cart_items<C: ConnectionTrait>(conn: &C, cart_id: Uuid) -> Result<Vec<ItemModel>, DbErr> {
    CartItems::find()
        .filter(ItemCol::CartId.eq(cart_id))
        .all(conn)
        .await
}

pub async fn get_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartDto>> {
    ensure_client(user)?;
    let cart = get_or_create_active_cart(&state.orm, user.user_id).await?;
    let items = cart_items(&state.orm, cart.id).await?;
    Ok(ApiResponse::success("OK", cart_dto(&cart, items), Some(Meta::empty())))
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartDto>> {
    ensure_client(user)?;
    let cart = get_or_create_active_cart(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    // Lock the product row so the check-then-decrement below cannot interleave
    // with a concurrent add against the same stock.
    let product = Products::find_by_id(payload.product_id)
        .filter(ProdCol::IsActive.eq(true))
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let product = match product {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }
    if product.stock < payload.quantity {
        return Err(AppError::InsufficientStock);
    }

    // Reserve: stock is committed to the cart now, not at checkout.
    let new_stock = product.stock - payload.quantity;
    let snapshot_name = product.name.clone();
    let snapshot_price = product.price;
    let mut product_active: ProductActive = product.into();
    product_active.stock = Set(new_stock);
    product_active.update(&txn).await?;

    let existing = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;

    match existing {
        Some(item) => {
            let quantity = item.quantity + payload.quantity;
            let mut active: ItemActive = item.into();
            active.quantity = Set(quantity);
            active.update(&txn).await?;
        }
        None => {
            ItemActive {
                id: Set(Uuid::new_v4()),
                cart_id: Set(cart.id),
                product_id: Set(payload.product_id),
                product_name: Set(snapshot_name),
                unit_price: Set(snapshot_price),
                quantity: Set(payload.quantity),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
        }
    }

    let cart = touch(&txn, cart).await?;
    let items = cart_items(&txn, cart.id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_add",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to cart",
        cart_dto(&cart, items),
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_cart(
    state: &AppState,
    user: &AuthUser,
    payload: RemoveFromCartRequest,
) -> AppResult<ApiResponse<CartDto>> {
    ensure_client(user)?;
    let cart = get_or_create_active_cart(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    let item = CartItems::find()
        .filter(ItemCol::CartId.eq(cart.id))
        .filter(ItemCol::ProductId.eq(payload.product_id))
        .one(&txn)
        .await?;
    let item = match item {
        Some(i) => i,
        None => return Err(AppError::NotFound),
    };

    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let returned = payload.quantity.min(item.quantity);

    // Release the reservation. A product hard-deleted since the add simply
    // skips the return; the item still leaves the cart.
    let product = Products::find_by_id(payload.product_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    if let Some(product) = product {
        let new_stock = product.stock + returned;
        let mut active: ProductActive = product.into();
        active.stock = Set(new_stock);
        active.update(&txn).await?;
    }

    let remaining = item.quantity - returned;
    if remaining == 0 {
        let item_id = item.id;
        CartItems::delete_by_id(item_id).exec(&txn).await?;
    } else {
        let mut active: ItemActive = item.into();
        active.quantity = Set(remaining);
        active.update(&txn).await?;
    }

    let cart = touch(&txn, cart).await?;
    let items = cart_items(&txn, cart.id).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "returned": returned })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from cart",
        cart_dto(&cart, items),
        Some(Meta::empty()),
    ))
}

pub async fn checkout(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CheckoutResponse>> {
    ensure_client(user)?;
    let cart = get_or_create_active_cart(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    let items = cart_items(&txn, cart.id).await?;
    if items.is_empty() {
        return Err(AppError::EmptyCart);
    }
    let total = cart_total(&items);

    // Stock stays where it is: it was reserved at add time. No order record is
    // created here either.
    let mut active: CartActive = cart.into();
    active.status = Set(CartStatus::CheckedOut);
    active.updated_at = Set(Utc::now().into());
    let cart = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_checkout",
        Some("carts"),
        Some(serde_json::json!({ "cart_id": cart.id, "total": total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Checked out",
        CheckoutResponse {
            cart_id: cart.id,
            total,
            status: cart.status,
        },
        Some(Meta::empty()),
    ))
}

pub async fn clear_cart(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<CartDto>> {
    ensure_client(user)?;
    let cart = get_or_create_active_cart(&state.orm, user.user_id).await?;

    let txn = state.orm.begin().await?;

    let items = cart_items(&txn, cart.id).await?;
    for item in &items {
        let product = Products::find_by_id(item.product_id)
            .lock(LockType::Update)
            .one(&txn)
            .await?;
        if let Some(product) = product {
            let new_stock = product.stock + item.quantity;
            let mut active: ProductActive = product.into();
            active.stock = Set(new_stock);
            active.update(&txn).await?;
        }
    }

    CartItems::delete_many()
        .filter(ItemCol::CartId.eq(cart.id))
        .exec(&txn)
        .await?;

    let cart = touch(&txn, cart).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "cart_clear",
        Some("carts"),
        Some(serde_json::json!({ "cart_id": cart.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Cart cleared",
        cart_dto(&cart, Vec::new()),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(unit_price: i64, quantity: i32) -> ItemModel {
        ItemModel {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            product_name: "widget".into(),
            unit_price,
            quantity,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let items = vec![item(550, 3), item(120, 1), item(1000, 2)];
        assert_eq!(cart_total(&items), 550 * 3 + 120 + 2000);
    }

    #[test]
    fn total_of_empty_cart_is_zero() {
        assert_eq!(cart_total(&[]), 0);
    }
}
