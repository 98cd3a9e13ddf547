mod common;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use storefront_api::{
    dto::cart::AddToCartRequest,
    entity::{cart_items, orders, products},
    error::AppError,
    services::{cart_service, checkout_service},
};

// A cart where one line exceeds current stock must fail as a whole: no
// order, no stock change, no cart deletion.
#[tokio::test]
async fn insufficient_stock_aborts_without_partial_state() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "blocked").await?;
    let category_id = common::create_category(&state).await?;
    let plenty = common::create_product(&state, category_id, 100, 5).await?;
    let scarce = common::create_product(&state, category_id, 250, 2).await?;

    cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id: plenty,
            quantity: Some(1),
        },
    )
    .await?;
    // Stock was 2 at add time but is drained before checkout.
    cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id: scarce,
            quantity: Some(2),
        },
    )
    .await?;
    sqlx::query("UPDATE products SET stock = 1 WHERE id = $1")
        .bind(scarce)
        .execute(&state.pool)
        .await?;

    let result = checkout_service::place_order(&state, user_id).await;
    match result {
        Err(AppError::InsufficientStock { available, .. }) => {
            assert_eq!(available, 1);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    let user_orders = orders::Entity::find()
        .filter(orders::Column::UserId.eq(user_id))
        .all(&state.orm)
        .await?;
    assert!(user_orders.is_empty(), "no order may survive the abort");

    let plenty_row = products::Entity::find_by_id(plenty)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(plenty_row.stock, 5);
    assert_eq!(plenty_row.sold, 0);

    let scarce_row = products::Entity::find_by_id(scarce)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(scarce_row.stock, 1);
    assert_eq!(scarce_row.sold, 0);

    let lines = cart_items::Entity::find()
        .filter(cart_items::Column::UserId.eq(user_id))
        .all(&state.orm)
        .await?;
    assert_eq!(lines.len(), 2, "cart must be untouched after the abort");

    // An unknown user is rejected before anything is read.
    let result = checkout_service::place_order(&state, uuid::Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::InvalidUser)));

    Ok(())
}

// Adding beyond stock never mutates the cart; the response carries the
// available count as an advisory.
#[tokio::test]
async fn add_to_cart_beyond_stock_is_an_advisory() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "advisory").await?;
    let category_id = common::create_category(&state).await?;
    let product_id = common::create_product(&state, category_id, 100, 3).await?;

    let resp = cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id,
            quantity: Some(4),
        },
    )
    .await?;
    assert_eq!(resp.message, "Available stock is 3");
    assert!(resp.data.expect("cart data").items.is_empty());

    Ok(())
}
