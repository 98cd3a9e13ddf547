mod common;

use sea_orm::EntityTrait;
use storefront_api::{
    dto::cart::AddToCartRequest,
    entity::products,
    error::AppError,
    services::{
        cart_service,
        checkout_service::{self, CheckoutOutcome},
    },
};

// Two buyers race for the last unit of one product. Exactly one checkout
// wins; the loser gets the insufficient-stock failure and no oversell
// happens.
#[tokio::test]
async fn concurrent_checkouts_for_last_unit_pick_one_winner() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let first = common::create_user(&state, "racer-one").await?;
    let second = common::create_user(&state, "racer-two").await?;
    let category_id = common::create_category(&state).await?;
    let product_id = common::create_product(&state, category_id, 100, 1).await?;

    for user_id in [first, second] {
        cart_service::add_to_cart(
            &state.pool,
            AddToCartRequest {
                user_id,
                product_id,
                quantity: Some(1),
            },
        )
        .await?;
    }

    let (a, b) = tokio::join!(
        checkout_service::place_order(&state, first),
        checkout_service::place_order(&state, second),
    );

    let mut placed = 0;
    let mut declined = 0;
    for result in [a, b] {
        match result {
            Ok(CheckoutOutcome::Placed(order)) => {
                assert_eq!(order.total, 100);
                placed += 1;
            }
            Ok(CheckoutOutcome::EmptyCart) => panic!("neither cart was empty"),
            Err(AppError::InsufficientStock { available, .. }) => {
                assert_eq!(available, 0);
                declined += 1;
            }
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }
    assert_eq!(placed, 1, "exactly one checkout must win");
    assert_eq!(declined, 1, "the other must be declined");

    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(product.stock, 0);
    assert_eq!(product.sold, 1);

    Ok(())
}

// The same user checking out from two devices must not be double-charged:
// the second transaction sees the emptied cart.
#[tokio::test]
async fn concurrent_checkouts_same_user_place_one_order() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "two-devices").await?;
    let category_id = common::create_category(&state).await?;
    let product_id = common::create_product(&state, category_id, 100, 10).await?;

    cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id,
            quantity: Some(2),
        },
    )
    .await?;

    let (a, b) = tokio::join!(
        checkout_service::place_order(&state, user_id),
        checkout_service::place_order(&state, user_id),
    );

    let outcomes = [a?, b?];
    let placed = outcomes
        .iter()
        .filter(|o| matches!(o, CheckoutOutcome::Placed(_)))
        .count();
    let empty = outcomes
        .iter()
        .filter(|o| matches!(o, CheckoutOutcome::EmptyCart))
        .count();
    assert_eq!(placed, 1, "only one device may place the order");
    assert_eq!(empty, 1, "the other sees an already-empty cart");

    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(product.stock, 8);
    assert_eq!(product.sold, 2);

    Ok(())
}
