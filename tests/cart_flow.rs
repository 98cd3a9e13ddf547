mod common;

use storefront_api::{
    dto::cart::{AddToCartRequest, RemoveFromCartQuery},
    error::AppError,
    services::cart_service,
};
use uuid::Uuid;

#[tokio::test]
async fn remove_line_and_clear_cart() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "remover").await?;
    let category_id = common::create_category(&state).await?;
    let first = common::create_product(&state, category_id, 100, 10).await?;
    let second = common::create_product(&state, category_id, 200, 10).await?;

    for product_id in [first, second] {
        cart_service::add_to_cart(
            &state.pool,
            AddToCartRequest {
                user_id,
                product_id,
                // Omitted quantity defaults to 1.
                quantity: None,
            },
        )
        .await?;
    }

    let resp = cart_service::remove_from_cart(
        &state.pool,
        RemoveFromCartQuery {
            user_id,
            product_id: Some(first),
        },
    )
    .await?;
    assert_eq!(resp.message, "Product removed from cart");
    assert_eq!(resp.data.expect("removal data").removed, 1);

    // Removing the same product again distinguishes "nothing to remove".
    let result = cart_service::remove_from_cart(
        &state.pool,
        RemoveFromCartQuery {
            user_id,
            product_id: Some(first),
        },
    )
    .await;
    match result {
        Err(AppError::BadRequest(message)) => assert_eq!(message, "Product is not in Cart"),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    // No product id clears the whole cart.
    let resp = cart_service::remove_from_cart(
        &state.pool,
        RemoveFromCartQuery {
            user_id,
            product_id: None,
        },
    )
    .await?;
    assert_eq!(resp.message, "Cart cleared");
    assert_eq!(resp.data.expect("removal data").removed, 1);

    let result = cart_service::remove_from_cart(
        &state.pool,
        RemoveFromCartQuery {
            user_id,
            product_id: None,
        },
    )
    .await;
    match result {
        Err(AppError::BadRequest(message)) => assert_eq!(message, "Cart is empty"),
        other => panic!("expected BadRequest, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn cart_mutations_reject_unknown_user_and_product() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "validator").await?;
    let category_id = common::create_category(&state).await?;
    let product_id = common::create_product(&state, category_id, 100, 10).await?;

    let result = cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id: Uuid::new_v4(),
            product_id,
            quantity: Some(1),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidUser)));

    let result = cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id: Uuid::new_v4(),
            quantity: Some(1),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidProduct)));

    let result = cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id,
            quantity: Some(0),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));

    let result = cart_service::remove_from_cart(
        &state.pool,
        RemoveFromCartQuery {
            user_id,
            product_id: Some(Uuid::new_v4()),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::InvalidProduct)));

    Ok(())
}
