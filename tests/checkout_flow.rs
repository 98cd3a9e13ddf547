mod common;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use storefront_api::{
    dto::cart::AddToCartRequest,
    entity::{cart_items, order_items, orders, products},
    routes::params::Pagination,
    services::{
        cart_service,
        checkout_service::{self, CheckoutOutcome},
        order_service,
    },
};

// The worked end-to-end flow: product (stock 3, price 100), add quantity 2
// to the cart (replacing an earlier quantity), place the order, and verify
// the order, its item, the stock/sold counters and the emptied cart.
#[tokio::test]
async fn add_to_cart_and_checkout_flow() -> anyhow::Result<()> {
    let Some(state) = common::setup_state().await? else {
        return Ok(());
    };

    let user_id = common::create_user(&state, "buyer").await?;
    let category_id = common::create_category(&state).await?;
    let product_id = common::create_product(&state, category_id, 100, 3).await?;

    // First add is replaced by the second; add-to-cart is not additive.
    cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id,
            quantity: Some(1),
        },
    )
    .await?;
    let resp = cart_service::add_to_cart(
        &state.pool,
        AddToCartRequest {
            user_id,
            product_id,
            quantity: Some(2),
        },
    )
    .await?;

    let cart = resp.data.expect("cart data");
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 2);
    assert_eq!(cart.items[0].price, 200);

    let outcome = checkout_service::place_order(&state, user_id).await?;
    let placed = match outcome {
        CheckoutOutcome::Placed(placed) => placed,
        CheckoutOutcome::EmptyCart => panic!("expected an order to be placed"),
    };
    assert_eq!(placed.total, 200);
    assert_eq!(placed.items, 1);

    let order = orders::Entity::find_by_id(placed.order_id)
        .one(&state.orm)
        .await?
        .expect("order row");
    assert_eq!(order.user_id, user_id);
    assert_eq!(order.price, 200);

    let items = order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, product_id);
    assert_eq!(items[0].line_no, 1);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].price, 200);

    let product = products::Entity::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .expect("product row");
    assert_eq!(product.stock, 1);
    assert_eq!(product.sold, 2);

    let remaining = cart_items::Entity::find()
        .filter(cart_items::Column::UserId.eq(user_id))
        .all(&state.orm)
        .await?;
    assert!(remaining.is_empty(), "cart should be empty after checkout");

    // Order detail shows the item with the order and product nested.
    let detail = order_service::order_detail(&state.pool, user_id).await?;
    let detail = detail.data.expect("order detail");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].order.id, order.id);
    assert_eq!(detail.items[0].product.id, product_id);

    // A second checkout on the now-empty cart is a no-op.
    let outcome = checkout_service::place_order(&state, user_id).await?;
    assert!(matches!(outcome, CheckoutOutcome::EmptyCart));

    // And the cart listing is empty too.
    let listing = cart_service::list_cart(
        &state.pool,
        user_id,
        Pagination {
            page: None,
            per_page: None,
        },
    )
    .await?;
    assert!(listing.data.expect("cart data").items.is_empty());

    Ok(())
}
