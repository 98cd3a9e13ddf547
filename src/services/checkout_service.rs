//! Cart-to-order checkout engine.
//!
//! Converts all of a user's cart lines into one order inside a single
//! database transaction. Stock is re-validated against the current values
//! while the product rows are held under `FOR UPDATE`, so two checkouts
//! racing for the same units serialize and the loser fails cleanly. Any
//! failure rolls the whole transaction back; no partial order, stock
//! decrement, or cart deletion is ever visible.

use std::collections::HashMap;

use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::PlacedOrder,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::ActiveModel as OrderItemActive,
        orders::ActiveModel as OrderActive,
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    state::AppState,
};

/// Result of a checkout attempt that did not error. An empty cart is a
/// no-op reported as a success-with-message at the API, not a failure.
#[derive(Debug)]
pub enum CheckoutOutcome {
    Placed(PlacedOrder),
    EmptyCart,
}

pub async fn place_order(state: &AppState, user_id: Uuid) -> AppResult<CheckoutOutcome> {
    let txn = state.orm.begin().await?;

    let user = Users::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(AppError::InvalidUser)?;

    // Locking the cart rows serializes two checkouts for the same user:
    // the second blocks here and re-reads an empty cart after the first
    // commits, landing on the empty-cart outcome instead of double-selling.
    let lines = CartItems::find()
        .filter(CartCol::UserId.eq(user.id))
        .order_by_asc(CartCol::CreatedAt)
        .order_by_asc(CartCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?;

    if lines.is_empty() {
        return Ok(CheckoutOutcome::EmptyCart);
    }

    // Lock every referenced product row in ascending-id order. All checkouts
    // acquire product locks in the same global order, so they cannot
    // deadlock against each other.
    let mut product_ids: Vec<Uuid> = lines.iter().map(|line| line.product_id).collect();
    product_ids.sort();
    product_ids.dedup();

    let products: HashMap<Uuid, ProductModel> = Products::find()
        .filter(ProdCol::Id.is_in(product_ids))
        .order_by_asc(ProdCol::Id)
        .lock(LockType::Update)
        .all(&txn)
        .await?
        .into_iter()
        .map(|product| (product.id, product))
        .collect();

    // Validation pass: every line is checked against current stock before
    // any mutation begins.
    for line in &lines {
        let product = products
            .get(&line.product_id)
            .ok_or(AppError::InvalidProduct)?;
        if product.stock < line.quantity {
            return Err(AppError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
            });
        }
    }

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.id),
        price: Set(0),
        address: Set(user.address.clone()),
        phone: Set(user.phone_no.clone()),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // Commit pass: one order item per cart line, in the order the lines
    // were loaded. The decrement is conditional on `stock >= quantity` as a
    // second guard under the row lock.
    let mut total: i64 = 0;
    for (idx, line) in lines.iter().enumerate() {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(line.product_id),
            line_no: Set(idx as i32 + 1),
            quantity: Set(line.quantity),
            price: Set(line.price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let updated = Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(line.quantity))
            .col_expr(ProdCol::Sold, Expr::col(ProdCol::Sold).add(line.quantity))
            .filter(ProdCol::Id.eq(line.product_id))
            .filter(ProdCol::Stock.gte(line.quantity))
            .exec(&txn)
            .await?;
        if updated.rows_affected != 1 {
            let product = &products[&line.product_id];
            return Err(AppError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
            });
        }

        total += line.price;

        CartItems::delete_by_id(line.id).exec(&txn).await?;
    }

    let mut active: OrderActive = order.into();
    active.price = Set(total);
    let order = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(order_id = %order.id, total, items = lines.len(), "order placed");

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.id),
        "order_placed",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total": total })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(CheckoutOutcome::Placed(PlacedOrder {
        order_id: order.id,
        total,
        items: lines.len() as i64,
    }))
}
