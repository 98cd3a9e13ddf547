use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::cart::{AddToCartRequest, CartLineDto, CartList, RemoveFromCartQuery, RemovedFromCart},
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

#[derive(FromRow)]
struct CartWithProductRow {
    line_id: Uuid,
    quantity: i32,
    line_price: i64,
    product_id: Uuid,
    name: String,
    price: i64,
    category_id: Uuid,
    stock: i32,
    sold: i32,
    description: Option<String>,
    image: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<CartWithProductRow> for CartLineDto {
    fn from(row: CartWithProductRow) -> Self {
        CartLineDto {
            id: row.line_id,
            product: Product {
                id: row.product_id,
                name: row.name,
                price: row.price,
                category_id: row.category_id,
                stock: row.stock,
                sold: row.sold,
                description: row.description,
                image: row.image,
                created_at: row.created_at,
            },
            quantity: row.quantity,
            price: row.line_price,
        }
    }
}

pub async fn list_cart(
    pool: &DbPool,
    user_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<CartList>> {
    ensure_user_exists(pool, user_id).await?;

    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS line_id, ci.quantity, ci.price AS line_price,
               p.id AS product_id, p.name, p.price, p.category_id, p.stock, p.sold,
               p.description, p.image, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at, ci.id
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cart_items WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let items = rows.into_iter().map(CartLineDto::from).collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", CartList { items }, Some(meta)))
}

/// Add-or-update a cart line. A second add for the same (user, product)
/// replaces quantity and price rather than accumulating; the line price is
/// captured as quantity x current unit price at this write.
pub async fn add_to_cart(
    pool: &DbPool,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartList>> {
    let quantity = payload.quantity.unwrap_or(1);
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    ensure_user_exists(pool, payload.user_id).await?;

    let product: Option<Product> = sqlx::query_as("SELECT * FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    let product = product.ok_or(AppError::InvalidProduct)?;

    // Not enough stock is an advisory, not an error: report the available
    // count with the unchanged cart.
    if product.stock < quantity {
        let current = full_cart(pool, payload.user_id).await?;
        return Ok(ApiResponse::success(
            format!("Available stock is {}", product.stock),
            current,
            Some(Meta::empty()),
        ));
    }

    let line_price = product.price * quantity as i64;
    sqlx::query(
        r#"
        INSERT INTO cart_items (id, user_id, product_id, quantity, price)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET quantity = EXCLUDED.quantity, price = EXCLUDED.price
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.user_id)
    .bind(payload.product_id)
    .bind(quantity)
    .bind(line_price)
    .execute(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(payload.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": payload.product_id, "quantity": quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    let cart = full_cart(pool, payload.user_id).await?;
    Ok(ApiResponse::success("OK", cart, Some(Meta::empty())))
}

/// Remove one line, or clear the whole cart when no product is given. The
/// removed count distinguishes "nothing to remove" from "removed".
pub async fn remove_from_cart(
    pool: &DbPool,
    query: RemoveFromCartQuery,
) -> AppResult<ApiResponse<RemovedFromCart>> {
    ensure_user_exists(pool, query.user_id).await?;

    let (message, removed) = match query.product_id {
        Some(product_id) => {
            let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
                .bind(product_id)
                .fetch_optional(pool)
                .await?;
            if product.is_none() {
                return Err(AppError::InvalidProduct);
            }

            let result =
                sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
                    .bind(query.user_id)
                    .bind(product_id)
                    .execute(pool)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::BadRequest("Product is not in Cart".to_string()));
            }
            ("Product removed from cart", result.rows_affected())
        }
        None => {
            let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
                .bind(query.user_id)
                .execute(pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::BadRequest("Cart is empty".to_string()));
            }
            ("Cart cleared", result.rows_affected())
        }
    };

    if let Err(err) = log_audit(
        pool,
        Some(query.user_id),
        "cart_remove",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": query.product_id, "removed": removed })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        message,
        RemovedFromCart { removed },
        Some(Meta::empty()),
    ))
}

async fn ensure_user_exists(pool: &DbPool, user_id: Uuid) -> AppResult<()> {
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if user.is_none() {
        return Err(AppError::InvalidUser);
    }
    Ok(())
}

async fn full_cart(pool: &DbPool, user_id: Uuid) -> AppResult<CartList> {
    let rows = sqlx::query_as::<_, CartWithProductRow>(
        r#"
        SELECT ci.id AS line_id, ci.quantity, ci.price AS line_price,
               p.id AS product_id, p.name, p.price, p.category_id, p.stock, p.sold,
               p.description, p.image, p.created_at
        FROM cart_items ci
        JOIN products p ON p.id = ci.product_id
        WHERE ci.user_id = $1
        ORDER BY ci.created_at, ci.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(CartList {
        items: rows.into_iter().map(CartLineDto::from).collect(),
    })
}
