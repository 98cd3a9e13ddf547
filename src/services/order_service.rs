use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::orders::{OrderDetailList, OrderItemDetail},
    error::{AppError, AppResult},
    models::{Order, Product},
    response::{ApiResponse, Meta},
};

#[derive(FromRow)]
struct OrderDetailRow {
    item_id: Uuid,
    line_no: i32,
    quantity: i32,
    item_price: i64,
    item_created_at: DateTime<Utc>,
    order_id: Uuid,
    user_id: Uuid,
    order_price: i64,
    address: String,
    phone: String,
    order_created_at: DateTime<Utc>,
    product_id: Uuid,
    name: String,
    price: i64,
    category_id: Uuid,
    stock: i32,
    sold: i32,
    description: Option<String>,
    image: Option<String>,
    product_created_at: DateTime<Utc>,
}

/// All order items ever placed by a user, newest order first, with the
/// owning order and the current product detail nested in each row.
pub async fn order_detail(pool: &DbPool, user_id: Uuid) -> AppResult<ApiResponse<OrderDetailList>> {
    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    if user.is_none() {
        return Err(AppError::InvalidUser);
    }

    let rows = sqlx::query_as::<_, OrderDetailRow>(
        r#"
        SELECT oi.id AS item_id, oi.line_no, oi.quantity, oi.price AS item_price,
               oi.created_at AS item_created_at,
               o.id AS order_id, o.user_id, o.price AS order_price, o.address, o.phone,
               o.created_at AS order_created_at,
               p.id AS product_id, p.name, p.price, p.category_id, p.stock, p.sold,
               p.description, p.image, p.created_at AS product_created_at
        FROM order_items oi
        JOIN orders o ON o.id = oi.order_id
        JOIN products p ON p.id = oi.product_id
        WHERE o.user_id = $1
        ORDER BY o.created_at DESC, oi.line_no
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let items = rows
        .into_iter()
        .map(|row| OrderItemDetail {
            id: row.item_id,
            line_no: row.line_no,
            quantity: row.quantity,
            price: row.item_price,
            created_at: row.item_created_at,
            order: Order {
                id: row.order_id,
                user_id: row.user_id,
                price: row.order_price,
                address: row.address,
                phone: row.phone,
                created_at: row.order_created_at,
            },
            product: Product {
                id: row.product_id,
                name: row.name,
                price: row.price,
                category_id: row.category_id,
                stock: row.stock,
                sold: row.sold,
                description: row.description,
                image: row.image,
                created_at: row.product_created_at,
            },
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderDetailList { items },
        Some(Meta::empty()),
    ))
}
