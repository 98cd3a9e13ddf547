use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Order, Product};

#[derive(Debug, Deserialize, ToSchema)]
pub struct UserQuery {
    pub user_id: Uuid,
}

/// Confirmation returned by a successful checkout.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlacedOrder {
    pub order_id: Uuid,
    pub total: i64,
    pub items: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderDetailList {
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub id: Uuid,
    pub line_no: i32,
    pub quantity: i32,
    pub price: i64,
    pub created_at: DateTime<Utc>,
    pub order: Order,
    pub product: Product,
}
