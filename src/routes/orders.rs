use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderDetailList, PlacedOrder, UserQuery},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{
        checkout_service::{self, CheckoutOutcome},
        order_service,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/place", post(place_order))
        .route("/detail", get(order_detail))
}

#[utoipa::path(
    post,
    path = "/api/order/place",
    params(
        ("user_id" = Uuid, Query, description = "User ID")
    ),
    responses(
        (status = 200, description = "Order placed, or cart was empty", body = ApiResponse<PlacedOrder>),
        (status = 400, description = "Invalid user or not enough stock"),
        (status = 500, description = "Storage failure; safe to retry"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<PlacedOrder>>> {
    let resp = match checkout_service::place_order(&state, query.user_id).await? {
        CheckoutOutcome::Placed(placed) => ApiResponse::success("Order placed", placed, None),
        CheckoutOutcome::EmptyCart => ApiResponse::message("Cart is empty"),
    };
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/order/detail",
    params(
        ("user_id" = Uuid, Query, description = "User ID")
    ),
    responses(
        (status = 200, description = "Order items with nested order and product", body = ApiResponse<OrderDetailList>),
        (status = 400, description = "Invalid user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn order_detail(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<OrderDetailList>>> {
    let resp = order_service::order_detail(&state.pool, query.user_id).await?;
    Ok(Json(resp))
}
