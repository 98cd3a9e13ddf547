use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartList, RemoveFromCartQuery, RemovedFromCart},
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add_to_cart))
        .route("/view/{user_id}", get(cart_list))
        .route("/remove", delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart/view/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20")
    ),
    responses(
        (status = 200, description = "List cart lines for a user", body = ApiResponse<CartList>),
        (status = 400, description = "Invalid user"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn cart_list(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::list_cart(&state.pool, user_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/add",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Cart line added or replaced; or stock advisory", body = ApiResponse<CartList>),
        (status = 400, description = "Invalid user, invalid product or bad quantity"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartList>>> {
    let resp = cart_service::add_to_cart(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/cart/remove",
    params(
        ("user_id" = Uuid, Query, description = "User ID"),
        ("product_id" = Option<Uuid>, Query, description = "Product ID; clears the whole cart when absent")
    ),
    responses(
        (status = 200, description = "Removed", body = ApiResponse<RemovedFromCart>),
        (status = 400, description = "Invalid user/product, or nothing to remove"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn remove_from_cart(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<RemoveFromCartQuery>,
) -> AppResult<Json<ApiResponse<RemovedFromCart>>> {
    let resp = cart_service::remove_from_cart(&state.pool, query).await?;
    Ok(Json(resp))
}
