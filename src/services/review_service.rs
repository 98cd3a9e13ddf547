use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::reviews::{ReviewList, SubmitReviewRequest},
    error::{AppError, AppResult},
    models::ProductReview,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

/// Create-or-update a review for a (user, product) pair. Submitting twice
/// replaces the earlier review and rating.
pub async fn submit_review(
    pool: &DbPool,
    payload: SubmitReviewRequest,
) -> AppResult<ApiResponse<ProductReview>> {
    if !(0..=5).contains(&payload.rating) {
        return Err(AppError::BadRequest(
            "rating must be between 0 and 5".to_string(),
        ));
    }

    let user: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
        .bind(payload.user_id)
        .fetch_optional(pool)
        .await?;
    if user.is_none() {
        return Err(AppError::InvalidUser);
    }

    let product: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;
    if product.is_none() {
        return Err(AppError::InvalidProduct);
    }

    let review = sqlx::query_as::<_, ProductReview>(
        r#"
        INSERT INTO product_reviews (id, product_id, user_id, review, rating)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, product_id)
        DO UPDATE SET review = EXCLUDED.review, rating = EXCLUDED.rating
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(payload.product_id)
    .bind(payload.user_id)
    .bind(payload.review)
    .bind(payload.rating)
    .fetch_one(pool)
    .await?;

    Ok(ApiResponse::success("Review saved", review, None))
}

pub async fn list_reviews(
    pool: &DbPool,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let items = sqlx::query_as::<_, ProductReview>(
        "SELECT * FROM product_reviews ORDER BY created_at DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM product_reviews")
        .fetch_one(pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}
