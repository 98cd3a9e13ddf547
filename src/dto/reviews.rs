use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::ProductReview;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct SubmitReviewRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[serde(default)]
    pub review: String,
    #[serde(default)]
    pub rating: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewList {
    pub items: Vec<ProductReview>,
}
