use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        cart::{CartLineDto, CartList, RemovedFromCart},
        categories::CategoryList,
        orders::{OrderDetailList, OrderItemDetail, PlacedOrder},
        products::ProductList,
        reviews::ReviewList,
    },
    models::{CartLine, Category, Order, OrderItem, Product, ProductReview, User},
    response::{ApiResponse, Meta},
    routes::{auth, cart, categories, health, orders, params, products, reviews},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::place_order,
        orders::order_detail,
        products::list_products,
        products::get_product,
        products::list_by_category,
        products::create_product,
        products::update_product,
        products::delete_product,
        categories::list_categories,
        categories::get_category,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        reviews::list_reviews,
        reviews::submit_review
    ),
    components(
        schemas(
            User,
            Category,
            Product,
            CartLine,
            Order,
            OrderItem,
            ProductReview,
            CartLineDto,
            CartList,
            RemovedFromCart,
            PlacedOrder,
            OrderItemDetail,
            OrderDetailList,
            ProductList,
            CategoryList,
            ReviewList,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartList>,
            ApiResponse<PlacedOrder>,
            ApiResponse<OrderDetailList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order placement and history"),
        (name = "Reviews", description = "Product review endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
