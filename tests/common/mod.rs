use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, Set};
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    entity::{
        categories::ActiveModel as CategoryActive, products::ActiveModel as ProductActive,
        users::ActiveModel as UserActive,
    },
    state::AppState,
};
use uuid::Uuid;

/// Connect and migrate, or `None` when no database is configured so the
/// caller can skip.
pub async fn setup_state() -> anyhow::Result<Option<AppState>> {
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests."
                );
                return Ok(None);
            }
        };

    let pool = create_pool(&database_url).await?;
    let orm = create_orm_conn(&database_url).await?;

    // Tests in one binary run concurrently; serialize migration DDL.
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT pg_advisory_lock(723401)")
        .execute(&mut *conn)
        .await?;
    let migrated = run_migrations(&orm).await;
    sqlx::query("SELECT pg_advisory_unlock(723401)")
        .execute(&mut *conn)
        .await?;
    migrated?;

    Ok(Some(AppState { pool, orm }))
}

pub async fn create_user(state: &AppState, tag: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(format!("{tag}-{}@example.com", Uuid::new_v4())),
        password_hash: Set("dummy".into()),
        full_name: Set(format!("Test {tag}")),
        phone_no: Set("555-0100".into()),
        address: Set("1 Test Lane".into()),
        is_admin: Set(false),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

pub async fn create_category(state: &AppState) -> anyhow::Result<Uuid> {
    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("category-{}", Uuid::new_v4())),
    }
    .insert(&state.orm)
    .await?;

    Ok(category.id)
}

pub async fn create_product(
    state: &AppState,
    category_id: Uuid,
    price: i64,
    stock: i32,
) -> anyhow::Result<Uuid> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(format!("widget-{}", Uuid::new_v4())),
        price: Set(price),
        category_id: Set(category_id),
        stock: Set(stock),
        sold: Set(0),
        description: Set(Some("A product for testing".into())),
        image: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product.id)
}
