//! Shared helpers for DB-backed scenario tests.
//!
//! Every seeded row gets a unique per-test name suffix so scenario tests can
//! run concurrently against one database without colliding on the catalog's
//! unique constraints. DB tests are gated on `BPOS_DATABASE_URL` (see the
//! `#[ignore]` strings on the tests themselves).

use anyhow::{Context, Result};
use bpos_schemas::{OrderLine, OrderSubmission};
use sqlx::PgPool;
use uuid::Uuid;

/// Connect using BPOS_DATABASE_URL and bring the schema up to date.
pub async fn connect_and_migrate() -> Result<PgPool> {
    let pool = bpos_db::connect_from_env().await?;
    bpos_db::migrate(&pool).await?;
    Ok(pool)
}

/// Seed one ingredient with a unique name ("<label> <uuid>") and the given
/// starting count. Returns its id.
pub async fn seed_ingredient(pool: &PgPool, label: &str, count: i64) -> Result<i64> {
    let name = format!("{label} {}", Uuid::new_v4());
    bpos_db::catalog::insert_ingredient(pool, &name, count)
        .await
        .with_context(|| format!("seed_ingredient '{label}'"))
}

/// Seed one menu item with a unique name. Returns its id.
pub async fn seed_menu_item(pool: &PgPool, label: &str, price: f64) -> Result<i64> {
    let name = format!("{label} {}", Uuid::new_v4());
    bpos_db::catalog::insert_menu_item(pool, "Milk Tea", &name, price)
        .await
        .with_context(|| format!("seed_menu_item '{label}'"))
}

/// Attach a recipe entry: `menu_item` consumes `quantity_per_unit` of
/// `ingredient` per unit sold.
pub async fn seed_recipe(
    pool: &PgPool,
    menu_item_id: i64,
    ingredient_id: i64,
    quantity_per_unit: i64,
) -> Result<()> {
    bpos_db::catalog::upsert_recipe_entry(pool, menu_item_id, ingredient_id, quantity_per_unit)
        .await
}

/// A submission with sane defaults for everything but the line items.
pub fn submission(items: Vec<(i64, i64)>) -> OrderSubmission {
    OrderSubmission {
        employee_id: 1,
        customer_id: None,
        total_cost: 9.50,
        order_week: 32,
        time_of_order: None,
        items: items
            .into_iter()
            .map(|(menu_item_id, quantity)| OrderLine { menu_item_id, quantity })
            .collect(),
    }
}

/// Current count for one ingredient; panics in the caller's `expect` if the
/// row is missing (tests seed what they read).
pub async fn ingredient_count(pool: &PgPool, ingredient_id: i64) -> Result<i64> {
    let rows = bpos_db::inventory::fetch_counts(pool, &[ingredient_id]).await?;
    rows.first()
        .map(|r| r.ingredient_count)
        .context("ingredient row missing")
}
