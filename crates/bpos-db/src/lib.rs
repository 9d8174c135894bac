use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod recipes;

pub use inventory::{DecrementOutcome, IngredientRow};
pub use orders::{NewOrder, OrderLineRow, OrderRow};
pub use recipes::RecipeEntry;

pub const ENV_DB_URL: &str = "BPOS_DATABASE_URL";

/// Connect to Postgres using BPOS_DATABASE_URL.
pub async fn connect_from_env() -> Result<PgPool> {
    connect_from_env_with_max(10).await
}

pub async fn connect_from_env_with_max(max_connections: u32) -> Result<PgPool> {
    let url = std::env::var(ENV_DB_URL)
        .with_context(|| format!("missing env var {ENV_DB_URL}"))?;

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await
        .context("failed to connect to Postgres")?;

    Ok(pool)
}

/// Run embedded SQLx migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("db migrate failed")?;
    Ok(())
}

/// Simple status query (connectivity + schema presence).
pub async fn status(pool: &PgPool) -> Result<DbStatus> {
    let (one,): (i32,) = sqlx::query_as::<_, (i32,)>("select 1")
        .fetch_one(pool)
        .await
        .context("status connectivity query failed")?;
    let ok = one == 1;

    let (exists,): (bool,) = sqlx::query_as::<_, (bool,)>(
        r#"
        select exists (
            select 1
            from information_schema.tables
            where table_schema='public' and table_name='orders'
        )
        "#,
    )
    .fetch_one(pool)
    .await
    .context("status table-exists query failed")?;

    Ok(DbStatus { ok, has_orders_table: exists })
}

#[derive(Debug, Clone)]
pub struct DbStatus {
    pub ok: bool,
    pub has_orders_table: bool,
}

// ---------------------------------------------------------------------------
// SQLSTATE classification
// ---------------------------------------------------------------------------

/// Postgres foreign_key_violation (23503).
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    sqlstate_is(err, &["23503"])
}

/// Postgres check_violation (23514).
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    sqlstate_is(err, &["23514"])
}

/// Conflicts that are safe to retry with a fresh transaction:
/// serialization_failure (40001) and deadlock_detected (40P01).
pub fn is_transient_conflict(err: &sqlx::Error) -> bool {
    sqlstate_is(err, &["40001", "40P01"])
}

fn sqlstate_is(err: &sqlx::Error, codes: &[&str]) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code();
            codes.iter().any(|c| code.as_deref() == Some(*c))
        }
        _ => false,
    }
}
