//! Menu catalog writes and reads.
//!
//! Catalog management proper (menu CRUD screens) is out of scope; these
//! functions exist for seeding and for the read surfaces the daemon and CLI
//! expose.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};

pub async fn insert_ingredient(pool: &PgPool, name: &str, count: i64) -> Result<i64> {
    let row = sqlx::query(
        r#"
        insert into inventory (ingredientname, ingredientcount)
        values ($1, $2)
        returning ingredientid
        "#,
    )
    .bind(name)
    .bind(count)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert_ingredient failed for '{name}'"))?;

    Ok(row.try_get("ingredientid")?)
}

pub async fn insert_menu_item(
    pool: &PgPool,
    category: &str,
    name: &str,
    price: f64,
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        insert into menuitems (drinkcategory, menuitemname, price)
        values ($1, $2, $3)
        returning menuitemid
        "#,
    )
    .bind(category)
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await
    .with_context(|| format!("insert_menu_item failed for '{name}'"))?;

    Ok(row.try_get("menuitemid")?)
}

/// Idempotent ingredient seeding: on name conflict the stored count wins
/// (re-seeding must not clobber live stock).
pub async fn ensure_ingredient(pool: &PgPool, name: &str, count: i64) -> Result<i64> {
    let row = sqlx::query(
        r#"
        insert into inventory (ingredientname, ingredientcount)
        values ($1, $2)
        on conflict (ingredientname) do update set ingredientname = excluded.ingredientname
        returning ingredientid
        "#,
    )
    .bind(name)
    .bind(count)
    .fetch_one(pool)
    .await
    .with_context(|| format!("ensure_ingredient failed for '{name}'"))?;

    Ok(row.try_get("ingredientid")?)
}

/// Idempotent menu item seeding: on name conflict the price is refreshed.
pub async fn ensure_menu_item(
    pool: &PgPool,
    category: &str,
    name: &str,
    price: f64,
) -> Result<i64> {
    let row = sqlx::query(
        r#"
        insert into menuitems (drinkcategory, menuitemname, price)
        values ($1, $2, $3)
        on conflict (menuitemname)
        do update set drinkcategory = excluded.drinkcategory, price = excluded.price
        returning menuitemid
        "#,
    )
    .bind(category)
    .bind(name)
    .bind(price)
    .fetch_one(pool)
    .await
    .with_context(|| format!("ensure_menu_item failed for '{name}'"))?;

    Ok(row.try_get("menuitemid")?)
}

/// Insert or replace one recipe entry for (menu item, ingredient).
pub async fn upsert_recipe_entry(
    pool: &PgPool,
    menu_item_id: i64,
    ingredient_id: i64,
    quantity_per_unit: i64,
) -> Result<()> {
    sqlx::query(
        r#"
        insert into menuitemingredients (menuitemid, ingredientid, ingredientqty)
        values ($1, $2, $3)
        on conflict (menuitemid, ingredientid)
        do update set ingredientqty = excluded.ingredientqty
        "#,
    )
    .bind(menu_item_id)
    .bind(ingredient_id)
    .bind(quantity_per_unit)
    .execute(pool)
    .await
    .context("upsert_recipe_entry failed")?;

    Ok(())
}
