//! Recipe index access: menu item -> per-unit ingredient consumption.
//!
//! Strictly read-only. A menu item with no recipe rows consumes nothing; the
//! empty result is a valid answer, never an error (non-consumable items such
//! as merchandise stay representable).

use anyhow::{Context, Result};
use sqlx::{Postgres, Row, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipeEntry {
    pub menu_item_id: i64,
    pub ingredient_id: i64,
    pub quantity_per_unit: i64,
}

/// All recipe entries for a set of menu items, transaction-scoped so the
/// expansion is read under the same isolation as the decrement that follows.
pub async fn recipe_entries_for_items(
    tx: &mut Transaction<'_, Postgres>,
    menu_item_ids: &[i64],
) -> Result<Vec<RecipeEntry>> {
    let rows = sqlx::query(
        r#"
        select menuitemid, ingredientid, ingredientqty
        from menuitemingredients
        where menuitemid = any($1)
        order by menuitemid, ingredientid
        "#,
    )
    .bind(menu_item_ids)
    .fetch_all(&mut **tx)
    .await
    .context("recipe_entries_for_items failed")?;

    rows.iter().map(entry_from_row).collect()
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Result<RecipeEntry> {
    Ok(RecipeEntry {
        menu_item_id: row.try_get("menuitemid")?,
        ingredient_id: row.try_get("ingredientid")?,
        quantity_per_unit: row.try_get("ingredientqty")?,
    })
}
