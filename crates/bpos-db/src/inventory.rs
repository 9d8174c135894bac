//! Inventory ledger access.
//!
//! The ledger is the only mutable shared state in the system. All writers go
//! through [`conditional_decrement`], which locks the touched rows, compares
//! aggregated demand against current counts, and applies the decrements as one
//! all-or-nothing unit inside the caller's transaction. No caller may
//! read-then-write inventory without holding those row locks.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRow {
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub ingredient_count: i64,
}

/// Outcome of a conditional decrement attempt.
///
/// `Insufficient` carries every short ingredient (ascending id), not just the
/// first. Counts are not included; callers see ids only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecrementOutcome {
    Applied,
    Insufficient { ingredient_ids: Vec<i64> },
}

/// Plain read of current counts for a set of ingredients. No locks taken;
/// for display surfaces only, never for allocation decisions.
pub async fn fetch_counts(pool: &PgPool, ingredient_ids: &[i64]) -> Result<Vec<IngredientRow>> {
    let rows = sqlx::query(
        r#"
        select ingredientid, ingredientname, ingredientcount
        from inventory
        where ingredientid = any($1)
        order by ingredientid
        "#,
    )
    .bind(ingredient_ids)
    .fetch_all(pool)
    .await
    .context("fetch_counts failed")?;

    rows.iter().map(ingredient_from_row).collect()
}

/// Full inventory listing (menu-board / stock display).
pub async fn list_inventory(pool: &PgPool) -> Result<Vec<IngredientRow>> {
    let rows = sqlx::query(
        r#"
        select ingredientid, ingredientname, ingredientcount
        from inventory
        order by ingredientname
        "#,
    )
    .fetch_all(pool)
    .await
    .context("list_inventory failed")?;

    rows.iter().map(ingredient_from_row).collect()
}

/// Lock the given inventory rows for the remainder of the transaction and
/// return their current counts.
///
/// Rows are locked in ascending ingredientid order. Every concurrent
/// placement locks in the same order, so two orders competing for overlapping
/// ingredients serialize instead of deadlocking.
pub async fn lock_counts(
    tx: &mut Transaction<'_, Postgres>,
    ingredient_ids: &[i64],
) -> Result<Vec<IngredientRow>> {
    let rows = sqlx::query(
        r#"
        select ingredientid, ingredientname, ingredientcount
        from inventory
        where ingredientid = any($1)
        order by ingredientid
        for update
        "#,
    )
    .bind(ingredient_ids)
    .fetch_all(&mut **tx)
    .await
    .context("lock_counts failed")?;

    rows.iter().map(ingredient_from_row).collect()
}

/// Atomically decrement the ledger by `demand` (ingredientid -> amount), or
/// mutate nothing.
///
/// Inside the caller's transaction:
/// 1. lock the touched rows (ascending id order),
/// 2. compare each demand against the locked count,
/// 3. only if every demand is satisfiable, apply all decrements.
///
/// Insufficient stock returns `Insufficient` with no mutation performed; the
/// caller decides whether to roll the surrounding transaction back. A demand
/// for an ingredient id with no ledger row is reported as insufficient rather
/// than an error (the FK on the recipe table makes this unreachable through
/// normal placement).
pub async fn conditional_decrement(
    tx: &mut Transaction<'_, Postgres>,
    demand: &BTreeMap<i64, i64>,
) -> Result<DecrementOutcome> {
    if demand.is_empty() {
        // Order of non-consuming items; nothing to do.
        return Ok(DecrementOutcome::Applied);
    }

    let ids: Vec<i64> = demand.keys().copied().collect();
    let locked = lock_counts(tx, &ids).await?;

    let counts: BTreeMap<i64, i64> = locked
        .iter()
        .map(|r| (r.ingredient_id, r.ingredient_count))
        .collect();

    let mut short: Vec<i64> = Vec::new();
    for (&ingredient_id, &needed) in demand {
        match counts.get(&ingredient_id) {
            Some(&available) if available >= needed => {}
            _ => short.push(ingredient_id),
        }
    }

    if !short.is_empty() {
        return Ok(DecrementOutcome::Insufficient { ingredient_ids: short });
    }

    for (&ingredient_id, &needed) in demand {
        sqlx::query(
            r#"
            update inventory
            set ingredientcount = ingredientcount - $1
            where ingredientid = $2
            "#,
        )
        .bind(needed)
        .bind(ingredient_id)
        .execute(&mut **tx)
        .await
        .with_context(|| format!("decrement failed for ingredient {ingredient_id}"))?;
    }

    Ok(DecrementOutcome::Applied)
}

fn ingredient_from_row(row: &sqlx::postgres::PgRow) -> Result<IngredientRow> {
    Ok(IngredientRow {
        ingredient_id: row.try_get("ingredientid")?,
        ingredient_name: row.try_get("ingredientname")?,
        ingredient_count: row.try_get("ingredientcount")?,
    })
}
