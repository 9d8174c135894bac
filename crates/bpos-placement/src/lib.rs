//! Order placement: the one transactional core of the POS.
//!
//! A submission runs Received → Validating → Allocating → Committed (or a
//! terminal Rejected/Failed); see [`state`] for the machine. Allocation is a
//! single Postgres transaction that expands the order through the recipe
//! index, conditionally decrements the inventory ledger under row locks, and
//! persists the order with its line items. Either all of those effects commit
//! or none of them are observable.
//!
//! Transient conflicts (serialization failure, deadlock) restart the whole
//! allocation from a fresh read, a bounded number of times with exponential
//! backoff. Business rejections are never retried.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use bpos_db::inventory::{self, DecrementOutcome};
use bpos_db::orders::{self, NewOrder, OrderLineRow, OrderRow};
use bpos_db::recipes::{self, RecipeEntry};
use bpos_schemas::{OrderLine, OrderSubmission};
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, info, warn};

pub mod state;

pub use state::{Placement, PlacementEvent, PlacementState, TransitionError};

// ---------------------------------------------------------------------------
// Outcome surface
// ---------------------------------------------------------------------------

/// Why a submission was refused. Business outcomes, not errors: the caller
/// gets these in `Ok`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Malformed submission (empty item list, non-positive quantity, …).
    /// Surfaced before any storage access.
    InvalidInput { reason: String },
    /// One or more ingredients short at the instant of the locked check.
    /// Carries ids only; stock counts stay internal.
    InsufficientInventory { ingredient_ids: Vec<i64> },
}

/// The persisted result of a committed placement.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order: OrderRow,
    pub lines: Vec<OrderLineRow>,
}

/// Terminal result of [`place_order`]. Infrastructure failure is the `Err`
/// channel of the surrounding `Result`.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementOutcome {
    Committed(PlacedOrder),
    Rejected(RejectReason),
}

/// Retry knobs for the transient-conflict loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOptions {
    /// Total attempts for one submission, counting the first (>= 1).
    pub max_attempts: u32,
    /// Base of the exponential backoff between attempts.
    pub backoff_base: Duration,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(25),
        }
    }
}

// ---------------------------------------------------------------------------
// place_order
// ---------------------------------------------------------------------------

/// Place one order: validate, then atomically check-and-decrement inventory
/// and persist the order with its line items.
///
/// Returns `Ok(Committed)` with the persisted rows, `Ok(Rejected)` for
/// business-rule refusals (nothing persisted, ledger untouched), or `Err` when
/// storage failed after bounded retries (everything rolled back).
pub async fn place_order(
    pool: &PgPool,
    submission: &OrderSubmission,
    opts: &PlacementOptions,
) -> Result<PlacementOutcome> {
    let mut placement = Placement::new();
    placement.apply(PlacementEvent::Validate)?;

    if let Err(reason) = validate(submission) {
        placement.apply(PlacementEvent::InvalidInput)?;
        debug!(%reason, "submission rejected before storage access");
        return Ok(PlacementOutcome::Rejected(RejectReason::InvalidInput {
            reason,
        }));
    }

    placement.apply(PlacementEvent::Allocate)?;

    let mut attempt_no: u32 = 1;
    loop {
        match attempt(pool, submission).await {
            Ok(Attempt::Committed(placed)) => {
                placement.apply(PlacementEvent::CommitOk)?;
                info!(
                    order_id = placed.order.order_id,
                    lines = placed.lines.len(),
                    attempts = attempt_no,
                    "order committed"
                );
                return Ok(PlacementOutcome::Committed(placed));
            }
            Ok(Attempt::ShortStock { ingredient_ids }) => {
                placement.apply(PlacementEvent::ShortStock)?;
                info!(?ingredient_ids, "order rejected: insufficient inventory");
                return Ok(PlacementOutcome::Rejected(
                    RejectReason::InsufficientInventory { ingredient_ids },
                ));
            }
            Err(err) if is_transient(&err) && attempt_no < opts.max_attempts => {
                placement.apply(PlacementEvent::Conflict)?;
                let delay = backoff_delay(opts.backoff_base, attempt_no);
                warn!(
                    attempt = attempt_no,
                    delay_ms = delay.as_millis() as u64,
                    "transient storage conflict; retrying placement from a fresh read"
                );
                tokio::time::sleep(delay).await;
                attempt_no += 1;
            }
            Err(err) => {
                placement.apply(PlacementEvent::StorageError)?;
                return Err(err.context("order placement failed"));
            }
        }
    }
}

/// One allocation attempt: a complete transaction from fresh reads.
enum Attempt {
    Committed(PlacedOrder),
    ShortStock { ingredient_ids: Vec<i64> },
}

async fn attempt(pool: &PgPool, submission: &OrderSubmission) -> Result<Attempt> {
    // Any early return (including `?`) drops the transaction, which rolls it
    // back: no exit path can leave a partial decrement or a parentless order.
    let mut tx = pool
        .begin()
        .await
        .context("begin placement transaction")?;

    let menu_item_ids = submission.distinct_menu_item_ids();
    let entries = recipes::recipe_entries_for_items(&mut tx, &menu_item_ids).await?;
    let demand = aggregate_demand(&submission.items, &entries);

    match inventory::conditional_decrement(&mut tx, &demand).await? {
        DecrementOutcome::Insufficient { ingredient_ids } => {
            tx.rollback()
                .await
                .context("rollback after insufficient inventory")?;
            return Ok(Attempt::ShortStock { ingredient_ids });
        }
        DecrementOutcome::Applied => {}
    }

    let order = orders::insert_order(
        &mut tx,
        &NewOrder {
            time_of_order: submission.time_of_order.unwrap_or_else(Utc::now),
            customer_id: submission.customer_id,
            employee_id: submission.employee_id,
            total_cost: submission.total_cost,
            order_week: submission.order_week,
        },
    )
    .await?;

    let lines = orders::insert_order_lines(&mut tx, order.order_id, &submission.items).await?;

    tx.commit().await.context("commit placement transaction")?;

    Ok(Attempt::Committed(PlacedOrder { order, lines }))
}

// ---------------------------------------------------------------------------
// Validation (step 1 — no storage access)
// ---------------------------------------------------------------------------

fn validate(submission: &OrderSubmission) -> std::result::Result<(), String> {
    if submission.items.is_empty() {
        return Err("order must contain at least one item".to_string());
    }
    for line in &submission.items {
        if line.quantity <= 0 {
            return Err(format!(
                "line quantity must be positive (menu item {}, quantity {})",
                line.menu_item_id, line.quantity
            ));
        }
    }
    if submission.employee_id <= 0 {
        return Err("employee id must be positive".to_string());
    }
    if !submission.total_cost.is_finite() || submission.total_cost < 0.0 {
        return Err("total cost must be a finite, non-negative amount".to_string());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Aggregation (step 2)
// ---------------------------------------------------------------------------

/// Sum per-ingredient demand across the whole order before any check.
///
/// An ingredient consumed by two different menu items (or by repeated lines of
/// the same item) must be checked once against its summed demand, never
/// per-line. Saturating arithmetic: a demand that overflows i64 can never be
/// satisfiable anyway, so saturation turns it into an insufficient-stock
/// rejection at the compare step.
fn aggregate_demand(lines: &[OrderLine], entries: &[RecipeEntry]) -> BTreeMap<i64, i64> {
    let mut demand: BTreeMap<i64, i64> = BTreeMap::new();

    for line in lines {
        for entry in entries.iter().filter(|e| e.menu_item_id == line.menu_item_id) {
            let needed = entry.quantity_per_unit.saturating_mul(line.quantity);
            let slot = demand.entry(entry.ingredient_id).or_insert(0);
            *slot = slot.saturating_add(needed);
        }
    }

    demand
}

// ---------------------------------------------------------------------------
// Transient-conflict classification
// ---------------------------------------------------------------------------

fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .any(bpos_db::is_transient_conflict)
}

fn backoff_delay(base: Duration, attempt_no: u32) -> Duration {
    // 1x, 2x, 4x, ... capped well below any request timeout.
    let factor = 1u32 << attempt_no.saturating_sub(1).min(6);
    base.saturating_mul(factor)
}

// ---------------------------------------------------------------------------
// Unit tests (pure pieces — validation, aggregation, backoff)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(menu_item_id: i64, ingredient_id: i64, qty: i64) -> RecipeEntry {
        RecipeEntry {
            menu_item_id,
            ingredient_id,
            quantity_per_unit: qty,
        }
    }

    fn line(menu_item_id: i64, quantity: i64) -> OrderLine {
        OrderLine {
            menu_item_id,
            quantity,
        }
    }

    fn submission(items: Vec<OrderLine>) -> OrderSubmission {
        OrderSubmission {
            employee_id: 1,
            customer_id: None,
            total_cost: 5.0,
            order_week: 30,
            time_of_order: None,
            items,
        }
    }

    #[test]
    fn empty_item_list_is_invalid() {
        let err = validate(&submission(vec![])).unwrap_err();
        assert!(err.contains("at least one item"), "got: {err}");
    }

    #[test]
    fn non_positive_quantity_is_invalid() {
        assert!(validate(&submission(vec![line(1, 0)])).is_err());
        assert!(validate(&submission(vec![line(1, -2)])).is_err());
        assert!(validate(&submission(vec![line(1, 1)])).is_ok());
    }

    #[test]
    fn non_finite_total_cost_is_invalid() {
        let mut s = submission(vec![line(1, 1)]);
        s.total_cost = f64::NAN;
        assert!(validate(&s).is_err());
        s.total_cost = -1.0;
        assert!(validate(&s).is_err());
    }

    #[test]
    fn demand_is_aggregated_across_menu_items() {
        // Menu item 1 needs 2 units of ingredient 7 per unit sold, quantity 3;
        // menu item 2 needs 1 unit of the same ingredient, quantity 1.
        // The check must see 2*3 + 1*1 = 7, not 6 and 1 separately.
        let entries = vec![entry(1, 7, 2), entry(2, 7, 1)];
        let lines = vec![line(1, 3), line(2, 1)];

        let demand = aggregate_demand(&lines, &entries);
        assert_eq!(demand.get(&7), Some(&7));
        assert_eq!(demand.len(), 1);
    }

    #[test]
    fn repeated_lines_of_same_item_are_summed() {
        let entries = vec![entry(1, 7, 4)];
        let lines = vec![line(1, 1), line(1, 2)];

        let demand = aggregate_demand(&lines, &entries);
        assert_eq!(demand.get(&7), Some(&12));
    }

    #[test]
    fn item_without_recipe_consumes_nothing() {
        let entries = vec![entry(1, 7, 2)];
        let lines = vec![line(99, 5)];

        let demand = aggregate_demand(&lines, &entries);
        assert!(demand.is_empty(), "recipe-less item must add no demand");
    }

    #[test]
    fn overflowing_demand_saturates() {
        let entries = vec![entry(1, 7, i64::MAX / 2)];
        let lines = vec![line(1, 3)];

        let demand = aggregate_demand(&lines, &entries);
        // Saturated demand can never pass a stock check.
        assert_eq!(demand.get(&7), Some(&i64::MAX));
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let base = Duration::from_millis(25);
        assert_eq!(backoff_delay(base, 1), Duration::from_millis(25));
        assert_eq!(backoff_delay(base, 2), Duration::from_millis(50));
        assert_eq!(backoff_delay(base, 3), Duration::from_millis(100));
    }
}
