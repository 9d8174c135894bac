//! Scenario: malformed submissions are rejected before any storage access.
//!
//! These tests run WITHOUT a database: the pool below is lazy and points at a
//! port nobody listens on, so any storage access would surface as a connect
//! error instead of the expected rejection. Green tests are the proof that
//! validation happens first.

use bpos_placement::{place_order, PlacementOptions, PlacementOutcome, RejectReason};
use bpos_schemas::{OrderLine, OrderSubmission};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// A pool that would fail on first use. Nothing may ever use it.
fn unreachable_pool() -> PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://nobody@127.0.0.1:1/void")
        .expect("lazy pool construction is infallible")
}

fn submission(items: Vec<OrderLine>) -> OrderSubmission {
    OrderSubmission {
        employee_id: 1,
        customer_id: None,
        total_cost: 4.75,
        order_week: 32,
        time_of_order: None,
        items,
    }
}

fn expect_invalid_input(outcome: PlacementOutcome) -> String {
    match outcome {
        PlacementOutcome::Rejected(RejectReason::InvalidInput { reason }) => reason,
        other => panic!("expected InvalidInput rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_item_list_is_rejected_without_touching_storage() {
    let pool = unreachable_pool();

    let outcome = place_order(&pool, &submission(vec![]), &PlacementOptions::default())
        .await
        .expect("validation failures are rejections, not errors");

    let reason = expect_invalid_input(outcome);
    assert!(
        reason.contains("at least one item"),
        "reason should name the problem, got: {reason}"
    );
}

#[tokio::test]
async fn zero_quantity_line_is_rejected_without_touching_storage() {
    let pool = unreachable_pool();

    let items = vec![OrderLine {
        menu_item_id: 1,
        quantity: 0,
    }];
    let outcome = place_order(&pool, &submission(items), &PlacementOptions::default())
        .await
        .expect("validation failures are rejections, not errors");

    let reason = expect_invalid_input(outcome);
    assert!(
        reason.contains("quantity"),
        "reason should name the problem, got: {reason}"
    );
}

#[tokio::test]
async fn non_finite_total_cost_is_rejected_without_touching_storage() {
    let pool = unreachable_pool();

    let mut s = submission(vec![OrderLine {
        menu_item_id: 1,
        quantity: 1,
    }]);
    s.total_cost = f64::INFINITY;

    let outcome = place_order(&pool, &s, &PlacementOptions::default())
        .await
        .expect("validation failures are rejections, not errors");

    expect_invalid_input(outcome);
}
