//! Order command handlers: place and list.

use anyhow::{bail, Result};
use bpos_placement::{place_order, PlacementOptions, PlacementOutcome, RejectReason};
use bpos_schemas::OrderSubmission;

use super::parse_item_arg;

// ---------------------------------------------------------------------------
// order place
// ---------------------------------------------------------------------------

pub async fn order_place(
    employee: i64,
    customer: Option<i64>,
    total: f64,
    week: i32,
    raw_items: Vec<String>,
) -> Result<()> {
    let items = raw_items
        .iter()
        .map(|raw| parse_item_arg(raw))
        .collect::<Result<Vec<_>>>()?;

    let submission = OrderSubmission {
        employee_id: employee,
        customer_id: customer,
        total_cost: total,
        order_week: week,
        time_of_order: None,
        items,
    };

    let pool = bpos_db::connect_from_env().await?;
    let outcome = place_order(&pool, &submission, &PlacementOptions::default()).await?;

    match outcome {
        PlacementOutcome::Committed(placed) => {
            println!("placed=true");
            println!("order_id={}", placed.order.order_id);
            println!("time_of_order={}", placed.order.time_of_order.to_rfc3339());
            println!("total_cost={:.2}", placed.order.total_cost);
            println!("lines={}", placed.lines.len());
            Ok(())
        }
        PlacementOutcome::Rejected(RejectReason::InvalidInput { reason }) => {
            bail!("invalid order: {reason}")
        }
        PlacementOutcome::Rejected(RejectReason::InsufficientInventory { ingredient_ids }) => {
            bail!("insufficient inventory for ingredient id(s): {ingredient_ids:?}")
        }
    }
}

// ---------------------------------------------------------------------------
// order list
// ---------------------------------------------------------------------------

pub async fn order_list(limit: i64) -> Result<()> {
    let pool = bpos_db::connect_from_env().await?;
    let orders = bpos_db::orders::list_recent_orders(&pool, limit).await?;

    for o in &orders {
        println!(
            "order_id={} time={} employee={} customer={} total={:.2} week={}",
            o.order_id,
            o.time_of_order.to_rfc3339(),
            o.employee_id,
            o.customer_id.map_or("-".to_string(), |c| c.to_string()),
            o.total_cost,
            o.order_week
        );
    }
    println!("count={}", orders.len());
    Ok(())
}
