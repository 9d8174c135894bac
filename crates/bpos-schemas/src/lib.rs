use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One requested line of a candidate order: a menu item and how many units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: i64,
    pub quantity: i64,
}

/// A candidate order as submitted by a cashier terminal.
///
/// `total_cost` is the caller-computed total. The placement core stores it
/// as-is and never recomputes it against menu prices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub employee_id: i64,
    /// Absent for walk-in customers.
    #[serde(default)]
    pub customer_id: Option<i64>,
    pub total_cost: f64,
    /// Business week number, carried through for weekly reporting.
    pub order_week: i32,
    /// Defaults to submission time when absent.
    #[serde(default)]
    pub time_of_order: Option<DateTime<Utc>>,
    pub items: Vec<OrderLine>,
}

impl OrderSubmission {
    /// Distinct menu item ids referenced by this submission, ascending.
    pub fn distinct_menu_item_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.items.iter().map(|l| l.menu_item_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
