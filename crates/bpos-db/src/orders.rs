//! Order store: append-only orders and their line items.
//!
//! Identifiers come from storage-native sequences (`bigserial` + RETURNING),
//! never from a separate MAX(id)+1 read, which races under concurrent
//! placements. All writes take the caller's transaction; the store never
//! commits a sub-transaction of its own.

use anyhow::{Context, Result};
use bpos_schemas::OrderLine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, Row, Transaction};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub order_id: i64,
    pub time_of_order: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub employee_id: i64,
    pub total_cost: f64,
    pub order_week: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRow {
    pub order_item_id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub time_of_order: DateTime<Utc>,
    pub customer_id: Option<i64>,
    pub employee_id: i64,
    pub total_cost: f64,
    pub order_week: i32,
}

/// Insert the order row; the sequence allocates its id.
pub async fn insert_order(
    tx: &mut Transaction<'_, Postgres>,
    order: &NewOrder,
) -> Result<OrderRow> {
    let row = sqlx::query(
        r#"
        insert into orders (timeoforder, customerid, employeeid, totalcost, orderweek)
        values ($1, $2, $3, $4, $5)
        returning orderid, timeoforder, customerid, employeeid, totalcost, orderweek
        "#,
    )
    .bind(order.time_of_order)
    .bind(order.customer_id)
    .bind(order.employee_id)
    .bind(order.total_cost)
    .bind(order.order_week)
    .fetch_one(&mut **tx)
    .await
    .context("insert_order failed")?;

    order_from_row(&row)
}

/// Insert all line items for one order. Same transaction as the parent order
/// and the inventory decrement.
pub async fn insert_order_lines(
    tx: &mut Transaction<'_, Postgres>,
    order_id: i64,
    lines: &[OrderLine],
) -> Result<Vec<OrderLineRow>> {
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let row = sqlx::query(
            r#"
            insert into orderitems (orderid, menuitemid, quantity)
            values ($1, $2, $3)
            returning orderitemid
            "#,
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.quantity)
        .fetch_one(&mut **tx)
        .await
        .with_context(|| format!("insert_order_lines failed for menu item {}", line.menu_item_id))?;

        out.push(OrderLineRow {
            order_item_id: row.try_get("orderitemid")?,
            order_id,
            menu_item_id: line.menu_item_id,
            quantity: line.quantity,
        });
    }

    Ok(out)
}

pub async fn fetch_order(pool: &PgPool, order_id: i64) -> Result<Option<OrderRow>> {
    let row = sqlx::query(
        r#"
        select orderid, timeoforder, customerid, employeeid, totalcost, orderweek
        from orders
        where orderid = $1
        "#,
    )
    .bind(order_id)
    .fetch_optional(pool)
    .await
    .context("fetch_order failed")?;

    row.as_ref().map(order_from_row).transpose()
}

pub async fn fetch_order_lines(pool: &PgPool, order_id: i64) -> Result<Vec<OrderLineRow>> {
    let rows = sqlx::query(
        r#"
        select orderitemid, orderid, menuitemid, quantity
        from orderitems
        where orderid = $1
        order by orderitemid
        "#,
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
    .context("fetch_order_lines failed")?;

    rows.iter()
        .map(|row| {
            Ok(OrderLineRow {
                order_item_id: row.try_get("orderitemid")?,
                order_id: row.try_get("orderid")?,
                menu_item_id: row.try_get("menuitemid")?,
                quantity: row.try_get("quantity")?,
            })
        })
        .collect()
}

/// Most recent orders first (cashier history view).
pub async fn list_recent_orders(pool: &PgPool, limit: i64) -> Result<Vec<OrderRow>> {
    let rows = sqlx::query(
        r#"
        select orderid, timeoforder, customerid, employeeid, totalcost, orderweek
        from orders
        order by timeoforder desc, orderid desc
        limit $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .context("list_recent_orders failed")?;

    rows.iter().map(order_from_row).collect()
}

pub async fn count_orders(pool: &PgPool) -> Result<i64> {
    let (n,): (i64,) = sqlx::query_as::<_, (i64,)>("select count(*)::bigint from orders")
        .fetch_one(pool)
        .await
        .context("count_orders failed")?;
    Ok(n)
}

fn order_from_row(row: &sqlx::postgres::PgRow) -> Result<OrderRow> {
    Ok(OrderRow {
        order_id: row.try_get("orderid")?,
        time_of_order: row.try_get("timeoforder")?,
        customer_id: row.try_get("customerid")?,
        employee_id: row.try_get("employeeid")?,
        total_cost: row.try_get("totalcost")?,
        order_week: row.try_get("orderweek")?,
    })
}
