//! Command handler modules for bpos-cli.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod order;
pub mod seed;

use anyhow::{Context, Result};
use bpos_schemas::OrderLine;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Parse one `--item` argument of the form `<menu_item_id>:<quantity>`.
pub fn parse_item_arg(raw: &str) -> Result<OrderLine> {
    let (menu_part, qty_part) = raw
        .split_once(':')
        .with_context(|| format!("invalid --item '{raw}'. expected <menu_item_id>:<quantity>"))?;

    let menu_item_id: i64 = menu_part
        .trim()
        .parse()
        .with_context(|| format!("invalid menu item id in --item '{raw}'"))?;
    let quantity: i64 = qty_part
        .trim()
        .parse()
        .with_context(|| format!("invalid quantity in --item '{raw}'"))?;

    Ok(OrderLine {
        menu_item_id,
        quantity,
    })
}

// ---------------------------------------------------------------------------
// db status / db migrate
// ---------------------------------------------------------------------------

pub async fn db_status() -> Result<()> {
    let pool = bpos_db::connect_from_env().await?;
    let st = bpos_db::status(&pool).await?;
    println!("ok={}", st.ok);
    println!("has_orders_table={}", st.has_orders_table);
    Ok(())
}

pub async fn db_migrate() -> Result<()> {
    let pool = bpos_db::connect_from_env().await?;
    bpos_db::migrate(&pool).await?;
    println!("migrated=true");
    Ok(())
}

// ---------------------------------------------------------------------------
// config-hash
// ---------------------------------------------------------------------------

pub fn config_hash(paths: Vec<String>) -> Result<()> {
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = bpos_config::load_layered_yaml(&path_refs)?;
    println!("config_hash={}", loaded.config_hash);
    println!("canonical_json={}", loaded.canonical_json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_item_arg_accepts_id_colon_qty() {
        let line = parse_item_arg("12:3").unwrap();
        assert_eq!(line.menu_item_id, 12);
        assert_eq!(line.quantity, 3);
    }

    #[test]
    fn parse_item_arg_rejects_malformed_input() {
        assert!(parse_item_arg("12").is_err());
        assert!(parse_item_arg("a:b").is_err());
        assert!(parse_item_arg("12:").is_err());
    }
}
