//! Demo catalog seeding.
//!
//! A small but realistic boba-shop catalog so a fresh database can take
//! orders immediately. Idempotent: re-running refreshes menu prices and
//! recipes but never clobbers live stock counts.

use anyhow::Result;
use bpos_db::catalog::{ensure_ingredient, ensure_menu_item, upsert_recipe_entry};

pub async fn seed_demo_catalog() -> Result<()> {
    let pool = bpos_db::connect_from_env().await?;
    bpos_db::migrate(&pool).await?;

    // Ingredients (name, starting count).
    let black_tea = ensure_ingredient(&pool, "Black Tea", 150).await?;
    let green_tea = ensure_ingredient(&pool, "Green Tea", 120).await?;
    let whole_milk = ensure_ingredient(&pool, "Whole Milk", 200).await?;
    let cane_sugar = ensure_ingredient(&pool, "Cane Sugar", 300).await?;
    let brown_sugar = ensure_ingredient(&pool, "Brown Sugar", 150).await?;
    let taro_powder = ensure_ingredient(&pool, "Taro Powder", 110).await?;
    let matcha_powder = ensure_ingredient(&pool, "Matcha Powder", 95).await?;
    let mango_syrup = ensure_ingredient(&pool, "Mango Syrup", 90).await?;
    let pearls = ensure_ingredient(&pool, "Tapioca Pearls (Boba)", 500).await?;

    // Menu items with their recipes (ingredient, per-unit quantity).
    let menu: &[(&str, &str, f64, &[(i64, i64)])] = &[
        (
            "Milk Tea",
            "Classic Milk Tea",
            4.75,
            &[(black_tea, 2), (whole_milk, 2), (cane_sugar, 1), (pearls, 1)],
        ),
        (
            "Milk Tea",
            "Taro Milk Tea",
            5.25,
            &[(black_tea, 1), (whole_milk, 2), (taro_powder, 2), (pearls, 1)],
        ),
        (
            "Milk Tea",
            "Matcha Milk Tea",
            5.50,
            &[(green_tea, 1), (whole_milk, 2), (matcha_powder, 2)],
        ),
        (
            "Fruit Tea",
            "Mango Green Tea",
            5.00,
            &[(green_tea, 2), (mango_syrup, 2), (cane_sugar, 1)],
        ),
        (
            "Specialty",
            "Brown Sugar Boba",
            5.95,
            &[(whole_milk, 3), (brown_sugar, 2), (pearls, 2)],
        ),
    ];

    for (category, name, price, recipe) in menu {
        let menu_item_id = ensure_menu_item(&pool, category, name, *price).await?;
        for (ingredient_id, qty) in recipe.iter() {
            upsert_recipe_entry(&pool, menu_item_id, *ingredient_id, *qty).await?;
        }
    }

    println!("seeded=true menu_items={}", menu.len());
    Ok(())
}
