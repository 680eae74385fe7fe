//! Catalog storage: named ingredients and sauces for day prompts.
//!
//! The catalog is read-only to the generation engine. Day prompts embed a
//! bounded prefix of each table, and the backend is required to echo these
//! names exactly so prices and macros reconcile downstream.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::CatalogItem;

/// Maximum ingredients embedded in a day prompt.
pub const MAX_PROMPT_INGREDIENTS: i64 = 100;

/// Maximum sauces embedded in a day prompt.
pub const MAX_PROMPT_SAUCES: i64 = 30;

/// List up to `limit` ingredients in id order.
pub async fn list_ingredients(pool: &SqlitePool, limit: i64) -> Result<Vec<CatalogItem>> {
    let items = sqlx::query_as::<_, CatalogItem>(
        r#"
        SELECT id, name, calories, protein, carbs, fats_per_100g, price
        FROM ingredients
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// List up to `limit` sauces in id order.
pub async fn list_sauces(pool: &SqlitePool, limit: i64) -> Result<Vec<CatalogItem>> {
    let items = sqlx::query_as::<_, CatalogItem>(
        r#"
        SELECT id, name, calories, protein, carbs, fats_per_100g, price
        FROM sauces
        ORDER BY id
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(items)
}

/// Seed the catalog with the default ingredient and sauce set.
///
/// Idempotent: existing names are left untouched.
pub async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    let ingredients: &[(&str, f64, f64, f64, f64, f64)] = &[
        ("RICE", 130.0, 2.7, 28.0, 0.3, 0.66),
        ("YELLOW RICE", 140.4, 2.916, 30.24, 0.32, 0.957),
        ("PASTA", 370.0, 13.0, 75.0, 1.5, 2.2),
        ("POTATO", 175.5, 3.96, 27.69, 5.89, 0.352),
        ("SWEET POTATO", 86.0, 1.8, 20.0, 0.1, 0.825),
        ("FISH", 90.0, 17.0, 0.0, 2.0, 1.045),
        ("SALMON", 206.0, 20.4, 0.0, 13.0, 7.15),
        ("SHRIMP", 85.0, 20.1, 0.2, 0.5, 3.245),
        ("BEEF", 230.0, 26.0, 0.0, 15.0, 4.0689),
        ("CHICKEN FILLET", 165.0, 31.0, 0.0, 3.6, 1.672),
        ("EGG", 148.0, 13.0, 0.8, 10.0, 1.3288),
        ("Avocado", 174.06, 2.0, 8.53, 14.66, 6.0),
        ("Banana", 98.69, 1.09, 22.84, 0.33, 3.0),
        ("Orange", 69.9, 1.3, 15.5, 0.3, 6.0),
        ("Strawberry", 36.1, 0.67, 7.68, 0.3, 15.0),
        ("Watermelon", 33.99, 0.61, 7.55, 0.15, 4.0),
        ("QUINOA SALAD", 400.0, 18.0, 45.0, 20.0, 13.244),
        ("GREEK SALAD", 380.0, 15.0, 35.0, 22.0, 12.287),
        ("TUNA SALAD", 600.0, 50.0, 45.0, 30.0, 22.528),
        ("CHICKEN SALAD", 550.0, 45.0, 40.0, 25.0, 15.433),
    ];

    let sauces: &[(&str, f64, f64, f64, f64, f64)] = &[
        ("24 SAUCE", 253.2, 2.3, 11.6, 22.3, 3.872),
        ("MUSHROOM SAUCE", 313.4, 8.9, 37.6, 14.3, 3.872),
        ("PESTO SAUCE", 437.0, 4.8, 5.6, 44.2, 4.103),
        ("CURRY SAUCE", 221.0, 2.6, 15.8, 16.9, 3.41),
        ("LEMON SAUCE", 192.4, 1.1, 9.4, 16.8, 3.41),
        ("GARLIC SAUCE", 334.6, 3.1, 13.2, 30.4, 3.41),
        ("BBQ SAUCE", 172.0, 0.8, 40.8, 0.6, 3.652),
        ("TOMATO SAUCE", 82.0, 1.8, 13.2, 2.4, 2.86),
    ];

    for (name, calories, protein, carbs, fats, price) in ingredients {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO ingredients (name, calories, protein, carbs, fats_per_100g, price)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(calories)
        .bind(protein)
        .bind(carbs)
        .bind(fats)
        .bind(price)
        .execute(pool)
        .await?;
    }

    for (name, calories, protein, carbs, fats, price) in sauces {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO sauces (name, calories, protein, carbs, fats_per_100g, price)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(calories)
        .bind(protein)
        .bind(carbs)
        .bind(fats)
        .bind(price)
        .execute(pool)
        .await?;
    }

    tracing::info!("Catalog seeded");
    Ok(())
}
