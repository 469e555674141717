//! Shopping list export: ingredient totals across every recipe in a cart.

use std::collections::BTreeMap;
use std::fmt;

use sqlx::{FromRow, SqlitePool};

/// One ingredient row of one recipe in the cart.
#[derive(Debug, Clone, FromRow)]
pub struct CartRow {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

impl fmt::Display for CartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) - {}", self.name, self.measurement_unit, self.total)
    }
}

/// Group rows by (name, unit) and sum their amounts. Largest totals come
/// first; equal totals are ordered by name, then unit.
pub fn aggregate<I>(rows: I) -> Vec<CartLine>
where
    I: IntoIterator<Item = CartRow>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for row in rows {
        let total = totals.entry((row.name, row.measurement_unit)).or_default();
        *total = total.saturating_add(row.amount);
    }

    let mut lines: Vec<CartLine> = totals
        .into_iter()
        .map(|((name, measurement_unit), total)| CartLine {
            name,
            measurement_unit,
            total,
        })
        .collect();

    // Stable sort: map order (name, unit) survives among equal totals.
    lines.sort_by(|a, b| b.total.cmp(&a.total));
    lines
}

pub fn render(lines: &[CartLine]) -> String {
    lines
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn fetch_rows(db: &SqlitePool, user_id: &str) -> Result<Vec<CartRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM shopping_cart sc
        JOIN recipe_ingredients ri ON ri.recipe_id = sc.recipe_id
        JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE sc.user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// The rendered shopping list for a user; empty when the cart is empty.
pub async fn shopping_list(db: &SqlitePool, user_id: &str) -> Result<String, sqlx::Error> {
    let rows = fetch_rows(db, user_id).await?;
    Ok(render(&aggregate(rows)))
}
