//! Sale Repository (read side; sales are written by [`crate::ledger`])

use super::{RepoError, RepoResult};
use shared::models::{Sale, SaleItem};
use sqlx::SqlitePool;
use std::collections::HashMap;

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    employee_id: i64,
    method: String,
    total: i64,
    created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    sale_id: i64,
    product_id: i64,
    quantity: i64,
    unit_price: i64,
}

fn assemble(rows: Vec<SaleRow>, items: Vec<SaleItemRow>) -> RepoResult<Vec<Sale>> {
    let mut by_sale: HashMap<i64, Vec<SaleItem>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id).or_default().push(SaleItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
        });
    }

    rows.into_iter()
        .map(|row| {
            Ok(Sale {
                method: row.method.parse().map_err(RepoError::Database)?,
                items: by_sale.remove(&row.id).unwrap_or_default(),
                id: row.id,
                employee_id: row.employee_id,
                total: row.total,
                created_at: row.created_at,
            })
        })
        .collect()
}

/// Newest first, optionally for one employee
pub async fn find_all(pool: &SqlitePool, employee_id: Option<i64>) -> RepoResult<Vec<Sale>> {
    let rows = sqlx::query_as::<_, SaleRow>(
        "SELECT id, employee_id, method, total, created_at FROM sale WHERE (?1 IS NULL OR employee_id = ?1) ORDER BY created_at DESC, id DESC",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    let items = sqlx::query_as::<_, SaleItemRow>(
        "SELECT si.sale_id, si.product_id, si.quantity, si.unit_price FROM sale_item si JOIN sale s ON s.id = si.sale_id WHERE (?1 IS NULL OR s.employee_id = ?1) ORDER BY si.id",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    assemble(rows, items)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Sale>> {
    let rows = sqlx::query_as::<_, SaleRow>(
        "SELECT id, employee_id, method, total, created_at FROM sale WHERE id = ?",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;
    if rows.is_empty() {
        return Ok(None);
    }

    let items = sqlx::query_as::<_, SaleItemRow>(
        "SELECT sale_id, product_id, quantity, unit_price FROM sale_item WHERE sale_id = ? ORDER BY id",
    )
    .bind(id)
    .fetch_all(pool)
    .await?;

    Ok(assemble(rows, items)?.pop())
}
