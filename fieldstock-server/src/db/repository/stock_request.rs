//! Stock Request Repository
//!
//! 创建、查询、删除。状态迁移 (approve/reject) 见 [`crate::ledger`]。

use super::{RepoError, RepoResult};
use shared::models::{RequestListQuery, RequestStatus, StockRequest};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, product_id, quantity, reason, status, rejection_reason, processed_at, processed_by, created_at";

#[derive(Debug, sqlx::FromRow)]
struct StockRequestRow {
    id: i64,
    employee_id: i64,
    product_id: i64,
    quantity: i64,
    reason: String,
    status: String,
    rejection_reason: Option<String>,
    processed_at: Option<i64>,
    processed_by: Option<i64>,
    created_at: i64,
}

impl TryFrom<StockRequestRow> for StockRequest {
    type Error = RepoError;

    fn try_from(row: StockRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            status: row.status.parse().map_err(RepoError::Database)?,
            id: row.id,
            employee_id: row.employee_id,
            product_id: row.product_id,
            quantity: row.quantity,
            reason: row.reason,
            rejection_reason: row.rejection_reason,
            processed_at: row.processed_at,
            processed_by: row.processed_by,
            created_at: row.created_at,
        })
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<StockRequest>> {
    let row = sqlx::query_as::<_, StockRequestRow>(&format!(
        "SELECT {COLUMNS} FROM stock_request WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(TryInto::try_into).transpose()
}

/// Newest first; filters are optional
pub async fn find_all(pool: &SqlitePool, query: &RequestListQuery) -> RepoResult<Vec<StockRequest>> {
    let rows = sqlx::query_as::<_, StockRequestRow>(&format!(
        "SELECT {COLUMNS} FROM stock_request WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR employee_id = ?2) ORDER BY created_at DESC, id DESC"
    ))
    .bind(query.status.map(|s| s.as_str()))
    .bind(query.employee_id)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(TryInto::try_into).collect()
}

pub async fn create(
    pool: &SqlitePool,
    employee_id: i64,
    product_id: i64,
    quantity: i64,
    reason: &str,
) -> RepoResult<StockRequest> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO stock_request (employee_id, product_id, quantity, reason, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(employee_id)
    .bind(product_id)
    .bind(quantity)
    .bind(reason)
    .bind(RequestStatus::Pending.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create stock request".into()))
}

/// Explicit admin delete (any status; no ledger effect)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM stock_request WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
