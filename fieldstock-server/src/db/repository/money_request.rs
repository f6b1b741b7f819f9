//! Money Request Repository
//!
//! 创建、查询、删除。状态迁移 (approve/reject) 见 [`crate::ledger`]。

use super::{RepoError, RepoResult};
use shared::models::{MoneyRequest, PaymentMethod, RequestListQuery, RequestStatus};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, employee_id, amount, method, reference_number, status, rejection_reason, processed_at, processed_by, created_at";

#[derive(Debug, sqlx::FromRow)]
struct MoneyRequestRow {
    id: i64,
    employee_id: i64,
    amount: i64,
    method: String,
    reference_number: Option<String>,
    status: String,
    rejection_reason: Option<String>,
    processed_at: Option<i64>,
    processed_by: Option<i64>,
    created_at: i64,
}

impl TryFrom<MoneyRequestRow> for MoneyRequest {
    type Error = RepoError;

    fn try_from(row: MoneyRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            method: row.method.parse().map_err(RepoError::Database)?,
            status: row.status.parse().map_err(RepoError::Database)?,
            id: row.id,
            employee_id: row.employee_id,
            amount: row.amount,
            reference_number: row.reference_number,
            rejection_reason: row.rejection_reason,
            processed_at: row.processed_at,
            processed_by: row.processed_by,
            created_at: row.created_at,
        })
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MoneyRequest>> {
    let row = sqlx::query_as::<_, MoneyRequestRow>(&format!(
        "SELECT {COLUMNS} FROM money_request WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(TryInto::try_into).transpose()
}

/// Newest first; filters are optional
pub async fn find_all(pool: &SqlitePool, query: &RequestListQuery) -> RepoResult<Vec<MoneyRequest>> {
    let rows = sqlx::query_as::<_, MoneyRequestRow>(&format!(
        "SELECT {COLUMNS} FROM money_request WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR employee_id = ?2) ORDER BY created_at DESC, id DESC"
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
    amount: i64,
    method: PaymentMethod,
    reference_number: Option<&str>,
) -> RepoResult<MoneyRequest> {
    let now = shared::util::now_millis();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO money_request (employee_id, amount, method, reference_number, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING id",
    )
    .bind(employee_id)
    .bind(amount)
    .bind(method.as_str())
    .bind(reference_number)
    .bind(RequestStatus::Pending.as_str())
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create money request".into()))
}

/// Explicit admin delete (any status; no ledger effect)
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM money_request WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
