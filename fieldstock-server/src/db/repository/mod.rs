//! Repository Module
//!
//! sqlx SQLite 上的 CRUD 自由函数：`fn x(pool: &SqlitePool, ...) -> RepoResult<T>`。
//! 行结构 (`*Row`, `sqlx::FromRow`) 仅在本层可见，对外返回 `shared::models`。
//!
//! 账本写操作 (库存、持有金额、分配、请求状态) 不在这里，见 [`crate::ledger`]。

pub mod admin;
pub mod employee;
pub mod money_request;
pub mod product;
pub mod sale;
pub mod stock_request;
pub mod verification_code;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".into()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_check_violation() => {
                RepoError::Validation(db_err.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Repository database error");
                AppError::database("Database error")
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Duplicate → domain-specific conflict code, everything else unchanged
pub(crate) fn duplicate_as(err: RepoError, code: ErrorCode) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::new(code),
        other => other.into(),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! In-memory database for repository / ledger tests

    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    /// Single-connection pool: every connection to `sqlite::memory:` is its own database
    pub async fn memory_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }
}
