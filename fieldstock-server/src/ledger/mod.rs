//! Stock / money ledger
//!
//! 账本操作分两步：
//!
//! 1. [`decide`] - 纯函数，根据快照与输入产出 [`LedgerPlan`] (有序的 [`LedgerEffect`] 列表)，
//!    不做任何 IO，校验失败直接返回错误
//! 2. [`apply`] - 在一个 SQLite 事务内按顺序执行计划；每个守卫都是
//!    `UPDATE ... WHERE counter >= ?` 条件更新，`rows_affected() == 0` 即失败，
//!    事务随错误一起 drop (回滚)
//!
//! 审批类计划的第一个 effect 永远是状态认领 (`WHERE status = 'Pending'`)，
//! 并发的第二个处理者因此得到 `AlreadyProcessed`。
//!
//! [`service`] 把 gate、快照读取、decide、apply 串起来，是 API 层唯一的入口。

pub mod apply;
pub mod decide;
pub mod plan;
pub mod service;

#[cfg(test)]
mod tests;

pub use apply::{AppliedPlan, apply};
pub use plan::{LedgerEffect, LedgerPlan, RequestKind, Settlement};
pub use service::Origin;

use shared::{AppError, ErrorCode};
use thiserror::Error;

/// Failures while applying a plan
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("request {0} not found")]
    RequestNotFound(i64),

    #[error("request {0} already processed")]
    AlreadyProcessed(i64),

    #[error("insufficient stock: {available} available, {requested} requested")]
    InsufficientStock { available: i64, requested: i64 },

    #[error("insufficient holdings: {available} available, {requested} requested")]
    InsufficientHoldings { available: i64, requested: i64 },

    #[error("employee {0} not found")]
    EmployeeNotFound(i64),

    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("employee {employee_id} has no allocation of product {product_id}")]
    AllocationNotFound { employee_id: i64, product_id: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::RequestNotFound(id) => {
                AppError::new(ErrorCode::RequestNotFound).with_detail("request_id", id)
            }
            LedgerError::AlreadyProcessed(id) => AppError::already_processed(id),
            LedgerError::InsufficientStock {
                available,
                requested,
            } => AppError::insufficient_stock(available, requested),
            LedgerError::InsufficientHoldings {
                available,
                requested,
            } => AppError::insufficient_holdings(available, requested),
            LedgerError::EmployeeNotFound(id) => {
                AppError::new(ErrorCode::EmployeeNotFound).with_detail("employee_id", id)
            }
            LedgerError::ProductNotFound(id) => {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id)
            }
            LedgerError::AllocationNotFound {
                employee_id,
                product_id,
            } => AppError::new(ErrorCode::AllocationNotFound)
                .with_detail("employee_id", employee_id)
                .with_detail("product_id", product_id),
            LedgerError::Database(e) => {
                tracing::error!(error = %e, "Ledger transaction failed");
                AppError::database("Ledger transaction failed")
            }
        }
    }
}
