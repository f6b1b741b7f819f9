//! Stock Request API Handlers
//!
//! 审批/拒绝走 [`crate::ledger::service`]，权限检查在那里完成。

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{RejectRequest, RequestListQuery, StockRequest, StockRequestCreate};
use shared::permission::{Action, Module};

use crate::auth::CurrentAdmin;
use crate::auth::guard::{authorize, authorize_any};
use crate::core::ServerState;
use crate::db::repository::stock_request;
use crate::ledger::{self, Origin};
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/stock-requests?status=&employee_id=
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<Vec<StockRequest>>> {
    // 审批人需要看到待处理队列
    authorize_any(
        &current.principal,
        Module::Requests,
        &[Action::Read, Action::Approve, Action::Reject],
    )?;
    let requests = stock_request::find_all(&state.pool, &query).await?;
    Ok(Json(requests))
}

/// POST /api/stock-requests - 代员工提交
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<StockRequestCreate>,
) -> AppResult<Json<StockRequest>> {
    let employee_id = payload.employee_id.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "employee_id is required")
            .with_detail("field", "employee_id")
    })?;
    let request = ledger::service::create_stock_request(
        &state.pool,
        Origin::Admin {
            actor: &current.principal,
            employee_id,
        },
        payload.product_id,
        payload.quantity,
        Some(payload.reason.as_str()),
    )
    .await?;
    Ok(Json(request))
}

/// POST /api/stock-requests/:id/approve
pub async fn approve(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<StockRequest>> {
    let request = ledger::service::approve_stock_request(&state.pool, &current.principal, id).await?;
    Ok(Json(request))
}

/// POST /api/stock-requests/:id/reject
pub async fn reject(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<StockRequest>> {
    let request = ledger::service::reject_stock_request(
        &state.pool,
        &current.principal,
        id,
        payload.reason.as_deref(),
    )
    .await?;
    Ok(Json(request))
}

/// DELETE /api/stock-requests/:id
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    authorize(&current.principal, Module::Requests, Action::Delete)?;
    let result = stock_request::delete(&state.pool, id).await?;
    if result {
        tracing::info!(request_id = id, admin_id = current.id(), "Stock request deleted");
    }
    Ok(Json(result))
}
