//! Money Request API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::models::{MoneyRequest, MoneyRequestCreate, RejectRequest, RequestListQuery};
use shared::permission::{Action, Module};

use crate::auth::CurrentAdmin;
use crate::auth::guard::{authorize, authorize_any};
use crate::core::ServerState;
use crate::db::repository::money_request;
use crate::ledger::{self, Origin};
use crate::utils::{AppError, AppResult, ErrorCode};

/// GET /api/money-requests?status=&employee_id=
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Query(query): Query<RequestListQuery>,
) -> AppResult<Json<Vec<MoneyRequest>>> {
    // 审批人需要看到待处理队列
    authorize_any(
        &current.principal,
        Module::Requests,
        &[Action::Read, Action::Approve, Action::Reject],
    )?;
    let requests = money_request::find_all(&state.pool, &query).await?;
    Ok(Json(requests))
}

/// POST /api/money-requests
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<MoneyRequestCreate>,
) -> AppResult<Json<MoneyRequest>> {
    let employee_id = payload.employee_id.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "employee_id is required")
            .with_detail("field", "employee_id")
    })?;
    let request = ledger::service::create_money_request(
        &state.pool,
        Origin::Admin {
            actor: &current.principal,
            employee_id,
        },
        payload.amount,
        payload.method,
        payload.reference_number.as_deref(),
    )
    .await?;
    Ok(Json(request))
}

/// POST /api/money-requests/:id/approve
pub async fn approve(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<MoneyRequest>> {
    let request = ledger::service::approve_money_request(&state.pool, &current.principal, id).await?;
    Ok(Json(request))
}

/// POST /api/money-requests/:id/reject
pub async fn reject(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<MoneyRequest>> {
    let request = ledger::service::reject_money_request(
        &state.pool,
        &current.principal,
        id,
        payload.reason.as_deref(),
    )
    .await?;
    Ok(Json(request))
}

/// DELETE /api/money-requests/:id
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    authorize(&current.principal, Module::Requests, Action::Delete)?;
    let result = money_request::delete(&state.pool, id).await?;
    if result {
        tracing::info!(request_id = id, admin_id = current.id(), "Money request deleted");
    }
    Ok(Json(result))
}
