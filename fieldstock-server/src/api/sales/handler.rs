//! Sales API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{Sale, SaleCreate};
use shared::permission::{Action, Module};

use crate::auth::CurrentAdmin;
use crate::auth::guard::authorize;
use crate::core::ServerState;
use crate::db::repository::sale;
use crate::ledger::{self, Origin};
use crate::utils::{AppError, AppResult, ErrorCode};

#[derive(Debug, Default, Deserialize)]
pub struct SaleListQuery {
    pub employee_id: Option<i64>,
}

/// GET /api/sales?employee_id=
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Query(query): Query<SaleListQuery>,
) -> AppResult<Json<Vec<Sale>>> {
    authorize(&current.principal, Module::Sales, Action::Read)?;
    let sales = sale::find_all(&state.pool, query.employee_id).await?;
    Ok(Json(sales))
}

/// GET /api/sales/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Sale>> {
    authorize(&current.principal, Module::Sales, Action::Read)?;
    let sale = sale::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Sale {}", id)))?;
    Ok(Json(sale))
}

/// POST /api/sales - 代员工记录销售
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<Sale>> {
    let employee_id = payload.employee_id.ok_or_else(|| {
        AppError::with_message(ErrorCode::RequiredField, "employee_id is required")
            .with_detail("field", "employee_id")
    })?;
    let sale = ledger::service::record_sale(
        &state.pool,
        Origin::Admin {
            actor: &current.principal,
            employee_id,
        },
        payload.method,
        &payload.items,
    )
    .await?;
    Ok(Json(sale))
}
