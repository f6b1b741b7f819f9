//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde_json::{Value, json};
use shared::models::{AssignStock, DeassignQuery, Employee, EmployeeCreate, EmployeeUpdate};
use shared::permission::{Action, Module};

use crate::auth::CurrentAdmin;
use crate::auth::guard::authorize;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::employee::{self, EmployeeChanges};
use crate::db::repository::{RepoError, duplicate_as};
use crate::ledger;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_password, validate_required_text,
};
use crate::utils::{AppError, AppResult, ErrorCode};

fn employee_error(err: RepoError, id: i64) -> AppError {
    match err {
        RepoError::NotFound(_) => AppError::new(ErrorCode::EmployeeNotFound).with_detail("id", id),
        other => duplicate_as(other, ErrorCode::EmployeePhoneExists),
    }
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))
}

/// GET /api/employees - 获取所有员工 (含持有金额与分配)
pub async fn list(
    State(state): State<ServerState>,
    current: CurrentAdmin,
) -> AppResult<Json<Vec<Employee>>> {
    authorize(&current.principal, Module::Employees, Action::Read)?;
    let employees = employee::find_all(&state.pool).await?;
    Ok(Json(employees))
}

/// GET /api/employees/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    authorize(&current.principal, Module::Employees, Action::Read)?;
    let employee = employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).with_detail("id", id))?;
    Ok(Json(employee))
}

/// POST /api/employees - 创建员工
pub async fn create(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    authorize(&current.principal, Module::Employees, Action::Create)?;

    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_password(&payload.password)?;

    let password_hash = hash(&payload.password)?;
    let employee = employee::create(
        &state.pool,
        payload.name.trim(),
        payload.phone.trim(),
        &password_hash,
    )
    .await
    .map_err(|e| duplicate_as(e, ErrorCode::EmployeePhoneExists))?;

    tracing::info!(
        employee_id = employee.id,
        admin_id = current.id(),
        "Employee created"
    );
    Ok(Json(employee))
}

/// PUT /api/employees/:id - 更新员工资料
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    authorize(&current.principal, Module::Employees, Action::Update)?;

    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(phone) = &payload.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    let password_hash = match &payload.password {
        Some(password) => {
            validate_password(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let employee = employee::update(
        &state.pool,
        id,
        EmployeeChanges {
            name: payload.name.map(|n| n.trim().to_string()),
            phone: payload.phone.map(|p| p.trim().to_string()),
            password_hash,
        },
    )
    .await
    .map_err(|e| employee_error(e, id))?;

    tracing::info!(employee_id = id, "Employee updated");
    Ok(Json(employee))
}

/// POST /api/employees/:id/toggle-status
///
/// 停用后该员工的 token 在下一次请求即失效 (extractor 每次重新加载)。
pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    authorize(&current.principal, Module::Employees, Action::ToggleStatus)?;
    let is_active = employee::toggle_status(&state.pool, id)
        .await
        .map_err(|e| employee_error(e, id))?;

    tracing::info!(employee_id = id, is_active, "Employee status toggled");
    Ok(Json(json!({ "id": id, "is_active": is_active })))
}

/// DELETE /api/employees/:id
pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    authorize(&current.principal, Module::Employees, Action::Delete)?;
    let result = employee::delete(&state.pool, id).await?;
    if result {
        tracing::info!(employee_id = id, "Employee deleted");
    }
    Ok(Json(result))
}

/// POST /api/employees/:id/products - 直接分配库存
pub async fn assign_stock(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path(id): Path<i64>,
    Json(payload): Json<AssignStock>,
) -> AppResult<Json<Employee>> {
    let employee = ledger::service::assign_stock(
        &state.pool,
        &current.principal,
        id,
        payload.product_id,
        payload.quantity,
    )
    .await?;
    Ok(Json(employee))
}

/// DELETE /api/employees/:id/products/:product_id?restock=true
pub async fn deassign_stock(
    State(state): State<ServerState>,
    current: CurrentAdmin,
    Path((id, product_id)): Path<(i64, i64)>,
    Query(query): Query<DeassignQuery>,
) -> AppResult<Json<Employee>> {
    let employee = ledger::service::deassign_stock(
        &state.pool,
        &current.principal,
        id,
        product_id,
        query.restock,
    )
    .await?;
    Ok(Json(employee))
}
