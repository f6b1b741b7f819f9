//! Mobile API Handlers

use std::time::Duration;

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use shared::models::{
    Employee, EmployeeLoginRequest, EmployeeLoginResponse, MoneyRequest, MoneyRequestCreate,
    OtpRequest, OtpVerifyRequest, Product, RequestListQuery, RequestStatus, Sale, SaleCreate,
    StockRequest, StockRequestCreate,
};

use crate::api::AUTH_FIXED_DELAY_MS;
use crate::auth::CurrentEmployee;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::verification;
use crate::core::ServerState;
use crate::db::repository::{employee, money_request, product, sale, stock_request};
use crate::ledger::{self, Origin};
use crate::security_log;
use crate::utils::validation::validate_password;
use crate::utils::{AppError, AppResult, ErrorCode};

// ========== Auth ==========

/// POST /api/mobile/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<EmployeeLoginRequest>,
) -> AppResult<Json<EmployeeLoginResponse>> {
    let phone = req.phone.trim().to_string();
    let row = employee::find_row_by_phone(&state.pool, &phone).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let row = match row {
        Some(row) if verify_password(&req.password, &row.password_hash) => row,
        _ => {
            security_log!(WARN, "mobile_login_failed", phone = %phone);
            return Err(AppError::invalid_credentials());
        }
    };
    // 密码正确后才暴露停用状态
    if !row.is_active {
        security_log!(WARN, "mobile_login_disabled", employee_id = row.id);
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let employee = employee::hydrate(&state.pool, row).await?;
    let token = state
        .get_jwt_service()
        .generate_employee_token(&employee)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(employee_id = employee.id, "Employee logged in");
    Ok(Json(EmployeeLoginResponse {
        token,
        expires_in: state.jwt_service.expires_in_seconds(),
        employee,
    }))
}

/// POST /api/mobile/auth/otp
///
/// 始终返回成功，不暴露手机号是否存在。
pub async fn request_otp(
    State(state): State<ServerState>,
    Json(req): Json<OtpRequest>,
) -> AppResult<Json<Value>> {
    let phone = req.phone.trim();
    if employee::find_row_by_phone(&state.pool, phone).await?.is_some() {
        let code = verification::issue_otp(&state.pool, phone, state.config.otp_ttl_minutes).await?;
        if let Err(e) = state.mailer.send_otp(phone, &code).await {
            tracing::error!(error = %e, "Failed to deliver OTP");
        }
    } else {
        security_log!(INFO, "otp_unknown_phone", phone = %phone);
    }

    Ok(Json(json!({
        "message": "If the phone number is registered, a code has been sent"
    })))
}

/// POST /api/mobile/auth/otp/verify - 验证 OTP 并设置新密码
pub async fn verify_otp(
    State(state): State<ServerState>,
    Json(req): Json<OtpVerifyRequest>,
) -> AppResult<Json<Value>> {
    validate_password(&req.new_password)?;
    let phone = req.phone.trim();
    verification::consume_otp(&state.pool, phone, &req.code).await?;

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    if !employee::set_password_by_phone(&state.pool, phone, &password_hash).await? {
        return Err(AppError::new(ErrorCode::EmployeeNotFound));
    }

    security_log!(INFO, "employee_password_reset", phone = %phone);
    Ok(Json(json!({ "message": "Password has been reset" })))
}

// ========== Self ==========

/// GET /api/mobile/me - 持有金额与分配
pub async fn me(current: CurrentEmployee) -> Json<Employee> {
    Json(current.employee)
}

/// GET /api/mobile/products - 可申请的商品 (仅启用)
pub async fn products(
    State(state): State<ServerState>,
    _current: CurrentEmployee,
) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool)
        .await?
        .into_iter()
        .filter(|p| p.is_active)
        .collect();
    Ok(Json(products))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<RequestStatus>,
}

impl StatusQuery {
    fn scoped(self, employee_id: i64) -> RequestListQuery {
        RequestListQuery {
            status: self.status,
            employee_id: Some(employee_id),
        }
    }
}

// ========== Requests ==========

/// GET /api/mobile/stock-requests
pub async fn list_stock_requests(
    State(state): State<ServerState>,
    current: CurrentEmployee,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<StockRequest>>> {
    let requests = stock_request::find_all(&state.pool, &query.scoped(current.id())).await?;
    Ok(Json(requests))
}

/// POST /api/mobile/stock-requests
pub async fn create_stock_request(
    State(state): State<ServerState>,
    current: CurrentEmployee,
    Json(payload): Json<StockRequestCreate>,
) -> AppResult<Json<StockRequest>> {
    let request = ledger::service::create_stock_request(
        &state.pool,
        Origin::Employee(current.id()),
        payload.product_id,
        payload.quantity,
        Some(payload.reason.as_str()),
    )
    .await?;
    Ok(Json(request))
}

/// GET /api/mobile/money-requests
pub async fn list_money_requests(
    State(state): State<ServerState>,
    current: CurrentEmployee,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<MoneyRequest>>> {
    let requests = money_request::find_all(&state.pool, &query.scoped(current.id())).await?;
    Ok(Json(requests))
}

/// POST /api/mobile/money-requests - 上交现金/线上款
pub async fn create_money_request(
    State(state): State<ServerState>,
    current: CurrentEmployee,
    Json(payload): Json<MoneyRequestCreate>,
) -> AppResult<Json<MoneyRequest>> {
    let request = ledger::service::create_money_request(
        &state.pool,
        Origin::Employee(current.id()),
        payload.amount,
        payload.method,
        payload.reference_number.as_deref(),
    )
    .await?;
    Ok(Json(request))
}

// ========== Sales ==========

/// GET /api/mobile/sales
pub async fn list_sales(
    State(state): State<ServerState>,
    current: CurrentEmployee,
) -> AppResult<Json<Vec<Sale>>> {
    let sales = sale::find_all(&state.pool, Some(current.id())).await?;
    Ok(Json(sales))
}

/// POST /api/mobile/sales
pub async fn create_sale(
    State(state): State<ServerState>,
    current: CurrentEmployee,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<Sale>> {
    let sale = ledger::service::record_sale(
        &state.pool,
        Origin::Employee(current.id()),
        payload.method,
        &payload.items,
    )
    .await?;
    Ok(Json(sale))
}
