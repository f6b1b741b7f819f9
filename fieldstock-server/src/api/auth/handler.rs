//! Admin Authentication Handlers
//!
//! login / me / forgot-password / reset-password

use std::time::Duration;

use axum::{Json, extract::State};
use serde_json::{Value, json};
use shared::models::{
    Admin, AdminLoginResponse, ForgotPasswordRequest, LoginRequest, ResetPasswordRequest,
};
use shared::permission::first_accessible_module;

use crate::api::AUTH_FIXED_DELAY_MS;
use crate::auth::CurrentAdmin;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::verification;
use crate::core::ServerState;
use crate::db::repository::admin;
use crate::security_log;
use crate::utils::validation::validate_password;
use crate::utils::{AppError, AppResult};

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AdminLoginResponse>> {
    let email = req.email.trim().to_string();
    let row = admin::find_row_by_email(&state.pool, &email).await?;

    // Fixed delay before looking at the result
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let row = match row {
        Some(row) if verify_password(&req.password, &row.password_hash) => row,
        _ => {
            security_log!(WARN, "login_failed", email = %email);
            return Err(AppError::invalid_credentials());
        }
    };

    let admin = row.into_admin()?;
    let token = state
        .get_jwt_service()
        .generate_admin_token(&admin)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;
    let landing_route = first_accessible_module(&admin.principal()).map(|m| m.route().to_string());

    tracing::info!(
        admin_id = admin.id,
        role = %admin.role,
        "Admin logged in successfully"
    );

    Ok(Json(AdminLoginResponse {
        token,
        expires_in: state.jwt_service.expires_in_seconds(),
        admin,
        landing_route,
    }))
}

/// GET /api/auth/me - freshly loaded admin record
pub async fn me(current: CurrentAdmin) -> Json<Admin> {
    Json(current.admin)
}

/// POST /api/auth/forgot-password
///
/// Always answers OK so the endpoint does not reveal which emails exist.
pub async fn forgot_password(
    State(state): State<ServerState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AppResult<Json<Value>> {
    let email = req.email.trim().to_lowercase();
    if admin::find_row_by_email(&state.pool, &email).await?.is_some() {
        let token =
            verification::issue_reset_token(&state.pool, &email, state.config.reset_token_ttl_minutes)
                .await?;
        if let Err(e) = state.mailer.send_password_reset(&email, &token).await {
            tracing::error!(error = %e, "Failed to deliver password reset token");
        }
    } else {
        security_log!(INFO, "password_reset_unknown_email", email = %email);
    }

    Ok(Json(json!({
        "message": "If the email exists, a reset link has been sent"
    })))
}

/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<ServerState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AppResult<Json<Value>> {
    validate_password(&req.new_password)?;
    let email = verification::consume_reset_token(&state.pool, &req.token).await?;

    let password_hash = hash_password(&req.new_password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;
    if !admin::set_password_by_email(&state.pool, &email, &password_hash).await? {
        return Err(AppError::new(shared::ErrorCode::AdminNotFound));
    }

    security_log!(INFO, "password_reset", email = %email);
    Ok(Json(json!({ "message": "Password has been reset" })))
}
