//! Principal extractors
//!
//! 令牌只证明身份；权限与启用状态每次请求都从数据库重新读取，
//! 撤销的权限立即生效。

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::{Admin, Employee};
use shared::permission::AdminPrincipal;
use shared::{AppError, ErrorCode};

use crate::auth::{Claims, JwtError, JwtService, PrincipalKind};
use crate::core::ServerState;
use crate::db::repository::{admin, employee};
use crate::security_log;

/// Authenticated dashboard admin
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub principal: AdminPrincipal,
    pub admin: Admin,
}

impl CurrentAdmin {
    pub fn id(&self) -> i64 {
        self.admin.id
    }
}

/// Authenticated mobile employee (always active)
#[derive(Debug, Clone)]
pub struct CurrentEmployee {
    pub employee: Employee,
}

impl CurrentEmployee {
    pub fn id(&self) -> i64 {
        self.employee.id
    }
}

/// Claims placed by `require_auth`, or validated here when the middleware did not run
fn claims_from_parts(parts: &mut Parts, state: &ServerState) -> Result<Claims, AppError> {
    if let Some(claims) = parts.extensions.get::<Claims>() {
        return Ok(claims.clone());
    }

    let auth_header = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %parts.uri);
            return Err(AppError::unauthorized());
        }
    };

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => {
            parts.extensions.insert(claims.clone());
            Ok(claims)
        }
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %parts.uri);
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

fn subject_of(claims: &Claims, expected: PrincipalKind) -> Result<i64, AppError> {
    if claims.kind != expected {
        security_log!(
            WARN,
            "principal_kind_mismatch",
            subject = %claims.sub,
            expected = ?expected,
            actual = ?claims.kind
        );
        return Err(AppError::forbidden());
    }
    claims
        .subject_id()
        .map_err(|_| AppError::invalid_token("Malformed token subject"))
}

impl FromRequestParts<ServerState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentAdmin>() {
            return Ok(current.clone());
        }

        let claims = claims_from_parts(parts, state)?;
        let id = subject_of(&claims, PrincipalKind::Admin)?;

        let Some(admin) = admin::find_by_id(&state.pool, id).await? else {
            security_log!(WARN, "auth_unknown_admin", admin_id = id);
            return Err(AppError::invalid_token("Account no longer exists"));
        };

        let current = CurrentAdmin {
            principal: admin.principal(),
            admin,
        };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

impl FromRequestParts<ServerState> for CurrentEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentEmployee>() {
            return Ok(current.clone());
        }

        let claims = claims_from_parts(parts, state)?;
        let id = subject_of(&claims, PrincipalKind::Employee)?;

        let Some(employee) = employee::find_by_id(&state.pool, id).await? else {
            security_log!(WARN, "auth_unknown_employee", employee_id = id);
            return Err(AppError::invalid_token("Account no longer exists"));
        };
        if !employee.is_active {
            security_log!(WARN, "auth_disabled_employee", employee_id = id);
            return Err(AppError::new(ErrorCode::AccountDisabled));
        }

        let current = CurrentEmployee { employee };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}
