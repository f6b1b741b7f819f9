//! 认证中间件
//!
//! 校验 `Authorization: Bearer <token>`，成功后把 [`Claims`] 注入请求扩展，
//! 由 [`CurrentAdmin`](super::CurrentAdmin) / [`CurrentEmployee`](super::CurrentEmployee)
//! 继续解析为具体的 principal。
//!
//! # 跳过认证的路径
//!
//! - `OPTIONS *` (CORS 预检)
//! - 非 `/api/` 路径 (正常返回 404)
//! - [`PUBLIC_ROUTES`]

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::AppError;

use crate::auth::{JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token
pub const PUBLIC_ROUTES: &[&str] = &[
    "/api/health",
    "/api/auth/login",
    "/api/auth/forgot-password",
    "/api/auth/reset-password",
    "/api/mobile/auth/login",
    "/api/mobile/auth/otp",
    "/api/mobile/auth/otp/verify",
];

pub fn is_public_route(path: &str) -> bool {
    PUBLIC_ROUTES.contains(&path.trim_end_matches('/'))
}

pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || is_public_route(path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!(WARN, "auth_missing", uri = %req.uri());
            return Err(AppError::unauthorized());
        }
    };

    match state.get_jwt_service().validate_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(WARN, "auth_failed", error = %e, uri = %req.uri());
            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}
