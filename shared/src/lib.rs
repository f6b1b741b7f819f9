//! Shared types for Fieldstock
//!
//! Types used by the server and by any client that renders the admin
//! dashboard or the mobile app: models, error codes, response envelope and
//! the permission registry/evaluator (so UI affordances and API gates make
//! the same decision).

pub mod error;
pub mod models;
pub mod permission;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use permission::{Action, AdminPrincipal, AdminRole, Module, PermissionSet};
