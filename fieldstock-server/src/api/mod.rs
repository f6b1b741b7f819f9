//! HTTP API 模块
//!
//! 每个子模块提供 `router()` 与 `handler`，在 [`build_router`](crate::core::server::build_router) 中合并。
//!
//! | 模块 | 前缀 | principal |
//! |------|------|-----------|
//! | health | /api/health | 无 |
//! | auth | /api/auth | admin (login/forgot/reset 公开) |
//! | permissions | /api/permissions | admin |
//! | admins / products / employees | /api/... | admin |
//! | stock_requests / money_requests / sales | /api/... | admin |
//! | mobile | /api/mobile | employee (auth 公开) |

pub mod admins;
pub mod auth;
pub mod employees;
pub mod health;
pub mod mobile;
pub mod money_requests;
pub mod permissions;
pub mod products;
pub mod sales;
pub mod stock_requests;

/// Fixed delay for credential checks (timing / enumeration)
pub(crate) const AUTH_FIXED_DELAY_MS: u64 = 500;
