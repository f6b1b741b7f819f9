//! 认证与授权模块
//!
//! # 组件
//!
//! - [`JwtService`] - HS256 令牌签发与校验 (admin / employee 两类 principal)
//! - [`require_auth`] - 路由级认证中间件
//! - [`CurrentAdmin`] / [`CurrentEmployee`] - 从请求解析 principal 的 extractor
//! - [`guard`] - 权限 gate，所有写操作在触碰账本前调用
//! - [`password`] - argon2 口令哈希
//! - [`verification`] - 密码重置令牌与 OTP

pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod verification;

pub use extractor::{CurrentAdmin, CurrentEmployee};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, PrincipalKind};
pub use middleware::require_auth;
