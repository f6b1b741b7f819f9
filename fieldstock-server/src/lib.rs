//! Fieldstock Server - 外勤库存与收款管理后端
//!
//! # 架构概述
//!
//! - **账本** (`ledger`): 库存分配、持有金额、请求状态机 (decide → apply，单事务)
//! - **权限** (`auth::guard` + `shared::permission`): 模块级 RBAC，所有写操作前置 gate
//! - **认证** (`auth`): JWT (admin / employee) + Argon2，密码重置令牌与 OTP
//! - **数据库** (`db`): SQLite (sqlx, WAL, 内嵌迁移)
//! - **HTTP API** (`api`): 后台 dashboard 与移动端接口
//!
//! # 模块结构
//!
//! ```text
//! fieldstock-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT、extractor、中间件、gate、口令、验证码
//! ├── ledger/        # 账本 plan / decide / apply / service
//! ├── services/      # 文件存储、Mailer
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、输入校验
//! └── db/            # 连接池与 repository
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentAdmin, CurrentEmployee, JwtService};
pub use core::{Config, Server, ServerState, build_app};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Security logging macro - 写入 `security` target
///
/// ```ignore
/// security_log!(WARN, "permission_denied", admin_id = actor.id, module = module.as_str());
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Local::now().to_rfc3339(),
            $($arg)*
        );
    };
}

/// 加载 `.env` 并读取配置
pub fn setup_environment() -> Config {
    // .env 可选
    dotenv::dotenv().ok();
    Config::from_env()
}

pub fn print_banner() {
    println!(
        r#"
    _______      __    __     __             __
   / ____(_)__  / /___/ /____/ /_____  _____/ /__
  / /_  / / _ \/ / __  / ___/ __/ __ \/ ___/ //_/
 / __/ / /  __/ / /_/ (__  ) /_/ /_/ / /__/ ,<
/_/   /_/\___/_/\__,_/____/\__/\____/\___/_/|_|
    "#
    );
}
