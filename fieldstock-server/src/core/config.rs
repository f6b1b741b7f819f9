use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::core::ServerError;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (`.env` 由 dotenv 加载)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 |
/// | DATABASE_PATH | {WORK_DIR}/database/fieldstock.db | SQLite 文件 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | UPLOAD_DIR | {WORK_DIR}/uploads | 上传文件目录 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | {WORK_DIR}/logs | 滚动日志目录 (存在时启用) |
/// | SUPER_ADMIN_EMAIL / _PASSWORD / _NAME | - | 首次启动时创建 super-admin |
/// | RESET_TOKEN_TTL_MINUTES | 30 | 密码重置令牌有效期 |
/// | OTP_TTL_MINUTES | 10 | 短信验证码有效期 |
///
/// JWT_* 见 [`JwtConfig`]。
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、上传文件、日志
    pub work_dir: String,
    /// SQLite 数据库文件路径
    pub database_path: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
    /// 上传文件目录
    pub upload_dir: String,
    pub log_level: String,
    pub log_dir: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 首次启动时创建的 super-admin (None = 不自动创建)
    pub bootstrap_admin: Option<BootstrapAdmin>,
    pub reset_token_ttl_minutes: i64,
    pub otp_ttl_minutes: i64,
}

/// Root account seeded on an empty database
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
    pub name: String,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let base = PathBuf::from(&work_dir);
        let default_db = base.join("database").join("fieldstock.db");

        let bootstrap_admin = match (
            std::env::var("SUPER_ADMIN_EMAIL"),
            std::env::var("SUPER_ADMIN_PASSWORD"),
        ) {
            (Ok(email), Ok(password)) => Some(BootstrapAdmin {
                email,
                password,
                name: std::env::var("SUPER_ADMIN_NAME").unwrap_or_else(|_| "Administrator".into()),
            }),
            _ => None,
        };

        Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| default_db.to_string_lossy().into_owned()),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| base.join("uploads").to_string_lossy().into_owned()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR")
                .unwrap_or_else(|_| base.join("logs").to_string_lossy().into_owned()),
            jwt: JwtConfig::default(),
            bootstrap_admin,
            reset_token_ttl_minutes: env_or("RESET_TOKEN_TTL_MINUTES", 30),
            otp_ttl_minutes: env_or("OTP_TTL_MINUTES", 10),
            work_dir,
        }
    }

    /// 测试用配置：临时目录 + 固定 JWT 密钥
    pub fn for_testing(work_dir: impl Into<String>) -> Self {
        let work_dir = work_dir.into();
        let base = PathBuf::from(&work_dir);
        Self {
            database_path: base.join("fieldstock.db").to_string_lossy().into_owned(),
            http_port: 0,
            environment: "test".into(),
            request_timeout_ms: 30_000,
            upload_dir: base.join("uploads").to_string_lossy().into_owned(),
            log_level: "debug".into(),
            log_dir: base.join("logs").to_string_lossy().into_owned(),
            jwt: JwtConfig::for_testing(),
            bootstrap_admin: None,
            reset_token_ttl_minutes: 30,
            otp_ttl_minutes: 10,
            work_dir,
        }
    }

    /// 启动前校验 (生产环境必须显式配置 JWT 密钥)
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.is_production() && self.jwt.ephemeral {
            return Err(ServerError::Config(
                "JWT_SECRET environment variable must be set in production".into(),
            ));
        }
        if self.jwt.secret.len() < 32 {
            return Err(ServerError::Config(
                "JWT_SECRET must be at least 32 characters long".into(),
            ));
        }
        if self.reset_token_ttl_minutes <= 0 || self.otp_ttl_minutes <= 0 {
            return Err(ServerError::Config("Token TTLs must be positive".into()));
        }
        Ok(())
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        std::fs::create_dir_all(&self.upload_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        if let Some(parent) = PathBuf::from(&self.database_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config_is_valid() {
        let config = Config::for_testing("/tmp/fieldstock-test");
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
        assert!(config.database_path.ends_with("fieldstock.db"));
    }

    #[test]
    fn test_production_rejects_ephemeral_secret() {
        let mut config = Config::for_testing("/tmp/fieldstock-test");
        config.environment = "production".into();
        config.jwt.ephemeral = true;
        assert!(matches!(config.validate(), Err(ServerError::Config(_))));
    }
}
