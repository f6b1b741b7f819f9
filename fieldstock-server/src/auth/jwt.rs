//! JWT 令牌服务
//!
//! 处理 JWT 令牌的生成、验证和解析。Admin 与 Employee 共用一个签名密钥，
//! 由 `kind` claim 区分两个表面 (dashboard / mobile)。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared::AdminRole;
use shared::PermissionSet;
use shared::models::{Admin, Employee};

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (应至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
    /// 密钥为进程内临时生成 (JWT_SECRET 未设置)，重启后旧令牌全部失效
    #[serde(skip)]
    pub ephemeral: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        let (secret, ephemeral) = match std::env::var("JWT_SECRET") {
            Ok(secret) => (secret, false),
            Err(_) => {
                tracing::warn!("⚠️  JWT_SECRET not set! Generating temporary key for development.");
                (generate_secure_printable_jwt_secret(), true)
            }
        };

        Self {
            secret,
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440), // 默认 24 小时
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "fieldstock-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "fieldstock-clients".to_string()),
            ephemeral,
        }
    }
}

impl JwtConfig {
    /// 固定密钥，测试用
    pub fn for_testing() -> Self {
        Self {
            secret: "fieldstock-test-secret-0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "fieldstock-server".to_string(),
            audience: "fieldstock-clients".to_string(),
            ephemeral: false,
        }
    }
}

/// 令牌主体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrincipalKind {
    Admin,
    Employee,
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// 主体 ID (Subject)
    pub sub: String,
    /// 显示名称
    pub name: String,
    pub kind: PrincipalKind,
    /// Admin 角色 (employee 令牌为空)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
    /// 签发时的权限快照，仅供客户端展示；服务端每次请求重新读取
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionSet>,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

impl Claims {
    /// Numeric subject id
    pub fn subject_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("non-numeric subject: {}", self.sub)))
    }
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> String {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_=+";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    if rng.fill(&mut bytes).is_err() {
        // 随机数生成失败时退回进程级随机 (仍满足 32 字节下限)
        use rand::Rng;
        rand::thread_rng().fill(&mut bytes[..]);
    }

    bytes
        .iter()
        .map(|b| ALLOWED[(*b as usize) % ALLOWED.len()] as char)
        .collect()
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn sign(&self, mut claims: Claims) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);
        claims.exp = expiration.timestamp();
        claims.iat = now.timestamp();
        claims.iss = self.config.issuer.clone();
        claims.aud = self.config.audience.clone();

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 为 admin 生成令牌
    pub fn generate_admin_token(&self, admin: &Admin) -> Result<String, JwtError> {
        self.sign(Claims {
            sub: admin.id.to_string(),
            name: admin.name.clone(),
            kind: PrincipalKind::Admin,
            role: Some(admin.role),
            permissions: match admin.role {
                AdminRole::SuperAdmin => None,
                AdminRole::SubAdmin => Some(admin.permissions.clone()),
            },
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        })
    }

    /// 为 employee (mobile) 生成令牌
    pub fn generate_employee_token(&self, employee: &Employee) -> Result<String, JwtError> {
        self.sign(Claims {
            sub: employee.id.to_string(),
            name: employee.name.clone(),
            kind: PrincipalKind::Employee,
            role: None,
            permissions: None,
            exp: 0,
            iat: 0,
            iss: String::new(),
            aud: String::new(),
        })
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// 新签发令牌的有效期 (秒)
    pub fn expires_in_seconds(&self) -> i64 {
        self.config.expiration_minutes * 60
    }
}
