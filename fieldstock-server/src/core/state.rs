//! 服务器状态 - 持有所有服务的共享引用
//!
//! [`ServerState`] 是 Clone 的 (内部均为 Arc / 连接池)，直接作为 axum 的 State。

use std::sync::Arc;

use shared::permission::{AdminRole, PermissionSet};
use shared::AppError;
use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::admin::{self, NewAdmin};
use crate::services::{FileStore, LogMailer, Mailer};
use crate::utils::validation::{validate_email, validate_password};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub file_store: FileStore,
    pub mailer: Arc<dyn Mailer>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("jwt_service", &self.jwt_service)
            .field("file_store", &self.file_store)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let file_store = FileStore::new(&config.upload_dir);
        Self {
            config,
            pool,
            jwt_service,
            file_store,
            mailer,
        }
    }

    /// 初始化: 目录结构 → 数据库 (迁移) → 服务 → super-admin 种子
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db = DbService::new(&config.database_path).await?;
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new(config.is_development()));
        let state = Self::new(config.clone(), db.pool, mailer);

        state.seed_super_admin().await?;
        Ok(state)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Create the root account on an empty database
    async fn seed_super_admin(&self) -> Result<()> {
        let existing = admin::count_super_admins(&self.pool)
            .await
            .map_err(AppError::from)?;
        if existing > 0 {
            return Ok(());
        }

        let Some(bootstrap) = &self.config.bootstrap_admin else {
            tracing::warn!(
                "No super-admin exists; set SUPER_ADMIN_EMAIL and SUPER_ADMIN_PASSWORD to create one"
            );
            return Ok(());
        };

        validate_email(&bootstrap.email)?;
        validate_password(&bootstrap.password)?;
        let password_hash = hash_password(&bootstrap.password)
            .map_err(|e| ServerError::Config(format!("Failed to hash bootstrap password: {e}")))?;

        let root = admin::create(
            &self.pool,
            NewAdmin {
                name: &bootstrap.name,
                email: &bootstrap.email,
                password_hash: &password_hash,
                role: AdminRole::SuperAdmin,
                permissions: &PermissionSet::new(),
            },
        )
        .await
        .map_err(AppError::from)?;

        tracing::info!(admin_id = root.id, email = %root.email, "Super-admin created");
        Ok(())
    }
}
