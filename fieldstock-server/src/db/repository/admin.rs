//! Admin Repository

use super::{RepoError, RepoResult};
use shared::models::Admin;
use shared::{AdminRole, PermissionSet};
use sqlx::SqlitePool;

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, role, permissions, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct AdminRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AdminRow {
    pub fn into_admin(self) -> RepoResult<Admin> {
        let role: AdminRole = self
            .role
            .parse()
            .map_err(|e| RepoError::Database(format!("admin {}: {e}", self.id)))?;

        // 非法 JSON 视为无权限 (deny-by-default)
        let permissions = match role {
            AdminRole::SuperAdmin => PermissionSet::new(),
            AdminRole::SubAdmin => serde_json::from_str(&self.permissions).unwrap_or_else(|e| {
                tracing::warn!(admin_id = self.id, error = %e, "Unreadable admin permissions");
                PermissionSet::new()
            }),
        };

        Ok(Admin {
            id: self.id,
            name: self.name,
            email: self.email,
            role,
            permissions,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn permissions_json(permissions: &PermissionSet) -> RepoResult<String> {
    serde_json::to_string(permissions).map_err(|e| RepoError::Database(e.to_string()))
}

/// Fields for a new admin row (password already hashed)
pub struct NewAdmin<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: AdminRole,
    pub permissions: &'a PermissionSet,
}

/// Field changes (password already hashed)
#[derive(Default)]
pub struct AdminChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub permissions: Option<PermissionSet>,
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Admin>> {
    let rows = sqlx::query_as::<_, AdminRow>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin ORDER BY role DESC, name"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(AdminRow::into_admin).collect()
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Admin>> {
    let row = sqlx::query_as::<_, AdminRow>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(AdminRow::into_admin).transpose()
}

/// Row with password hash, for login
pub async fn find_row_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<AdminRow>> {
    let row = sqlx::query_as::<_, AdminRow>(&format!(
        "SELECT {ADMIN_COLUMNS} FROM admin WHERE email = ? COLLATE NOCASE"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn count_super_admins(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin WHERE role = 'super-admin'")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

pub async fn create(pool: &SqlitePool, data: NewAdmin<'_>) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let permissions = match data.role {
        // super-admin 权限是计算出来的，不落库
        AdminRole::SuperAdmin => "{}".to_string(),
        AdminRole::SubAdmin => permissions_json(data.permissions)?,
    };

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO admin (name, email, password_hash, role, permissions, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING id",
    )
    .bind(data.name)
    .bind(data.email)
    .bind(data.password_hash)
    .bind(data.role.as_str())
    .bind(permissions)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create admin".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, changes: AdminChanges) -> RepoResult<Admin> {
    let now = shared::util::now_millis();
    let permissions = changes
        .permissions
        .as_ref()
        .map(permissions_json)
        .transpose()?;

    // permissions 列对 super-admin 永远保持 '{}'
    let rows = sqlx::query(
        "UPDATE admin SET name = COALESCE(?1, name), email = COALESCE(?2, email), password_hash = COALESCE(?3, password_hash), permissions = CASE WHEN role = 'sub-admin' THEN COALESCE(?4, permissions) ELSE permissions END, updated_at = ?5 WHERE id = ?6",
    )
    .bind(changes.name)
    .bind(changes.email)
    .bind(changes.password_hash)
    .bind(permissions)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Admin {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Admin {id} not found")))
}

pub async fn set_password_by_email(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE admin SET password_hash = ?1, updated_at = ?2 WHERE email = ?3 COLLATE NOCASE",
    )
    .bind(password_hash)
    .bind(now)
    .bind(email)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Hard delete; the super-admin row is never matched
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM admin WHERE id = ? AND role = 'sub-admin'")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support::memory_pool;
    use shared::{Action, Module};

    async fn insert(pool: &SqlitePool, email: &str, role: AdminRole) -> Admin {
        create(
            pool,
            NewAdmin {
                name: "Test",
                email,
                password_hash: "hash",
                role,
                permissions: &PermissionSet::new().with(Module::Sales, &[Action::Read]),
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let pool = memory_pool().await;
        let admin = insert(&pool, "sub@example.com", AdminRole::SubAdmin).await;
        assert!(admin.permissions.contains(Module::Sales, Action::Read));

        let row = find_row_by_email(&pool, "SUB@example.com").await.unwrap().unwrap();
        assert_eq!(row.id, admin.id);
    }

    #[tokio::test]
    async fn test_single_super_admin() {
        let pool = memory_pool().await;
        let root = insert(&pool, "root@example.com", AdminRole::SuperAdmin).await;
        assert!(root.permissions.is_empty());

        let err = create(
            &pool,
            NewAdmin {
                name: "Second root",
                email: "root2@example.com",
                password_hash: "hash",
                role: AdminRole::SuperAdmin,
                permissions: &PermissionSet::new(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert_eq!(count_super_admins(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_super_admin_row_never_deleted() {
        let pool = memory_pool().await;
        let root = insert(&pool, "root@example.com", AdminRole::SuperAdmin).await;
        assert!(!delete(&pool, root.id).await.unwrap());
        assert!(find_by_id(&pool, root.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_stored_unknown_actions_are_ignored() {
        let pool = memory_pool().await;
        let admin = insert(&pool, "sub@example.com", AdminRole::SubAdmin).await;
        sqlx::query("UPDATE admin SET permissions = ? WHERE id = ?")
            .bind(r#"{"products":["read","explode"],"dashboard":["delete"]}"#)
            .bind(admin.id)
            .execute(&pool)
            .await
            .unwrap();

        let loaded = find_by_id(&pool, admin.id).await.unwrap().unwrap();
        assert!(loaded.permissions.contains(Module::Products, Action::Read));
        assert!(!loaded.permissions.has_module(Module::Dashboard));
    }

    #[tokio::test]
    async fn test_update_permissions() {
        let pool = memory_pool().await;
        let admin = insert(&pool, "sub@example.com", AdminRole::SubAdmin).await;
        let updated = update(
            &pool,
            admin.id,
            AdminChanges {
                permissions: Some(PermissionSet::new().with(Module::Requests, &[Action::Approve])),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.permissions.contains(Module::Requests, Action::Approve));
        assert!(!updated.permissions.has_module(Module::Sales));
    }
}
