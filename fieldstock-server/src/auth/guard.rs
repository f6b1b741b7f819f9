//! Authorization gate
//!
//! 所有写操作在触碰账本之前都要经过这里。Principal 由调用方显式传入。
//!
//! 拒绝时对外只返回通用错误；module/action 等细节只写入 `security` 日志。

use shared::models::{Admin, AdminUpdate};
use shared::permission::{self, Action, AdminPrincipal, AdminRole, Module};
use shared::{AppError, AppResult, ErrorCode};

use crate::security_log;

/// Require `module:action`
pub fn authorize(actor: &AdminPrincipal, module: Module, action: Action) -> AppResult<()> {
    if permission::can(actor, module, action) {
        return Ok(());
    }
    security_log!(
        WARN,
        "permission_denied",
        admin_id = actor.id,
        module = module.as_str(),
        action = action.as_str()
    );
    Err(AppError::forbidden())
}

/// Require any of `actions` on `module`
pub fn authorize_any(actor: &AdminPrincipal, module: Module, actions: &[Action]) -> AppResult<()> {
    if permission::can_any(actor, module, actions) {
        return Ok(());
    }
    security_log!(
        WARN,
        "permission_denied",
        admin_id = actor.id,
        module = module.as_str(),
        actions = ?actions
    );
    Err(AppError::forbidden())
}

fn deny(actor: &AdminPrincipal, code: ErrorCode, target_id: i64) -> AppError {
    security_log!(
        WARN,
        "admin_management_denied",
        admin_id = actor.id,
        target_id = target_id,
        code = code.code()
    );
    AppError::new(code)
}

/// 仅 super-admin 可创建 sub-admin
pub fn authorize_admin_create(actor: &AdminPrincipal) -> AppResult<()> {
    if actor.is_super_admin() {
        return Ok(());
    }
    Err(deny(actor, ErrorCode::SuperAdminRequired, 0))
}

/// Update rules
///
/// - super-admin 记录：只能由其本人修改 name/password
/// - sub-admin 本人：只能修改 name/password (不能自我提权)
/// - 其他 sub-admin：仅 super-admin 可修改
pub fn authorize_admin_update(
    actor: &AdminPrincipal,
    target: &Admin,
    update: &AdminUpdate,
) -> AppResult<()> {
    let is_self = actor.id == target.id;

    match target.role {
        AdminRole::SuperAdmin => {
            if is_self && !update.touches_privileged() {
                Ok(())
            } else {
                Err(deny(actor, ErrorCode::CannotModifySuperAdmin, target.id))
            }
        }
        AdminRole::SubAdmin if is_self => {
            if update.touches_privileged() {
                Err(deny(actor, ErrorCode::PermissionDenied, target.id))
            } else {
                Ok(())
            }
        }
        AdminRole::SubAdmin => {
            if actor.is_super_admin() {
                Ok(())
            } else {
                Err(deny(actor, ErrorCode::SuperAdminRequired, target.id))
            }
        }
    }
}

/// Delete rules: never self, never the super-admin, only by super-admin
pub fn authorize_admin_delete(actor: &AdminPrincipal, target: &Admin) -> AppResult<()> {
    if actor.id == target.id {
        return Err(deny(actor, ErrorCode::CannotDeleteSelf, target.id));
    }
    if target.role == AdminRole::SuperAdmin {
        return Err(deny(actor, ErrorCode::CannotDeleteSuperAdmin, target.id));
    }
    if !actor.is_super_admin() {
        return Err(deny(actor, ErrorCode::SuperAdminRequired, target.id));
    }
    Ok(())
}

/// Reading admin records: `admins:read`, or one's own record
pub fn authorize_admin_read(actor: &AdminPrincipal, target_id: i64) -> AppResult<()> {
    if actor.id == target_id {
        return Ok(());
    }
    authorize(actor, Module::Admins, Action::Read)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::PermissionSet;

    fn principal(id: i64, role: AdminRole, permissions: PermissionSet) -> AdminPrincipal {
        AdminPrincipal {
            id,
            role,
            permissions,
        }
    }

    fn record(id: i64, role: AdminRole) -> Admin {
        Admin {
            id,
            name: format!("admin-{id}"),
            email: format!("admin{id}@example.com"),
            role,
            permissions: PermissionSet::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    fn root() -> AdminPrincipal {
        principal(1, AdminRole::SuperAdmin, PermissionSet::new())
    }

    fn full_sub(id: i64) -> AdminPrincipal {
        principal(id, AdminRole::SubAdmin, PermissionSet::full())
    }

    fn profile_update() -> AdminUpdate {
        AdminUpdate {
            name: Some("New Name".into()),
            password: Some("new-password".into()),
            ..Default::default()
        }
    }

    fn elevate_update() -> AdminUpdate {
        AdminUpdate {
            permissions: Some(serde_json::to_value(PermissionSet::full()).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_products_read_only_sub_admin() {
        let actor = principal(
            2,
            AdminRole::SubAdmin,
            PermissionSet::new().with(Module::Products, &[Action::Read]),
        );
        let err = authorize(&actor, Module::Products, Action::Delete).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.message, "Permission denied");
        assert!(authorize(&actor, Module::Products, Action::Read).is_ok());
        assert!(authorize_any(&actor, Module::Products, &[Action::Update, Action::Read]).is_ok());
    }

    #[test]
    fn test_only_super_admin_creates_admins() {
        assert!(authorize_admin_create(&root()).is_ok());
        let err = authorize_admin_create(&full_sub(2)).unwrap_err();
        assert_eq!(err.code, ErrorCode::SuperAdminRequired);
    }

    #[test]
    fn test_super_admin_self_profile_only() {
        let target = record(1, AdminRole::SuperAdmin);
        assert!(authorize_admin_update(&root(), &target, &profile_update()).is_ok());

        let email_change = AdminUpdate {
            email: Some("new@example.com".into()),
            ..Default::default()
        };
        let err = authorize_admin_update(&root(), &target, &email_change).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotModifySuperAdmin);

        let err = authorize_admin_update(&full_sub(2), &target, &profile_update()).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotModifySuperAdmin);
    }

    #[test]
    fn test_sub_admin_cannot_self_elevate() {
        let target = record(2, AdminRole::SubAdmin);
        let actor = principal(2, AdminRole::SubAdmin, PermissionSet::new());
        assert!(authorize_admin_update(&actor, &target, &profile_update()).is_ok());
        let err = authorize_admin_update(&actor, &target, &elevate_update()).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_sub_admin_cannot_edit_peers() {
        let target = record(3, AdminRole::SubAdmin);
        let err = authorize_admin_update(&full_sub(2), &target, &profile_update()).unwrap_err();
        assert_eq!(err.code, ErrorCode::SuperAdminRequired);
        assert!(authorize_admin_update(&root(), &target, &elevate_update()).is_ok());
    }

    #[test]
    fn test_delete_rules() {
        let super_record = record(1, AdminRole::SuperAdmin);
        let sub_record = record(3, AdminRole::SubAdmin);

        let err = authorize_admin_delete(&root(), &super_record).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeleteSelf);

        let err = authorize_admin_delete(&full_sub(2), &super_record).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeleteSuperAdmin);

        let err = authorize_admin_delete(&full_sub(3), &sub_record).unwrap_err();
        assert_eq!(err.code, ErrorCode::CannotDeleteSelf);

        let err = authorize_admin_delete(&full_sub(2), &sub_record).unwrap_err();
        assert_eq!(err.code, ErrorCode::SuperAdminRequired);

        assert!(authorize_admin_delete(&root(), &sub_record).is_ok());
    }

    #[test]
    fn test_read_own_record_without_admins_read() {
        let actor = principal(4, AdminRole::SubAdmin, PermissionSet::new());
        assert!(authorize_admin_read(&actor, 4).is_ok());
        assert!(authorize_admin_read(&actor, 5).is_err());
    }
}
