//! Pure permission decisions

use serde::{Deserialize, Serialize};

use super::{Action, AdminRole, Module, PermissionSet};

/// Authenticated admin as seen by the evaluator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub id: i64,
    pub role: AdminRole,
    /// Absent in stored data = no grants
    #[serde(default)]
    pub permissions: PermissionSet,
}

impl AdminPrincipal {
    pub fn is_super_admin(&self) -> bool {
        self.role == AdminRole::SuperAdmin
    }

    pub fn can(&self, module: Module, action: Action) -> bool {
        can(self, module, action)
    }
}

/// Core check. super-admin 短路返回 true；sub-admin 查表。
pub fn can(principal: &AdminPrincipal, module: Module, action: Action) -> bool {
    match principal.role {
        AdminRole::SuperAdmin => true,
        AdminRole::SubAdmin => principal.permissions.contains(module, action),
    }
}

/// True if any of `actions` is allowed on `module`
pub fn can_any(principal: &AdminPrincipal, module: Module, actions: &[Action]) -> bool {
    actions.iter().any(|&a| can(principal, module, a))
}

/// Module visibility (sidebar/route): `read` on the module
pub fn can_access_module(principal: &AdminPrincipal, module: Module) -> bool {
    can(principal, module, Action::Read)
}

pub fn accessible_modules(principal: &AdminPrincipal) -> Vec<Module> {
    Module::ALL
        .into_iter()
        .filter(|&m| can_access_module(principal, m))
        .collect()
}

/// First module in registry order the principal may read
pub fn first_accessible_module(principal: &AdminPrincipal) -> Option<Module> {
    Module::ALL
        .into_iter()
        .find(|&m| can_access_module(principal, m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALL_ACTIONS: [Action; 9] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::ToggleStatus,
        Action::AssignProducts,
        Action::Approve,
        Action::Reject,
        Action::OrgSettings,
    ];

    fn sub_admin(permissions: PermissionSet) -> AdminPrincipal {
        AdminPrincipal {
            id: 2,
            role: AdminRole::SubAdmin,
            permissions,
        }
    }

    #[test]
    fn test_super_admin_can_everything() {
        let root = AdminPrincipal {
            id: 1,
            role: AdminRole::SuperAdmin,
            permissions: PermissionSet::new(),
        };
        for module in Module::ALL {
            for action in ALL_ACTIONS {
                assert!(can(&root, module, action));
            }
        }
        assert_eq!(accessible_modules(&root), Module::ALL.to_vec());
    }

    #[test]
    fn test_sub_admin_exactly_granted_pairs() {
        let perms = PermissionSet::new()
            .with(Module::Employees, &[Action::Read, Action::AssignProducts])
            .with(Module::Requests, &[Action::Approve]);
        let admin = sub_admin(perms.clone());
        for module in Module::ALL {
            for action in ALL_ACTIONS {
                assert_eq!(
                    can(&admin, module, action),
                    perms.contains(module, action),
                    "{module}:{action}"
                );
            }
        }
    }

    #[test]
    fn test_products_read_only_scenario() {
        let admin = sub_admin(PermissionSet::new().with(Module::Products, &[Action::Read]));
        assert!(can(&admin, Module::Products, Action::Read));
        assert!(!can(&admin, Module::Products, Action::Update));
        assert!(!can(&admin, Module::Employees, Action::Read));
        assert!(can_any(
            &admin,
            Module::Products,
            &[Action::Update, Action::Read]
        ));
        assert!(!can_any(&admin, Module::Products, &[]));
        assert_eq!(first_accessible_module(&admin), Some(Module::Products));
    }

    #[test]
    fn test_no_grants_means_no_access() {
        let admin = sub_admin(PermissionSet::new());
        assert!(accessible_modules(&admin).is_empty());
        assert_eq!(first_accessible_module(&admin), None);
    }

    #[test]
    fn test_first_accessible_follows_registry_order() {
        let admin = sub_admin(
            PermissionSet::new()
                .with(Module::Admins, &[Action::Read])
                .with(Module::Sales, &[Action::Read]),
        );
        assert_eq!(first_accessible_module(&admin), Some(Module::Sales));
    }

    #[test]
    fn test_principal_without_permissions_field() {
        let admin: AdminPrincipal =
            serde_json::from_value(json!({"id": 9, "role": "sub-admin"})).unwrap();
        assert!(admin.permissions.is_empty());
        assert!(!admin.can(Module::Dashboard, Action::Read));
    }

    #[test]
    fn test_stored_unknown_action_is_ignored() {
        let admin: AdminPrincipal = serde_json::from_value(json!({
            "id": 3,
            "role": "sub-admin",
            "permissions": {"products": ["read", "teleport"]}
        }))
        .unwrap();
        assert!(admin.can(Module::Products, Action::Read));
        assert_eq!(admin.permissions.actions(Module::Products).count(), 1);
    }
}
