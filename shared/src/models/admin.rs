//! Admin Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::permission::{AdminPrincipal, AdminRole, PermissionSet};

/// Admin account (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    /// Empty for super-admin (implicit full access, not stored)
    #[serde(default)]
    pub permissions: PermissionSet,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Admin {
    /// Principal used by the permission evaluator
    pub fn principal(&self) -> AdminPrincipal {
        AdminPrincipal {
            id: self.id,
            role: self.role,
            permissions: self.permissions.clone(),
        }
    }
}

/// Create sub-admin payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Absent = role default (`{dashboard: [read]}`).
    /// Raw JSON; parsed strictly by [`AdminCreate::permission_set`].
    pub permissions: Option<Value>,
}

impl AdminCreate {
    pub fn permission_set(&self) -> AppResult<Option<PermissionSet>> {
        parse_submitted(self.permissions.as_ref())
    }
}

/// Update admin payload
///
/// No `role` field: an admin is never promoted through update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub permissions: Option<Value>,
}

impl AdminUpdate {
    /// Touches fields outside the self-service profile (name/password)
    pub fn touches_privileged(&self) -> bool {
        self.email.is_some() || self.permissions.is_some()
    }

    pub fn permission_set(&self) -> AppResult<Option<PermissionSet>> {
        parse_submitted(self.permissions.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.permissions.is_none()
    }
}

/// 提交的权限必须全部合法；任何未知模块/动作都拒绝整个请求
fn parse_submitted(value: Option<&Value>) -> AppResult<Option<PermissionSet>> {
    let Some(value) = value else {
        return Ok(None);
    };
    PermissionSet::from_value_strict(value).map(Some).map_err(|rejected| {
        AppError::validation("Unknown permission entries")
            .with_detail("field", "permissions")
            .with_detail("rejected", rejected)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::permission::{Action, Module};
    use serde_json::json;

    #[test]
    fn test_update_privileged_fields() {
        let profile = AdminUpdate {
            name: Some("Ana".into()),
            password: Some("new-secret".into()),
            ..Default::default()
        };
        assert!(!profile.touches_privileged());

        let elevate = AdminUpdate {
            permissions: Some(json!({"products": ["read"]})),
            ..Default::default()
        };
        assert!(elevate.touches_privileged());
        assert!(AdminUpdate::default().is_empty());
    }

    #[test]
    fn test_update_ignores_role_field() {
        let update: AdminUpdate =
            serde_json::from_str(r#"{"name":"x","role":"super-admin"}"#).unwrap();
        assert!(!update.touches_privileged());
    }

    #[test]
    fn test_submitted_permissions_are_strict() {
        let create: AdminCreate = serde_json::from_value(json!({
            "name": "Ana",
            "email": "ana@example.com",
            "password": "secret-pass",
            "permissions": {"products": ["read", "teleport"], "warehouse": ["read"]}
        }))
        .unwrap();
        let err = create.permission_set().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        let details = err.details.unwrap();
        assert_eq!(
            details.get("rejected").unwrap(),
            &json!(["products:\"teleport\"", "warehouse"])
        );

        let update: AdminUpdate =
            serde_json::from_value(json!({"permissions": {"sales": ["read", "create"]}})).unwrap();
        let set = update.permission_set().unwrap().unwrap();
        assert!(set.contains(Module::Sales, Action::Create));

        assert!(AdminUpdate::default().permission_set().unwrap().is_none());
    }
}
