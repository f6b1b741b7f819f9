//! Static permission tables: modules, actions, vocabulary, role defaults

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::PermissionSet;

/// Name that does not match any registry entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {name}")]
pub struct UnknownName {
    pub kind: &'static str,
    pub name: String,
}

/// Functional area permissions are scoped to
///
/// Declaration order is the sidebar order and drives
/// [`first_accessible_module`](super::first_accessible_module).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Module {
    Dashboard,
    Products,
    Employees,
    Customers,
    ProductRequests,
    Sales,
    Invoices,
    Requests,
    Admins,
}

/// Action vocabulary: CRUD plus module-specific special actions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    ToggleStatus,
    AssignProducts,
    Approve,
    Reject,
    OrgSettings,
}

use Action::*;

const CRUD: &[Action] = &[Create, Read, Update, Delete];

impl Module {
    /// All modules in registry order
    pub const ALL: [Module; 9] = [
        Module::Dashboard,
        Module::Products,
        Module::Employees,
        Module::Customers,
        Module::ProductRequests,
        Module::Sales,
        Module::Invoices,
        Module::Requests,
        Module::Admins,
    ];

    /// Wire name (matches the stored permission map keys)
    pub const fn as_str(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Products => "products",
            Module::Employees => "employees",
            Module::Customers => "customers",
            Module::ProductRequests => "productRequests",
            Module::Sales => "sales",
            Module::Invoices => "invoices",
            Module::Requests => "requests",
            Module::Admins => "admins",
        }
    }

    /// Declared action vocabulary of this module
    pub const fn actions(&self) -> &'static [Action] {
        match self {
            Module::Dashboard => &[Read],
            Module::Products => &[Create, Read, Update, Delete, ToggleStatus],
            Module::Employees => &[Create, Read, Update, Delete, ToggleStatus, AssignProducts],
            Module::Customers => &[Create, Read, Update, Delete, ToggleStatus],
            Module::ProductRequests => &[Read, Update, Delete, Approve, Reject],
            Module::Sales => CRUD,
            Module::Invoices => CRUD,
            Module::Requests => &[Create, Read, Update, Delete, Approve, Reject],
            Module::Admins => &[Create, Read, Update, Delete, OrgSettings],
        }
    }

    /// Whether `action` belongs to this module's vocabulary
    pub fn allows(&self, action: Action) -> bool {
        self.actions().contains(&action)
    }

    /// Dashboard route used for first-accessible-route redirection
    pub const fn route(&self) -> &'static str {
        match self {
            Module::Dashboard => "/dashboard",
            Module::Products => "/products",
            Module::Employees => "/employees",
            Module::Customers => "/customers",
            Module::ProductRequests => "/product-requests",
            Module::Sales => "/sales",
            Module::Invoices => "/invoices",
            Module::Requests => "/requests",
            Module::Admins => "/admins",
        }
    }
}

impl Action {
    /// Wire name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Create => "create",
            Read => "read",
            Update => "update",
            Delete => "delete",
            ToggleStatus => "toggleStatus",
            AssignProducts => "assignProducts",
            Approve => "approve",
            Reject => "reject",
            OrgSettings => "orgSettings",
        }
    }
}

impl FromStr for Module {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "module",
                name: s.to_string(),
            })
    }
}

impl FromStr for Action {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const ALL: [Action; 9] = [
            Create,
            Read,
            Update,
            Delete,
            ToggleStatus,
            AssignProducts,
            Approve,
            Reject,
            OrgSettings,
        ];
        ALL.into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownName {
                kind: "action",
                name: s.to_string(),
            })
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdminRole {
    SuperAdmin,
    SubAdmin,
}

impl AdminRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            AdminRole::SuperAdmin => "super-admin",
            AdminRole::SubAdmin => "sub-admin",
        }
    }
}

impl FromStr for AdminRole {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(AdminRole::SuperAdmin),
            "sub-admin" => Ok(AdminRole::SubAdmin),
            other => Err(UnknownName {
                kind: "role",
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role defaults used when an admin is created without explicit permissions.
///
/// The super-admin entry is the full set (seeding/display only; evaluation
/// never consults it).
pub fn default_permissions(role: AdminRole) -> PermissionSet {
    match role {
        AdminRole::SuperAdmin => PermissionSet::full(),
        AdminRole::SubAdmin => PermissionSet::new().with(Module::Dashboard, &[Read]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_names_round_trip() {
        for module in Module::ALL {
            assert_eq!(module.as_str().parse::<Module>().unwrap(), module);
        }
        assert!("orders".parse::<Module>().is_err());
    }

    #[test]
    fn test_every_module_has_read() {
        for module in Module::ALL {
            assert!(module.allows(Action::Read), "{module} must be readable");
        }
    }

    #[test]
    fn test_special_actions_scoped_to_their_modules() {
        assert!(Module::Employees.allows(Action::AssignProducts));
        assert!(!Module::Products.allows(Action::AssignProducts));
        assert!(Module::Requests.allows(Action::Approve));
        assert!(!Module::Sales.allows(Action::Approve));
        assert!(Module::Admins.allows(Action::OrgSettings));
        assert!(!Module::Dashboard.allows(Action::Delete));
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::ToggleStatus.as_str(), "toggleStatus");
        assert_eq!("assignProducts".parse::<Action>().unwrap(), Action::AssignProducts);
        let err = "launchMissiles".parse::<Action>().unwrap_err();
        assert_eq!(err.kind, "action");
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&AdminRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"super-admin\"");
        let role: AdminRole = serde_json::from_str("\"sub-admin\"").unwrap();
        assert_eq!(role, AdminRole::SubAdmin);
    }

    #[test]
    fn test_sub_admin_default_is_dashboard_read() {
        let set = default_permissions(AdminRole::SubAdmin);
        assert!(set.contains(Module::Dashboard, Action::Read));
        assert_eq!(set.modules().count(), 1);
    }
}
