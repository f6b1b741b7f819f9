//! Permission registry and evaluator
//!
//! Module-scoped RBAC for admin principals:
//! - [`Module`] / [`Action`] - the fixed registry (9 modules, per-module vocabulary)
//! - [`PermissionSet`] - enum-keyed grant matrix; out-of-vocabulary grants cannot be represented
//! - [`can`] / [`can_any`] / [`can_access_module`] - pure decision functions
//!
//! ## 设计原则
//! - super-admin 隐式拥有全部权限，不查表
//! - sub-admin 仅拥有显式授予的 (module, action)
//! - 缺失的权限对象 = 无权限 (deny-by-default)，从不报错
//!
//! The evaluator is pure and lives in `shared` so the dashboard can hide
//! affordances with the same rules the server enforces. Only the server-side
//! check is trusted.

mod evaluator;
mod registry;
mod set;

pub use evaluator::{
    AdminPrincipal, accessible_modules, can, can_access_module, can_any,
    first_accessible_module,
};
pub use registry::{Action, AdminRole, Module, UnknownName, default_permissions};
pub use set::PermissionSet;
