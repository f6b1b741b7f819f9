//! Permission registry for the dashboard
//!
//! 返回模块/动作词表以及调用者可访问的模块，用于隐藏无权限的入口。
//! 服务端的 gate 仍是唯一可信的检查。

use axum::{Json, Router, routing::get};
use shared::models::{ModuleInfo, PermissionsInfo};
use shared::permission::{Module, accessible_modules, first_accessible_module};

use crate::auth::CurrentAdmin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/permissions", get(permissions))
}

async fn permissions(current: CurrentAdmin) -> Json<PermissionsInfo> {
    let registry = Module::ALL
        .into_iter()
        .map(|module| ModuleInfo {
            module,
            actions: module.actions().to_vec(),
            route: module.route().to_string(),
        })
        .collect();

    Json(PermissionsInfo {
        registry,
        accessible: accessible_modules(&current.principal),
        landing_route: first_accessible_module(&current.principal).map(|m| m.route().to_string()),
    })
}
