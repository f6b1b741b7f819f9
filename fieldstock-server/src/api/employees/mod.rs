//! Employee API 模块
//!
//! 员工 CRUD + 直接分配/回收库存 (走账本)

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/toggle-status", post(handler::toggle_status))
        .route("/{id}/products", post(handler::assign_stock))
        .route(
            "/{id}/products/{product_id}",
            delete(handler::deassign_stock),
        )
}
