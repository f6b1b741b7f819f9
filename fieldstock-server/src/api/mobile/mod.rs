//! Mobile API (employee principal)
//!
//! 员工只能操作自己的账本：请求与销售的 `employee_id` 一律取自 token，
//! 请求体中的同名字段被忽略。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/mobile", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/auth/login", post(handler::login))
        .route("/auth/otp", post(handler::request_otp))
        .route("/auth/otp/verify", post(handler::verify_otp))
        .route("/me", get(handler::me))
        .route("/products", get(handler::products))
        .route(
            "/stock-requests",
            get(handler::list_stock_requests).post(handler::create_stock_request),
        )
        .route(
            "/money-requests",
            get(handler::list_money_requests).post(handler::create_money_request),
        )
        .route("/sales", get(handler::list_sales).post(handler::create_sale))
}
