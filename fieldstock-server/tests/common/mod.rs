//! Shared fixtures for integration tests

#![allow(dead_code)]

use fieldstock_server::auth::password::hash_password;
use fieldstock_server::db::repository::{admin, employee, product};
use fieldstock_server::{Config, ServerState};
use shared::models::{Admin, Employee, Price, Product, ProductCreate};
use shared::{AdminRole, PermissionSet};
use tempfile::TempDir;

pub const PASSWORD: &str = "correct-horse-42";

/// State over a fresh WAL database in a temp dir (dir lives as long as the guard)
pub async fn setup() -> (TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::for_testing(dir.path().to_string_lossy());
    let state = ServerState::initialize(&config).await.unwrap();
    (dir, state)
}

pub async fn seed_admin(
    state: &ServerState,
    email: &str,
    role: AdminRole,
    permissions: PermissionSet,
) -> Admin {
    let password_hash = hash_password(PASSWORD).unwrap();
    admin::create(
        &state.pool,
        admin::NewAdmin {
            name: "Test Admin",
            email,
            password_hash: &password_hash,
            role,
            permissions: &permissions,
        },
    )
    .await
    .unwrap()
}

pub async fn seed_employee(state: &ServerState, phone: &str) -> Employee {
    let password_hash = hash_password(PASSWORD).unwrap();
    employee::create(&state.pool, "Field Rep", phone, &password_hash)
        .await
        .unwrap()
}

pub async fn seed_product(state: &ServerState, sku: &str, stock: i64) -> Product {
    product::create(
        &state.pool,
        ProductCreate {
            name: format!("Product {sku}"),
            sku: sku.to_string(),
            image_url: None,
            price: Price {
                base: 1_000,
                lowest_selling_price: 800,
            },
            stock_quantity: Some(stock),
        },
    )
    .await
    .unwrap()
}

pub async fn stock_of(state: &ServerState, product_id: i64) -> i64 {
    sqlx::query_scalar("SELECT stock_quantity FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_one(&state.pool)
        .await
        .unwrap()
}

pub async fn set_cash(state: &ServerState, employee_id: i64, cash: i64) {
    sqlx::query("UPDATE employee SET holdings_cash = ?1, holdings_total = ?1 + holdings_online WHERE id = ?2")
        .bind(cash)
        .bind(employee_id)
        .execute(&state.pool)
        .await
        .unwrap();
}
