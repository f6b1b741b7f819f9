use shared::models::{
    Holdings, PaymentMethod, Price, ProductCreate, RequestStatus, SaleItem,
};
use shared::permission::{Action, AdminPrincipal, AdminRole, Module, PermissionSet};
use shared::ErrorCode;
use sqlx::SqlitePool;

use super::service::*;
use crate::db::repository::test_support::memory_pool;
use crate::db::repository::{employee, product};

fn root() -> AdminPrincipal {
    AdminPrincipal {
        id: 1,
        role: AdminRole::SuperAdmin,
        permissions: PermissionSet::new(),
    }
}

fn sub_admin(permissions: PermissionSet) -> AdminPrincipal {
    AdminPrincipal {
        id: 2,
        role: AdminRole::SubAdmin,
        permissions,
    }
}

async fn seed_employee(pool: &SqlitePool) -> i64 {
    employee::create(pool, "Field Rep", "5550100", "hash")
        .await
        .unwrap()
        .id
}

async fn seed_product(pool: &SqlitePool, stock: i64) -> i64 {
    product::create(
        pool,
        ProductCreate {
            name: "Water Filter".into(),
            sku: "WF-01".into(),
            image_url: None,
            price: Price {
                base: 1000,
                lowest_selling_price: 800,
            },
            stock_quantity: Some(stock),
        },
    )
    .await
    .unwrap()
    .id
}

async fn set_holdings(pool: &SqlitePool, employee_id: i64, cash: i64, online: i64) {
    sqlx::query(
        "UPDATE employee SET holdings_cash = ?1, holdings_online = ?2, holdings_total = ?1 + ?2 WHERE id = ?3",
    )
    .bind(cash)
    .bind(online)
    .bind(employee_id)
    .execute(pool)
    .await
    .unwrap();
}

async fn holdings(pool: &SqlitePool, employee_id: i64) -> Holdings {
    employee::find_by_id(pool, employee_id)
        .await
        .unwrap()
        .unwrap()
        .holdings
}

async fn stock(pool: &SqlitePool, product_id: i64) -> i64 {
    product::find_by_id(pool, product_id)
        .await
        .unwrap()
        .unwrap()
        .stock_quantity
}

async fn allocation(pool: &SqlitePool, employee_id: i64, product_id: i64) -> Option<i64> {
    employee::find_by_id(pool, employee_id)
        .await
        .unwrap()
        .unwrap()
        .products
        .into_iter()
        .find(|p| p.product_id == product_id)
        .map(|p| p.quantity)
}

#[tokio::test]
async fn test_cash_request_drains_holdings() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    set_holdings(&pool, emp, 500, 0).await;

    let request = create_money_request(&pool, Origin::Employee(emp), 500, PaymentMethod::Cash, None)
        .await
        .unwrap();
    let approved = approve_money_request(&pool, &root(), request.id).await.unwrap();

    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.processed_by, Some(1));
    assert!(approved.processed_at.is_some());
    let h = holdings(&pool, emp).await;
    assert_eq!(h, Holdings::new(0, 0));
    assert!(h.is_balanced());
}

#[tokio::test]
async fn test_approval_guard_is_binding() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    set_holdings(&pool, emp, 200, 500).await;

    let request = create_money_request(
        &pool,
        Origin::Employee(emp),
        500,
        PaymentMethod::Online,
        Some("UPI-7781"),
    )
    .await
    .unwrap();
    // 创建后余额变化
    set_holdings(&pool, emp, 200, 300).await;

    let err = approve_money_request(&pool, &root(), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientHoldings);
    let details = err.details.unwrap();
    assert_eq!(details.get("available").unwrap(), 300);
    assert_eq!(details.get("shortfall").unwrap(), 200);

    assert_eq!(holdings(&pool, emp).await, Holdings::new(200, 300));
    let still = crate::db::repository::money_request::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, RequestStatus::Pending);
    assert_eq!(still.processed_at, None);
}

#[tokio::test]
async fn test_money_request_creation_checks() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;

    let err = create_money_request(&pool, Origin::Employee(emp), 100, PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientHoldings);

    set_holdings(&pool, emp, 100, 100).await;
    let err = create_money_request(&pool, Origin::Employee(emp), 100, PaymentMethod::Online, Some("  "))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ReferenceNumberRequired);

    let err = create_money_request(&pool, Origin::Employee(emp), 100, PaymentMethod::Cash, Some("R1"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidPaymentMethod);

    let err = create_money_request(&pool, Origin::Employee(emp), 0, PaymentMethod::Cash, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ValueOutOfRange);
}

#[tokio::test]
async fn test_stock_request_over_stock_leaves_stock_untouched() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;

    let request = create_stock_request(&pool, Origin::Employee(emp), prod, 15, Some("big order"))
        .await
        .unwrap();
    let err = approve_stock_request(&pool, &root(), request.id)
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(err.details.unwrap().get("shortfall").unwrap(), 5);
    assert_eq!(stock(&pool, prod).await, 10);
    assert_eq!(allocation(&pool, emp, prod).await, None);
    let still = crate::db::repository::stock_request::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, RequestStatus::Pending);
}

#[tokio::test]
async fn test_stock_approval_moves_stock_and_is_terminal() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;

    let first = create_stock_request(&pool, Origin::Employee(emp), prod, 4, Some("route A"))
        .await
        .unwrap();
    let second = create_stock_request(&pool, Origin::Employee(emp), prod, 3, Some("route B"))
        .await
        .unwrap();

    approve_stock_request(&pool, &root(), first.id).await.unwrap();
    approve_stock_request(&pool, &root(), second.id).await.unwrap();
    assert_eq!(stock(&pool, prod).await, 3);
    assert_eq!(allocation(&pool, emp, prod).await, Some(7));

    for err in [
        approve_stock_request(&pool, &root(), first.id).await.unwrap_err(),
        reject_stock_request(&pool, &root(), first.id, Some("late")).await.unwrap_err(),
    ] {
        assert_eq!(err.code, ErrorCode::RequestAlreadyProcessed);
    }
    assert_eq!(stock(&pool, prod).await, 3);
}

#[tokio::test]
async fn test_reject_requires_reason_and_changes_nothing() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    set_holdings(&pool, emp, 500, 0).await;
    let request = create_money_request(&pool, Origin::Employee(emp), 200, PaymentMethod::Cash, None)
        .await
        .unwrap();

    let err = reject_money_request(&pool, &root(), request.id, Some("   "))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RejectionReasonRequired);
    let still = crate::db::repository::money_request::find_by_id(&pool, request.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still.status, RequestStatus::Pending);

    let rejected = reject_money_request(&pool, &root(), request.id, Some(" wrong amount "))
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("wrong amount"));
    assert_eq!(holdings(&pool, emp).await, Holdings::new(500, 0));

    let err = approve_money_request(&pool, &root(), request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RequestAlreadyProcessed);
}

#[tokio::test]
async fn test_sale_consumes_allocation_and_credits_holdings() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;
    assign_stock(&pool, &root(), emp, prod, 3).await.unwrap();
    assert_eq!(stock(&pool, prod).await, 7);

    let items = [SaleItem {
        product_id: prod,
        quantity: 2,
        unit_price: 900,
    }];
    let sale = record_sale(&pool, Origin::Employee(emp), PaymentMethod::Cash, &items)
        .await
        .unwrap();
    assert_eq!(sale.total, 1800);
    assert_eq!(sale.items, items.to_vec());
    assert_eq!(allocation(&pool, emp, prod).await, Some(1));

    let last = [SaleItem {
        product_id: prod,
        quantity: 1,
        unit_price: 1000,
    }];
    record_sale(&pool, Origin::Employee(emp), PaymentMethod::Online, &last)
        .await
        .unwrap();

    // 分配归零后删除；中央库存不受销售影响
    assert_eq!(allocation(&pool, emp, prod).await, None);
    assert_eq!(stock(&pool, prod).await, 7);
    let h = holdings(&pool, emp).await;
    assert_eq!(h, Holdings::new(1800, 1000));
    assert!(h.is_balanced());
}

#[tokio::test]
async fn test_sale_short_allocation_rolls_back() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;
    assign_stock(&pool, &root(), emp, prod, 1).await.unwrap();

    let items = [SaleItem {
        product_id: prod,
        quantity: 2,
        unit_price: 900,
    }];
    let err = record_sale(&pool, Origin::Employee(emp), PaymentMethod::Cash, &items)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);

    assert_eq!(allocation(&pool, emp, prod).await, Some(1));
    assert_eq!(holdings(&pool, emp).await, Holdings::default());
    let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(sales, 0);
}

#[tokio::test]
async fn test_sale_below_minimum_price_is_refused() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;
    assign_stock(&pool, &root(), emp, prod, 2).await.unwrap();

    let items = [SaleItem {
        product_id: prod,
        quantity: 1,
        unit_price: 700,
    }];
    let err = record_sale(&pool, Origin::Employee(emp), PaymentMethod::Cash, &items)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SalePriceBelowMinimum);
    assert_eq!(allocation(&pool, emp, prod).await, Some(2));
}

#[tokio::test]
async fn test_deassign_with_and_without_restock() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;

    assign_stock(&pool, &root(), emp, prod, 4).await.unwrap();
    let updated = deassign_stock(&pool, &root(), emp, prod, true).await.unwrap();
    assert!(updated.products.is_empty());
    assert_eq!(stock(&pool, prod).await, 10);

    assign_stock(&pool, &root(), emp, prod, 4).await.unwrap();
    deassign_stock(&pool, &root(), emp, prod, false).await.unwrap();
    assert_eq!(stock(&pool, prod).await, 6);
    assert_eq!(allocation(&pool, emp, prod).await, None);

    let err = deassign_stock(&pool, &root(), emp, prod, true).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::AllocationNotFound);
}

#[tokio::test]
async fn test_assign_beyond_stock() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 2).await;

    let err = assign_stock(&pool, &root(), emp, prod, 3).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::InsufficientStock);
    assert_eq!(stock(&pool, prod).await, 2);
}

#[tokio::test]
async fn test_gates_apply_before_ledger() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;
    let request = create_stock_request(&pool, Origin::Employee(emp), prod, 1, Some("demo"))
        .await
        .unwrap();

    let reader = sub_admin(PermissionSet::new().with(Module::Requests, &[Action::Read]));
    let err = approve_stock_request(&pool, &reader, request.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    let err = assign_stock(&pool, &reader, emp, prod, 1).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    let err = record_sale(
        &pool,
        Origin::Admin {
            actor: &reader,
            employee_id: emp,
        },
        PaymentMethod::Cash,
        &[],
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionDenied);
    assert_eq!(stock(&pool, prod).await, 10);

    let approver = sub_admin(PermissionSet::new().with(Module::Requests, &[Action::Approve]));
    approve_stock_request(&pool, &approver, request.id)
        .await
        .unwrap();
    assert_eq!(stock(&pool, prod).await, 9);
}

#[tokio::test]
async fn test_inactive_product_cannot_be_requested() {
    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;
    product::toggle_status(&pool, prod).await.unwrap();

    let err = create_stock_request(&pool, Origin::Employee(emp), prod, 1, Some("need"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductInactive);

    let err = create_stock_request(&pool, Origin::Employee(emp), 999, 1, Some("need"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ProductNotFound);
}

#[tokio::test]
async fn test_request_history_survives_entity_delete() {
    use crate::db::repository::{RepoError, money_request, stock_request};

    let pool = memory_pool().await;
    let emp = seed_employee(&pool).await;
    let prod = seed_product(&pool, 10).await;

    let approved = create_stock_request(&pool, Origin::Employee(emp), prod, 4, Some("route A"))
        .await
        .unwrap();
    approve_stock_request(&pool, &root(), approved.id).await.unwrap();
    let pending = create_stock_request(&pool, Origin::Employee(emp), prod, 2, Some("route B"))
        .await
        .unwrap();
    deassign_stock(&pool, &root(), emp, prod, true).await.unwrap();
    assert_eq!(stock(&pool, prod).await, 10);

    // 无分配，但仍有请求历史
    let err = product::delete(&pool, prod).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    for id in [approved.id, pending.id] {
        assert!(stock_request::find_by_id(&pool, id).await.unwrap().is_some());
    }

    // 已审批的现金请求把余额清零后，员工仍不可删除
    set_holdings(&pool, emp, 500, 0).await;
    let cash = create_money_request(&pool, Origin::Employee(emp), 500, PaymentMethod::Cash, None)
        .await
        .unwrap();
    approve_money_request(&pool, &root(), cash.id).await.unwrap();
    assert_eq!(holdings(&pool, emp).await, Holdings::new(0, 0));

    let err = employee::delete(&pool, emp).await.unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    let kept = money_request::find_by_id(&pool, cash.id).await.unwrap().unwrap();
    assert_eq!(kept.status, RequestStatus::Approved);
}
