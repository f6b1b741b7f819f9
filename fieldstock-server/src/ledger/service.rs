//! Ledger operations
//!
//! gate → snapshot → decide → apply → reload

use shared::models::{
    Employee, MoneyRequest, PaymentMethod, Product, Sale, SaleItem, StockRequest,
};
use shared::permission::{Action, AdminPrincipal, Module};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;
use std::collections::HashMap;

use super::apply::apply;
use super::decide;
use super::plan::RequestKind;
use crate::auth::guard::authorize;
use crate::db::repository::{employee, money_request, product, sale, stock_request};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, require_reason, validate_positive};

/// Who is creating a request or recording a sale
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// Mobile: the authenticated employee, acting on their own ledger
    Employee(i64),
    /// Dashboard: an admin acting on behalf of an employee
    Admin {
        actor: &'a AdminPrincipal,
        employee_id: i64,
    },
}

impl Origin<'_> {
    pub fn employee_id(&self) -> i64 {
        match self {
            Origin::Employee(id) => *id,
            Origin::Admin { employee_id, .. } => *employee_id,
        }
    }

    /// Employees act on themselves; admins go through the gate
    fn authorize(&self, module: Module, action: Action) -> AppResult<()> {
        match self {
            Origin::Employee(_) => Ok(()),
            Origin::Admin { actor, .. } => authorize(actor, module, action),
        }
    }
}

async fn load_employee(pool: &SqlitePool, id: i64) -> AppResult<Employee> {
    employee::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).with_detail("employee_id", id))
}

async fn load_product(pool: &SqlitePool, id: i64) -> AppResult<Product> {
    product::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id))
}

async fn load_stock_request(pool: &SqlitePool, id: i64) -> AppResult<StockRequest> {
    stock_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound).with_detail("request_id", id))
}

async fn load_money_request(pool: &SqlitePool, id: i64) -> AppResult<MoneyRequest> {
    money_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::RequestNotFound).with_detail("request_id", id))
}

// ========== Stock requests ==========

pub async fn create_stock_request(
    pool: &SqlitePool,
    origin: Origin<'_>,
    product_id: i64,
    quantity: i64,
    reason: Option<&str>,
) -> AppResult<StockRequest> {
    origin.authorize(Module::Requests, Action::Create)?;
    validate_positive(quantity, "quantity")?;
    let reason = require_reason(reason, "reason")?;

    let employee = load_employee(pool, origin.employee_id()).await?;
    if !employee.is_active {
        return Err(AppError::new(ErrorCode::EmployeeInactive).with_detail("employee_id", employee.id));
    }
    let product = load_product(pool, product_id).await?;
    if !product.is_active {
        return Err(AppError::new(ErrorCode::ProductInactive).with_detail("product_id", product.id));
    }

    let request = stock_request::create(pool, employee.id, product.id, quantity, &reason).await?;
    tracing::info!(
        request_id = request.id,
        employee_id = employee.id,
        product_id = product.id,
        quantity,
        "Stock request created"
    );
    Ok(request)
}

pub async fn approve_stock_request(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    request_id: i64,
) -> AppResult<StockRequest> {
    authorize(actor, Module::Requests, Action::Approve)?;
    let request = load_stock_request(pool, request_id).await?;
    let plan = decide::stock_approval(&request, actor.id)?;

    if let Err(e) = apply(pool, &plan).await {
        tracing::warn!(request_id, admin_id = actor.id, error = %e, "Stock request approval failed");
        return Err(e.into());
    }
    tracing::info!(
        request_id,
        admin_id = actor.id,
        employee_id = request.employee_id,
        product_id = request.product_id,
        quantity = request.quantity,
        "Stock request approved"
    );
    load_stock_request(pool, request_id).await
}

pub async fn reject_stock_request(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    request_id: i64,
    reason: Option<&str>,
) -> AppResult<StockRequest> {
    authorize(actor, Module::Requests, Action::Reject)?;
    let request = load_stock_request(pool, request_id).await?;
    let plan = decide::rejection(RequestKind::Stock, request.id, request.status, reason, actor.id)?;
    apply(pool, &plan).await?;
    tracing::info!(request_id, admin_id = actor.id, "Stock request rejected");
    load_stock_request(pool, request_id).await
}

// ========== Money requests ==========

pub async fn create_money_request(
    pool: &SqlitePool,
    origin: Origin<'_>,
    amount: i64,
    method: PaymentMethod,
    reference_number: Option<&str>,
) -> AppResult<MoneyRequest> {
    origin.authorize(Module::Requests, Action::Create)?;
    validate_positive(amount, "amount")?;

    let reference_number = reference_number.map(str::trim).filter(|r| !r.is_empty());
    match (method, reference_number) {
        (PaymentMethod::Online, None) => {
            return Err(AppError::new(ErrorCode::ReferenceNumberRequired)
                .with_detail("field", "reference_number"));
        }
        (PaymentMethod::Cash, Some(_)) => {
            return Err(AppError::with_message(
                ErrorCode::InvalidPaymentMethod,
                "Cash requests do not take a reference number",
            )
            .with_detail("field", "reference_number"));
        }
        (_, Some(reference)) if reference.chars().count() > MAX_SHORT_TEXT_LEN => {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("reference_number is too long (max {MAX_SHORT_TEXT_LEN} characters)"),
            )
            .with_detail("field", "reference_number"));
        }
        _ => {}
    }

    let employee = load_employee(pool, origin.employee_id()).await?;
    // 提前拒绝明显不够的请求；审批时的守卫才是最终判定
    let available = employee.holdings.get(method);
    if available < amount {
        return Err(AppError::insufficient_holdings(available, amount));
    }

    let request = money_request::create(pool, employee.id, amount, method, reference_number).await?;
    tracing::info!(
        request_id = request.id,
        employee_id = employee.id,
        amount,
        method = method.as_str(),
        "Money request created"
    );
    Ok(request)
}

pub async fn approve_money_request(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    request_id: i64,
) -> AppResult<MoneyRequest> {
    authorize(actor, Module::Requests, Action::Approve)?;
    let request = load_money_request(pool, request_id).await?;
    let plan = decide::money_approval(&request, actor.id)?;

    if let Err(e) = apply(pool, &plan).await {
        tracing::warn!(request_id, admin_id = actor.id, error = %e, "Money request approval failed");
        return Err(e.into());
    }
    tracing::info!(
        request_id,
        admin_id = actor.id,
        employee_id = request.employee_id,
        amount = request.amount,
        method = request.method.as_str(),
        "Money request approved"
    );
    load_money_request(pool, request_id).await
}

pub async fn reject_money_request(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    request_id: i64,
    reason: Option<&str>,
) -> AppResult<MoneyRequest> {
    authorize(actor, Module::Requests, Action::Reject)?;
    let request = load_money_request(pool, request_id).await?;
    let plan = decide::rejection(RequestKind::Money, request.id, request.status, reason, actor.id)?;
    apply(pool, &plan).await?;
    tracing::info!(request_id, admin_id = actor.id, "Money request rejected");
    load_money_request(pool, request_id).await
}

// ========== Direct assignment ==========

pub async fn assign_stock(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    employee_id: i64,
    product_id: i64,
    quantity: i64,
) -> AppResult<Employee> {
    authorize(actor, Module::Employees, Action::AssignProducts)?;
    let employee = load_employee(pool, employee_id).await?;
    let product = load_product(pool, product_id).await?;
    let plan = decide::assignment(&employee, &product, quantity)?;
    apply(pool, &plan).await?;

    tracing::info!(admin_id = actor.id, employee_id, product_id, quantity, "Stock assigned");
    load_employee(pool, employee_id).await
}

pub async fn deassign_stock(
    pool: &SqlitePool,
    actor: &AdminPrincipal,
    employee_id: i64,
    product_id: i64,
    restock: bool,
) -> AppResult<Employee> {
    authorize(actor, Module::Employees, Action::AssignProducts)?;
    let employee = load_employee(pool, employee_id).await?;
    let plan = decide::deassignment(&employee, product_id, restock)?;
    let applied = apply(pool, &plan).await?;

    tracing::info!(
        admin_id = actor.id,
        employee_id,
        product_id,
        released = applied.released,
        restock,
        "Stock de-assigned"
    );
    load_employee(pool, employee_id).await
}

// ========== Sales ==========

pub async fn record_sale(
    pool: &SqlitePool,
    origin: Origin<'_>,
    method: PaymentMethod,
    items: &[SaleItem],
) -> AppResult<Sale> {
    origin.authorize(Module::Sales, Action::Create)?;
    let employee = load_employee(pool, origin.employee_id()).await?;

    let mut products = HashMap::new();
    for item in items {
        if !products.contains_key(&item.product_id) {
            if let Some(p) = product::find_by_id(pool, item.product_id).await? {
                products.insert(p.id, p);
            }
        }
    }

    let plan = decide::sale(&employee, method, items, &products)?;
    let applied = apply(pool, &plan).await?;
    let sale_id = applied
        .sale_id
        .ok_or_else(|| AppError::internal("Sale was not recorded"))?;

    let sale = sale::find_by_id(pool, sale_id)
        .await?
        .ok_or_else(|| AppError::internal("Sale was not recorded"))?;
    tracing::info!(
        sale_id,
        employee_id = employee.id,
        total = sale.total,
        method = method.as_str(),
        "Sale recorded"
    );
    Ok(sale)
}
