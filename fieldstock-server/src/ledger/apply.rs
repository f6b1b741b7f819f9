//! Transactional plan executor
//!
//! 一个 plan = 一个事务。任一守卫失败即返回错误，`tx` 被 drop 时自动回滚，
//! 之前已执行的 effect (包括状态认领) 一并撤销。

use shared::models::PaymentMethod;
use sqlx::{SqliteConnection, SqlitePool};

use super::LedgerError;
use super::plan::{LedgerEffect, LedgerPlan, RequestKind, Settlement};

/// Values produced while applying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedPlan {
    /// Id of the sale row written by `RecordSale`
    pub sale_id: Option<i64>,
    /// Quantity released by `RemoveAllocation`
    pub released: Option<i64>,
}

/// Apply every effect in order inside one transaction
pub async fn apply(pool: &SqlitePool, plan: &LedgerPlan) -> Result<AppliedPlan, LedgerError> {
    let mut tx = pool.begin().await?;
    let now = shared::util::now_millis();
    let mut applied = AppliedPlan::default();

    for effect in &plan.effects {
        apply_effect(&mut tx, effect, now, &mut applied).await?;
    }

    tx.commit().await?;
    Ok(applied)
}

async fn apply_effect(
    conn: &mut SqliteConnection,
    effect: &LedgerEffect,
    now: i64,
    applied: &mut AppliedPlan,
) -> Result<(), LedgerError> {
    match effect {
        LedgerEffect::SettleRequest {
            kind,
            request_id,
            settlement,
            processed_by,
        } => settle_request(conn, *kind, *request_id, settlement, *processed_by, now).await,
        LedgerEffect::DebitHoldings {
            employee_id,
            method,
            amount,
        } => debit_holdings(conn, *employee_id, *method, *amount, now).await,
        LedgerEffect::CreditHoldings {
            employee_id,
            method,
            amount,
        } => credit_holdings(conn, *employee_id, *method, *amount, now).await,
        LedgerEffect::DeductStock {
            product_id,
            quantity,
        } => deduct_stock(conn, *product_id, *quantity, now).await,
        LedgerEffect::AllocateStock {
            employee_id,
            product_id,
            quantity,
        } => allocate_stock(conn, *employee_id, *product_id, *quantity, now).await,
        LedgerEffect::ConsumeAllocation {
            employee_id,
            product_id,
            quantity,
        } => consume_allocation(conn, *employee_id, *product_id, *quantity).await,
        LedgerEffect::RemoveAllocation {
            employee_id,
            product_id,
            restock,
        } => {
            let released = remove_allocation(conn, *employee_id, *product_id, *restock, now).await?;
            applied.released = Some(released);
            Ok(())
        }
        LedgerEffect::RecordSale {
            employee_id,
            method,
            items,
            total,
        } => {
            let sale_id: i64 = sqlx::query_scalar(
                "INSERT INTO sale (employee_id, method, total, created_at) VALUES (?1, ?2, ?3, ?4) RETURNING id",
            )
            .bind(*employee_id)
            .bind(method.as_str())
            .bind(*total)
            .bind(now)
            .fetch_one(&mut *conn)
            .await?;

            for item in items {
                sqlx::query(
                    "INSERT INTO sale_item (sale_id, product_id, quantity, unit_price) VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(sale_id)
                .bind(item.product_id)
                .bind(item.quantity)
                .bind(item.unit_price)
                .execute(&mut *conn)
                .await?;
            }
            applied.sale_id = Some(sale_id);
            Ok(())
        }
    }
}

/// Pending → terminal; zero rows means missing or already processed
async fn settle_request(
    conn: &mut SqliteConnection,
    kind: RequestKind,
    request_id: i64,
    settlement: &Settlement,
    processed_by: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let rejection_reason = match settlement {
        Settlement::Approved => None,
        Settlement::Rejected { reason } => Some(reason.as_str()),
    };
    let table = kind.table();

    let result = sqlx::query(&format!(
        "UPDATE {table} SET status = ?1, rejection_reason = ?2, processed_at = ?3, processed_by = ?4 WHERE id = ?5 AND status = 'Pending'"
    ))
    .bind(settlement.status().as_str())
    .bind(rejection_reason)
    .bind(now)
    .bind(processed_by)
    .bind(request_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let exists: Option<String> = sqlx::query_scalar(&format!("SELECT status FROM {table} WHERE id = ?"))
        .bind(request_id)
        .fetch_optional(&mut *conn)
        .await?;
    match exists {
        Some(_) => Err(LedgerError::AlreadyProcessed(request_id)),
        None => Err(LedgerError::RequestNotFound(request_id)),
    }
}

async fn holdings_of(
    conn: &mut SqliteConnection,
    employee_id: i64,
    method: PaymentMethod,
) -> Result<Option<i64>, LedgerError> {
    let column = method.holdings_column();
    let available = sqlx::query_scalar(&format!("SELECT {column} FROM employee WHERE id = ?"))
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(available)
}

async fn debit_holdings(
    conn: &mut SqliteConnection,
    employee_id: i64,
    method: PaymentMethod,
    amount: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let column = method.holdings_column();
    let result = sqlx::query(&format!(
        "UPDATE employee SET {column} = {column} - ?1, holdings_total = holdings_total - ?1, updated_at = ?2 WHERE id = ?3 AND {column} >= ?1"
    ))
    .bind(amount)
    .bind(now)
    .bind(employee_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }
    match holdings_of(conn, employee_id, method).await? {
        Some(available) => Err(LedgerError::InsufficientHoldings {
            available,
            requested: amount,
        }),
        None => Err(LedgerError::EmployeeNotFound(employee_id)),
    }
}

async fn credit_holdings(
    conn: &mut SqliteConnection,
    employee_id: i64,
    method: PaymentMethod,
    amount: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let column = method.holdings_column();
    let result = sqlx::query(&format!(
        "UPDATE employee SET {column} = {column} + ?1, holdings_total = holdings_total + ?1, updated_at = ?2 WHERE id = ?3"
    ))
    .bind(amount)
    .bind(now)
    .bind(employee_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(LedgerError::EmployeeNotFound(employee_id));
    }
    Ok(())
}

async fn deduct_stock(
    conn: &mut SqliteConnection,
    product_id: i64,
    quantity: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE product SET stock_quantity = stock_quantity - ?1, updated_at = ?2 WHERE id = ?3 AND stock_quantity >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 1 {
        return Ok(());
    }

    let available: Option<i64> = sqlx::query_scalar("SELECT stock_quantity FROM product WHERE id = ?")
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
    match available {
        Some(available) => Err(LedgerError::InsufficientStock {
            available,
            requested: quantity,
        }),
        None => Err(LedgerError::ProductNotFound(product_id)),
    }
}

/// Upsert; an existing allocation keeps its original `assigned_at`
async fn allocate_stock(
    conn: &mut SqliteConnection,
    employee_id: i64,
    product_id: i64,
    quantity: i64,
    now: i64,
) -> Result<(), LedgerError> {
    let employee_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM employee WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(&mut *conn)
        .await?;
    if employee_exists.is_none() {
        return Err(LedgerError::EmployeeNotFound(employee_id));
    }

    sqlx::query(
        "INSERT INTO employee_product (employee_id, product_id, quantity, assigned_at) VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT(employee_id, product_id) DO UPDATE SET quantity = quantity + excluded.quantity",
    )
    .bind(employee_id)
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn consume_allocation(
    conn: &mut SqliteConnection,
    employee_id: i64,
    product_id: i64,
    quantity: i64,
) -> Result<(), LedgerError> {
    let result = sqlx::query(
        "UPDATE employee_product SET quantity = quantity - ?1 WHERE employee_id = ?2 AND product_id = ?3 AND quantity >= ?1",
    )
    .bind(quantity)
    .bind(employee_id)
    .bind(product_id)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        let available: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM employee_product WHERE employee_id = ? AND product_id = ?",
        )
        .bind(employee_id)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;
        return Err(LedgerError::InsufficientStock {
            available: available.unwrap_or(0),
            requested: quantity,
        });
    }

    sqlx::query("DELETE FROM employee_product WHERE employee_id = ? AND product_id = ? AND quantity = 0")
        .bind(employee_id)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn remove_allocation(
    conn: &mut SqliteConnection,
    employee_id: i64,
    product_id: i64,
    restock: bool,
    now: i64,
) -> Result<i64, LedgerError> {
    let released: Option<i64> = sqlx::query_scalar(
        "DELETE FROM employee_product WHERE employee_id = ? AND product_id = ? RETURNING quantity",
    )
    .bind(employee_id)
    .bind(product_id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(released) = released else {
        return Err(LedgerError::AllocationNotFound {
            employee_id,
            product_id,
        });
    };

    if restock {
        let result = sqlx::query(
            "UPDATE product SET stock_quantity = stock_quantity + ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(released)
        .bind(now)
        .bind(product_id)
        .execute(&mut *conn)
        .await?;
        if result.rows_affected() == 0 {
            return Err(LedgerError::ProductNotFound(product_id));
        }
    }
    Ok(released)
}
