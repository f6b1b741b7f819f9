//! Employee Repository
//!
//! Holdings 与分配数量只读；修改走 [`crate::ledger`]。

use super::{RepoError, RepoResult};
use shared::models::{Employee, Holdings, ProductAllocation};
use sqlx::SqlitePool;

const EMPLOYEE_COLUMNS: &str = "id, name, phone, password_hash, is_active, holdings_cash, holdings_online, holdings_total, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub is_active: bool,
    pub holdings_cash: i64,
    pub holdings_online: i64,
    pub holdings_total: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl EmployeeRow {
    fn into_employee(self, products: Vec<ProductAllocation>) -> Employee {
        Employee {
            id: self.id,
            name: self.name,
            phone: self.phone,
            is_active: self.is_active,
            holdings: Holdings {
                cash: self.holdings_cash,
                online: self.holdings_online,
                total: self.holdings_total,
            },
            products,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AllocationRow {
    employee_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    assigned_at: i64,
}

impl From<AllocationRow> for ProductAllocation {
    fn from(row: AllocationRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            assigned_at: row.assigned_at,
        }
    }
}

/// Field changes (password already hashed)
#[derive(Default)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

pub async fn find_allocations(
    pool: &SqlitePool,
    employee_id: i64,
) -> RepoResult<Vec<ProductAllocation>> {
    let rows = sqlx::query_as::<_, AllocationRow>(
        "SELECT ep.employee_id, ep.product_id, p.name AS product_name, ep.quantity, ep.assigned_at FROM employee_product ep JOIN product p ON p.id = ep.product_id WHERE ep.employee_id = ? AND ep.quantity > 0 ORDER BY ep.assigned_at",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employee ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;

    let allocations = sqlx::query_as::<_, AllocationRow>(
        "SELECT ep.employee_id, ep.product_id, p.name AS product_name, ep.quantity, ep.assigned_at FROM employee_product ep JOIN product p ON p.id = ep.product_id WHERE ep.quantity > 0 ORDER BY ep.assigned_at",
    )
    .fetch_all(pool)
    .await?;

    let mut by_employee: std::collections::HashMap<i64, Vec<ProductAllocation>> =
        std::collections::HashMap::new();
    for row in allocations {
        by_employee.entry(row.employee_id).or_default().push(row.into());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let products = by_employee.remove(&row.id).unwrap_or_default();
            row.into_employee(products)
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Employee>> {
    let Some(row) = find_row_by_id(pool, id).await? else {
        return Ok(None);
    };
    let products = find_allocations(pool, id).await?;
    Ok(Some(row.into_employee(products)))
}

pub async fn find_row_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<EmployeeRow>> {
    let row = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Row with password hash, for mobile login
pub async fn find_row_by_phone(pool: &SqlitePool, phone: &str) -> RepoResult<Option<EmployeeRow>> {
    let row = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employee WHERE phone = ?"
    ))
    .bind(phone)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Row → model with allocations loaded
pub async fn hydrate(pool: &SqlitePool, row: EmployeeRow) -> RepoResult<Employee> {
    let products = find_allocations(pool, row.id).await?;
    Ok(row.into_employee(products))
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    phone: &str,
    password_hash: &str,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    // holdings 由列默认值初始化为 {0, 0, 0}
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO employee (name, phone, password_hash, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, 1, ?4, ?4) RETURNING id",
    )
    .bind(name)
    .bind(phone)
    .bind(password_hash)
    .bind(now)
    .fetch_one(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, changes: EmployeeChanges) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE employee SET name = COALESCE(?1, name), phone = COALESCE(?2, phone), password_hash = COALESCE(?3, password_hash), updated_at = ?4 WHERE id = ?5",
    )
    .bind(changes.name)
    .bind(changes.phone)
    .bind(changes.password_hash)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

/// Flip `is_active`, returning the new value
pub async fn toggle_status(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let active: Option<bool> = sqlx::query_scalar(
        "UPDATE employee SET is_active = NOT is_active, updated_at = ?1 WHERE id = ?2 RETURNING is_active",
    )
    .bind(now)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    active.ok_or_else(|| RepoError::NotFound(format!("Employee {id} not found")))
}

pub async fn set_password_by_phone(
    pool: &SqlitePool,
    phone: &str,
    password_hash: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE employee SET password_hash = ?1, updated_at = ?2 WHERE phone = ?3")
        .bind(password_hash)
        .bind(now)
        .bind(phone)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Hard delete. Refused while the employee still holds stock or money, or
/// while any request or sale still references them (deactivate instead).
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM employee WHERE id = ?1 AND holdings_total = 0 \
         AND NOT EXISTS (SELECT 1 FROM employee_product WHERE employee_id = ?1 AND quantity > 0) \
         AND NOT EXISTS (SELECT 1 FROM stock_request WHERE employee_id = ?1) \
         AND NOT EXISTS (SELECT 1 FROM money_request WHERE employee_id = ?1) \
         AND NOT EXISTS (SELECT 1 FROM sale WHERE employee_id = ?1)",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() > 0 {
        return Ok(true);
    }
    let Some(row) = find_row_by_id(pool, id).await? else {
        return Ok(false);
    };
    let has_allocations: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM employee_product WHERE employee_id = ? AND quantity > 0)",
    )
    .bind(id)
    .fetch_one(pool)
    .await?;
    if row.holdings_total > 0 || has_allocations {
        return Err(RepoError::Validation(
            "Employee still holds stock or money; settle before deleting".into(),
        ));
    }
    Err(RepoError::Validation(
        "Employee has request or sale history; deactivate instead".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::money_request;
    use crate::db::repository::test_support::memory_pool;

    #[tokio::test]
    async fn test_new_employee_has_zero_holdings() {
        let pool = memory_pool().await;
        let emp = create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        assert_eq!(emp.holdings, Holdings::default());
        assert!(emp.products.is_empty());
        assert!(emp.is_active);
    }

    #[tokio::test]
    async fn test_duplicate_phone() {
        let pool = memory_pool().await;
        create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        let err = create(&pool, "Other", "+15550001", "hash").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_toggle_status() {
        let pool = memory_pool().await;
        let emp = create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        assert!(!toggle_status(&pool, emp.id).await.unwrap());
        assert!(toggle_status(&pool, emp.id).await.unwrap());
        assert!(matches!(
            toggle_status(&pool, 999).await,
            Err(RepoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_refused_with_holdings() {
        let pool = memory_pool().await;
        let emp = create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        sqlx::query("UPDATE employee SET holdings_cash = 100, holdings_total = 100 WHERE id = ?")
            .bind(emp.id)
            .execute(&pool)
            .await
            .unwrap();
        assert!(matches!(delete(&pool, emp.id).await, Err(RepoError::Validation(_))));

        let other = create(&pool, "Mei", "+15550002", "hash").await.unwrap();
        assert!(delete(&pool, other.id).await.unwrap());
        assert!(!delete(&pool, other.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_refused_while_history_exists() {
        let pool = memory_pool().await;
        let emp = create(&pool, "Ravi", "+15550001", "hash").await.unwrap();
        let request = money_request::create(
            &pool,
            emp.id,
            500,
            shared::models::PaymentMethod::Cash,
            None,
        )
        .await
        .unwrap();

        let err = delete(&pool, emp.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(msg) if msg.contains("history")));
        assert!(money_request::find_by_id(&pool, request.id)
            .await
            .unwrap()
            .is_some());

        // 显式删除请求后才能删除员工
        assert!(money_request::delete(&pool, request.id).await.unwrap());
        assert!(delete(&pool, emp.id).await.unwrap());
    }
}
