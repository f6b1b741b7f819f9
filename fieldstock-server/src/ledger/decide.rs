//! Pure ledger decisions
//!
//! 输入是读取到的快照，输出是 [`LedgerPlan`]。这里不访问数据库；
//! 快照过期由 apply 阶段的条件更新兜底。

use shared::models::{
    Employee, MoneyRequest, PaymentMethod, Product, RequestStatus, SaleItem, StockRequest,
    sale_total,
};
use shared::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

use super::plan::{LedgerEffect, LedgerPlan, RequestKind, Settlement};
use crate::utils::validation::{require_reason, validate_positive};

fn ensure_pending(status: RequestStatus, request_id: i64) -> AppResult<()> {
    if status.is_terminal() {
        return Err(AppError::already_processed(request_id));
    }
    Ok(())
}

fn ensure_employee_active(employee: &Employee) -> AppResult<()> {
    if !employee.is_active {
        return Err(AppError::new(ErrorCode::EmployeeInactive).with_detail("employee_id", employee.id));
    }
    Ok(())
}

fn ensure_product_active(product: &Product) -> AppResult<()> {
    if !product.is_active {
        return Err(AppError::new(ErrorCode::ProductInactive).with_detail("product_id", product.id));
    }
    Ok(())
}

/// Pending stock request → Approved: central stock moves to the employee
pub fn stock_approval(request: &StockRequest, processed_by: i64) -> AppResult<LedgerPlan> {
    ensure_pending(request.status, request.id)?;
    Ok(LedgerPlan::new()
        .then(LedgerEffect::SettleRequest {
            kind: RequestKind::Stock,
            request_id: request.id,
            settlement: Settlement::Approved,
            processed_by,
        })
        .then(LedgerEffect::DeductStock {
            product_id: request.product_id,
            quantity: request.quantity,
        })
        .then(LedgerEffect::AllocateStock {
            employee_id: request.employee_id,
            product_id: request.product_id,
            quantity: request.quantity,
        }))
}

/// Pending money request → Approved: holdings[method] handed over
pub fn money_approval(request: &MoneyRequest, processed_by: i64) -> AppResult<LedgerPlan> {
    ensure_pending(request.status, request.id)?;
    Ok(LedgerPlan::new()
        .then(LedgerEffect::SettleRequest {
            kind: RequestKind::Money,
            request_id: request.id,
            settlement: Settlement::Approved,
            processed_by,
        })
        .then(LedgerEffect::DebitHoldings {
            employee_id: request.employee_id,
            method: request.method,
            amount: request.amount,
        }))
}

/// Pending → Rejected. A non-blank reason is mandatory; no counters move.
pub fn rejection(
    kind: RequestKind,
    request_id: i64,
    status: RequestStatus,
    reason: Option<&str>,
    processed_by: i64,
) -> AppResult<LedgerPlan> {
    let reason = require_reason(reason, "reason").map_err(|e| match e.code {
        ErrorCode::RequiredField => {
            AppError::new(ErrorCode::RejectionReasonRequired).with_detail("field", "reason")
        }
        _ => e,
    })?;
    ensure_pending(status, request_id)?;

    Ok(LedgerPlan::new().then(LedgerEffect::SettleRequest {
        kind,
        request_id,
        settlement: Settlement::Rejected { reason },
        processed_by,
    }))
}

/// Direct admin assignment: same movement as a stock approval, without a request
pub fn assignment(employee: &Employee, product: &Product, quantity: i64) -> AppResult<LedgerPlan> {
    validate_positive(quantity, "quantity")?;
    ensure_employee_active(employee)?;
    ensure_product_active(product)?;
    Ok(LedgerPlan::new()
        .then(LedgerEffect::DeductStock {
            product_id: product.id,
            quantity,
        })
        .then(LedgerEffect::AllocateStock {
            employee_id: employee.id,
            product_id: product.id,
            quantity,
        }))
}

/// Remove an allocation, optionally restocking it
pub fn deassignment(employee: &Employee, product_id: i64, restock: bool) -> AppResult<LedgerPlan> {
    if !employee.products.iter().any(|p| p.product_id == product_id) {
        return Err(AppError::new(ErrorCode::AllocationNotFound)
            .with_detail("employee_id", employee.id)
            .with_detail("product_id", product_id));
    }
    Ok(LedgerPlan::new().then(LedgerEffect::RemoveAllocation {
        employee_id: employee.id,
        product_id,
        restock,
    }))
}

/// Field sale: allocations consumed, holdings[method] credited with the total
pub fn sale(
    employee: &Employee,
    method: PaymentMethod,
    items: &[SaleItem],
    products: &HashMap<i64, Product>,
) -> AppResult<LedgerPlan> {
    ensure_employee_active(employee)?;
    if items.is_empty() {
        return Err(AppError::with_message(ErrorCode::RequiredField, "A sale needs at least one item")
            .with_detail("field", "items"));
    }

    let mut plan = LedgerPlan::new();
    for item in items {
        validate_positive(item.quantity, "quantity")?;
        let product = products.get(&item.product_id).ok_or_else(|| {
            AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", item.product_id)
        })?;
        if item.unit_price < product.price.lowest_selling_price {
            return Err(AppError::new(ErrorCode::SalePriceBelowMinimum)
                .with_detail("product_id", product.id)
                .with_detail("unit_price", item.unit_price)
                .with_detail("lowest_selling_price", product.price.lowest_selling_price));
        }
        plan = plan.then(LedgerEffect::ConsumeAllocation {
            employee_id: employee.id,
            product_id: item.product_id,
            quantity: item.quantity,
        });
    }

    let total = sale_total(items).ok_or_else(|| {
        AppError::with_message(ErrorCode::ValueOutOfRange, "Sale total is out of range")
            .with_detail("field", "items")
    })?;

    Ok(plan
        .then(LedgerEffect::CreditHoldings {
            employee_id: employee.id,
            method,
            amount: total,
        })
        .then(LedgerEffect::RecordSale {
            employee_id: employee.id,
            method,
            items: items.to_vec(),
            total,
        }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Holdings, Price, ProductAllocation};

    fn employee(active: bool, products: Vec<ProductAllocation>) -> Employee {
        Employee {
            id: 7,
            name: "Field Rep".into(),
            phone: "5550001".into(),
            is_active: active,
            holdings: Holdings::default(),
            products,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn product(id: i64, base: i64, lowest: i64) -> Product {
        Product {
            id,
            name: format!("P{id}"),
            sku: format!("SKU-{id}"),
            image_url: None,
            price: Price {
                base,
                lowest_selling_price: lowest,
            },
            stock_quantity: 10,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn stock_request(status: RequestStatus) -> StockRequest {
        StockRequest {
            id: 3,
            employee_id: 7,
            product_id: 1,
            quantity: 5,
            reason: "restock".into(),
            status,
            rejection_reason: None,
            processed_at: None,
            processed_by: None,
            created_at: 0,
        }
    }

    #[test]
    fn test_stock_approval_claims_first() {
        let plan = stock_approval(&stock_request(RequestStatus::Pending), 1).unwrap();
        assert!(matches!(
            plan.effects[0],
            LedgerEffect::SettleRequest {
                kind: RequestKind::Stock,
                settlement: Settlement::Approved,
                ..
            }
        ));
        assert_eq!(
            plan.effects[1],
            LedgerEffect::DeductStock {
                product_id: 1,
                quantity: 5
            }
        );
        assert_eq!(plan.effects.len(), 3);
    }

    #[test]
    fn test_terminal_request_is_already_processed() {
        for status in [RequestStatus::Approved, RequestStatus::Rejected] {
            let err = stock_approval(&stock_request(status), 1).unwrap_err();
            assert_eq!(err.code, ErrorCode::RequestAlreadyProcessed);
        }
    }

    #[test]
    fn test_rejection_requires_reason() {
        for reason in [None, Some(""), Some("   ")] {
            let err = rejection(RequestKind::Money, 1, RequestStatus::Pending, reason, 1).unwrap_err();
            assert_eq!(err.code, ErrorCode::RejectionReasonRequired);
        }
        let plan = rejection(RequestKind::Money, 1, RequestStatus::Pending, Some(" wrong amount "), 1)
            .unwrap();
        assert_eq!(
            plan.effects,
            vec![LedgerEffect::SettleRequest {
                kind: RequestKind::Money,
                request_id: 1,
                settlement: Settlement::Rejected {
                    reason: "wrong amount".into()
                },
                processed_by: 1,
            }]
        );
    }

    #[test]
    fn test_sale_below_minimum_price() {
        let products = HashMap::from([(1, product(1, 1000, 800))]);
        let items = [SaleItem {
            product_id: 1,
            quantity: 1,
            unit_price: 799,
        }];
        let err = sale(&employee(true, vec![]), PaymentMethod::Cash, &items, &products).unwrap_err();
        assert_eq!(err.code, ErrorCode::SalePriceBelowMinimum);
    }

    #[test]
    fn test_sale_plan_credits_total() {
        let products = HashMap::from([(1, product(1, 1000, 800)), (2, product(2, 500, 500))]);
        let items = [
            SaleItem {
                product_id: 1,
                quantity: 2,
                unit_price: 900,
            },
            SaleItem {
                product_id: 2,
                quantity: 1,
                unit_price: 500,
            },
        ];
        let plan = sale(&employee(true, vec![]), PaymentMethod::Online, &items, &products).unwrap();
        assert!(plan.effects.contains(&LedgerEffect::CreditHoldings {
            employee_id: 7,
            method: PaymentMethod::Online,
            amount: 2300,
        }));
        assert!(matches!(
            plan.effects.last(),
            Some(LedgerEffect::RecordSale { total: 2300, .. })
        ));
    }

    #[test]
    fn test_inactive_employee_cannot_sell() {
        let products = HashMap::from([(1, product(1, 1000, 800))]);
        let items = [SaleItem {
            product_id: 1,
            quantity: 1,
            unit_price: 900,
        }];
        let err = sale(&employee(false, vec![]), PaymentMethod::Cash, &items, &products).unwrap_err();
        assert_eq!(err.code, ErrorCode::EmployeeInactive);
    }

    #[test]
    fn test_empty_sale_rejected() {
        let err = sale(&employee(true, vec![]), PaymentMethod::Cash, &[], &HashMap::new()).unwrap_err();
        assert_eq!(err.code, ErrorCode::RequiredField);
    }

    #[test]
    fn test_deassign_unknown_allocation() {
        let err = deassignment(&employee(true, vec![]), 1, true).unwrap_err();
        assert_eq!(err.code, ErrorCode::AllocationNotFound);
    }

    #[test]
    fn test_assignment_rejects_zero_quantity() {
        let err = assignment(&employee(true, vec![]), &product(1, 10, 5), 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::ValueOutOfRange);
    }
}
