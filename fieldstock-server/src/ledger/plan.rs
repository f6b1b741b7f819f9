//! Ledger plan: the ordered writes one operation commits atomically

use shared::models::{PaymentMethod, RequestStatus, SaleItem};

/// Which request table a settlement targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Stock,
    Money,
}

impl RequestKind {
    pub const fn table(&self) -> &'static str {
        match self {
            RequestKind::Stock => "stock_request",
            RequestKind::Money => "money_request",
        }
    }
}

/// Terminal outcome written by a settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Approved,
    Rejected { reason: String },
}

impl Settlement {
    pub fn status(&self) -> RequestStatus {
        match self {
            Settlement::Approved => RequestStatus::Approved,
            Settlement::Rejected { .. } => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEffect {
    /// Pending → terminal (conditional claim; fails with AlreadyProcessed)
    SettleRequest {
        kind: RequestKind,
        request_id: i64,
        settlement: Settlement,
        processed_by: i64,
    },
    /// holdings[method] -= amount, total -= amount (guard: holdings[method] >= amount)
    DebitHoldings {
        employee_id: i64,
        method: PaymentMethod,
        amount: i64,
    },
    /// holdings[method] += amount, total += amount
    CreditHoldings {
        employee_id: i64,
        method: PaymentMethod,
        amount: i64,
    },
    /// stock_quantity -= quantity (guard: stock_quantity >= quantity)
    DeductStock { product_id: i64, quantity: i64 },
    /// Upsert allocation (+quantity, assigned_at kept on increment)
    AllocateStock {
        employee_id: i64,
        product_id: i64,
        quantity: i64,
    },
    /// allocation -= quantity (guard: allocation >= quantity); removed at zero
    ConsumeAllocation {
        employee_id: i64,
        product_id: i64,
        quantity: i64,
    },
    /// Drop the allocation; optionally return its quantity to central stock
    RemoveAllocation {
        employee_id: i64,
        product_id: i64,
        restock: bool,
    },
    /// Insert sale + items
    RecordSale {
        employee_id: i64,
        method: PaymentMethod,
        items: Vec<SaleItem>,
        total: i64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerPlan {
    pub effects: Vec<LedgerEffect>,
}

impl LedgerPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, effect: LedgerEffect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
