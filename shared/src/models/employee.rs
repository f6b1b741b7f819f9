//! Employee Model

use serde::{Deserialize, Serialize};

use super::PaymentMethod;

/// Per-employee money balance (cents)
///
/// `total == cash + online` holds after every mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holdings {
    pub cash: i64,
    pub online: i64,
    pub total: i64,
}

impl Holdings {
    pub fn new(cash: i64, online: i64) -> Self {
        Self {
            cash,
            online,
            total: cash + online,
        }
    }

    /// Balance of the field a payment method maps to
    pub fn get(&self, method: PaymentMethod) -> i64 {
        match method {
            PaymentMethod::Cash => self.cash,
            PaymentMethod::Online => self.online,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.total == self.cash + self.online
    }
}

/// Product assigned to an employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAllocation {
    pub product_id: i64,
    pub product_name: String,
    /// Always >= 1; an allocation reaching zero is removed
    pub quantity: i64,
    pub assigned_at: i64,
}

/// Employee response (without password)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub is_active: bool,
    pub holdings: Holdings,
    #[serde(default)]
    pub products: Vec<ProductAllocation>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub name: String,
    pub phone: String,
    pub password: String,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Direct stock assignment payload (`POST /api/employees/{id}/products`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignStock {
    pub product_id: i64,
    pub quantity: i64,
}

/// Query for `DELETE /api/employees/{id}/products/{product_id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeassignQuery {
    /// Return the allocated quantity to product stock
    #[serde(default)]
    pub restock: bool,
}
