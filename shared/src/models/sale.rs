//! Sale Model

use serde::{Deserialize, Serialize};

use super::PaymentMethod;

/// One sold line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleItem {
    pub product_id: i64,
    pub quantity: i64,
    /// Cents, must be >= the product's lowest selling price
    pub unit_price: i64,
}

impl SaleItem {
    pub fn line_total(&self) -> Option<i64> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// Recorded sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub employee_id: i64,
    pub method: PaymentMethod,
    pub items: Vec<SaleItem>,
    pub total: i64,
    pub created_at: i64,
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    /// Required on the admin surface; ignored on mobile
    pub employee_id: Option<i64>,
    pub method: PaymentMethod,
    pub items: Vec<SaleItem>,
}

/// Sum of line totals, None on overflow
pub fn sale_total(items: &[SaleItem]) -> Option<i64> {
    items
        .iter()
        .try_fold(0_i64, |acc, item| acc.checked_add(item.line_total()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_total() {
        let items = vec![
            SaleItem { product_id: 1, quantity: 2, unit_price: 250 },
            SaleItem { product_id: 2, quantity: 1, unit_price: 1000 },
        ];
        assert_eq!(sale_total(&items), Some(1500));
        assert_eq!(sale_total(&[]), Some(0));
    }

    #[test]
    fn test_sale_total_overflow() {
        let items = vec![SaleItem { product_id: 1, quantity: i64::MAX, unit_price: 2 }];
        assert_eq!(sale_total(&items), None);
    }
}
