//! Product Model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// Product price (cents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub base: i64,
    /// Floor for sale unit prices
    pub lowest_selling_price: i64,
}

impl Price {
    /// `0 <= lowest_selling_price <= base`
    pub fn validate(&self) -> AppResult<()> {
        if self.base < 0 || self.lowest_selling_price < 0 {
            return Err(AppError::with_message(
                ErrorCode::ProductInvalidPrice,
                "Prices must not be negative",
            ));
        }
        if self.lowest_selling_price > self.base {
            return Err(AppError::with_message(
                ErrorCode::ProductInvalidPrice,
                format!(
                    "Lowest selling price {} exceeds base price {}",
                    self.lowest_selling_price, self.base
                ),
            ));
        }
        Ok(())
    }
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub price: Price,
    /// Central (unassigned) stock, never negative
    pub stock_quantity: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub sku: String,
    pub image_url: Option<String>,
    pub price: Price,
    pub stock_quantity: Option<i64>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub sku: Option<String>,
    /// 缺失 = 不变，`null` = 移除图片
    #[serde(
        default,
        deserialize_with = "super::serde_helpers::double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    pub price: Option<Price>,
    pub stock_quantity: Option<i64>,
}
