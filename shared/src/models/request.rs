//! Stock / money request models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Request lifecycle status
///
/// `Pending -> Approved | Rejected`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Approved" => Ok(Self::Approved),
            "Rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment method; selects the holdings field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Cash,
    Online,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Online => "Online",
        }
    }

    /// Holdings column name
    pub const fn holdings_column(&self) -> &'static str {
        match self {
            Self::Cash => "holdings_cash",
            Self::Online => "holdings_online",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(Self::Cash),
            "Online" => Ok(Self::Online),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stock request: employee asks for product allocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequest {
    pub id: i64,
    pub employee_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub reason: String,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub processed_at: Option<i64>,
    pub processed_by: Option<i64>,
    pub created_at: i64,
}

/// Create stock request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRequestCreate {
    /// Required on the admin surface; ignored on mobile (taken from the token)
    pub employee_id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    pub reason: String,
}

/// Money request: employee hands over holdings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyRequest {
    pub id: i64,
    pub employee_id: i64,
    /// Cents
    pub amount: i64,
    pub method: PaymentMethod,
    pub reference_number: Option<String>,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub processed_at: Option<i64>,
    pub processed_by: Option<i64>,
    pub created_at: i64,
}

/// Create money request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyRequestCreate {
    /// Required on the admin surface; ignored on mobile
    pub employee_id: Option<i64>,
    pub amount: i64,
    pub method: PaymentMethod,
    /// Required iff `method == Online`
    pub reference_number: Option<String>,
}

/// Reject payload (reason validated server-side)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// List filter shared by both request kinds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestListQuery {
    pub status: Option<RequestStatus>,
    pub employee_id: Option<i64>,
}
