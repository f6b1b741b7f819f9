//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Admin account errors
//! - 4xxx: Stock/money request errors
//! - 5xxx: Holdings errors
//! - 6xxx: Product and stock errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 on the wire so the dashboard and the mobile app can
/// switch on it without string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Verification code (OTP / reset token) expired
    VerificationCodeExpired = 1101,
    /// Verification code (OTP / reset token) invalid or already used
    VerificationCodeInvalid = 1102,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Super-admin role required
    SuperAdminRequired = 2003,
    /// Super-admin record is immutable except name/password by itself
    CannotModifySuperAdmin = 2004,
    /// Super-admin record can never be deleted
    CannotDeleteSuperAdmin = 2005,
    /// Admin cannot delete own account
    CannotDeleteSelf = 2006,

    // ==================== 3xxx: Admin ====================
    /// Admin not found
    AdminNotFound = 3001,
    /// Admin email already exists
    AdminEmailExists = 3002,

    // ==================== 4xxx: Requests ====================
    /// Stock/money request not found
    RequestNotFound = 4001,
    /// Request already approved or rejected
    RequestAlreadyProcessed = 4002,
    /// Rejection requires a reason
    RejectionReasonRequired = 4003,
    /// Online money requests require a reference number
    ReferenceNumberRequired = 4004,

    // ==================== 5xxx: Holdings ====================
    /// Employee holdings do not cover the requested amount
    InsufficientHoldings = 5001,
    /// Invalid payment method
    InvalidPaymentMethod = 5002,

    // ==================== 6xxx: Product / Stock ====================
    /// Product not found
    ProductNotFound = 6001,
    /// Product has invalid price
    ProductInvalidPrice = 6002,
    /// Stock does not cover the requested quantity
    InsufficientStock = 6003,
    /// Product is inactive
    ProductInactive = 6004,
    /// Product SKU already exists
    ProductSkuExists = 6005,
    /// Employee has no allocation for this product
    AllocationNotFound = 6101,
    /// Sale price below lowest selling price
    SalePriceBelowMinimum = 6201,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee phone already exists
    EmployeePhoneExists = 8002,
    /// Employee is inactive
    EmployeeInactive = 8003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// File storage failed
    FileStorageFailed = 9401,
    /// System busy (lock contention, retry later)
    SystemBusy = 9404,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::VerificationCodeExpired => "Verification code has expired",
            ErrorCode::VerificationCodeInvalid => "Invalid verification code",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::SuperAdminRequired => "Super-admin role is required",
            ErrorCode::CannotModifySuperAdmin => "Cannot modify super-admin account",
            ErrorCode::CannotDeleteSuperAdmin => "Cannot delete super-admin account",
            ErrorCode::CannotDeleteSelf => "Cannot delete own account",

            // Admin
            ErrorCode::AdminNotFound => "Admin not found",
            ErrorCode::AdminEmailExists => "Admin email already exists",

            // Requests
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::RequestAlreadyProcessed => "Request has already been processed",
            ErrorCode::RejectionReasonRequired => "Rejection reason is required",
            ErrorCode::ReferenceNumberRequired => {
                "Reference number is required for online payments"
            }

            // Holdings
            ErrorCode::InsufficientHoldings => "Insufficient holdings",
            ErrorCode::InvalidPaymentMethod => "Invalid payment method",

            // Product / Stock
            ErrorCode::ProductNotFound => "Product not found",
            ErrorCode::ProductInvalidPrice => "Product has invalid price",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ProductInactive => "Product is inactive",
            ErrorCode::ProductSkuExists => "Product SKU already exists",
            ErrorCode::AllocationNotFound => "Product is not assigned to this employee",
            ErrorCode::SalePriceBelowMinimum => "Sale price is below the lowest selling price",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeePhoneExists => "Employee phone already exists",
            ErrorCode::EmployeeInactive => "Employee is inactive",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::FileStorageFailed => "File storage failed",
            ErrorCode::SystemBusy => "System busy, please retry later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1101 => Ok(ErrorCode::VerificationCodeExpired),
            1102 => Ok(ErrorCode::VerificationCodeInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::SuperAdminRequired),
            2004 => Ok(ErrorCode::CannotModifySuperAdmin),
            2005 => Ok(ErrorCode::CannotDeleteSuperAdmin),
            2006 => Ok(ErrorCode::CannotDeleteSelf),

            // Admin
            3001 => Ok(ErrorCode::AdminNotFound),
            3002 => Ok(ErrorCode::AdminEmailExists),

            // Requests
            4001 => Ok(ErrorCode::RequestNotFound),
            4002 => Ok(ErrorCode::RequestAlreadyProcessed),
            4003 => Ok(ErrorCode::RejectionReasonRequired),
            4004 => Ok(ErrorCode::ReferenceNumberRequired),

            // Holdings
            5001 => Ok(ErrorCode::InsufficientHoldings),
            5002 => Ok(ErrorCode::InvalidPaymentMethod),

            // Product / Stock
            6001 => Ok(ErrorCode::ProductNotFound),
            6002 => Ok(ErrorCode::ProductInvalidPrice),
            6003 => Ok(ErrorCode::InsufficientStock),
            6004 => Ok(ErrorCode::ProductInactive),
            6005 => Ok(ErrorCode::ProductSkuExists),
            6101 => Ok(ErrorCode::AllocationNotFound),
            6201 => Ok(ErrorCode::SalePriceBelowMinimum),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeePhoneExists),
            8003 => Ok(ErrorCode::EmployeeInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9401 => Ok(ErrorCode::FileStorageFailed),
            9404 => Ok(ErrorCode::SystemBusy),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);

        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::CannotDeleteSuperAdmin.code(), 2005);
        assert_eq!(ErrorCode::RequestAlreadyProcessed.code(), 4002);
        assert_eq!(ErrorCode::InsufficientHoldings.code(), 5001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 6003);
        assert_eq!(ErrorCode::EmployeeNotFound.code(), 8001);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::InsufficientStock.is_success());
    }

    #[test]
    fn test_try_from_u16_round_trips_known_codes() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::TokenExpired,
            ErrorCode::CannotDeleteSelf,
            ErrorCode::AdminEmailExists,
            ErrorCode::ReferenceNumberRequired,
            ErrorCode::InsufficientHoldings,
            ErrorCode::SalePriceBelowMinimum,
            ErrorCode::EmployeeInactive,
            ErrorCode::SystemBusy,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::InsufficientStock).unwrap();
        assert_eq!(json, "6003");
        let code: ErrorCode = serde_json::from_str("4002").unwrap();
        assert_eq!(code, ErrorCode::RequestAlreadyProcessed);
    }
}
