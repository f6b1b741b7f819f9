//! Auth / session payloads (dashboard + mobile)

use serde::{Deserialize, Serialize};

use super::{Admin, Employee};
use crate::permission::{Action, Module};

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub admin: Admin,
    /// Route of the first module the admin may read (None = no access at all)
    pub landing_route: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Mobile login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLoginRequest {
    pub phone: String,
    pub password: String,
}

/// Mobile login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub employee: Employee,
}

/// OTP request (mobile password reset, step 1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRequest {
    pub phone: String,
}

/// OTP verification (mobile password reset, step 2)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub code: String,
    pub new_password: String,
}

/// One registry row as exposed to the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInfo {
    pub module: Module,
    pub actions: Vec<Action>,
    pub route: String,
}

/// `GET /api/permissions` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionsInfo {
    pub registry: Vec<ModuleInfo>,
    pub accessible: Vec<Module>,
    pub landing_route: Option<String>,
}
