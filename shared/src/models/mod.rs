//! Data models
//!
//! Shared between fieldstock-server and its clients (via API).
//! DB row types live in the server's repository layer and map into these.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY). Money is integer cents.

pub mod admin;
pub mod auth;
pub mod employee;
pub mod product;
pub mod request;
pub mod sale;
pub mod serde_helpers;

// Re-exports
pub use admin::*;
pub use auth::*;
pub use employee::*;
pub use product::*;
pub use request::*;
pub use sale::*;
