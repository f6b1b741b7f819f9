//! 服务层
//!
//! - [`FileStore`] - 上传文件清理
//! - [`Mailer`] - 一次性码投递 (默认 [`LogMailer`])

pub mod file_store;
pub mod mailer;

pub use file_store::FileStore;
pub use mailer::{LogMailer, Mailer};
