//! Outbound notifications (password reset tokens, OTPs)

use async_trait::async_trait;
use shared::AppResult;

/// Delivery channel for one-time codes
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &str, token: &str) -> AppResult<()>;

    async fn send_otp(&self, phone: &str, code: &str) -> AppResult<()>;
}

/// Writes deliveries to the log. The code itself is only logged in development.
#[derive(Debug, Clone)]
pub struct LogMailer {
    reveal_codes: bool,
}

impl LogMailer {
    pub fn new(reveal_codes: bool) -> Self {
        Self { reveal_codes }
    }

    fn shown<'a>(&self, code: &'a str) -> &'a str {
        if self.reveal_codes { code } else { "<redacted>" }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, email: &str, token: &str) -> AppResult<()> {
        tracing::info!(to = %email, token = %self.shown(token), "Password reset token issued");
        Ok(())
    }

    async fn send_otp(&self, phone: &str, code: &str) -> AppResult<()> {
        tracing::info!(to = %phone, code = %self.shown(code), "OTP issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        assert_eq!(LogMailer::new(false).shown("123456"), "<redacted>");
        assert_eq!(LogMailer::new(true).shown("123456"), "123456");
    }
}
