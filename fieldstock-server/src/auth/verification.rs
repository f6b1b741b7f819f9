//! Password reset tokens and OTPs
//!
//! 明文只在签发时返回一次 (交给 Mailer)；数据库只存 SHA-256 hex。
//! 新签发会作废同一 subject 之前未使用的码；消费是原子的，一码一用。

use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};
use shared::util::{minutes_to_millis, now_millis};
use shared::{AppError, AppResult, ErrorCode};
use sqlx::SqlitePool;

use crate::db::repository::verification_code::{self, CodeKind};

/// 32 random bytes, hex encoded (64 chars)
pub fn generate_reset_token() -> AppResult<String> {
    let mut bytes = [0u8; 32];
    SystemRandom::new()
        .fill(&mut bytes)
        .map_err(|_| AppError::internal("Failed to generate reset token"))?;
    Ok(hex::encode(bytes))
}

/// Six decimal digits, leading zeros allowed
pub fn generate_otp() -> String {
    use rand::Rng;
    let code: u32 = rand::thread_rng().gen_range(0..1_000_000);
    format!("{code:06}")
}

pub fn hash_code(code: &str) -> String {
    hex::encode(Sha256::digest(code.trim().as_bytes()))
}

async fn issue(pool: &SqlitePool, kind: CodeKind, subject: &str, code: &str, ttl_minutes: i64) -> AppResult<()> {
    let expires_at = now_millis().saturating_add(minutes_to_millis(ttl_minutes));
    verification_code::issue(pool, kind, subject, &hash_code(code), expires_at).await?;
    Ok(())
}

/// Consume a live code; a failed attempt is classified as expired or invalid
async fn consume(pool: &SqlitePool, kind: CodeKind, code: &str, subject: Option<&str>) -> AppResult<String> {
    let hash = hash_code(code);
    let now = now_millis();
    if let Some(consumed) = verification_code::consume(pool, kind, &hash, subject, now).await? {
        return Ok(consumed);
    }

    let known = verification_code::find_by_hash(pool, kind, &hash, subject).await?;
    match known {
        Some(row) if row.consumed_at.is_none() && row.expires_at <= now => {
            Err(AppError::new(ErrorCode::VerificationCodeExpired))
        }
        _ => Err(AppError::new(ErrorCode::VerificationCodeInvalid)),
    }
}

/// Issue a reset token for an admin email; returns the plaintext token
pub async fn issue_reset_token(pool: &SqlitePool, email: &str, ttl_minutes: i64) -> AppResult<String> {
    let token = generate_reset_token()?;
    issue(pool, CodeKind::PasswordReset, &email.to_lowercase(), &token, ttl_minutes).await?;
    Ok(token)
}

/// Consume a reset token; returns the email it was issued for
pub async fn consume_reset_token(pool: &SqlitePool, token: &str) -> AppResult<String> {
    consume(pool, CodeKind::PasswordReset, token, None).await
}

/// Issue an OTP for an employee phone; returns the plaintext code
pub async fn issue_otp(pool: &SqlitePool, phone: &str, ttl_minutes: i64) -> AppResult<String> {
    let code = generate_otp();
    issue(pool, CodeKind::Otp, phone, &code, ttl_minutes).await?;
    Ok(code)
}

/// OTPs are scoped to the phone they were sent to
pub async fn consume_otp(pool: &SqlitePool, phone: &str, code: &str) -> AppResult<()> {
    consume(pool, CodeKind::Otp, code, Some(phone)).await.map(|_| ())
}
