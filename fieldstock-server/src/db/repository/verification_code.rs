//! Verification Code Repository (password reset tokens, OTPs)
//!
//! 只保存 SHA-256 摘要；明文只交给 Mailer。

use super::RepoResult;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    PasswordReset,
    Otp,
}

impl CodeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CodeKind::PasswordReset => "PasswordReset",
            CodeKind::Otp => "Otp",
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct VerificationCodeRow {
    pub id: i64,
    pub subject: String,
    pub expires_at: i64,
    pub consumed_at: Option<i64>,
}

/// Store a new code; earlier unconsumed codes of the same kind/subject are voided
pub async fn issue(
    pool: &SqlitePool,
    kind: CodeKind,
    subject: &str,
    code_hash: &str,
    expires_at: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE verification_code SET consumed_at = ?1 WHERE kind = ?2 AND subject = ?3 AND consumed_at IS NULL",
    )
    .bind(now)
    .bind(kind.as_str())
    .bind(subject)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO verification_code (subject, kind, code_hash, expires_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(subject)
    .bind(kind.as_str())
    .bind(code_hash)
    .bind(expires_at)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

/// Atomically mark a live code consumed, returning its subject.
///
/// `subject` narrows the match (OTPs are scoped to a phone number).
pub async fn consume(
    pool: &SqlitePool,
    kind: CodeKind,
    code_hash: &str,
    subject: Option<&str>,
    now: i64,
) -> RepoResult<Option<String>> {
    let consumed_subject = sqlx::query_scalar(
        "UPDATE verification_code SET consumed_at = ?1 WHERE kind = ?2 AND code_hash = ?3 AND (?4 IS NULL OR subject = ?4) AND consumed_at IS NULL AND expires_at > ?1 RETURNING subject",
    )
    .bind(now)
    .bind(kind.as_str())
    .bind(code_hash)
    .bind(subject)
    .fetch_optional(pool)
    .await?;
    Ok(consumed_subject)
}

/// Most recent row for a hash (to tell expired from unknown after a failed consume)
pub async fn find_by_hash(
    pool: &SqlitePool,
    kind: CodeKind,
    code_hash: &str,
    subject: Option<&str>,
) -> RepoResult<Option<VerificationCodeRow>> {
    let row = sqlx::query_as::<_, VerificationCodeRow>(
        "SELECT id, subject, expires_at, consumed_at FROM verification_code WHERE kind = ?1 AND code_hash = ?2 AND (?3 IS NULL OR subject = ?3) ORDER BY id DESC LIMIT 1",
    )
    .bind(kind.as_str())
    .bind(code_hash)
    .bind(subject)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
