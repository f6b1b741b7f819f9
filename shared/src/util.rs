/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Milliseconds for a minute-based TTL
pub fn minutes_to_millis(minutes: i64) -> i64 {
    minutes.saturating_mul(60_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_millis_is_recent() {
        // 2024-01-01 UTC
        assert!(now_millis() > 1_704_067_200_000);
    }

    #[test]
    fn test_minutes_to_millis() {
        assert_eq!(minutes_to_millis(15), 900_000);
        assert_eq!(minutes_to_millis(i64::MAX), i64::MAX);
    }
}
