use chrono::Utc;
use tokio::time::Instant;

/// Current time as unix milliseconds, the unit every token timestamp uses.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Saturates at `i64::MAX` instead of wrapping for huge configured values.
pub fn seconds_to_millis(seconds: u64) -> i64 {
    i64::try_from(seconds).unwrap_or(i64::MAX).saturating_mul(1000)
}

pub fn get_instant() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_to_millis_saturates() {
        assert_eq!(seconds_to_millis(300), 300_000);
        assert_eq!(seconds_to_millis(u64::MAX), i64::MAX);
        assert_eq!(seconds_to_millis(i64::MAX as u64 / 10), i64::MAX);
    }
}
