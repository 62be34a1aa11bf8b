// src/utils/time.rs
//! Epoch-millisecond clock helpers

use chrono::Utc;

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms_is_recent() {
        // 2020-01-01 in epoch millis
        assert!(now_ms() > 1_577_836_800_000);
    }
}
