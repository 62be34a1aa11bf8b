// src/utils/ids.rs
//! ULID-based identifier generation
//!
//! Session, chunk and event ids are ULIDs with a short type prefix so they
//! stay sortable by creation time and recognizable in server logs.

use ulid::Ulid;

/// Generate a new session id (`ses_<ulid>`)
pub fn session_id() -> String {
    format!("ses_{}", Ulid::new().to_string().to_lowercase())
}

/// Generate a new chunk id (`chk_<ulid>`)
pub fn chunk_id() -> String {
    format!("chk_{}", Ulid::new().to_string().to_lowercase())
}

/// Generate a new custom event id (`evt_<ulid>`)
pub fn event_id() -> String {
    format!("evt_{}", Ulid::new().to_string().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert!(session_id().starts_with("ses_"));
        assert!(chunk_id().starts_with("chk_"));
        assert!(event_id().starts_with("evt_"));
    }

    #[test]
    fn test_uniqueness() {
        let a = event_id();
        let b = event_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_sortable_across_milliseconds() {
        let a = chunk_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = chunk_id();
        assert!(a < b);
    }
}
