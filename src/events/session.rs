// src/events/session.rs
//! Session identity, status, and immutable metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is being recorded; supplied by the host's auth layer at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Recording,
    Completed,
    Error,
}

/// One continuous recorded interval of user activity
///
/// Created when `start()` succeeds; mutated only by the controller; exactly
/// one is active per controller instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub user: UserIdentity,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn begin(session_id: String, user: UserIdentity) -> Self {
        Self {
            session_id,
            user,
            status: SessionStatus::Recording,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Mark the session completed and stamp its end time
    pub fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.ended_at = Some(Utc::now());
    }

    /// Duration so far, or total duration once ended
    pub fn duration_ms(&self) -> i64 {
        let end = self.ended_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }
}

/// Immutable snapshot taken once at session start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub browser: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_version: Option<String>,
    pub os: String,
    pub device_type: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub pixel_ratio: f64,
    pub locale: String,
    pub timezone: String,
    pub initial_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}
