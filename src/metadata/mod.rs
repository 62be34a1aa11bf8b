// src/metadata/mod.rs
//! Session metadata capture
//!
//! - **ua**: Pure user-agent string parser
//! - **ClientContext**: The host-supplied snapshot of screen, locale and
//!   location state from which `SessionMetadata` is derived

pub mod ua;

use crate::events::SessionMetadata;
use serde::{Deserialize, Serialize};

pub use ua::{parse_user_agent, DeviceType, UaInfo};

/// Raw client environment snapshot supplied by the host at session start
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    pub user_agent: String,
    pub screen_width: u32,
    pub screen_height: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub pixel_ratio: f64,
    pub locale: String,
    pub timezone: String,
    pub url: String,
    pub referrer: Option<String>,
    /// Current route path, tracked separately from the full URL
    pub path: String,
}

impl ClientContext {
    /// Derive the immutable session metadata snapshot
    pub fn into_metadata(self) -> SessionMetadata {
        let ua = parse_user_agent(&self.user_agent);
        SessionMetadata {
            browser: ua.browser,
            browser_version: ua.browser_version,
            os: ua.os,
            device_type: ua.device_type.as_str().to_string(),
            screen_width: self.screen_width,
            screen_height: self.screen_height,
            viewport_width: self.viewport_width,
            viewport_height: self.viewport_height,
            pixel_ratio: self.pixel_ratio,
            locale: self.locale,
            timezone: self.timezone,
            initial_url: self.url,
            referrer: self.referrer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_context() {
        let ctx = ClientContext {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            screen_width: 2560,
            screen_height: 1440,
            viewport_width: 1280,
            viewport_height: 900,
            pixel_ratio: 2.0,
            locale: "en-US".to_string(),
            timezone: "America/New_York".to_string(),
            url: "https://app.example.com/projects".to_string(),
            referrer: None,
            path: "/projects".to_string(),
        };

        let meta = ctx.into_metadata();
        assert_eq!(meta.browser, "Chrome");
        assert_eq!(meta.os, "macOS");
        assert_eq!(meta.device_type, "desktop");
        assert_eq!(meta.pixel_ratio, 2.0);
        assert_eq!(meta.initial_url, "https://app.example.com/projects");
    }
}
