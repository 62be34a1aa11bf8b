// src/metadata/ua.rs
//! User-agent string parser
//!
//! Pure functions deriving browser, OS and device type from a user-agent
//! string. Token order matters: Edge and Opera embed "Chrome", Chrome embeds
//! "Safari", so the more specific tokens are checked first.

use serde::{Deserialize, Serialize};

/// Coarse device classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Desktop => "desktop",
            DeviceType::Mobile => "mobile",
            DeviceType::Tablet => "tablet",
        }
    }
}

/// Parsed user-agent fields
#[derive(Debug, Clone, PartialEq)]
pub struct UaInfo {
    pub browser: String,
    pub browser_version: Option<String>,
    pub os: String,
    pub device_type: DeviceType,
}

/// Parse a user-agent string
pub fn parse_user_agent(ua: &str) -> UaInfo {
    UaInfo {
        browser: browser_name(ua).to_string(),
        browser_version: browser_version(ua),
        os: os_name(ua).to_string(),
        device_type: device_type(ua),
    }
}

fn browser_name(ua: &str) -> &'static str {
    if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Firefox/") || ua.contains("FxiOS/") {
        "Firefox"
    } else if ua.contains("Safari/") {
        "Safari"
    } else if ua.contains("MSIE") || ua.contains("Trident/") {
        "Internet Explorer"
    } else {
        "Unknown"
    }
}

fn browser_version(ua: &str) -> Option<String> {
    let token = match browser_name(ua) {
        "Edge" => "Edg/",
        "Opera" => "OPR/",
        "Chrome" => "Chrome/",
        "Firefox" => "Firefox/",
        "Safari" => "Version/",
        _ => return None,
    };

    let rest = &ua[ua.find(token)? + token.len()..];
    let version: String = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if version.is_empty() {
        None
    } else {
        Some(version)
    }
}

fn os_name(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("CrOS") {
        "ChromeOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        "Unknown"
    }
}

fn device_type(ua: &str) -> DeviceType {
    if ua.contains("iPad") || (ua.contains("Android") && !ua.contains("Mobile")) {
        DeviceType::Tablet
    } else if ua.contains("Mobile") || ua.contains("iPhone") {
        DeviceType::Mobile
    } else {
        DeviceType::Desktop
    }
}
