//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Mobile detection (picks the tuning profile)
//! - Run seeding from the host clock

/// Viewports at or below this width are treated as phones
const MOBILE_MAX_WIDTH: f32 = 767.0;

/// User agent fragments of touch devices (matched case-insensitively)
const MOBILE_AGENTS: [&str; 7] = [
    "android",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// True for narrow viewports or known touch-device user agents
pub fn is_mobile(viewport_width: f32, user_agent: &str) -> bool {
    if viewport_width <= MOBILE_MAX_WIDTH {
        return true;
    }
    let agent = user_agent.to_lowercase();
    MOBILE_AGENTS.iter().any(|needle| agent.contains(needle))
}

/// Inspect the browser window
#[cfg(target_arch = "wasm32")]
pub fn detect_mobile() -> bool {
    let Some(window) = web_sys::window() else {
        return false;
    };
    let width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(f64::MAX) as f32;
    let agent = window.navigator().user_agent().unwrap_or_default();
    is_mobile(width, &agent)
}

/// Native builds are never mobile
#[cfg(not(target_arch = "wasm32"))]
pub fn detect_mobile() -> bool {
    false
}

/// Seed for a new run
#[cfg(target_arch = "wasm32")]
pub fn clock_seed() -> u64 {
    js_sys::Date::now() as u64
}

/// Seed for a new run
#[cfg(not(target_arch = "wasm32"))]
pub fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0";

    #[test]
    fn test_narrow_viewport_is_mobile() {
        assert!(is_mobile(767.0, DESKTOP_UA));
        assert!(is_mobile(375.0, DESKTOP_UA));
        assert!(!is_mobile(1280.0, DESKTOP_UA));
    }

    #[test]
    fn test_user_agent_detection() {
        let ipad = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        assert!(is_mobile(1024.0, ipad));
        assert!(is_mobile(1920.0, "Opera Mini/8.0"));
        assert!(is_mobile(1920.0, "something ANDROID something"));
    }
}
