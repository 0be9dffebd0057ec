use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::config::PlatformInfo;

/// User agents that get the native SMS escalation.
static MOBILE_USER_AGENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Android|webOS|iPhone|iPad|iPod|BlackBerry|IEMobile|Opera Mini")
        .expect("mobile user agent pattern is valid")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

impl DeviceClass {
    /// Narrow viewport or a mobile user agent means mobile. No signal at all
    /// means desktop.
    pub fn classify(platform: &PlatformInfo, breakpoint_px: u32) -> Self {
        let narrow = platform
            .viewport_width
            .is_some_and(|width| width <= breakpoint_px);

        if narrow || MOBILE_USER_AGENT.is_match(&platform.user_agent) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DESKTOP_UA: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";

    fn platform(width: Option<u32>, ua: &str) -> PlatformInfo {
        PlatformInfo {
            viewport_width: width,
            user_agent: ua.to_string(),
            utc_offset_minutes: 0,
        }
    }

    #[test]
    fn wide_desktop_is_desktop() {
        assert_eq!(
            DeviceClass::classify(&platform(Some(1920), DESKTOP_UA), 768),
            DeviceClass::Desktop
        );
    }

    #[test]
    fn breakpoint_is_inclusive() {
        assert_eq!(
            DeviceClass::classify(&platform(Some(768), DESKTOP_UA), 768),
            DeviceClass::Mobile
        );
        assert_eq!(
            DeviceClass::classify(&platform(Some(769), DESKTOP_UA), 768),
            DeviceClass::Desktop
        );
    }

    #[test]
    fn mobile_user_agent_wins_on_wide_viewport() {
        let ua = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        assert_eq!(
            DeviceClass::classify(&platform(Some(1024), ua), 768),
            DeviceClass::Mobile
        );
        assert_eq!(
            DeviceClass::classify(&platform(Some(1920), "opera mini/8.0"), 768),
            DeviceClass::Mobile
        );
    }

    #[test]
    fn unknown_platform_is_desktop() {
        assert_eq!(
            DeviceClass::classify(&PlatformInfo::default(), 768),
            DeviceClass::Desktop
        );
    }

    proptest! {
        #[test]
        fn narrow_viewports_are_always_mobile(width in 0u32..=768) {
            prop_assert_eq!(
                DeviceClass::classify(&platform(Some(width), DESKTOP_UA), 768),
                DeviceClass::Mobile
            );
        }

        #[test]
        fn wide_desktop_viewports_are_desktop(width in 769u32..10_000) {
            prop_assert_eq!(
                DeviceClass::classify(&platform(Some(width), DESKTOP_UA), 768),
                DeviceClass::Desktop
            );
        }
    }
}
