use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_API_BASE, DEFAULT_EMERGENCY_NUMBER, DEFAULT_LOCATION_TIMEOUT_MS,
    DEFAULT_MOBILE_BREAKPOINT_PX, DEFAULT_RECENT_INCIDENT_COUNT, DEFAULT_REPORT_CONFIRMATION_MS,
    DEFAULT_REPORT_ERROR_DISPLAY_MS, DEFAULT_SMS_HANDOFF_DELAY_MS, DEFAULT_SOS_FAILURE_DISPLAY_MS,
    DEFAULT_SOS_SUCCESS_DISPLAY_MS,
};

/// Runtime configuration supplied by the shell at startup.
///
/// Every field has a default, so a shell may send `{}` and get the stock
/// dashboard behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Absolute `http(s)` origin of the relief API.
    pub api_base: String,
    pub emergency_number: String,
    pub location_timeout_ms: u64,
    pub sms_handoff_delay_ms: u64,
    pub sos_success_display_ms: u64,
    pub sos_failure_display_ms: u64,
    pub report_confirmation_ms: u64,
    pub report_error_display_ms: u64,
    pub mobile_breakpoint_px: u32,
    pub recent_incident_count: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            emergency_number: DEFAULT_EMERGENCY_NUMBER.to_string(),
            location_timeout_ms: DEFAULT_LOCATION_TIMEOUT_MS,
            sms_handoff_delay_ms: DEFAULT_SMS_HANDOFF_DELAY_MS,
            sos_success_display_ms: DEFAULT_SOS_SUCCESS_DISPLAY_MS,
            sos_failure_display_ms: DEFAULT_SOS_FAILURE_DISPLAY_MS,
            report_confirmation_ms: DEFAULT_REPORT_CONFIRMATION_MS,
            report_error_display_ms: DEFAULT_REPORT_ERROR_DISPLAY_MS,
            mobile_breakpoint_px: DEFAULT_MOBILE_BREAKPOINT_PX,
            recent_incident_count: DEFAULT_RECENT_INCIDENT_COUNT,
        }
    }
}

/// What the shell knows about the device it runs on.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformInfo {
    pub viewport_width: Option<u32>,
    pub user_agent: String,
    /// Local clock offset from UTC, used for timestamp formatting.
    pub utc_offset_minutes: i32,
}
