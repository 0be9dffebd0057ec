#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod data_sync;
pub mod device;
pub mod event;
pub mod location;
pub mod model;
pub mod report;
pub mod sos;
pub mod transport;
pub mod view_state;

pub use app::{App, ViewModel};
pub use capabilities::{Capabilities, Effect};
pub use config::{DashboardConfig, PlatformInfo};
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use model::Model;

pub const STATS_PATH: &str = "/api/stats";
pub const INCIDENTS_PATH: &str = "/api/incidents";
pub const INVENTORY_PATH: &str = "/api/inventory";
pub const VOLUNTEERS_PATH: &str = "/api/volunteers";
pub const SHELTERS_PATH: &str = "/api/shelters";

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_EMERGENCY_NUMBER: &str = "911";
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SMS_HANDOFF_DELAY_MS: u64 = 1_500;
pub const DEFAULT_SOS_SUCCESS_DISPLAY_MS: u64 = 4_000;
pub const DEFAULT_SOS_FAILURE_DISPLAY_MS: u64 = 3_000;
pub const DEFAULT_REPORT_CONFIRMATION_MS: u64 = 1_500;
pub const DEFAULT_REPORT_ERROR_DISPLAY_MS: u64 = 2_000;
pub const DEFAULT_MOBILE_BREAKPOINT_PX: u32 = 768;
pub const DEFAULT_RECENT_INCIDENT_COUNT: usize = 5;
