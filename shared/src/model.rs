use chrono::{DateTime, Utc};

use crate::config::{DashboardConfig, PlatformInfo};
use crate::data_sync::Snapshots;
use crate::device::DeviceClass;
use crate::report::ReportForm;
use crate::sos::SosFlow;
use crate::view_state::ViewStateMachine;

/// Core state. Each piece of UI state sits behind its own state object and
/// is only changed through that object's transitions.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub config: DashboardConfig,
    pub platform: PlatformInfo,
    pub views: ViewStateMachine,
    pub snapshots: Snapshots,
    pub sos: SosFlow,
    pub report: ReportForm,
    pub nav_menu_open: bool,
    /// One-off message for the user, e.g. the location permission notice.
    pub notice: Option<String>,
    pub now: DateTime<Utc>,
}

impl Model {
    pub fn update_timestamp(&mut self) {
        self.now = Utc::now();
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::classify(&self.platform, self.config.mobile_breakpoint_px)
    }

    pub fn show_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }
}
