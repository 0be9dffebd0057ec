use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpOutcome, LocationOutput};
use crate::config::{DashboardConfig, PlatformInfo};
use crate::data_sync::Resource;
use crate::sos::SessionId;
use crate::transport::{IncidentKind, MediaAttachment, Severity, SubmitResult};
use crate::view_state::{DashboardTab, View};

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Lifecycle
    AppStarted {
        config: Box<DashboardConfig>,
        platform: PlatformInfo,
    },
    ViewportResized {
        viewport_width: Option<u32>,
    },

    // Navigation
    Navigate(View),
    SelectTab(DashboardTab),
    SyncRequested,
    ToggleNavMenu,
    DismissNotice,

    // Data sync
    SnapshotFetched {
        resource: Resource,
        result: Box<HttpOutcome>,
    },

    // SOS
    SosTriggered,
    SosLocationResolved {
        session: SessionId,
        output: LocationOutput,
    },
    SosLocationDeadline {
        session: SessionId,
    },
    SosAlertSubmitted {
        session: SessionId,
        result: Box<SubmitResult>,
    },
    SosSmsHandoffDue {
        session: SessionId,
    },
    SosRecoveryDue {
        session: SessionId,
    },

    // Incident report
    ReportKindSelected(IncidentKind),
    ReportSeveritySelected(Severity),
    ReportLocationEdited(String),
    ReportDescriptionEdited(String),
    ReportMediaAttached(Box<MediaAttachment>),
    ReportMediaCleared,
    ReportLocateRequested,
    ReportLocateResolved(LocationOutput),
    ReportSubmitted,
    ReportSubmitCompleted {
        attempt: u64,
        result: Box<SubmitResult>,
    },
    ReportRecoveryDue {
        attempt: u64,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted { .. } => "app_started",
            Self::ViewportResized { .. } => "viewport_resized",
            Self::Navigate(_) => "navigate",
            Self::SelectTab(_) => "select_tab",
            Self::SyncRequested => "sync_requested",
            Self::ToggleNavMenu => "toggle_nav_menu",
            Self::DismissNotice => "dismiss_notice",
            Self::SnapshotFetched { .. } => "snapshot_fetched",
            Self::SosTriggered => "sos_triggered",
            Self::SosLocationResolved { .. } => "sos_location_resolved",
            Self::SosLocationDeadline { .. } => "sos_location_deadline",
            Self::SosAlertSubmitted { .. } => "sos_alert_submitted",
            Self::SosSmsHandoffDue { .. } => "sos_sms_handoff_due",
            Self::SosRecoveryDue { .. } => "sos_recovery_due",
            Self::ReportKindSelected(_) => "report_kind_selected",
            Self::ReportSeveritySelected(_) => "report_severity_selected",
            Self::ReportLocationEdited(_) => "report_location_edited",
            Self::ReportDescriptionEdited(_) => "report_description_edited",
            Self::ReportMediaAttached(_) => "report_media_attached",
            Self::ReportMediaCleared => "report_media_cleared",
            Self::ReportLocateRequested => "report_locate_requested",
            Self::ReportLocateResolved(_) => "report_locate_resolved",
            Self::ReportSubmitted => "report_submitted",
            Self::ReportSubmitCompleted { .. } => "report_submit_completed",
            Self::ReportRecoveryDue { .. } => "report_recovery_due",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::Navigate(_)
                | Self::SelectTab(_)
                | Self::SyncRequested
                | Self::ToggleNavMenu
                | Self::DismissNotice
                | Self::SosTriggered
                | Self::ReportKindSelected(_)
                | Self::ReportSeveritySelected(_)
                | Self::ReportLocationEdited(_)
                | Self::ReportDescriptionEdited(_)
                | Self::ReportMediaAttached(_)
                | Self::ReportMediaCleared
                | Self::ReportLocateRequested
                | Self::ReportSubmitted
        )
    }
}
