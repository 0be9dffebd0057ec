//! Incident report form: the draft being edited and the submit button
//! lifecycle around a single submission.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::capabilities::LocationOutput;
use crate::config::DashboardConfig;
use crate::location::{report_location_text, REPORT_LOCATING_TEXT};
use crate::transport::{AlertPayload, IncidentKind, MediaAttachment, Severity, SubmitResult};

pub const UNKNOWN_LOCATION: &str = "Unknown";
pub const MEDIA_PROMPT: &str = "Click to upload images or videos";

pub const SUBMIT_LABEL_IDLE: &str = "Submit Report";
pub const SUBMIT_LABEL_UPLOADING: &str = "Uploading...";
pub const SUBMIT_LABEL_SUBMITTED: &str = "Report Submitted";
pub const SUBMIT_LABEL_ERROR: &str = "Error";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDraft {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub media: Option<MediaAttachment>,
}

impl ReportDraft {
    /// Fields are sent as typed. Only a blank location is defaulted.
    pub fn to_payload(&self) -> AlertPayload {
        let location = if self.location.trim().is_empty() {
            UNKNOWN_LOCATION.to_string()
        } else {
            self.location.clone()
        };

        AlertPayload {
            kind: self.kind,
            severity: self.severity,
            location,
            description: self.description.clone(),
            media: self.media.clone(),
        }
    }

    pub fn media_label(&self) -> String {
        match &self.media {
            Some(media) => format!("Media Attached: {}", media.file_name),
            None => MEDIA_PROMPT.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitState {
    #[default]
    Editing,
    Uploading,
    Submitted,
    Error,
}

impl SubmitState {
    pub const fn label(self) -> &'static str {
        match self {
            SubmitState::Editing => SUBMIT_LABEL_IDLE,
            SubmitState::Uploading => SUBMIT_LABEL_UPLOADING,
            SubmitState::Submitted => SUBMIT_LABEL_SUBMITTED,
            SubmitState::Error => SUBMIT_LABEL_ERROR,
        }
    }

    pub const fn accepts_submit(self) -> bool {
        matches!(self, SubmitState::Editing)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReportCommand {
    Submit { attempt: u64, payload: AlertPayload },
    ScheduleRecovery { attempt: u64, millis: u64 },
    ShowDashboard,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportForm {
    pub draft: ReportDraft,
    state: SubmitState,
    attempt: u64,
    locating: bool,
    error: Option<String>,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitState {
        self.state
    }

    pub fn attempt(&self) -> u64 {
        self.attempt
    }

    pub fn is_locating(&self) -> bool {
        self.locating
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn submit(&mut self) -> Vec<ReportCommand> {
        if !self.state.accepts_submit() {
            warn!(state = ?self.state, "report submit ignored");
            return Vec::new();
        }

        self.attempt += 1;
        self.state = SubmitState::Uploading;
        self.error = None;
        info!(attempt = self.attempt, kind = self.draft.kind.as_str(), "report submission started");

        vec![ReportCommand::Submit {
            attempt: self.attempt,
            payload: self.draft.to_payload(),
        }]
    }

    pub fn submit_completed(
        &mut self,
        attempt: u64,
        result: SubmitResult,
        config: &DashboardConfig,
    ) -> Vec<ReportCommand> {
        if attempt != self.attempt || self.state != SubmitState::Uploading {
            warn!(attempt, current = self.attempt, "dropping stale report result");
            return Vec::new();
        }

        match result {
            Ok(ack) => {
                info!(attempt, incident_id = ?ack.id, "report accepted");
                self.state = SubmitState::Submitted;
                vec![ReportCommand::ScheduleRecovery {
                    attempt,
                    millis: config.report_confirmation_ms,
                }]
            }
            Err(e) => {
                error!(attempt, error = %e, "report submission failed");
                self.state = SubmitState::Error;
                self.error = Some(e.to_string());
                vec![ReportCommand::ScheduleRecovery {
                    attempt,
                    millis: config.report_error_display_ms,
                }]
            }
        }
    }

    /// After a success the form is cleared and the dashboard shown. After an
    /// error the button is re-enabled with the draft intact.
    pub fn recovery_due(&mut self, attempt: u64) -> Vec<ReportCommand> {
        if attempt != self.attempt {
            return Vec::new();
        }

        match self.state {
            SubmitState::Submitted => {
                self.draft = ReportDraft::default();
                self.state = SubmitState::Editing;
                vec![ReportCommand::ShowDashboard]
            }
            SubmitState::Error => {
                self.state = SubmitState::Editing;
                Vec::new()
            }
            SubmitState::Editing | SubmitState::Uploading => Vec::new(),
        }
    }

    pub fn locate_requested(&mut self) {
        self.locating = true;
        self.draft.location = REPORT_LOCATING_TEXT.to_string();
    }

    /// Fills the location field and returns a notice to show, if any.
    pub fn locate_resolved(&mut self, output: &LocationOutput) -> Option<&'static str> {
        if !self.locating {
            return None;
        }
        self.locating = false;
        let (text, notice) = report_location_text(output);
        self.draft.location = text;
        notice
    }
}
