//! The SOS session state machine.
//!
//! `SosFlow` holds no capabilities. Every transition returns the
//! [`SosCommand`]s the app must carry out, and every follow-up event names the
//! session it belongs to so answers for a superseded session are dropped.

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::device::DeviceClass;
use crate::location::{LocationFix, LocationProbe, ProbeOutcome};
use crate::transport::{AlertPayload, SubmitResult};

pub const STATUS_LOCATING: &str = "Locating...";
pub const STATUS_LOCKED: &str = "Location locked. Transmitting to Command Center...";
pub const STATUS_NO_GPS: &str = "GPS unavailable. Transmitting generic alert...";
pub const STATUS_ESCALATING: &str = "CRITICAL ALERT RECEIVED\nOpening Emergency SMS...";
pub const STATUS_ACKNOWLEDGED: &str =
    "CRITICAL ALERT RECEIVED\nHelp sequence initialized in Command Center.";
pub const STATUS_FAILED: &str = "Transmission Failed! Please call emergency services locally.";

pub const TRIGGER_LABEL_IDLE: &str = "SOS";
pub const TRIGGER_LABEL_BUSY: &str = "Transmitting...";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosPhase {
    #[default]
    Idle,
    Locating,
    Transmitting,
    Escalating,
    Acknowledged,
    Done,
    Failed,
}

impl SosPhase {
    /// A session in one of these phases blocks a new trigger.
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            SosPhase::Locating | SosPhase::Transmitting | SosPhase::Escalating | SosPhase::Acknowledged
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sos-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SosCommand {
    AcquireLocation { session: SessionId, timeout_ms: u64 },
    ArmLocationDeadline { session: SessionId, millis: u64 },
    SubmitAlert { session: SessionId, payload: AlertPayload },
    ScheduleSmsHandoff { session: SessionId, millis: u64 },
    ScheduleRecovery { session: SessionId, millis: u64 },
    OpenSms { href: String },
    ShowDashboard,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SosFlow {
    phase: SosPhase,
    session: SessionId,
    started_at: Option<DateTime<Utc>>,
    probe: LocationProbe,
    fix: Option<LocationFix>,
    overlay_visible: bool,
    status: String,
}

impl SosFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SosPhase {
        self.phase
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn fix(&self) -> Option<&LocationFix> {
        self.fix.as_ref()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn status_message(&self) -> &str {
        &self.status
    }

    pub fn trigger_label(&self) -> &'static str {
        if self.overlay_visible {
            TRIGGER_LABEL_BUSY
        } else {
            TRIGGER_LABEL_IDLE
        }
    }

    fn enter(&mut self, phase: SosPhase, status: &str) {
        info!(session = %self.session, from = ?self.phase, to = ?phase, "sos phase change");
        self.phase = phase;
        self.status = status.to_string();
    }

    fn is_current(&self, session: SessionId, expected: SosPhase, step: &'static str) -> bool {
        if session != self.session {
            warn!(session = %session, current = %self.session, step, "dropping event for superseded sos session");
            return false;
        }
        if self.phase != expected {
            debug!(session = %session, phase = ?self.phase, step, "ignoring sos event outside its phase");
            return false;
        }
        true
    }

    /// Starts a new session unless one is already in flight.
    pub fn trigger(&mut self, now: DateTime<Utc>, config: &DashboardConfig) -> Vec<SosCommand> {
        if self.phase.is_in_flight() {
            warn!(session = %self.session, phase = ?self.phase, "sos already in flight, trigger ignored");
            return Vec::new();
        }

        self.session = SessionId(self.session.0 + 1);
        self.started_at = Some(now);
        self.probe = LocationProbe::new();
        self.fix = None;
        self.overlay_visible = true;
        self.enter(SosPhase::Locating, STATUS_LOCATING);

        vec![
            SosCommand::AcquireLocation {
                session: self.session,
                timeout_ms: config.location_timeout_ms,
            },
            SosCommand::ArmLocationDeadline {
                session: self.session,
                millis: config.location_timeout_ms,
            },
        ]
    }

    /// Feeds either the platform answer or the deadline. Only the first one
    /// for the session moves the flow on.
    pub fn location_settled(&mut self, session: SessionId, outcome: ProbeOutcome) -> Vec<SosCommand> {
        if !self.is_current(session, SosPhase::Locating, "location") {
            return Vec::new();
        }
        let Some(fix) = self.probe.settle(&outcome) else {
            return Vec::new();
        };

        let status = if fix.is_gps() { STATUS_LOCKED } else { STATUS_NO_GPS };
        let payload = AlertPayload::sos(fix.alert_text());
        self.fix = Some(fix);
        self.enter(SosPhase::Transmitting, status);

        vec![SosCommand::SubmitAlert { session, payload }]
    }

    pub fn alert_completed(
        &mut self,
        session: SessionId,
        result: SubmitResult,
        device: DeviceClass,
        config: &DashboardConfig,
    ) -> Vec<SosCommand> {
        if !self.is_current(session, SosPhase::Transmitting, "transmit") {
            return Vec::new();
        }

        match result {
            Ok(ack) => {
                debug!(session = %session, incident_id = ?ack.id, "sos alert accepted");
                let recovery = SosCommand::ScheduleRecovery {
                    session,
                    millis: config.sos_success_display_ms,
                };
                match device {
                    DeviceClass::Mobile => {
                        self.enter(SosPhase::Escalating, STATUS_ESCALATING);
                        vec![
                            SosCommand::ScheduleSmsHandoff {
                                session,
                                millis: config.sms_handoff_delay_ms,
                            },
                            recovery,
                        ]
                    }
                    DeviceClass::Desktop => {
                        self.enter(SosPhase::Acknowledged, STATUS_ACKNOWLEDGED);
                        vec![recovery]
                    }
                }
            }
            Err(e) => {
                error!(session = %session, error = %e, "sos alert transmission failed");
                self.enter(SosPhase::Failed, STATUS_FAILED);
                vec![SosCommand::ScheduleRecovery {
                    session,
                    millis: config.sos_failure_display_ms,
                }]
            }
        }
    }

    pub fn sms_handoff_due(&mut self, session: SessionId, config: &DashboardConfig) -> Vec<SosCommand> {
        if !self.is_current(session, SosPhase::Escalating, "sms_handoff") {
            return Vec::new();
        }
        let location = self
            .fix
            .as_ref()
            .map(LocationFix::alert_text)
            .unwrap_or_default();

        info!(session = %session, "opening sms composer");
        vec![SosCommand::OpenSms {
            href: sms_href(&config.emergency_number, &location),
        }]
    }

    /// Closes the overlay once the display window elapses. Success moves on
    /// to the dashboard; a failure returns the trigger to rest.
    pub fn recovery_due(&mut self, session: SessionId) -> Vec<SosCommand> {
        if session != self.session {
            warn!(session = %session, current = %self.session, "dropping recovery for superseded sos session");
            return Vec::new();
        }

        match self.phase {
            SosPhase::Escalating | SosPhase::Acknowledged => {
                self.overlay_visible = false;
                self.enter(SosPhase::Done, "");
                vec![SosCommand::ShowDashboard]
            }
            SosPhase::Failed => {
                self.overlay_visible = false;
                self.enter(SosPhase::Idle, "");
                Vec::new()
            }
            phase => {
                debug!(session = %session, phase = ?phase, "recovery outside a terminal display window");
                Vec::new()
            }
        }
    }
}

/// `sms:` deep link with a prefilled emergency body.
pub fn sms_href(number: &str, location: &str) -> String {
    let body = format!(
        "URGENT EMERGENCY!\nLocation: {location}\nPlease send immediate assistance."
    );
    format!("sms:{number}?body={}", utf8_percent_encode(&body, URI_COMPONENT))
}
