//! Bounded location acquisition for the SOS flow and the report form.
//!
//! The platform query and a core-side deadline race each other; whichever
//! answer reaches the [`LocationProbe`] first settles it and every later
//! answer is discarded. The probe never fails: anything other than a valid
//! position settles to the fallback fix.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capabilities::LocationOutput;

pub const SOS_FALLBACK_LABEL: &str = "Unknown Origin (SOS)";
pub const REPORT_LOCATING_TEXT: &str = "Locating via Satellite...";
pub const REPORT_DEFAULT_LOCATION: &str = "34.0522, -118.2437 (Default)";
pub const REPORT_UNSUPPORTED_TEXT: &str = "GPS Not Supported";
pub const REPORT_DENIED_NOTICE: &str = "Location access denied. Using center coordinates.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "precision", rename_all = "snake_case")]
pub enum LocationFix {
    Gps { latitude: f64, longitude: f64 },
    Fallback { label: String },
}

impl LocationFix {
    pub fn fallback() -> Self {
        LocationFix::Fallback {
            label: SOS_FALLBACK_LABEL.to_string(),
        }
    }

    /// Out-of-range or non-finite coordinates are treated like a failed query.
    pub fn from_output(output: &LocationOutput) -> Self {
        match *output {
            LocationOutput::Position {
                latitude,
                longitude,
                ..
            } if is_valid_coordinate(latitude, longitude) => LocationFix::Gps {
                latitude,
                longitude,
            },
            _ => Self::fallback(),
        }
    }

    pub fn is_gps(&self) -> bool {
        matches!(self, LocationFix::Gps { .. })
    }

    /// The location string carried by an SOS alert.
    pub fn alert_text(&self) -> String {
        match self {
            LocationFix::Gps {
                latitude,
                longitude,
            } => format!("SOS GPS: {}, {}", fixed4(*latitude), fixed4(*longitude)),
            LocationFix::Fallback { label } => label.clone(),
        }
    }
}

/// Four decimal places, ties rounded away from zero (`34.03125` gives
/// `34.0313`, as `Number.toFixed(4)` does).
pub fn fixed4(value: f64) -> String {
    let scaled = (value * 10_000.0).round() / 10_000.0;
    format!("{scaled:.4}")
}

fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ProbeOutcome {
    Platform(LocationOutput),
    Deadline,
}

/// Arbitrates the race between the platform answer and the deadline.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationProbe {
    settled: bool,
}

impl LocationProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Returns the fix for the first outcome only.
    pub fn settle(&mut self, outcome: &ProbeOutcome) -> Option<LocationFix> {
        if self.settled {
            return None;
        }
        self.settled = true;

        let fix = match outcome {
            ProbeOutcome::Platform(output) => LocationFix::from_output(output),
            ProbeOutcome::Deadline => LocationFix::fallback(),
        };

        if !fix.is_gps() {
            warn!(outcome = ?outcome_kind(outcome), "location unavailable, using fallback fix");
        }

        Some(fix)
    }
}

fn outcome_kind(outcome: &ProbeOutcome) -> &'static str {
    match outcome {
        ProbeOutcome::Deadline => "deadline",
        ProbeOutcome::Platform(LocationOutput::Position { .. }) => "invalid_position",
        ProbeOutcome::Platform(LocationOutput::PermissionDenied) => "permission_denied",
        ProbeOutcome::Platform(LocationOutput::Unavailable) => "unavailable",
        ProbeOutcome::Platform(LocationOutput::TimedOut) => "timed_out",
        ProbeOutcome::Platform(LocationOutput::Unsupported) => "unsupported",
    }
}

/// Text for the report form's location field after a "locate me" request,
/// plus a notice to show when the default coordinates were substituted.
pub fn report_location_text(output: &LocationOutput) -> (String, Option<&'static str>) {
    match *output {
        LocationOutput::Position {
            latitude,
            longitude,
            ..
        } if is_valid_coordinate(latitude, longitude) => {
            (
                format!("{}, {} (Auto-detected)", fixed4(latitude), fixed4(longitude)),
                None,
            )
        }
        LocationOutput::Unsupported => (REPORT_UNSUPPORTED_TEXT.to_string(), None),
        _ => (
            REPORT_DEFAULT_LOCATION.to_string(),
            Some(REPORT_DENIED_NOTICE),
        ),
    }
}
