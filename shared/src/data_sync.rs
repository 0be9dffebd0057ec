//! Read-only refresh of dashboard data.
//!
//! Each resource is fetched with one GET. A good response replaces the whole
//! snapshot for that resource; anything else is logged and the previous
//! snapshot stays on screen. Responses are applied in arrival order, so when
//! two refreshes race the later response wins.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::capabilities::{settle, ApiUrl, Http, HttpError, HttpOutcome};
use crate::view_state::DashboardTab;
use crate::{
    INCIDENTS_PATH, INVENTORY_PATH, SHELTERS_PATH, STATS_PATH, VOLUNTEERS_PATH,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Stats,
    Incidents,
    Inventory,
    Volunteers,
    Shelters,
}

impl Resource {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Stats => STATS_PATH,
            Self::Incidents => INCIDENTS_PATH,
            Self::Inventory => INVENTORY_PATH,
            Self::Volunteers => VOLUNTEERS_PATH,
            Self::Shelters => SHELTERS_PATH,
        }
    }

    /// Resources backing a dashboard tab. The overview shows the headline
    /// stats and the most recent incidents.
    pub const fn for_tab(tab: DashboardTab) -> &'static [Resource] {
        match tab {
            DashboardTab::Overview => &[Resource::Stats, Resource::Incidents],
            DashboardTab::Incidents => &[Resource::Incidents],
            DashboardTab::Inventory => &[Resource::Inventory],
            DashboardTab::Volunteers => &[Resource::Volunteers],
            DashboardTab::Shelters => &[Resource::Shelters],
        }
    }
}

/// The service reports some counters as preformatted text ("1.2k+").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(i64),
    Text(String),
}

impl Default for StatValue {
    fn default() -> Self {
        StatValue::Count(0)
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub volunteers: StatValue,
    pub camps: StatValue,
    pub resources: StatValue,
    pub critical_alerts: StatValue,
    pub active_incidents: StatValue,
    pub resolved_24h: StatValue,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: String,
    pub severity: String,
    #[serde(default)]
    pub status: String,
    /// Service time in UTC, `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media_path: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub category: String,
    pub item: String,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub name: String,
    pub skill: String,
    pub availability: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub name: String,
    pub location: String,
    pub occupied: u32,
    pub capacity: u32,
}

impl Shelter {
    pub fn occupancy_percent(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        (f64::from(self.occupied) / f64::from(self.capacity) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    #[error("{resource:?} request failed: {source}")]
    Transport {
        resource: Resource,
        #[source]
        source: HttpError,
    },

    #[error("{resource:?} request returned HTTP {status}")]
    Status { resource: Resource, status: u16 },

    #[error("{resource:?} response could not be decoded: {reason}")]
    Decode { resource: Resource, reason: String },
}

/// The last good data for every resource, plus when the dashboard was last
/// shown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshots {
    pub stats: Option<Stats>,
    pub incidents: Option<Vec<IncidentRecord>>,
    pub inventory: Option<Vec<InventoryItem>>,
    pub volunteers: Option<Vec<Volunteer>>,
    pub shelters: Option<Vec<Shelter>>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Snapshots {
    /// Replaces the snapshot for `resource` on success. On failure the
    /// previous snapshot is kept and the error is returned for logging.
    pub fn apply(&mut self, resource: Resource, outcome: HttpOutcome) -> Result<(), SyncError> {
        let response = outcome.map_err(|source| SyncError::Transport { resource, source })?;

        if !response.is_success() {
            return Err(SyncError::Status {
                resource,
                status: response.status,
            });
        }

        let decode = |e: HttpError| SyncError::Decode {
            resource,
            reason: e.to_string(),
        };

        match resource {
            Resource::Stats => self.stats = Some(response.json().map_err(decode)?),
            Resource::Incidents => self.incidents = Some(response.json().map_err(decode)?),
            Resource::Inventory => self.inventory = Some(response.json().map_err(decode)?),
            Resource::Volunteers => self.volunteers = Some(response.json().map_err(decode)?),
            Resource::Shelters => self.shelters = Some(response.json().map_err(decode)?),
        }

        debug!(resource = ?resource, "snapshot replaced");
        Ok(())
    }
}

pub struct DataSyncService;

impl DataSyncService {
    /// Issues one read per resource behind `tab`.
    pub fn refresh<Ev>(
        http: &Http<Ev>,
        api_base: &str,
        tab: DashboardTab,
        make_event: fn(Resource, HttpOutcome) -> Ev,
    ) where
        Ev: Send + 'static,
    {
        for resource in Resource::for_tab(tab) {
            Self::fetch(http, api_base, *resource, make_event);
        }
    }

    pub fn fetch<Ev>(
        http: &Http<Ev>,
        api_base: &str,
        resource: Resource,
        make_event: fn(Resource, HttpOutcome) -> Ev,
    ) where
        Ev: Send + 'static,
    {
        match ApiUrl::join(api_base, resource.path()) {
            Ok(url) => http
                .get(url.as_str())
                .header("Accept", "application/json")
                .send(move |result| make_event(resource, settle(result))),
            Err(e) => warn!(resource = ?resource, error = %e, "refresh skipped"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeStyle {
    /// `HH:MM`
    Short,
    /// `YYYY-MM-DD HH:MM:SS`
    Full,
}

fn local_offset(offset_minutes: i32) -> FixedOffset {
    FixedOffset::east_opt(offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix())
}

/// Formats a service timestamp in the shell's local time. Unparseable input
/// is shown as-is.
pub fn format_service_time(raw: &str, offset_minutes: i32, style: TimeStyle) -> String {
    let parsed = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"));

    let Ok(naive) = parsed else {
        return raw.to_string();
    };

    let local = Utc.from_utc_datetime(&naive).with_timezone(&local_offset(offset_minutes));
    match style {
        TimeStyle::Short => local.format("%H:%M").to_string(),
        TimeStyle::Full => local.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

/// `Sync: HH:MM:SS` in local time.
pub fn format_sync_stamp(at: DateTime<Utc>, offset_minutes: i32) -> String {
    format!(
        "Sync: {}",
        at.with_timezone(&local_offset(offset_minutes)).format("%H:%M:%S")
    )
}
