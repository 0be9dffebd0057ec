use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::capabilities::{Capabilities, HttpOutcome};
use crate::data_sync::{
    format_service_time, format_sync_stamp, DataSyncService, IncidentRecord, Resource, Stats,
    TimeStyle,
};
use crate::event::Event;
use crate::location::ProbeOutcome;
use crate::model::Model;
use crate::report::ReportCommand;
use crate::sos::{SosCommand, SosPhase};
use crate::transport::{AlertTransport, IncidentKind, Severity};
use crate::view_state::{DashboardTab, View};

// --- View model ---

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsView {
    pub volunteers: String,
    pub camps: String,
    pub resources: String,
    pub critical_alerts: String,
    pub active_incidents: String,
    pub resolved_24h: String,
}

impl From<&Stats> for StatsView {
    fn from(stats: &Stats) -> Self {
        Self {
            volunteers: stats.volunteers.to_string(),
            camps: stats.camps.to_string(),
            resources: stats.resources.to_string(),
            critical_alerts: stats.critical_alerts.to_string(),
            active_incidents: stats.active_incidents.to_string(),
            resolved_24h: stats.resolved_24h.to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecentIncidentView {
    pub icon: String,
    /// `high` for high and critical severities, `med` otherwise.
    pub badge: String,
    pub heading: String,
    pub time: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentRowView {
    pub reported_at: String,
    pub kind: String,
    pub location: String,
    pub severity: String,
    /// `urgent` for critical incidents, `pending` otherwise.
    pub badge: String,
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryCardView {
    pub category: String,
    pub quantity: String,
    pub item: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VolunteerRowView {
    pub name: String,
    pub skill: String,
    pub availability: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShelterRowView {
    pub name: String,
    pub location: String,
    pub occupancy: String,
    pub percent_full: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabContent {
    Overview {
        stats: Option<StatsView>,
        recent: Vec<RecentIncidentView>,
    },
    Incidents {
        rows: Vec<IncidentRowView>,
    },
    Inventory {
        cards: Vec<InventoryCardView>,
    },
    Volunteers {
        rows: Vec<VolunteerRowView>,
    },
    Shelters {
        rows: Vec<ShelterRowView>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DashboardView {
    pub tab: DashboardTab,
    pub title: String,
    pub sync_stamp: Option<String>,
    pub content: TabContent,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SosView {
    pub phase: SosPhase,
    pub overlay_visible: bool,
    pub status_message: String,
    pub trigger_label: String,
    pub trigger_enabled: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportView {
    pub kind: IncidentKind,
    pub severity: Severity,
    pub location: String,
    pub description: String,
    pub media_label: String,
    pub submit_label: String,
    pub submit_enabled: bool,
    pub locating: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub active_view: View,
    pub nav_menu_open: bool,
    pub landing_stats: Option<StatsView>,
    pub dashboard: Option<DashboardView>,
    pub report: ReportView,
    pub sos: SosView,
    pub notice: Option<String>,
}

// --- App ---

#[derive(Default)]
pub struct App;

fn snapshot_fetched(resource: Resource, result: HttpOutcome) -> Event {
    Event::SnapshotFetched {
        resource,
        result: Box::new(result),
    }
}

impl App {
    /// Activates `view`. Showing the dashboard refreshes its tab and moves
    /// the sync stamp.
    fn show_view(view: View, model: &mut Model, caps: &Capabilities) {
        model.nav_menu_open = false;
        if let Some(tab) = model.views.activate(view) {
            model.snapshots.last_synced_at = Some(model.now);
            Self::sync_tab(tab, model, caps);
        }
    }

    fn sync_tab(tab: DashboardTab, model: &Model, caps: &Capabilities) {
        DataSyncService::refresh(&caps.http, &model.config.api_base, tab, snapshot_fetched);
    }

    fn run_sos(commands: Vec<SosCommand>, model: &mut Model, caps: &Capabilities) {
        for command in commands {
            match command {
                SosCommand::AcquireLocation {
                    session,
                    timeout_ms,
                } => caps
                    .location
                    .current_position(Some(timeout_ms), move |output| {
                        Event::SosLocationResolved { session, output }
                    }),

                SosCommand::ArmLocationDeadline { session, millis } => caps
                    .timer
                    .after(millis, Event::SosLocationDeadline { session }),

                SosCommand::SubmitAlert { session, payload } => {
                    let sent = AlertTransport::submit(
                        &caps.http,
                        &model.config.api_base,
                        &payload,
                        move |result| Event::SosAlertSubmitted {
                            session,
                            result: Box::new(result),
                        },
                    );
                    if let Err(e) = sent {
                        let device = model.device_class();
                        let next = model.sos.alert_completed(session, Err(e), device, &model.config);
                        Self::run_sos(next, model, caps);
                    }
                }

                SosCommand::ScheduleSmsHandoff { session, millis } => caps
                    .timer
                    .after(millis, Event::SosSmsHandoffDue { session }),

                SosCommand::ScheduleRecovery { session, millis } => caps
                    .timer
                    .after(millis, Event::SosRecoveryDue { session }),

                SosCommand::OpenSms { href } => caps.navigate.open(href),

                SosCommand::ShowDashboard => Self::show_view(View::Dashboard, model, caps),
            }
        }
    }

    fn run_report(commands: Vec<ReportCommand>, model: &mut Model, caps: &Capabilities) {
        for command in commands {
            match command {
                ReportCommand::Submit { attempt, payload } => {
                    let sent = AlertTransport::submit(
                        &caps.http,
                        &model.config.api_base,
                        &payload,
                        move |result| Event::ReportSubmitCompleted {
                            attempt,
                            result: Box::new(result),
                        },
                    );
                    if let Err(e) = sent {
                        let next = model.report.submit_completed(attempt, Err(e), &model.config);
                        Self::run_report(next, model, caps);
                    }
                }

                ReportCommand::ScheduleRecovery { attempt, millis } => caps
                    .timer
                    .after(millis, Event::ReportRecoveryDue { attempt }),

                ReportCommand::ShowDashboard => Self::show_view(View::Dashboard, model, caps),
            }
        }
    }

    fn recent_incident(record: &IncidentRecord, offset_minutes: i32) -> RecentIncidentView {
        let high = Severity::parse(&record.severity).is_some_and(Severity::is_urgent);
        RecentIncidentView {
            icon: IncidentKind::parse(&record.kind).icon().to_string(),
            badge: if high { "high" } else { "med" }.to_string(),
            heading: format!("{} - {}", record.kind, record.location),
            time: format_service_time(&record.timestamp, offset_minutes, TimeStyle::Short),
        }
    }

    fn incident_row(record: &IncidentRecord, offset_minutes: i32) -> IncidentRowView {
        let urgent = Severity::parse(&record.severity) == Some(Severity::Critical);
        IncidentRowView {
            reported_at: format_service_time(&record.timestamp, offset_minutes, TimeStyle::Full),
            kind: capitalize(&record.kind),
            location: record.location.clone(),
            severity: record.severity.clone(),
            badge: if urgent { "urgent" } else { "pending" }.to_string(),
            status: record.status.clone(),
        }
    }

    fn tab_content(tab: DashboardTab, model: &Model) -> TabContent {
        let snapshots = &model.snapshots;
        let offset = model.platform.utc_offset_minutes;

        match tab {
            DashboardTab::Overview => TabContent::Overview {
                stats: snapshots.stats.as_ref().map(StatsView::from),
                recent: snapshots
                    .incidents
                    .iter()
                    .flatten()
                    .take(model.config.recent_incident_count)
                    .map(|r| Self::recent_incident(r, offset))
                    .collect(),
            },
            DashboardTab::Incidents => TabContent::Incidents {
                rows: snapshots
                    .incidents
                    .iter()
                    .flatten()
                    .map(|r| Self::incident_row(r, offset))
                    .collect(),
            },
            DashboardTab::Inventory => TabContent::Inventory {
                cards: snapshots
                    .inventory
                    .iter()
                    .flatten()
                    .map(|i| InventoryCardView {
                        category: i.category.clone(),
                        quantity: i.quantity.to_string(),
                        item: i.item.clone(),
                    })
                    .collect(),
            },
            DashboardTab::Volunteers => TabContent::Volunteers {
                rows: snapshots
                    .volunteers
                    .iter()
                    .flatten()
                    .map(|v| VolunteerRowView {
                        name: v.name.clone(),
                        skill: format!("{} Expert", v.skill),
                        availability: v.availability.clone(),
                    })
                    .collect(),
            },
            DashboardTab::Shelters => TabContent::Shelters {
                rows: snapshots
                    .shelters
                    .iter()
                    .flatten()
                    .map(|s| ShelterRowView {
                        name: s.name.clone(),
                        location: s.location.clone(),
                        occupancy: format!("{}/{}", s.occupied, s.capacity),
                        percent_full: format!("{}% Full", s.occupancy_percent()),
                    })
                    .collect(),
            },
        }
    }
}

/// Uppercases the first letter of each word.
fn capitalize(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        model.update_timestamp();

        let event_name = event.name();
        if event.is_user_initiated() {
            debug!(event = event_name, "user action");
        } else {
            trace!(event = event_name, "event");
        }

        match event {
            Event::AppStarted { config, platform } => {
                model.config = *config;
                model.platform = platform;
                DataSyncService::fetch(
                    &caps.http,
                    &model.config.api_base,
                    Resource::Stats,
                    snapshot_fetched,
                );
                caps.render.render();
            }

            Event::ViewportResized { viewport_width } => {
                model.platform.viewport_width = viewport_width;
                caps.render.render();
            }

            Event::Navigate(view) => {
                Self::show_view(view, model, caps);
                caps.render.render();
            }

            Event::SelectTab(tab) => {
                model.nav_menu_open = false;
                let tab = model.views.select_tab(tab);
                Self::sync_tab(tab, model, caps);
                caps.render.render();
            }

            Event::SyncRequested => {
                if let Some(tab) = model.views.active_tab() {
                    Self::sync_tab(tab, model, caps);
                    caps.render.render();
                }
            }

            Event::ToggleNavMenu => {
                model.nav_menu_open = !model.nav_menu_open;
                caps.render.render();
            }

            Event::DismissNotice => {
                model.clear_notice();
                caps.render.render();
            }

            Event::SnapshotFetched { resource, result } => {
                if let Err(e) = model.snapshots.apply(resource, *result) {
                    warn!(resource = ?resource, error = %e, "refresh failed, keeping previous snapshot");
                }
                caps.render.render();
            }

            Event::SosTriggered => {
                let commands = model.sos.trigger(model.now, &model.config);
                Self::run_sos(commands, model, caps);
                caps.render.render();
            }

            Event::SosLocationResolved { session, output } => {
                let commands = model
                    .sos
                    .location_settled(session, ProbeOutcome::Platform(output));
                Self::run_sos(commands, model, caps);
                caps.render.render();
            }

            Event::SosLocationDeadline { session } => {
                let commands = model.sos.location_settled(session, ProbeOutcome::Deadline);
                Self::run_sos(commands, model, caps);
                caps.render.render();
            }

            Event::SosAlertSubmitted { session, result } => {
                let device = model.device_class();
                let commands = model
                    .sos
                    .alert_completed(session, *result, device, &model.config);
                Self::run_sos(commands, model, caps);
                caps.render.render();
            }

            Event::SosSmsHandoffDue { session } => {
                let commands = model.sos.sms_handoff_due(session, &model.config);
                Self::run_sos(commands, model, caps);
            }

            Event::SosRecoveryDue { session } => {
                let commands = model.sos.recovery_due(session);
                Self::run_sos(commands, model, caps);
                caps.render.render();
            }

            Event::ReportKindSelected(kind) => {
                model.report.draft.kind = kind;
                caps.render.render();
            }

            Event::ReportSeveritySelected(severity) => {
                model.report.draft.severity = severity;
                caps.render.render();
            }

            Event::ReportLocationEdited(location) => {
                model.report.draft.location = location;
                caps.render.render();
            }

            Event::ReportDescriptionEdited(description) => {
                model.report.draft.description = description;
                caps.render.render();
            }

            Event::ReportMediaAttached(media) => {
                model.report.draft.media = Some(*media);
                caps.render.render();
            }

            Event::ReportMediaCleared => {
                model.report.draft.media = None;
                caps.render.render();
            }

            Event::ReportLocateRequested => {
                model.report.locate_requested();
                caps.location.current_position(
                    Some(model.config.location_timeout_ms),
                    Event::ReportLocateResolved,
                );
                caps.render.render();
            }

            Event::ReportLocateResolved(output) => {
                if let Some(notice) = model.report.locate_resolved(&output) {
                    model.show_notice(notice);
                }
                caps.render.render();
            }

            Event::ReportSubmitted => {
                let commands = model.report.submit();
                Self::run_report(commands, model, caps);
                caps.render.render();
            }

            Event::ReportSubmitCompleted { attempt, result } => {
                let commands = model
                    .report
                    .submit_completed(attempt, *result, &model.config);
                Self::run_report(commands, model, caps);
                caps.render.render();
            }

            Event::ReportRecoveryDue { attempt } => {
                let commands = model.report.recovery_due(attempt);
                Self::run_report(commands, model, caps);
                caps.render.render();
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let dashboard = model.views.active_tab().map(|tab| DashboardView {
            tab,
            title: tab.title().to_string(),
            sync_stamp: model
                .snapshots
                .last_synced_at
                .map(|at| format_sync_stamp(at, model.platform.utc_offset_minutes)),
            content: Self::tab_content(tab, model),
        });

        let sos = &model.sos;
        let report = &model.report;

        ViewModel {
            active_view: model.views.active_view(),
            nav_menu_open: model.nav_menu_open,
            landing_stats: model.snapshots.stats.as_ref().map(StatsView::from),
            dashboard,
            report: ReportView {
                kind: report.draft.kind,
                severity: report.draft.severity,
                location: report.draft.location.clone(),
                description: report.draft.description.clone(),
                media_label: report.draft.media_label(),
                submit_label: report.state().label().to_string(),
                submit_enabled: report.state().accepts_submit(),
                locating: report.is_locating(),
                error: report.error().map(str::to_string),
            },
            sos: SosView {
                phase: sos.phase(),
                overlay_visible: sos.overlay_visible(),
                status_message: sos.status_message().to_string(),
                trigger_label: sos.trigger_label().to_string(),
                trigger_enabled: !sos.phase().is_in_flight(),
            },
            notice: model.notice.clone(),
        }
    }
}
