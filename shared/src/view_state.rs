//! Which top-level view and which dashboard tab are showing.
//!
//! State is private to [`ViewStateMachine`]; every change goes through
//! [`ViewStateMachine::activate`] or [`ViewStateMachine::select_tab`], which
//! keeps exactly one view active and, on the dashboard, exactly one tab.

use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Landing,
    Report,
    Dashboard,
    Login,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardTab {
    #[default]
    Overview,
    Incidents,
    Inventory,
    Volunteers,
    Shelters,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 5] = [
        DashboardTab::Overview,
        DashboardTab::Incidents,
        DashboardTab::Inventory,
        DashboardTab::Volunteers,
        DashboardTab::Shelters,
    ];

    pub const fn title(self) -> &'static str {
        match self {
            Self::Overview => "Command Overview",
            Self::Incidents => "Incident Log",
            Self::Inventory => "Supply Inventory",
            Self::Volunteers => "Volunteer Network",
            Self::Shelters => "Relief Camps",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewStateMachine {
    active: View,
    last_tab: DashboardTab,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_view(&self) -> View {
        self.active
    }

    /// `Some` only while the dashboard is the active view.
    pub fn active_tab(&self) -> Option<DashboardTab> {
        (self.active == View::Dashboard).then_some(self.last_tab)
    }

    /// The tab the dashboard resumes on.
    pub fn last_tab(&self) -> DashboardTab {
        self.last_tab
    }

    /// Switches to `target`. Returns the tab that now needs a refresh, which
    /// is every time the dashboard is the target, including when it already
    /// was active.
    pub fn activate(&mut self, target: View) -> Option<DashboardTab> {
        if self.active != target {
            info!(from = ?self.active, to = ?target, "view activated");
        }
        self.active = target;
        self.active_tab()
    }

    /// Selecting a tab implies the dashboard view. Always returns the tab to
    /// refresh, even when it was already selected.
    pub fn select_tab(&mut self, tab: DashboardTab) -> DashboardTab {
        if self.active != View::Dashboard || self.last_tab != tab {
            info!(tab = ?tab, "dashboard tab activated");
        }
        self.active = View::Dashboard;
        self.last_tab = tab;
        tab
    }
}
