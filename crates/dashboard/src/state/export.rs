//! Export panel filters over the export data set.
//!
//! Each filter is a multi-select; an empty selection matches every client.

use prometeo_domain::{Client, ClientPriority, ClientStatus};

/// Risk profiles offered by the panel
pub const RISK_PROFILE_OPTIONS: [&str; 3] = ["conservative", "moderate", "aggressive"];

pub const PRIORITY_OPTIONS: [ClientPriority; 3] = [
    ClientPriority::High,
    ClientPriority::Medium,
    ClientPriority::Low,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportFilter {
    pub statuses: Vec<ClientStatus>,
    pub risk_profiles: Vec<String>,
    pub priorities: Vec<ClientPriority>,
}

impl ExportFilter {
    pub fn toggle_status(&mut self, status: ClientStatus) {
        toggle(&mut self.statuses, status);
    }

    pub fn toggle_risk_profile(&mut self, profile: &str) {
        toggle(&mut self.risk_profiles, profile.to_string());
    }

    pub fn toggle_priority(&mut self, priority: ClientPriority) {
        toggle(&mut self.priorities, priority);
    }

    /// No filter selected, everything is exported
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.risk_profiles.is_empty() && self.priorities.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A client without a risk profile or priority never matches a
    /// non-empty selection on that field
    pub fn matches(&self, client: &Client) -> bool {
        let status = self.statuses.is_empty() || self.statuses.contains(&client.status);
        let risk = self.risk_profiles.is_empty()
            || client
                .risk_profile
                .as_ref()
                .is_some_and(|profile| self.risk_profiles.contains(profile));
        let priority = self.priorities.is_empty()
            || client
                .priority
                .is_some_and(|priority| self.priorities.contains(&priority));
        status && risk && priority
    }

    /// Clients to export, in their original order
    pub fn apply(&self, clients: &[Client]) -> Vec<Client> {
        clients
            .iter()
            .filter(|client| self.matches(client))
            .cloned()
            .collect()
    }
}

fn toggle<T: PartialEq>(selected: &mut Vec<T>, value: T) {
    match selected.iter().position(|v| *v == value) {
        Some(index) => {
            selected.remove(index);
        }
        None => selected.push(value),
    }
}
