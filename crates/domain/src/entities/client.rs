//! Priority-list client records
//!
//! A `Client` is one row of the priority list returned by the backend. The
//! probability score and the status are validated on deserialization so the
//! rest of the crate can rely on their invariants.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::ids::ClientId;

/// Contact status of a client in the outreach workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClientStatus {
    /// Not contacted yet
    #[default]
    Pending,
    /// Reached at least once
    Contacted,
    /// Waiting on a follow-up action
    Followup,
    /// Bought a product
    Converted,
    /// Declined the offer
    Rejected,
}

impl ClientStatus {
    /// All statuses in workflow order, for status menus
    pub fn all() -> &'static [ClientStatus] {
        &[
            ClientStatus::Pending,
            ClientStatus::Contacted,
            ClientStatus::Followup,
            ClientStatus::Converted,
            ClientStatus::Rejected,
        ]
    }

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Pending => "pending",
            ClientStatus::Contacted => "contacted",
            ClientStatus::Followup => "followup",
            ClientStatus::Converted => "converted",
            ClientStatus::Rejected => "rejected",
        }
    }

    /// Label shown in the status menu
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Pending => "Pendiente",
            ClientStatus::Contacted => "Contactado",
            ClientStatus::Followup => "Seguimiento",
            ClientStatus::Converted => "Convertido",
            ClientStatus::Rejected => "Rechazado",
        }
    }

    /// Whether the client counts as reached for outreach metrics
    pub fn is_contacted(&self) -> bool {
        !matches!(self, ClientStatus::Pending)
    }
}

impl fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ClientStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ClientStatus::Pending),
            "contacted" => Ok(ClientStatus::Contacted),
            "followup" => Ok(ClientStatus::Followup),
            "converted" => Ok(ClientStatus::Converted),
            "rejected" => Ok(ClientStatus::Rejected),
            _ => Err(DomainError::parse(format!("Unknown client status: {}", s))),
        }
    }
}

/// Priority tier assigned by the scoring model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientPriority {
    High,
    Medium,
    Low,
}

impl ClientPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientPriority::High => "high",
            ClientPriority::Medium => "medium",
            ClientPriority::Low => "low",
        }
    }
}

impl fmt::Display for ClientPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Conversion probability in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Probability(f64);

impl Probability {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::out_of_range("probability", value))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Whole-number percentage for display
    pub fn percent(&self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl TryFrom<f64> for Probability {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Probability> for f64 {
    fn from(value: Probability) -> Self {
        value.0
    }
}

/// One row of the priority list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    pub user_id: String,
    pub probability: Probability,
    pub status: ClientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_profile: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<ClientPriority>,
}

impl Client {
    /// Copy of this client with a different status
    pub fn with_status(&self, status: ClientStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

/// Replace the status of `id` inside a page, leaving every other row and the
/// row order untouched. Returns `None` when the client is not on the page.
pub fn set_client_status(
    clients: &[Client],
    id: ClientId,
    status: ClientStatus,
) -> Option<Vec<Client>> {
    if !clients.iter().any(|c| c.id == id) {
        return None;
    }
    Some(
        clients
            .iter()
            .map(|c| if c.id == id { c.with_status(status) } else { c.clone() })
            .collect(),
    )
}
