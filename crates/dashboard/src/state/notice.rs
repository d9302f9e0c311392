//! Operator-facing notices for settled mutations

use prometeo_domain::ClientStatus;

use crate::application::mutations::MutationOutcome;

pub const STATUS_UPDATE_FAILED: &str = "Error al actualizar el estado del cliente";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationNotice {
    pub level: NoticeLevel,
    pub message: String,
}

impl MutationNotice {
    pub fn status_changed(status: ClientStatus) -> Self {
        let (icon, message) = match status {
            ClientStatus::Contacted => ("✓", "Cliente marcado como contactado"),
            ClientStatus::Followup => ("👁️", "Cliente en seguimiento"),
            ClientStatus::Converted => ("🎉", "¡Cliente convertido exitosamente!"),
            ClientStatus::Rejected => ("✗", "Cliente rechazado"),
            ClientStatus::Pending => ("✓", "Estado del cliente actualizado"),
        };
        Self {
            level: NoticeLevel::Success,
            message: format!("{} {}", icon, message),
        }
    }

    pub fn status_failed() -> Self {
        Self {
            level: NoticeLevel::Error,
            message: STATUS_UPDATE_FAILED.to_string(),
        }
    }

    /// Notice for a settled status change to `status`
    pub fn for_status_outcome(outcome: &MutationOutcome, status: ClientStatus) -> Self {
        if outcome.error().is_none() {
            Self::status_changed(status)
        } else {
            Self::status_failed()
        }
    }
}
