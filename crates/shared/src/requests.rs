//! Request bodies and query parameters for the dashboard REST API

use prometeo_domain::{ClientStatus, HeatmapMetric};
use serde::{Deserialize, Serialize};

/// Body of `PATCH /clients/{id}/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateClientStatusRequest {
    pub status: ClientStatus,
}

/// Body of `PUT /contacts/config`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactsConfigRequest {
    pub monthly_target: u64,
}

/// Page selector for the priority list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Index of the first row of this page in the full list
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize) * self.size as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 5 }
    }
}

/// Heat map pivot selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeatmapQuery {
    pub x: String,
    pub y: String,
    pub metric: HeatmapMetric,
}

impl Default for HeatmapQuery {
    fn default() -> Self {
        Self {
            x: "age".to_string(),
            y: "income_range".to_string(),
            metric: HeatmapMetric::Probability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_body_uses_wire_name() {
        let body = UpdateClientStatusRequest {
            status: ClientStatus::Followup,
        };
        assert_eq!(
            serde_json::to_value(&body).expect("serializable"),
            serde_json::json!({ "status": "followup" })
        );
    }

    #[test]
    fn page_request_clamps_to_first_page() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page, PageRequest { page: 1, size: 1 });
        assert_eq!(PageRequest::new(3, 5).offset(), 10);
    }
}
