//! REST paths, relative to the API base URL

use prometeo_domain::ClientId;

use crate::requests::{HeatmapQuery, PageRequest};

pub const METRICS_SUMMARY: &str = "/metrics/summary";
pub const PROBABILITY_DISTRIBUTION: &str = "/metrics/probability-distribution";
pub const HEATMAP_VARIABLES: &str = "/metrics/heatmap/variables";
pub const CONTACT_PROGRESS: &str = "/contacts/progress";
pub const CONTACTS_CONFIG: &str = "/contacts/config";

/// Rows fetched for the export panel, in one page
pub const CLIENTS_EXPORT_SIZE: u32 = 100;

pub fn priority_list(page: PageRequest) -> String {
    format!("/clients/priority-list?page={}&size={}", page.page, page.size)
}

/// Export data set: the first `CLIENTS_EXPORT_SIZE` rows of the priority list
pub fn clients_export() -> String {
    priority_list(PageRequest::new(1, CLIENTS_EXPORT_SIZE))
}

pub fn client_status(id: ClientId) -> String {
    format!("/clients/{}/status", id)
}

pub fn heatmap(query: &HeatmapQuery) -> String {
    format!(
        "/metrics/heatmap?x={}&y={}&metric={}",
        encode_component(&query.x),
        encode_component(&query.y),
        query.metric.as_str()
    )
}

fn encode_component(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
