//! Application services, one per dashboard view.

mod assistant_service;
mod client_service;
mod contact_service;
mod metrics_service;

pub use assistant_service::AssistantService;
pub use client_service::ClientService;
pub use contact_service::ContactService;
pub use metrics_service::MetricsService;
