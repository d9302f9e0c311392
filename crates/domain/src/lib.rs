//! Prometeo domain vocabulary: client records and backend aggregates.

pub mod entities;
pub mod error;
pub mod ids;

pub use entities::{
    set_client_status, Client, ClientPriority, ClientStatus, ContactProgress, Heatmap,
    HeatmapMetric, HeatmapVariables, MetricsSummary, Probability, ProbabilityBucket,
    ProbabilityDistribution,
};
pub use error::DomainError;
pub use ids::ClientId;
