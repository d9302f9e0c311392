//! Domain entities

mod client;
mod metrics;

pub use client::{set_client_status, Client, ClientPriority, ClientStatus, Probability};
pub use metrics::{
    ContactProgress, Heatmap, HeatmapMetric, HeatmapVariables, MetricsSummary,
    ProbabilityBucket, ProbabilityDistribution,
};
