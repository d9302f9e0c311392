//! Composition root: wires adapters to ports and hands out the services.

use std::sync::Arc;

use futures_util::future::join_all;
use prometeo_shared::{HeatmapQuery, PageRequest};

use crate::application::mutations::{InvalidationPolicy, OptimisticMutator};
use crate::application::services::{
    AssistantService, ClientService, ContactService, MetricsService,
};
use crate::application::{Api, ApiQueryFetcher};
use crate::infrastructure::{ApiAdapter, DashboardConfig, QueryCache, WebhookAssistant};
use crate::ports::outbound::{AssistantPort, FetchError, RawApiPort};
use crate::ports::QueryKey;

/// Everything a dashboard front end needs, sharing one cache
#[derive(Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    cache: QueryCache,
    mutator: OptimisticMutator,
    pub clients: ClientService,
    pub metrics: MetricsService,
    pub contacts: ContactService,
    pub assistant: AssistantService,
}

impl Dashboard {
    /// Build the dashboard against the configured HTTP endpoints
    pub fn new(config: DashboardConfig) -> Self {
        let raw: Arc<dyn RawApiPort> = Arc::new(ApiAdapter::new(
            config.api_url.as_str(),
            config.request_timeout,
        ));
        let assistant = config.assistant_webhook_url.clone().map(|url| {
            Arc::new(WebhookAssistant::new(url, config.request_timeout)) as Arc<dyn AssistantPort>
        });
        Self::with_ports(config, raw, assistant)
    }

    /// Build the dashboard over arbitrary port implementations
    pub fn with_ports(
        config: DashboardConfig,
        raw: Arc<dyn RawApiPort>,
        assistant: Option<Arc<dyn AssistantPort>>,
    ) -> Self {
        let api = Api::new(raw);
        let cache = QueryCache::new(
            Arc::new(ApiQueryFetcher::new(api.clone())),
            config.cache_config(),
        );
        let mutator = OptimisticMutator::new(cache.clone(), InvalidationPolicy::default());

        Self {
            clients: ClientService::new(api.clone(), cache.clone(), mutator.clone()),
            metrics: MetricsService::new(cache.clone()),
            contacts: ContactService::new(api, cache.clone(), mutator.clone()),
            assistant: AssistantService::new(assistant),
            config,
            cache,
            mutator,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    /// First priority-list page at the configured page size
    pub fn first_page(&self) -> PageRequest {
        PageRequest::new(1, self.config.page_size)
    }

    /// Queries every dashboard view reads on load
    pub fn initial_queries(&self) -> Vec<QueryKey> {
        vec![
            QueryKey::PriorityList(self.first_page()),
            QueryKey::MetricsSummary,
            QueryKey::ProbabilityDistribution,
            QueryKey::ContactProgress,
            QueryKey::ClientsExport,
            QueryKey::HeatmapVariables,
            QueryKey::Heatmap(HeatmapQuery::default()),
        ]
    }

    /// Load the initial queries concurrently; one result per key
    pub async fn warm_up(&self) -> Vec<(QueryKey, Result<(), FetchError>)> {
        let keys = self.initial_queries();
        let results = join_all(keys.iter().map(|key| self.cache.fetch(key))).await;
        keys.into_iter()
            .zip(results)
            .map(|(key, result)| (key, result.map(drop)))
            .collect()
    }

    /// Drop pending mutations and dispose the cache
    pub fn shutdown(&self) {
        self.mutator.abandon_pending();
        self.cache.dispose();
        tracing::info!("Dashboard shut down");
    }
}
