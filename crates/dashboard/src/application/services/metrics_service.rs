//! Metrics Service - KPI cards, distribution chart and heat map

use prometeo_domain::{Heatmap, HeatmapVariables, MetricsSummary, ProbabilityDistribution};
use prometeo_shared::HeatmapQuery;

use crate::application::ServiceError;
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::ports::{QueryData, QueryKey};

/// Read-only aggregate queries. Each has a non-blocking `*_state` read for
/// rendering and an awaitable variant.
#[derive(Clone)]
pub struct MetricsService {
    cache: QueryCache,
}

impl MetricsService {
    pub fn new(cache: QueryCache) -> Self {
        Self { cache }
    }

    pub fn summary_state(&self) -> QueryState {
        self.cache.read(&QueryKey::MetricsSummary)
    }

    pub fn distribution_state(&self) -> QueryState {
        self.cache.read(&QueryKey::ProbabilityDistribution)
    }

    pub fn heatmap_state(&self, query: HeatmapQuery) -> QueryState {
        self.cache.read(&QueryKey::Heatmap(query))
    }

    pub fn heatmap_variables_state(&self) -> QueryState {
        self.cache.read(&QueryKey::HeatmapVariables)
    }

    pub async fn summary(&self) -> Result<MetricsSummary, ServiceError> {
        self.load(QueryKey::MetricsSummary).await
    }

    pub async fn distribution(&self) -> Result<ProbabilityDistribution, ServiceError> {
        self.load(QueryKey::ProbabilityDistribution).await
    }

    pub async fn heatmap(&self, query: HeatmapQuery) -> Result<Heatmap, ServiceError> {
        self.load(QueryKey::Heatmap(query)).await
    }

    pub async fn heatmap_variables(&self) -> Result<HeatmapVariables, ServiceError> {
        self.load(QueryKey::HeatmapVariables).await
    }

    async fn load<T>(&self, key: QueryKey) -> Result<T, ServiceError>
    where
        T: TryFrom<QueryData, Error = QueryData>,
    {
        let data = self.cache.fetch(&key).await?;
        ServiceError::expect_data(&key, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::CacheConfig;
    use crate::infrastructure::retry::RetryConfig;
    use crate::ports::outbound::{ApiError, FetchError, MockQueryFetcher};
    use prometeo_domain::HeatmapMetric;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn cache(fetcher: MockQueryFetcher) -> QueryCache {
        QueryCache::new(
            Arc::new(fetcher),
            CacheConfig {
                retry: RetryConfig::none(),
                ..CacheConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn heatmap_is_keyed_by_axes_and_metric() {
        let mut fetcher = MockQueryFetcher::new();
        fetcher
            .expect_fetch()
            .withf(|key| matches!(key, QueryKey::Heatmap(q) if q.metric == HeatmapMetric::Count))
            .times(1)
            .returning(|_| {
                Ok(QueryData::Heatmap(Heatmap {
                    x_categories: vec!["18-30".into()],
                    y_categories: vec!["bajo".into()],
                    values: vec![vec![4.0]],
                }))
            });
        let service = MetricsService::new(cache(fetcher));

        let query = HeatmapQuery {
            metric: HeatmapMetric::Count,
            ..HeatmapQuery::default()
        };
        let heatmap = service.heatmap(query.clone()).await.expect("heatmap");
        assert_eq!(heatmap.cell(0, 0), Some(4.0));

        // Second read is served from the cache
        assert!(matches!(
            service.heatmap_state(query),
            QueryState::Ready { stale: false, .. }
        ));
    }

    #[tokio::test]
    async fn failures_surface_as_fetch_errors() {
        let mut fetcher = MockQueryFetcher::new();
        fetcher
            .expect_fetch()
            .returning(|_| Err(FetchError::Api(ApiError::http(503, "unavailable"))));
        let service = MetricsService::new(cache(fetcher));

        let error = service.summary().await.expect_err("should fail");
        assert_eq!(
            error,
            ServiceError::Fetch(FetchError::Api(ApiError::http(503, "unavailable")))
        );
        assert!(service.summary_state().error().is_some());
    }

    #[tokio::test]
    async fn variables_hide_priority_axis() {
        let mut fetcher = MockQueryFetcher::new();
        fetcher.expect_fetch().times(1).returning(|_| {
            Ok(QueryData::HeatmapVariables(HeatmapVariables {
                variables: vec!["age".into(), "priority".into(), "income_range".into()],
                categories: BTreeMap::new(),
            }))
        });
        let service = MetricsService::new(cache(fetcher));

        let variables = service.heatmap_variables().await.expect("variables");
        assert_eq!(variables.axis_choices(), vec!["age", "income_range"]);
    }
}
