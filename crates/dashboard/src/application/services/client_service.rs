//! Client Service - priority list reads and status changes

use prometeo_domain::{set_client_status, Client, ClientId, ClientStatus};
use prometeo_shared::{routes, PageRequest, UpdateClientStatusRequest};

use crate::application::api::Api;
use crate::application::mutations::{MutationKind, MutationOutcome, OptimisticMutator};
use crate::application::ServiceError;
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::ports::{QueryData, QueryKey};

/// Priority-list queries and the optimistic status update
#[derive(Clone)]
pub struct ClientService {
    api: Api,
    cache: QueryCache,
    mutator: OptimisticMutator,
}

impl ClientService {
    pub fn new(api: Api, cache: QueryCache, mutator: OptimisticMutator) -> Self {
        Self {
            api,
            cache,
            mutator,
        }
    }

    /// Cached state of one priority-list page
    pub fn priority_list(&self, page: PageRequest) -> QueryState {
        self.cache.read(&QueryKey::PriorityList(page))
    }

    pub async fn fetch_priority_list(
        &self,
        page: PageRequest,
    ) -> Result<Vec<Client>, ServiceError> {
        let key = QueryKey::PriorityList(page);
        let data = self.cache.fetch(&key).await?;
        ServiceError::expect_data(&key, data)
    }

    /// Cached state of the export panel's data set
    pub fn export_state(&self) -> QueryState {
        self.cache.read(&QueryKey::ClientsExport)
    }

    /// Clients available for export, before any panel filter is applied
    pub async fn fetch_export(&self) -> Result<Vec<Client>, ServiceError> {
        let key = QueryKey::ClientsExport;
        let data = self.cache.fetch(&key).await?;
        ServiceError::expect_data(&key, data)
    }

    /// Change one client's status on `page`, optimistically.
    ///
    /// The row is updated in the cached page before the PATCH goes out. On
    /// success the page, the aggregates and the contact progress are
    /// invalidated; on failure the page is restored.
    pub async fn update_status(
        &self,
        page: PageRequest,
        client_id: ClientId,
        status: ClientStatus,
    ) -> MutationOutcome {
        let api = self.api.clone();
        let path = routes::client_status(client_id);
        let body = UpdateClientStatusRequest { status };

        tracing::info!(
            client_id = %client_id,
            status = status.as_str(),
            "Updating client status"
        );
        self.mutator
            .mutate(
                MutationKind::ClientStatus,
                QueryKey::PriorityList(page),
                move |data| {
                    set_client_status(data.as_clients()?, client_id, status)
                        .map(QueryData::Clients)
                },
                move || async move { api.patch_no_response(&path, &body).await },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fetcher::ApiQueryFetcher;
    use crate::application::mutations::InvalidationPolicy;
    use crate::infrastructure::cache::CacheConfig;
    use crate::infrastructure::retry::RetryConfig;
    use crate::infrastructure::testing::{sample_progress, sample_summary};
    use crate::ports::outbound::{ApiError, MockRawApiPort};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn page() -> PageRequest {
        PageRequest::new(1, 5)
    }

    fn page_json() -> serde_json::Value {
        json!([
            { "id": 42, "user_id": "U0042", "probability": 0.87, "status": "pending" },
            { "id": 7, "user_id": "U0007", "probability": 0.55, "status": "contacted" }
        ])
    }

    fn service(raw: MockRawApiPort) -> (ClientService, QueryCache) {
        let api = Api::new(Arc::new(raw));
        let fetcher = Arc::new(ApiQueryFetcher::new(api.clone()));
        let cache = QueryCache::new(
            fetcher,
            CacheConfig {
                retry: RetryConfig::none(),
                event_capacity: 64,
                ..CacheConfig::uniform(Duration::from_secs(300))
            },
        );
        let mutator = OptimisticMutator::new(cache.clone(), InvalidationPolicy::default());
        (ClientService::new(api, cache.clone(), mutator), cache)
    }

    fn expect_reads(raw: &mut MockRawApiPort) {
        raw.expect_get_json()
            .withf(|path| path == "/clients/priority-list?page=1&size=5")
            .returning(|_| Ok(page_json()));
        raw.expect_get_json()
            .withf(|path| path == "/metrics/summary")
            .returning(|_| Ok(serde_json::to_value(sample_summary()).expect("summary")));
        raw.expect_get_json()
            .withf(|path| path == "/metrics/probability-distribution")
            .returning(|_| Ok(json!({ "buckets": [], "threshold": 0.5 })));
        raw.expect_get_json()
            .withf(|path| path == "/contacts/progress")
            .returning(|_| Ok(serde_json::to_value(sample_progress()).expect("progress")));
    }

    fn status_of_42(cache: &QueryCache) -> Option<ClientStatus> {
        cache
            .peek(&QueryKey::PriorityList(page()))?
            .as_clients()?
            .iter()
            .find(|c| c.id == ClientId::new(42))
            .map(|c| c.status)
    }

    #[tokio::test]
    async fn contacting_a_client_commits_and_refreshes_dependents() {
        let mut raw = MockRawApiPort::new();
        expect_reads(&mut raw);
        raw.expect_patch_json()
            .withf(|path, body| {
                path == "/clients/42/status" && body == &json!({ "status": "contacted" })
            })
            .times(1)
            .returning(|_, _| Ok(json!({ "ok": true })));
        let (service, cache) = service(raw);

        service.fetch_priority_list(page()).await.expect("page");
        cache.fetch(&QueryKey::MetricsSummary).await.expect("summary");
        cache
            .fetch(&QueryKey::ProbabilityDistribution)
            .await
            .expect("distribution");
        cache.fetch(&QueryKey::ContactProgress).await.expect("progress");

        let outcome = service
            .update_status(page(), ClientId::new(42), ClientStatus::Contacted)
            .await;

        let invalidated = outcome.into_result().expect("committed");
        assert_eq!(status_of_42(&cache), Some(ClientStatus::Contacted));
        assert!(invalidated.contains(&QueryKey::PriorityList(page())));
        assert!(invalidated.contains(&QueryKey::MetricsSummary));
        assert!(invalidated.contains(&QueryKey::ProbabilityDistribution));
        assert!(invalidated.contains(&QueryKey::ContactProgress));
        assert_eq!(invalidated.len(), 4);
        assert_eq!(cache.is_stale(&QueryKey::MetricsSummary), Some(true));
        assert_eq!(cache.is_stale(&QueryKey::ProbabilityDistribution), Some(true));
    }

    #[tokio::test]
    async fn server_error_restores_the_page() {
        let mut raw = MockRawApiPort::new();
        expect_reads(&mut raw);
        raw.expect_patch_json()
            .times(1)
            .returning(|_, _| Err(ApiError::http(500, "Internal Server Error")));
        let (service, cache) = service(raw);

        let before = service.fetch_priority_list(page()).await.expect("page");
        cache.fetch(&QueryKey::MetricsSummary).await.expect("summary");

        let outcome = service
            .update_status(page(), ClientId::new(42), ClientStatus::Contacted)
            .await;

        assert_eq!(outcome.error(), Some(&ApiError::http(500, "Internal Server Error")));
        assert_eq!(status_of_42(&cache), Some(ClientStatus::Pending));
        assert_eq!(
            cache.peek(&QueryKey::PriorityList(page())),
            Some(QueryData::Clients(before))
        );
        assert_eq!(cache.is_stale(&QueryKey::MetricsSummary), Some(false));
    }

    #[tokio::test]
    async fn client_not_on_page_still_calls_server() {
        let mut raw = MockRawApiPort::new();
        expect_reads(&mut raw);
        raw.expect_patch_json()
            .withf(|path, _| path == "/clients/999/status")
            .times(1)
            .returning(|_, _| Ok(serde_json::Value::Null));
        let (service, cache) = service(raw);
        let before = service.fetch_priority_list(page()).await.expect("page");

        let outcome = service
            .update_status(page(), ClientId::new(999), ClientStatus::Rejected)
            .await;

        assert!(outcome.is_committed());
        assert_eq!(
            cache.peek(&QueryKey::PriorityList(page())),
            Some(QueryData::Clients(before))
        );
    }

    #[tokio::test]
    async fn export_loads_one_large_page() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .withf(|path| path == "/clients/priority-list?page=1&size=100")
            .times(1)
            .returning(|_| Ok(page_json()));
        let (service, cache) = service(raw);

        assert!(service.export_state().is_loading());
        let clients = service.fetch_export().await.expect("export");

        assert_eq!(clients.len(), 2);
        assert_eq!(clients[0].id, ClientId::new(42));
        assert!(cache.peek(&QueryKey::PriorityList(page())).is_none());
    }
}
