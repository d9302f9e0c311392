//! Resolves query keys against the REST backend

use async_trait::async_trait;

use prometeo_domain::{
    Client, ContactProgress, Heatmap, HeatmapVariables, MetricsSummary, ProbabilityDistribution,
};

use super::api::Api;
use crate::ports::outbound::{FetchError, QueryFetcher};
use crate::ports::{QueryData, QueryKey};

/// [`QueryFetcher`] that GETs the REST path of each key
#[derive(Clone)]
pub struct ApiQueryFetcher {
    api: Api,
}

impl ApiQueryFetcher {
    pub fn new(api: Api) -> Self {
        Self { api }
    }
}

#[async_trait]
impl QueryFetcher for ApiQueryFetcher {
    async fn fetch(&self, key: &QueryKey) -> Result<QueryData, FetchError> {
        let path = key.path();
        tracing::debug!(key = %key, path = %path, "Fetching query");

        let data = match key {
            QueryKey::PriorityList(_) | QueryKey::ClientsExport => {
                self.api.get::<Vec<Client>>(&path).await?.into()
            }
            QueryKey::MetricsSummary => self.api.get::<MetricsSummary>(&path).await?.into(),
            QueryKey::ProbabilityDistribution => {
                self.api.get::<ProbabilityDistribution>(&path).await?.into()
            }
            QueryKey::ContactProgress => self.api.get::<ContactProgress>(&path).await?.into(),
            QueryKey::Heatmap(_) => self.api.get::<Heatmap>(&path).await?.into(),
            QueryKey::HeatmapVariables => self.api.get::<HeatmapVariables>(&path).await?.into(),
        };
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{ApiError, MockRawApiPort};
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::Arc;

    fn fetcher(raw: MockRawApiPort) -> ApiQueryFetcher {
        ApiQueryFetcher::new(Api::new(Arc::new(raw)))
    }

    #[tokio::test]
    async fn priority_list_decodes_clients() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .with(eq("/clients/priority-list?page=1&size=5"))
            .times(1)
            .returning(|_| {
                Ok(json!([
                    { "id": 42, "user_id": "U0042", "probability": 0.87, "status": "pending" }
                ]))
            });

        let data = fetcher(raw)
            .fetch(&QueryKey::priority_list(1, 5))
            .await
            .expect("clients");
        let clients = data.as_clients().expect("client list");
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].id.value(), 42);
    }

    #[tokio::test]
    async fn out_of_range_probability_is_a_parse_error() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json().returning(|_| {
            Ok(json!([
                { "id": 1, "user_id": "U1", "probability": 1.4, "status": "pending" }
            ]))
        });

        let result = fetcher(raw).fetch(&QueryKey::priority_list(1, 5)).await;
        assert!(matches!(
            result,
            Err(FetchError::Api(ApiError::ParseError(_)))
        ));
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let mut raw = MockRawApiPort::new();
        raw.expect_get_json()
            .with(eq("/contacts/progress"))
            .returning(|_| Err(ApiError::Timeout));

        let result = fetcher(raw).fetch(&QueryKey::ContactProgress).await;
        assert_eq!(result, Err(FetchError::Api(ApiError::Timeout)));
    }
}
