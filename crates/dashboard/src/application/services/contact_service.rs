//! Contact Service - outreach progress and the monthly target

use prometeo_domain::{ContactProgress, DomainError};
use prometeo_shared::{routes, ContactsConfigRequest};

use crate::application::api::Api;
use crate::application::mutations::{MutationKind, MutationOutcome, OptimisticMutator};
use crate::application::ServiceError;
use crate::infrastructure::cache::{QueryCache, QueryState};
use crate::ports::{QueryData, QueryKey};

#[derive(Clone)]
pub struct ContactService {
    api: Api,
    cache: QueryCache,
    mutator: OptimisticMutator,
}

impl ContactService {
    pub fn new(api: Api, cache: QueryCache, mutator: OptimisticMutator) -> Self {
        Self {
            api,
            cache,
            mutator,
        }
    }

    pub fn progress_state(&self) -> QueryState {
        self.cache.read(&QueryKey::ContactProgress)
    }

    pub async fn progress(&self) -> Result<ContactProgress, ServiceError> {
        let key = QueryKey::ContactProgress;
        let data = self.cache.fetch(&key).await?;
        ServiceError::expect_data(&key, data)
    }

    /// Set the monthly outreach target, optimistically.
    ///
    /// A target of zero is rejected before anything is written or sent.
    pub async fn update_monthly_target(
        &self,
        monthly_target: u64,
    ) -> Result<MutationOutcome, ServiceError> {
        if monthly_target == 0 {
            return Err(DomainError::out_of_range("monthly_target", monthly_target).into());
        }

        let api = self.api.clone();
        let body = ContactsConfigRequest { monthly_target };
        tracing::info!(monthly_target, "Updating monthly contact target");

        let outcome = self
            .mutator
            .mutate(
                MutationKind::MonthlyTarget,
                QueryKey::ContactProgress,
                move |data| {
                    data.as_contact_progress()
                        .map(|p| QueryData::ContactProgress(p.with_monthly_target(monthly_target)))
                },
                move || async move { api.put_no_response(routes::CONTACTS_CONFIG, &body).await },
            )
            .await;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fetcher::ApiQueryFetcher;
    use crate::application::mutations::InvalidationPolicy;
    use crate::infrastructure::cache::CacheConfig;
    use crate::infrastructure::retry::RetryConfig;
    use crate::infrastructure::testing::sample_progress;
    use crate::ports::outbound::{ApiError, MockRawApiPort};
    use mockall::predicate::eq;
    use serde_json::json;
    use std::sync::Arc;

    fn service(raw: MockRawApiPort) -> (ContactService, QueryCache) {
        let api = Api::new(Arc::new(raw));
        let cache = QueryCache::new(
            Arc::new(ApiQueryFetcher::new(api.clone())),
            CacheConfig {
                retry: RetryConfig::none(),
                ..CacheConfig::default()
            },
        );
        let mutator = OptimisticMutator::new(cache.clone(), InvalidationPolicy::default());
        (ContactService::new(api, cache.clone(), mutator), cache)
    }

    fn expect_progress(raw: &mut MockRawApiPort) {
        raw.expect_get_json()
            .with(eq("/contacts/progress"))
            .returning(|_| Ok(serde_json::to_value(sample_progress()).expect("progress")));
    }

    #[tokio::test]
    async fn zero_target_is_rejected_without_a_call() {
        let raw = MockRawApiPort::new();
        let (service, _) = service(raw);

        let error = service.update_monthly_target(0).await.expect_err("invalid");
        assert!(error.is_validation());
    }

    #[tokio::test]
    async fn target_update_commits_and_marks_progress_stale() {
        let mut raw = MockRawApiPort::new();
        expect_progress(&mut raw);
        raw.expect_put_json()
            .withf(|path, body| {
                path == "/contacts/config" && body == &json!({ "monthly_target": 250 })
            })
            .times(1)
            .returning(|_, _| Ok(json!({ "monthly_target": 250 })));
        let (service, cache) = service(raw);
        service.progress().await.expect("progress");

        let outcome = service.update_monthly_target(250).await.expect("valid");

        assert_eq!(
            outcome.into_result().expect("committed"),
            vec![QueryKey::ContactProgress]
        );
        let progress = cache
            .peek(&QueryKey::ContactProgress)
            .and_then(|d| d.as_contact_progress().cloned())
            .expect("cached progress");
        assert_eq!(progress.monthly_target, 250);
        assert_eq!(cache.is_stale(&QueryKey::ContactProgress), Some(true));
    }

    #[tokio::test]
    async fn failed_target_update_reverts() {
        let mut raw = MockRawApiPort::new();
        expect_progress(&mut raw);
        raw.expect_put_json()
            .times(1)
            .returning(|_, _| Err(ApiError::RequestFailed("connection reset".into())));
        let (service, cache) = service(raw);
        service.progress().await.expect("progress");

        let outcome = service.update_monthly_target(999).await.expect("valid");

        assert!(!outcome.is_committed());
        assert_eq!(
            cache.peek(&QueryKey::ContactProgress),
            Some(QueryData::ContactProgress(sample_progress()))
        );
    }
}
