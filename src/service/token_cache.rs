use std::sync::Arc;

use tracing::{error, info};

use crate::errors::AppError;
use crate::salesforce::SalesforceClient;
use crate::store::TokenStore;

/// Key under which the bearer token lives in the shared store.
pub const ACCESS_TOKEN_KEY: &str = "salesforce_access_token";

/// Two-state token cache: either the shared store holds a usable token (fast
/// path, no network) or it doesn't and we run the OAuth exchange. Token expiry
/// is invisible here; it is discovered downstream via a 401 and handled by
/// calling `refresh`.
#[derive(Clone)]
pub struct TokenCache {
    store: Arc<dyn TokenStore>,
    salesforce: SalesforceClient,
}

impl TokenCache {
    pub fn new(store: Arc<dyn TokenStore>, salesforce: SalesforceClient) -> Self {
        Self { store, salesforce }
    }

    /// Returns the cached token when the store has one; otherwise performs a
    /// fresh OAuth exchange. A failing store read is treated as a miss — the
    /// cache is best-effort and must never block obtaining a usable token.
    pub async fn get_access_token(&self) -> Result<String, AppError> {
        match self.store.get(ACCESS_TOKEN_KEY).await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => self.refresh().await,
            Err(e) => {
                error!("Token store read failed, falling back to OAuth exchange: {e}");
                self.refresh().await
            }
        }
    }

    /// Runs the OAuth password-grant exchange and returns the new token
    /// immediately. The store write-back happens on a detached task:
    /// best-effort, non-blocking, and failure-tolerant — a slow or failing
    /// write must never delay or fail the request being served.
    pub async fn refresh(&self) -> Result<String, AppError> {
        let token = self.salesforce.request_token().await?;
        info!("Refreshed Salesforce access token");

        let store = Arc::clone(&self.store);
        let cached = token.clone();
        tokio::spawn(async move {
            let existed = match store.get(ACCESS_TOKEN_KEY).await {
                Ok(value) => value.is_some(),
                Err(e) => {
                    error!("Token store existence check failed, assuming absent: {e}");
                    false
                }
            };
            if let Err(e) = store.write(ACCESS_TOKEN_KEY, &cached, existed).await {
                error!("Failed to cache refreshed access token: {e}");
            }
        });

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::testing::RecordingStore;

    fn salesforce(server: &MockServer) -> SalesforceClient {
        SalesforceClient::new(
            "acme",
            "cid".to_string(),
            "csecret".to_string(),
            "user@example.com".to_string(),
            "hunter2".to_string(),
            "SECTOK".to_string(),
        )
        .with_base_url(&server.uri())
    }

    async fn wait_for_write(store: &RecordingStore) {
        for _ in 0..200 {
            if store.writes.load(Ordering::SeqCst) > 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("store write never happened");
    }

    #[tokio::test]
    async fn store_hit_returns_token_without_network_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore::holding("cached-tok"));
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let token = cache.get_access_token().await.unwrap();
        assert_eq!(token, "cached-tok");
        assert_eq!(store.gets.load(Ordering::SeqCst), 1);
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn store_miss_exchanges_once_and_writes_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "fresh-tok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore::empty());
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let token = cache.get_access_token().await.unwrap();
        assert_eq!(token, "fresh-tok");

        wait_for_write(&store).await;
        assert_eq!(store.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.stored_value().as_deref(), Some("fresh-tok"));
        // Key was absent, so the write-back must be a create.
        assert_eq!(*store.last_write_existed.lock().unwrap(), Some(false));
    }

    #[tokio::test]
    async fn refresh_overwrites_an_existing_token_with_update() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "fresh-tok" })),
            )
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore::holding("stale-tok"));
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let token = cache.refresh().await.unwrap();
        assert_eq!(token, "fresh-tok");

        wait_for_write(&store).await;
        assert_eq!(store.stored_value().as_deref(), Some("fresh-tok"));
        assert_eq!(*store.last_write_existed.lock().unwrap(), Some(true));
    }

    #[tokio::test]
    async fn failed_write_back_does_not_fail_the_refresh() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "fresh-tok" })),
            )
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore { fail_writes: true, ..RecordingStore::empty() });
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let token = cache.refresh().await.unwrap();
        assert_eq!(token, "fresh-tok");

        wait_for_write(&store).await;
        assert!(store.stored_value().is_none());
    }

    #[tokio::test]
    async fn failed_store_read_falls_back_to_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "fresh-tok" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore { fail_reads: true, ..RecordingStore::empty() });
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let token = cache.get_access_token().await.unwrap();
        assert_eq!(token, "fresh-tok");
    }

    #[tokio::test]
    async fn failed_exchange_propagates_upstream_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&server)
            .await;

        let store = Arc::new(RecordingStore::empty());
        let cache = TokenCache::new(store.clone(), salesforce(&server));

        let err = cache.get_access_token().await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamAuth { status: 401, .. }));
        assert_eq!(store.writes.load(Ordering::SeqCst), 0);
    }
}
