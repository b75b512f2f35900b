//! Wiring: one session store shared by every component that reads or writes it.

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::gateway::AuthGateway;
use crate::interceptor::BearerAuthenticator;
use crate::navigation::Navigator;
use crate::router::Router;
use crate::session_store::SessionStore;
use crate::storage::{FileTokenStorage, TokenStorage};

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Application state shared by the admin console.
///
/// Cloning shares the same session store.
#[derive(Clone)]
pub struct AdminClient {
    pub store: SessionStore,
    pub navigator: Arc<dyn Navigator>,
    pub api: ApiClient,
    pub gateway: AuthGateway,
    pub router: Arc<Router>,
}

impl AdminClient {
    /// Build the client with the token file named in `config`.
    pub fn init(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, InitError> {
        let storage = Arc::new(FileTokenStorage::new(config.token_file.clone()));
        Self::with_storage(config, storage, navigator)
    }

    pub fn with_storage(
        config: &ClientConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, InitError> {
        let store = SessionStore::init(storage);

        let http = reqwest::Client::builder().timeout(config.http_timeout).build()?;
        let api = ApiClient::new(
            http,
            config.api_url.clone(),
            Arc::new(BearerAuthenticator::new(store.clone())),
        );
        let gateway = AuthGateway::new(api.clone(), store.clone(), navigator.clone());
        let router = Arc::new(Router::admin_console(store.clone(), navigator.clone()));

        tracing::debug!(api_url = %api.base_url(), "admin client initialized");

        Ok(Self {
            store,
            navigator,
            api,
            gateway,
            router,
        })
    }

    /// Disconnect session subscribers. Sign-in state keeps working: the
    /// session stays readable and logout still clears durable storage.
    pub fn dispose(&self) {
        self.store.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    use reqwest::Url;
    use storefront_auth::Session;

    use crate::navigation::HistoryNavigator;
    use crate::router::Activation;
    use crate::storage::MemoryTokenStorage;

    fn config() -> ClientConfig {
        ClientConfig {
            api_url: Url::parse("http://127.0.0.1:9/api").unwrap(),
            token_file: PathBuf::from("/unused"),
            http_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn components_share_one_session() {
        let nav = Arc::new(HistoryNavigator::new());
        let client = AdminClient::with_storage(
            &config(),
            Arc::new(MemoryTokenStorage::new()),
            nav.clone(),
        )
        .unwrap();

        assert_eq!(client.router.activate("/orders"), Activation::Denied { guard: "auth" });

        client.store.set(Session::authenticated("abc", "bob"));
        assert!(matches!(client.router.activate("/orders"), Activation::Granted { .. }));

        client.gateway.logout();
        assert_eq!(client.store.get(), Session::none());
        assert_eq!(nav.history(), vec!["/login", "/login"]);
    }

    #[test]
    fn dispose_keeps_last_session_readable() {
        let client = AdminClient::with_storage(
            &config(),
            Arc::new(MemoryTokenStorage::with_token("abc")),
            Arc::new(HistoryNavigator::new()),
        )
        .unwrap();

        let sub = client.store.subscribe();
        client.dispose();

        assert_eq!(client.store.get().token(), Some("abc"));
        assert_eq!(sub.drain(), vec![Session::from_token("abc")]);
    }

    #[test]
    fn logout_after_dispose_forgets_the_stored_token() {
        let storage = Arc::new(MemoryTokenStorage::with_token("abc"));
        let nav = Arc::new(HistoryNavigator::new());
        let client = AdminClient::with_storage(&config(), storage.clone(), nav.clone()).unwrap();

        client.dispose();
        client.gateway.logout();

        assert_eq!(storage.snapshot(), None);
        assert_eq!(client.store.get(), Session::none());
        assert_eq!(nav.history(), vec!["/login"]);
    }
}
