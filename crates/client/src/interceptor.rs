//! Per-request transforms applied before transmission.

use reqwest::Request;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use crate::session_store::SessionStore;

/// Transforms an outgoing request exactly once, inline, before it is sent.
///
/// The request is taken by value and the transformed request returned; the
/// caller never observes a half-modified request.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: Request) -> Request;
}

/// Attaches `Authorization: Bearer <token>` when the session holds a token.
///
/// Reads the session store synchronously at dispatch time. Never retries,
/// never refreshes, never looks at claims; method and body are untouched.
#[derive(Debug, Clone)]
pub struct BearerAuthenticator {
    store: SessionStore,
}

impl BearerAuthenticator {
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for BearerAuthenticator {
    fn intercept(&self, mut request: Request) -> Request {
        let session = self.store.get();
        let Some(token) = session.token() else {
            tracing::trace!(url = %request.url(), "no session token; request sent as-is");
            return request;
        };

        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
                tracing::trace!(url = %request.url(), "bearer token attached");
            }
            Err(_) => {
                tracing::warn!(
                    url = %request.url(),
                    "session token is not a valid header value; request sent without it"
                );
            }
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use reqwest::{Body, Method, Url};
    use storefront_auth::Session;

    use crate::storage::MemoryTokenStorage;

    fn request(method: Method, body: Option<&'static str>) -> Request {
        let mut request = Request::new(method, Url::parse("http://localhost/api/test").unwrap());
        if let Some(body) = body {
            *request.body_mut() = Some(Body::from(body));
        }
        request
    }

    fn body_bytes(request: &Request) -> Option<&[u8]> {
        request.body().and_then(Body::as_bytes)
    }

    #[test]
    fn attaches_bearer_header_when_token_present() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::with_token("mock-token")));
        let out = BearerAuthenticator::new(store).intercept(request(Method::GET, None));

        assert_eq!(out.method(), Method::GET);
        assert_eq!(out.headers()[AUTHORIZATION], "Bearer mock-token");
        assert!(out.headers()[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn passes_through_without_token() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::new()));
        let out = BearerAuthenticator::new(store).intercept(request(Method::GET, None));

        assert!(!out.headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn never_alters_method_or_body() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::with_token("t")));
        let out = BearerAuthenticator::new(store)
            .intercept(request(Method::PUT, Some(r#"{"name":"lamp"}"#)));

        assert_eq!(out.method(), Method::PUT);
        assert_eq!(body_bytes(&out), Some(br#"{"name":"lamp"}"#.as_slice()));
        assert_eq!(out.url().as_str(), "http://localhost/api/test");
    }

    #[test]
    fn reads_the_session_at_dispatch_time() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::new()));
        let auth = BearerAuthenticator::new(store.clone());

        assert!(!auth.intercept(request(Method::GET, None)).headers().contains_key(AUTHORIZATION));

        store.set(Session::authenticated("fresh", "bob"));
        let out = auth.intercept(request(Method::GET, None));
        assert_eq!(out.headers()[AUTHORIZATION], "Bearer fresh");

        store.clear();
        assert!(!auth.intercept(request(Method::GET, None)).headers().contains_key(AUTHORIZATION));
    }

    #[test]
    fn replaces_a_stale_authorization_header() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::with_token("current")));
        let mut stale = request(Method::GET, None);
        stale
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer old"));

        let out = BearerAuthenticator::new(store).intercept(stale);
        assert_eq!(out.headers().get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(out.headers()[AUTHORIZATION], "Bearer current");
    }

    #[test]
    fn unusable_token_is_not_sent() {
        let store = SessionStore::init(Arc::new(MemoryTokenStorage::new()));
        store.set(Session::authenticated("bad\ntoken", "bob"));

        let out = BearerAuthenticator::new(store).intercept(request(Method::GET, None));
        assert!(!out.headers().contains_key(AUTHORIZATION));
    }
}
