//! In-memory transport for tests.

use super::Transport;
use crate::error::{FluentError, Result};
use crate::types::{Request, Response};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

type RequestMatcher = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

/// A canned response returned for matching requests.
#[derive(Clone)]
pub struct MockRoute {
    method: Option<Method>,
    url: String,
    matcher: Option<RequestMatcher>,
    status: StatusCode,
    content_type: Option<String>,
    body: Bytes,
}

impl MockRoute {
    /// Match `method` requests to `url` (compared after URL normalisation).
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method: Some(method),
            url: url.into(),
            matcher: None,
            status: StatusCode::OK,
            content_type: None,
            body: Bytes::new(),
        }
    }

    /// Match requests to `url` with any method.
    pub fn any(url: impl Into<String>) -> Self {
        Self {
            method: None,
            ..Self::new(Method::GET, url)
        }
    }

    /// Extra predicate, e.g. on the encoded body.
    #[must_use]
    pub fn with_matcher<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Respond `200` with the given content type and body.
    #[must_use]
    pub fn respond(self, content_type: &str, body: impl Into<Bytes>) -> Self {
        self.respond_with(StatusCode::OK, content_type, body)
    }

    /// Respond with an explicit status, content type and body.
    #[must_use]
    pub fn respond_with(
        mut self,
        status: StatusCode,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> Self {
        self.status = status;
        self.content_type = Some(content_type.to_string());
        self.body = body.into();
        self
    }

    fn matches(&self, request: &Request) -> bool {
        if let Some(method) = &self.method {
            if method != request.method() {
                return false;
            }
        }

        let url_matches = match (request.url(), Url::parse(&self.url)) {
            (Some(actual), Ok(expected)) => {
                actual.scheme() == expected.scheme()
                    && actual.host_str() == expected.host_str()
                    && actual.port_or_known_default() == expected.port_or_known_default()
                    && actual.path() == expected.path()
                    && (expected.query().is_none() || actual.query() == expected.query())
            }
            (Some(actual), Err(_)) => actual.as_str() == self.url,
            (None, _) => false,
        };

        url_matches && self.matcher.as_ref().map_or(true, |matcher| matcher(request))
    }

    fn to_response(&self) -> Response {
        let mut headers = HeaderMap::new();
        if let Some(content_type) = &self.content_type {
            if let Ok(value) = HeaderValue::from_str(content_type) {
                headers.insert(CONTENT_TYPE, value);
            }
        }
        Response::new(self.status, headers, self.body.clone())
    }
}

impl fmt::Debug for MockRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRoute")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("status", &self.status)
            .finish()
    }
}

/// Transport answering from registered [`MockRoute`]s.
///
/// Unmatched requests get an empty `404 Not Found`. Every request received is
/// recorded for later assertions.
///
/// # Examples
///
/// ```
/// use fluently_http::transport::{MockRoute, MockTransport};
/// use http::Method;
///
/// let mock = MockTransport::new();
/// mock.route(
///     MockRoute::new(Method::GET, "https://sketch7.com/api/heroes/azmodan")
///         .respond("application/json", r#"{ "name": "Azmodan" }"#),
/// );
/// assert_eq!(mock.route_count(), 1);
/// ```
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<MockRoute>>,
    received: Mutex<Vec<Request>>,
    dispose_calls: AtomicUsize,
    fail_dispose: AtomicBool,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. Routes are matched in insertion order.
    pub fn route(&self, route: MockRoute) -> &Self {
        self.routes.lock().push(route);
        self
    }

    /// Number of configured routes.
    pub fn route_count(&self) -> usize {
        self.routes.lock().len()
    }

    /// Requests received so far, in arrival order.
    pub fn received(&self) -> Vec<Request> {
        self.received.lock().clone()
    }

    /// How many times [`Transport::dispose`] ran.
    pub fn dispose_calls(&self) -> usize {
        self.dispose_calls.load(Ordering::SeqCst)
    }

    /// Make every following dispose fail.
    pub fn fail_dispose(&self, fail: bool) -> &Self {
        self.fail_dispose.store(fail, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let response = self
            .routes
            .lock()
            .iter()
            .find(|route| route.matches(&request))
            .map(MockRoute::to_response)
            .unwrap_or_else(|| Response::new(StatusCode::NOT_FOUND, HeaderMap::new(), Bytes::new()));

        self.received.lock().push(request);
        Ok(response)
    }

    fn dispose(&self) -> Result<()> {
        self.dispose_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_dispose.load(Ordering::SeqCst) {
            return Err(FluentError::Transport("mock transport failed to dispose".into()));
        }
        Ok(())
    }
}
