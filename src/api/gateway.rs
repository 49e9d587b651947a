use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::app::ApiConfig;
use crate::constants::TOKEN_INVALID_MSG;
use crate::session::{ExpiryReason, SessionStore};
use crate::utils::ApiError;

/// Build the shared HTTP client for a backend
pub fn build_client(config: &ApiConfig) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| ApiError::Client(e.to_string()))
}

/// Join a base endpoint and a relative path with exactly one slash
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Authorized request gateway
///
/// Every call goes out with the current bearer token (when there is one),
/// and every response passes through the same check: an invalid-token
/// answer ends the session via [`SessionStore::force_clear`].
pub struct Gateway {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl Gateway {
    pub fn new(config: &ApiConfig, session: Arc<SessionStore>) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_client(config)?, &config.base_url, session))
    }

    pub fn with_client(client: Client, base_url: &str, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = endpoint(&self.base_url, path);
        debug!(%method, %url, "Outbound request");
        let builder = self.client.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Request failed before a response arrived");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let parsed = parse_body(&body);

        let token_rejected = parsed.as_ref().map(signals_invalid_token).unwrap_or(false);
        if status == StatusCode::UNAUTHORIZED || token_rejected {
            debug!(%status, "Backend rejected the bearer token");
            self.session.force_clear(ExpiryReason::Rejected);
            return Err(ApiError::SessionExpired);
        }

        if !status.is_success() {
            let payload = parsed.unwrap_or_else(|_| {
                json!({ "error": String::from_utf8_lossy(&body).trim().to_string() })
            });
            debug!(%status, "Backend returned an error payload");
            return Err(ApiError::Server {
                status: status.as_u16(),
                payload,
            });
        }

        let value = parsed.map_err(ApiError::Decode)?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// Empty bodies read as null so unit-like responses still decode
fn parse_body(body: &[u8]) -> Result<Value, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

fn signals_invalid_token(payload: &Value) -> bool {
    ["msg", "error"]
        .iter()
        .any(|key| payload.get(*key).and_then(Value::as_str) == Some(TOKEN_INVALID_MSG))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::session::{NoticeLevel, Route, SessionState};
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_joining() {
        assert_eq!(endpoint("http://h/api", "events"), "http://h/api/events");
        assert_eq!(endpoint("http://h/api/", "/events/1"), "http://h/api/events/1");
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start().await;
        let (store, _shell) = session_store(true);
        let token = store.token().unwrap();
        Mock::given(method("GET"))
            .and(path("/api/ping"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = gateway(&format!("{}/api", server.uri()), store);
        let body: Value = gateway.get("ping").await.unwrap();
        assert_eq!(body, json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_anonymous_requests_carry_no_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let (store, _shell) = session_store(false);
        let gateway = gateway(&server.uri(), store);
        let body: Vec<Value> = gateway.get("events").await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_status_forces_logout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "jwt expired"})))
            .mount(&server)
            .await;

        let (store, shell) = session_store(true);
        let gateway = gateway(&server.uri(), store.clone());
        let result: Result<Value, ApiError> = gateway.get("events/my-events").await;

        assert!(matches!(result, Err(ApiError::SessionExpired)));
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(shell.routes(), vec![Route::Login { session_expired: true }]);
    }

    #[tokio::test]
    async fn test_token_not_valid_payload_forces_logout_once_per_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"msg": TOKEN_INVALID_MSG})))
            .mount(&server)
            .await;

        let (store, shell) = session_store(true);
        let gateway = gateway(&server.uri(), store.clone());

        let first: Result<Value, ApiError> = gateway.post("events", &json!({})).await;
        let second: Result<Value, ApiError> = gateway.post("events", &json!({})).await;

        assert!(matches!(first, Err(ApiError::SessionExpired)));
        assert!(matches!(second, Err(ApiError::SessionExpired)));
        assert!(!store.is_authenticated());
        assert_eq!(shell.routes().len(), 2);
        let notices = shell.notices();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Info));
    }

    #[tokio::test]
    async fn test_server_errors_pass_through_untouched() {
        let server = MockServer::start().await;
        let payload = json!({"error": "Event not found", "code": 17});
        Mock::given(method("GET"))
            .and(path("/events/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(payload.clone()))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad gateway"))
            .mount(&server)
            .await;

        let (store, shell) = session_store(true);
        let gateway = gateway(&server.uri(), store.clone());

        let err = gateway.get::<Value>("events/missing").await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            ApiError::Server { status, payload: got } => {
                assert_eq!(status, 404);
                assert_eq!(got, payload);
            }
            other => panic!("Expected server error, got {:?}", other),
        }

        let err = gateway.delete::<Value>("events/1").await.unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert_eq!(err.message(), "Bad gateway");

        // Ordinary failures leave the session alone
        assert!(store.is_authenticated());
        assert!(shell.routes().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_is_distinct() {
        let (store, shell) = session_store(true);
        // Nothing listens on port 9 (discard) in test environments
        let gateway = gateway("http://127.0.0.1:9", store.clone());

        let err = gateway.get::<Value>("events").await.unwrap_err();

        assert!(err.is_network());
        assert!(store.is_authenticated());
        assert!(shell.notices().is_empty());
    }

    #[tokio::test]
    async fn test_empty_success_body_decodes_as_unit() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (store, _shell) = session_store(true);
        let gateway = gateway(&server.uri(), store);
        let result: Option<Value> = gateway.delete("events/1").await.unwrap();
        assert_eq!(result, None);
    }
}
