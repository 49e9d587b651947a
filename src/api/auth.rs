use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::gateway::{build_client, endpoint};
use crate::app::ApiConfig;
use crate::constants::{LOGIN_PATH, REGISTER_PATH};
use crate::session::{AuthBackend, AuthResponse, LoginRequest, RegisterRequest};
use crate::utils::{payload_message, ApiError, AuthFailure};

/// Login and registration endpoints
///
/// These bypass the gateway on purpose: a 401 here means bad credentials,
/// not an expired session.
pub struct AuthApi {
    client: Client,
    base_url: String,
}

impl AuthApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        Ok(Self::with_client(build_client(config)?, &config.base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    async fn post_credentials<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, AuthFailure> {
        let url = endpoint(&self.base_url, path);
        debug!(%url, "Sending credentials");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthFailure::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AuthFailure::Network(e.to_string()))?;
        let payload: Option<Value> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            return Err(AuthFailure::Rejected {
                status: status.as_u16(),
                message: payload.as_ref().and_then(payload_message),
            });
        }

        payload
            .and_then(|p| serde_json::from_value(p).ok())
            .ok_or_else(|| AuthFailure::Rejected {
                status: status.as_u16(),
                message: Some("Unexpected response from server".to_string()),
            })
    }
}

#[async_trait]
impl AuthBackend for AuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, AuthFailure> {
        self.post_credentials(LOGIN_PATH, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AuthFailure> {
        self.post_credentials(REGISTER_PATH, request).await
    }
}
