use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;

use super::{AuthorizationRemote, RemoteError, RemoteFactory};
use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::identity::RestCredentials;

pub const PUSH_AUTHENTICATION_PATH: &str = "me/two-step/push-authentication";

fn endpoint_url(api_base: &str) -> AppResult<Url> {
    let raw = format!("{}/{}", api_base.trim_end_matches('/'), PUSH_AUTHENTICATION_PATH);
    Url::parse(&raw).map_err(|e| AppError::config("invalid_api_base".to_string(), format!("'{}': {}", api_base, e)))
}

// Pull `error` / `message` out of a REST error body; anything else leaves them empty.
fn parse_error_body(body: &str) -> (String, String) {
    let v: serde_json::Value = serde_json::from_str(body).unwrap_or(serde_json::Value::Null);
    let code = v.get("error").and_then(|s| s.as_str()).unwrap_or("").to_string();
    let message = v.get("message").and_then(|s| s.as_str()).unwrap_or("").to_string();
    (code, message)
}

/// WordPress.com REST client, either signed with a bearer token or anonymous.
#[derive(Clone)]
pub struct RestApi {
    endpoint: Url,
    client: reqwest::Client,
    bearer: Option<String>,
}

impl RestApi {
    pub fn new(endpoint: Url, client: reqwest::Client, bearer: Option<String>) -> Self {
        Self { endpoint, client, bearer }
    }

    pub fn endpoint(&self) -> &Url { &self.endpoint }

    pub fn is_anonymous(&self) -> bool { self.bearer.is_none() }

    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.bearer {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| RemoteError::Transport(format!("invalid bearer token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl AuthorizationRemote for RestApi {
    async fn authorize_login(&self, token: &str) -> Result<(), RemoteError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .headers(self.headers()?)
            .form(&[("action", "authorize_login"), ("push_token", token)])
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            tracing::debug!(target: "pushauth::remote", "authorize_login accepted: HTTP {}", status);
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        let (code, message) = parse_error_body(&body);
        tracing::debug!(target: "pushauth::remote", "authorize_login rejected: HTTP {} code='{}'", status, code);
        Err(RemoteError::Rejected { status: status.as_u16(), code, message })
    }
}

/// Builds `RestApi` clients from the configured base URL, timeout and user agent.
#[derive(Debug, Clone)]
pub struct RestApiFactory {
    config: ClientConfig,
}

impl RestApiFactory {
    pub fn new(config: ClientConfig) -> Self { Self { config } }

    fn build(&self, bearer: Option<String>) -> AppResult<RestApi> {
        let endpoint = endpoint_url(&self.config.api_base)?;
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.clone())
            .build()
            .map_err(|e| AppError::transport("client_build_failed".to_string(), e.to_string()))?;
        Ok(RestApi::new(endpoint, client, bearer))
    }
}

impl RemoteFactory for RestApiFactory {
    fn authenticated(&self, credentials: &RestCredentials) -> AppResult<Arc<dyn AuthorizationRemote>> {
        Ok(Arc::new(self.build(Some(credentials.bearer_token().to_string()))?))
    }

    fn anonymous(&self) -> AppResult<Arc<dyn AuthorizationRemote>> {
        Ok(Arc::new(self.build(None)?))
    }
}
