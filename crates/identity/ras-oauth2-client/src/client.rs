//! OAuth2 client for the authorization-code flow.

use crate::config::OAuth2ClientConfig;
use crate::error::{OAuth2Error, OAuth2Result};
use crate::state::{AuthorizationState, InMemoryStateStore, StateStore};
use crate::types::{AuthorizationRequest, TokenResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use url::Url;

/// Capabilities a strategy needs from an OAuth2 client.
#[async_trait]
pub trait OAuth2Client: Send + Sync {
    /// Build the URL that starts the authorization-code flow.
    async fn authorization_url(
        &self,
        additional_params: &HashMap<String, String>,
    ) -> OAuth2Result<AuthorizationRequest>;

    /// Exchange an authorization code for tokens, verifying `state` when enabled.
    async fn exchange_code(&self, code: &str, state: Option<&str>) -> OAuth2Result<TokenResponse>;

    /// Authenticated GET returning the response body.
    async fn get(&self, url: &str, access_token: &str) -> OAuth2Result<String>;
}

/// [`OAuth2Client`] over `reqwest`.
#[derive(Clone)]
pub struct HttpOAuth2Client {
    config: OAuth2ClientConfig,
    http_client: Client,
    state_store: Arc<dyn StateStore>,
}

impl HttpOAuth2Client {
    pub fn new(config: OAuth2ClientConfig, state_store: Arc<dyn StateStore>) -> OAuth2Result<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
            state_store,
        })
    }

    /// Client with an in-memory state store.
    pub fn with_defaults(config: OAuth2ClientConfig) -> OAuth2Result<Self> {
        Self::new(config, Arc::new(InMemoryStateStore::new()))
    }

    pub fn config(&self) -> &OAuth2ClientConfig {
        &self.config
    }

    pub fn state_store(&self) -> &Arc<dyn StateStore> {
        &self.state_store
    }

    async fn verify_state(&self, state: Option<&str>) -> OAuth2Result<()> {
        if !self.config.state {
            return Ok(());
        }

        let state = state.ok_or(OAuth2Error::InvalidState)?;
        self.state_store.take(state).await?;
        Ok(())
    }
}

#[async_trait]
impl OAuth2Client for HttpOAuth2Client {
    async fn authorization_url(
        &self,
        additional_params: &HashMap<String, String>,
    ) -> OAuth2Result<AuthorizationRequest> {
        let mut url = Url::parse(&self.config.authorization_url)?;

        let state = if self.config.state {
            let state = AuthorizationState::new(self.config.state_ttl_seconds)?;
            let handle = state.state.clone();
            self.state_store.store(state).await?;
            Some(handle)
        } else {
            None
        };

        let mut params = url.query_pairs_mut();
        params.append_pair("response_type", "code");
        params.append_pair("client_id", &self.config.client_id);

        if let Some(callback_url) = &self.config.callback_url {
            params.append_pair("redirect_uri", callback_url);
        }
        if let Some(scope) = self.config.scope_param() {
            params.append_pair("scope", &scope);
        }
        if let Some(state) = &state {
            params.append_pair("state", state);
        }
        for (key, value) in additional_params {
            params.append_pair(key, value);
        }

        drop(params);

        debug!("Generated authorization URL for client {}", self.config.client_id);

        Ok(AuthorizationRequest {
            url: url.to_string(),
            state,
        })
    }

    async fn exchange_code(&self, code: &str, state: Option<&str>) -> OAuth2Result<TokenResponse> {
        self.verify_state(state).await?;

        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("client_id", self.config.client_id.as_str());
        params.insert("client_secret", self.config.client_secret.as_str());
        if let Some(callback_url) = &self.config.callback_url {
            params.insert("redirect_uri", callback_url.as_str());
        }

        let response = self
            .http_client
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Token exchange failed with status {}: {}", status, body);
            return Err(OAuth2Error::TokenExchangeFailed(body));
        }

        let token_response = match serde_json::from_str::<TokenResponse>(&body) {
            Ok(token) => token,
            Err(json_err) => TokenResponse::from_form(&body)
                .ok_or_else(|| OAuth2Error::InvalidTokenResponse(json_err.to_string()))?,
        };

        info!("Successfully exchanged code for tokens");
        Ok(token_response)
    }

    async fn get(&self, url: &str, access_token: &str) -> OAuth2Result<String> {
        let request = if self.config.use_authorization_header_for_get {
            self.http_client.get(url).bearer_auth(access_token)
        } else {
            let mut url = Url::parse(url)?;
            url.query_pairs_mut().append_pair("access_token", access_token);
            self.http_client.get(url)
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("GET {} failed with status {}", url, status);
            return Err(OAuth2Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        debug!("GET {} succeeded", url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuth2ClientConfig {
        OAuth2ClientConfig::new(
            "test_client_id",
            "test_secret",
            "https://example.com/auth",
            "https://example.com/token",
        )
        .with_callback_url("http://localhost:3000/callback")
        .with_scope(["profile", "email"])
    }

    #[test]
    fn test_new_validates_config() {
        let result = HttpOAuth2Client::with_defaults(OAuth2ClientConfig::new(
            "",
            "secret",
            "https://example.com/auth",
            "https://example.com/token",
        ));
        assert!(matches!(result, Err(OAuth2Error::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_authorization_url_with_state() {
        let client = HttpOAuth2Client::with_defaults(config().with_state(true)).unwrap();

        let request = client.authorization_url(&HashMap::new()).await.unwrap();

        let url = Url::parse(&request.url).unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
        assert_eq!(url.path(), "/auth");

        let params: HashMap<_, _> = url.query_pairs().collect();
        assert_eq!(params.get("response_type"), Some(&"code".into()));
        assert_eq!(params.get("client_id"), Some(&"test_client_id".into()));
        assert_eq!(
            params.get("redirect_uri"),
            Some(&"http://localhost:3000/callback".into())
        );
        assert_eq!(params.get("scope"), Some(&"profile email".into()));

        let state = request.state.unwrap();
        assert_eq!(params.get("state"), Some(&state.clone().into()));
        assert!(client.state_store().take(&state).await.is_ok());
    }

    #[tokio::test]
    async fn test_authorization_url_without_state() {
        let client = HttpOAuth2Client::with_defaults(config()).unwrap();

        let mut extra = HashMap::new();
        extra.insert("prompt".to_string(), "consent".to_string());
        let request = client.authorization_url(&extra).await.unwrap();

        assert!(request.state.is_none());
        let url = Url::parse(&request.url).unwrap();
        let params: HashMap<_, _> = url.query_pairs().collect();
        assert!(!params.contains_key("state"));
        assert_eq!(params.get("prompt"), Some(&"consent".into()));
    }

    #[tokio::test]
    async fn test_authorization_url_keeps_trailing_question_mark_base() {
        let mut config = config();
        config.authorization_url = "https://example.com/authorize?".to_string();
        let client = HttpOAuth2Client::with_defaults(config).unwrap();

        let request = client.authorization_url(&HashMap::new()).await.unwrap();
        assert!(
            request
                .url
                .starts_with("https://example.com/authorize?response_type=code")
        );
    }

    #[tokio::test]
    async fn test_exchange_rejects_missing_state() {
        let client = HttpOAuth2Client::with_defaults(config().with_state(true)).unwrap();

        let result = client.exchange_code("code", None).await;
        assert!(matches!(result, Err(OAuth2Error::InvalidState)));

        let result = client.exchange_code("code", Some("forged")).await;
        assert!(matches!(result, Err(OAuth2Error::StateNotFound)));
    }
}
