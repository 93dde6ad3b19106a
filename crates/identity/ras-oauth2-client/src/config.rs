//! OAuth2 client configuration.

use crate::error::{OAuth2Error, OAuth2Result};
use crate::state::state_ttl;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for a single OAuth2 client registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuth2ClientConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    /// Sent as `redirect_uri` on the authorization and token requests when set.
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub scope: Vec<String>,
    #[serde(default = "default_scope_separator")]
    pub scope_separator: String,
    /// Include an anti-forgery `state` parameter and verify it on callback.
    #[serde(default)]
    pub state: bool,
    /// Send the access token as `Authorization: Bearer` on GET instead of a query parameter.
    #[serde(default)]
    pub use_authorization_header_for_get: bool,
    #[serde(default = "default_state_ttl")]
    pub state_ttl_seconds: u64,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
}

fn default_scope_separator() -> String {
    " ".to_string()
}

fn default_state_ttl() -> u64 {
    600 // 10 minutes
}

fn default_http_timeout() -> u64 {
    30
}

impl OAuth2ClientConfig {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorization_url: authorization_url.into(),
            token_url: token_url.into(),
            callback_url: None,
            scope: Vec::new(),
            scope_separator: default_scope_separator(),
            state: false,
            use_authorization_header_for_get: false,
            state_ttl_seconds: default_state_ttl(),
            http_timeout_seconds: default_http_timeout(),
        }
    }

    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_scope_separator(mut self, separator: impl Into<String>) -> Self {
        self.scope_separator = separator.into();
        self
    }

    pub fn with_state(mut self, enabled: bool) -> Self {
        self.state = enabled;
        self
    }

    pub fn with_authorization_header_for_get(mut self, enabled: bool) -> Self {
        self.use_authorization_header_for_get = enabled;
        self
    }

    pub fn with_state_ttl(mut self, seconds: u64) -> Self {
        self.state_ttl_seconds = seconds;
        self
    }

    pub fn with_http_timeout(mut self, seconds: u64) -> Self {
        self.http_timeout_seconds = seconds;
        self
    }

    /// Scope value as sent on the wire, `None` when no scope is requested.
    pub fn scope_param(&self) -> Option<String> {
        if self.scope.is_empty() {
            None
        } else {
            Some(self.scope.join(&self.scope_separator))
        }
    }

    pub fn validate(&self) -> OAuth2Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(OAuth2Error::ConfigError(
                "OAuth2 client requires a client_id".to_string(),
            ));
        }
        if self.client_secret.trim().is_empty() {
            return Err(OAuth2Error::ConfigError(
                "OAuth2 client requires a client_secret".to_string(),
            ));
        }

        Url::parse(&self.authorization_url).map_err(|e| {
            OAuth2Error::ConfigError(format!(
                "Invalid authorization URL '{}': {}",
                self.authorization_url, e
            ))
        })?;
        Url::parse(&self.token_url).map_err(|e| {
            OAuth2Error::ConfigError(format!("Invalid token URL '{}': {}", self.token_url, e))
        })?;
        state_ttl(self.state_ttl_seconds)?;

        Ok(())
    }
}
