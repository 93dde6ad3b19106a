//! Strategy options and their resolution against the Ameba defaults.

use ras_oauth2_client::OAuth2ClientConfig;
use serde::{Deserialize, Serialize};

/// Name the hosting framework routes this strategy under.
pub const STRATEGY_NAME: &str = "ameba";

/// Value written to `provider` on every fetched profile.
///
/// Differs from [`STRATEGY_NAME`]; existing consumers match on this exact string.
pub const PROFILE_PROVIDER: &str = "abema";

pub const DEFAULT_AUTHORIZATION_URL: &str = "https://dauth.user.ameba.jp/authorize?";
pub const DEFAULT_TOKEN_URL: &str = "https://dauth.user.ameba.jp/token";
pub const DEFAULT_USER_PROFILE_URL: &str = "https://api.amebame.com/graph/me";
pub const DEFAULT_SCOPE: &str = "profile";

/// Caller-supplied options. Field names on the wire follow the Ameba developer console
/// (`channelID`, `channelSecret`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmebaStrategyOptions {
    #[serde(rename = "channelID", default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_secret: Option<String>,
    #[serde(rename = "callbackURL", default)]
    pub callback_url: Option<String>,
    #[serde(rename = "authorizationURL", default)]
    pub authorization_url: Option<String>,
    #[serde(rename = "tokenURL", default)]
    pub token_url: Option<String>,
    #[serde(rename = "userProfileURL", default)]
    pub user_profile_url: Option<String>,
    /// Space separated.
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub state: Option<bool>,
}

impl AmebaStrategyOptions {
    pub fn new(channel_id: impl Into<String>, channel_secret: impl Into<String>) -> Self {
        Self {
            channel_id: Some(channel_id.into()),
            channel_secret: Some(channel_secret.into()),
            ..Default::default()
        }
    }

    /// Read options from `AMEBA_*` environment variables.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());

        Self {
            channel_id: var("AMEBA_CHANNEL_ID"),
            channel_secret: var("AMEBA_CHANNEL_SECRET"),
            callback_url: var("AMEBA_CALLBACK_URL"),
            authorization_url: var("AMEBA_AUTHORIZATION_URL"),
            token_url: var("AMEBA_TOKEN_URL"),
            user_profile_url: var("AMEBA_USER_PROFILE_URL"),
            scope: var("AMEBA_SCOPE"),
            state: var("AMEBA_STATE").map(|v| parse_flag(&v)),
        }
    }

    pub fn with_callback_url(mut self, url: impl Into<String>) -> Self {
        self.callback_url = Some(url.into());
        self
    }

    pub fn with_authorization_url(mut self, url: impl Into<String>) -> Self {
        self.authorization_url = Some(url.into());
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    pub fn with_user_profile_url(mut self, url: impl Into<String>) -> Self {
        self.user_profile_url = Some(url.into());
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_state(mut self, enabled: bool) -> Self {
        self.state = Some(enabled);
        self
    }

    /// Merge with the provider defaults.
    ///
    /// Missing credentials are not rejected here; the OAuth2 client validates them when the
    /// strategy is built.
    pub fn resolve(self) -> StrategyConfig {
        let scope = self
            .scope
            .as_deref()
            .map(|scope| {
                scope
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|scope| !scope.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_SCOPE.to_string()]);

        StrategyConfig {
            client_id: self.channel_id.unwrap_or_default(),
            client_secret: self.channel_secret.unwrap_or_default(),
            callback_url: self.callback_url,
            authorization_url: self
                .authorization_url
                .unwrap_or_else(|| DEFAULT_AUTHORIZATION_URL.to_string()),
            token_url: self
                .token_url
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            user_profile_url: self
                .user_profile_url
                .unwrap_or_else(|| DEFAULT_USER_PROFILE_URL.to_string()),
            scope,
            state: self.state.unwrap_or(true),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

/// Resolved, immutable strategy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: Option<String>,
    pub authorization_url: String,
    pub token_url: String,
    pub user_profile_url: String,
    pub scope: Vec<String>,
    pub state: bool,
}

impl StrategyConfig {
    /// Configuration for the OAuth2 client. The profile endpoint only accepts bearer
    /// headers, so GETs always carry the token in `Authorization`.
    pub fn oauth2_config(&self) -> OAuth2ClientConfig {
        let config = OAuth2ClientConfig::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.authorization_url.clone(),
            self.token_url.clone(),
        )
        .with_scope(self.scope.iter().cloned())
        .with_state(self.state)
        .with_authorization_header_for_get(true);

        match &self.callback_url {
            Some(url) => config.with_callback_url(url.clone()),
            None => config,
        }
    }
}
