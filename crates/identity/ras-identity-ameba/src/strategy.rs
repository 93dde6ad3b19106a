//! Ameba authentication strategy.

use crate::options::{AmebaStrategyOptions, PROFILE_PROVIDER, STRATEGY_NAME, StrategyConfig};
use crate::profile;
use async_trait::async_trait;
use ras_identity_core::{
    AuthOutcome, AuthStrategy, AuthorizationCallback, AuthorizationRedirect, IdentityError,
    IdentityResult, NormalizedProfile, Verify,
};
use ras_oauth2_client::{HttpOAuth2Client, OAuth2Client, OAuth2Error};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const STATE_FAILURE_MESSAGE: &str = "Unable to verify authorization request state.";

/// Authenticates users against Ameba by delegating the OAuth2 mechanics to an
/// [`OAuth2Client`].
pub struct AmebaStrategy<V> {
    config: StrategyConfig,
    oauth2: Arc<dyn OAuth2Client>,
    verify: V,
}

impl<V: Verify> AmebaStrategy<V> {
    /// Build a strategy backed by an [`HttpOAuth2Client`].
    pub fn new(options: AmebaStrategyOptions, verify: V) -> IdentityResult<Self> {
        let config = options.resolve();
        let client =
            HttpOAuth2Client::with_defaults(config.oauth2_config()).map_err(config_error)?;

        Ok(Self {
            config,
            oauth2: Arc::new(client),
            verify,
        })
    }

    /// Build a strategy around an existing client.
    ///
    /// Ameba only accepts the access token as an `Authorization: Bearer` header. An
    /// [`HttpOAuth2Client`] passed here must be built from
    /// [`StrategyConfig::oauth2_config`] (`options.clone().resolve().oauth2_config()`), which
    /// turns that on; a client built from a bare `OAuth2ClientConfig` sends the token as a
    /// query parameter and profile fetches will be rejected.
    pub fn with_client(
        options: AmebaStrategyOptions,
        client: Arc<dyn OAuth2Client>,
        verify: V,
    ) -> IdentityResult<Self> {
        let config = options.resolve();
        config.oauth2_config().validate().map_err(config_error)?;

        Ok(Self {
            config,
            oauth2: client,
            verify,
        })
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Fetch the user resource and normalize it.
    ///
    /// Transport and HTTP failures are wrapped as [`IdentityError::InternalOAuth`]; a body
    /// that is not JSON is returned as [`IdentityError::Decode`].
    pub async fn fetch_user_profile(
        &self,
        access_token: &str,
    ) -> IdentityResult<NormalizedProfile> {
        let body = self
            .oauth2
            .get(&self.config.user_profile_url, access_token)
            .await
            .map_err(|e| {
                warn!("Failed to fetch user profile: {}", e);
                IdentityError::internal_oauth("failed to fetch user profile", e)
            })?;

        let json: serde_json::Value = serde_json::from_str(&body)?;

        let mut profile = profile::parse(&json)?;
        profile.provider = Some(PROFILE_PROVIDER.to_string());
        profile.raw = Some(body);
        profile.json = Some(json);

        debug!("Fetched user profile {:?}", profile.id);
        Ok(profile)
    }

    async fn complete(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> IdentityResult<AuthOutcome<V::User>> {
        let tokens = match self.oauth2.exchange_code(code, state).await {
            Ok(tokens) => tokens,
            Err(e) if e.is_state_error() => {
                warn!("Rejected callback: {}", e);
                return Ok(AuthOutcome::failure(STATE_FAILURE_MESSAGE));
            }
            Err(e) => {
                return Err(IdentityError::internal_oauth(
                    "failed to obtain access token",
                    e,
                ));
            }
        };

        let profile = self.fetch_user_profile(&tokens.access_token).await?;
        let user = self
            .verify
            .verify(&tokens.access_token, tokens.refresh_token.as_deref(), profile)
            .await?;

        match user {
            Some(user) => {
                info!("Successfully authenticated user via {}", STRATEGY_NAME);
                Ok(AuthOutcome::Success(user))
            }
            None => {
                info!("Verify callback rejected the {} profile", STRATEGY_NAME);
                Ok(AuthOutcome::failure("User rejected by verify callback"))
            }
        }
    }
}

fn config_error(err: OAuth2Error) -> IdentityError {
    IdentityError::Configuration(err.to_string())
}

#[async_trait]
impl<V: Verify> AuthStrategy for AmebaStrategy<V> {
    type User = V::User;

    fn name(&self) -> &str {
        STRATEGY_NAME
    }

    async fn authorization_redirect(&self) -> IdentityResult<AuthorizationRedirect> {
        let request = self
            .oauth2
            .authorization_url(&HashMap::new())
            .await
            .map_err(|e| IdentityError::internal_oauth("failed to build authorization URL", e))?;

        Ok(AuthorizationRedirect {
            url: request.url,
            state: request.state,
        })
    }

    async fn authenticate(
        &self,
        callback: AuthorizationCallback,
    ) -> IdentityResult<AuthOutcome<V::User>> {
        if let Some(error) = callback.error {
            let description = callback.error_description.unwrap_or_else(|| error.clone());
            if error == "access_denied" {
                info!("User denied access: {}", description);
                return Ok(AuthOutcome::failure(description));
            }
            return Err(IdentityError::Authorization(format!("{}: {}", error, description)));
        }

        match callback.code {
            Some(code) => self.complete(&code, callback.state.as_deref()).await,
            None => Ok(AuthOutcome::Redirect(self.authorization_redirect().await?)),
        }
    }

    async fn user_profile(&self, access_token: &str) -> IdentityResult<NormalizedProfile> {
        self.fetch_user_profile(access_token).await
    }
}
