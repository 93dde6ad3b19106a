//! Core strategy traits and types for delegated authentication.

mod profile;

pub use profile::{NormalizedProfile, ProfileName, ProfileValue};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Failure reported by the OAuth2 collaborator, wrapped with its cause.
    #[error("{message}")]
    InternalOAuth {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Verification failed: {0}")]
    Verify(String),
}

impl IdentityError {
    pub fn internal_oauth(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::InternalOAuth {
            message: message.into(),
            source: source.into(),
        }
    }
}

pub type IdentityResult<T> = Result<T, IdentityError>;

/// Where to send the user agent to start the authorization-code flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRedirect {
    pub url: String,
    pub state: Option<String>,
}

/// Query parameters the provider appends when redirecting back to the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Result of running one request through a strategy.
#[derive(Debug)]
pub enum AuthOutcome<U> {
    /// Flow not started yet; redirect the user agent.
    Redirect(AuthorizationRedirect),
    Success(U),
    /// The user could not be authenticated. Not an error.
    Failure { message: String },
}

impl<U> AuthOutcome<U> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// The pluggable unit a hosting framework loads to support one identity provider.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    type User: Send;

    /// Routing identifier.
    fn name(&self) -> &str;

    async fn authorization_redirect(&self) -> IdentityResult<AuthorizationRedirect>;

    async fn authenticate(
        &self,
        callback: AuthorizationCallback,
    ) -> IdentityResult<AuthOutcome<Self::User>>;

    async fn user_profile(&self, access_token: &str) -> IdentityResult<NormalizedProfile>;
}

/// Application hook that maps an authenticated profile to a user.
///
/// Returning `Ok(None)` rejects the credentials without raising an error.
#[async_trait]
pub trait Verify: Send + Sync {
    type User: Send;

    async fn verify(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        profile: NormalizedProfile,
    ) -> IdentityResult<Option<Self::User>>;
}

/// [`Verify`] implementation backed by an async closure. See [`verify_fn`].
pub struct VerifyFn<F> {
    f: F,
}

pub fn verify_fn<F, Fut, U>(f: F) -> VerifyFn<F>
where
    F: Fn(String, Option<String>, NormalizedProfile) -> Fut + Send + Sync,
    Fut: Future<Output = IdentityResult<Option<U>>> + Send + 'static,
    U: Send + 'static,
{
    VerifyFn { f }
}

#[async_trait]
impl<F, Fut, U> Verify for VerifyFn<F>
where
    F: Fn(String, Option<String>, NormalizedProfile) -> Fut + Send + Sync,
    Fut: Future<Output = IdentityResult<Option<U>>> + Send + 'static,
    U: Send + 'static,
{
    type User = U;

    async fn verify(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
        profile: NormalizedProfile,
    ) -> IdentityResult<Option<U>> {
        (self.f)(
            access_token.to_string(),
            refresh_token.map(str::to_string),
            profile,
        )
        .await
    }
}
