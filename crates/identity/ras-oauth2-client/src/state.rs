//! Anti-forgery state handling for the authorization request.

use crate::error::{OAuth2Error, OAuth2Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// State issued with an authorization request, valid until `expires_at`.
#[derive(Debug, Clone)]
pub struct AuthorizationState {
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Lifetime of an issued state. Rejects values chrono cannot represent.
pub(crate) fn state_ttl(ttl_seconds: u64) -> OAuth2Result<Duration> {
    i64::try_from(ttl_seconds)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ttl_out_of_range(ttl_seconds))
}

fn ttl_out_of_range(ttl_seconds: u64) -> OAuth2Error {
    OAuth2Error::ConfigError(format!("State TTL of {} seconds is out of range", ttl_seconds))
}

impl AuthorizationState {
    pub fn new(ttl_seconds: u64) -> OAuth2Result<Self> {
        let created_at = Utc::now();
        let expires_at = created_at
            .checked_add_signed(state_ttl(ttl_seconds)?)
            .ok_or_else(|| ttl_out_of_range(ttl_seconds))?;

        Ok(Self {
            state: Uuid::new_v4().to_string(),
            created_at,
            expires_at,
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn store(&self, state: AuthorizationState) -> OAuth2Result<()>;

    /// Remove and return a state. Each state verifies at most once.
    async fn take(&self, state: &str) -> OAuth2Result<AuthorizationState>;

    async fn cleanup_expired(&self) -> OAuth2Result<usize>;
}

#[derive(Default)]
pub struct InMemoryStateStore {
    states: Arc<RwLock<HashMap<String, AuthorizationState>>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn store(&self, state: AuthorizationState) -> OAuth2Result<()> {
        let mut states = self.states.write().await;
        // Abandoned flows never reach take(); drop them here so the map stays bounded.
        let now = Utc::now();
        states.retain(|_, stored| stored.expires_at >= now);
        states.insert(state.state.clone(), state);
        Ok(())
    }

    async fn take(&self, state: &str) -> OAuth2Result<AuthorizationState> {
        let mut states = self.states.write().await;
        let stored = states.remove(state).ok_or(OAuth2Error::StateNotFound)?;

        if stored.is_expired() {
            return Err(OAuth2Error::StateNotFound);
        }

        Ok(stored)
    }

    async fn cleanup_expired(&self) -> OAuth2Result<usize> {
        let mut states = self.states.write().await;
        let before = states.len();
        let now = Utc::now();
        states.retain(|_, state| state.expires_at >= now);
        Ok(before - states.len())
    }
}
