//! Generic OAuth2 client for the authorization-code flow.
//!
//! Provides the pieces an identity strategy delegates to: building the authorization URL
//! with an anti-forgery state, exchanging the authorization code for tokens, and issuing
//! authenticated GET requests against provider APIs.

mod client;
mod config;
mod error;
mod state;
mod types;

#[cfg(test)]
mod tests;

pub use client::{HttpOAuth2Client, OAuth2Client};
pub use config::OAuth2ClientConfig;
pub use error::{OAuth2Error, OAuth2Result};
pub use state::{AuthorizationState, InMemoryStateStore, StateStore};
pub use types::{AuthorizationRequest, TokenResponse};
