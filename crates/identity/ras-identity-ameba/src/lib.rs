//! Ameba authentication strategy.
//!
//! Supplies the Ameba endpoints and option defaults to a generic OAuth2 client, fetches the
//! user resource with the access token sent as a bearer header, and normalizes it into a
//! [`NormalizedProfile`].
//!
//! ```rust,ignore
//! let strategy = AmebaStrategy::new(
//!     AmebaStrategyOptions::new("channel-id", "channel-secret")
//!         .with_callback_url("https://www.example.net/auth/ameba/callback"),
//!     verify_fn(|_access_token, _refresh_token, profile| async move { Ok(profile.id) }),
//! )?;
//! ```

mod options;
pub mod profile;
mod strategy;


pub use options::{
    AmebaStrategyOptions, DEFAULT_AUTHORIZATION_URL, DEFAULT_SCOPE, DEFAULT_TOKEN_URL,
    DEFAULT_USER_PROFILE_URL, PROFILE_PROVIDER, STRATEGY_NAME, StrategyConfig,
};
pub use strategy::AmebaStrategy;

// Re-export common types for convenience
pub use ras_identity_core::{AuthStrategy, NormalizedProfile, verify_fn};
