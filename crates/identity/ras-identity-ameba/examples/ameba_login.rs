//! Example showing how to authenticate a user with Ameba
//!
//! Reads `AMEBA_*` settings from the environment (or a `.env` file), prints the
//! authorization URL, and, when `AMEBA_CODE` from the callback is supplied, completes the
//! flow and prints the normalized profile. Issued states only live for one process, so
//! completing a flow started by an earlier run needs `AMEBA_STATE=false`.

use ras_identity_ameba::{AmebaStrategy, AmebaStrategyOptions, AuthStrategy, verify_fn};
use ras_identity_core::{AuthOutcome, AuthorizationCallback, NormalizedProfile};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = AmebaStrategyOptions::from_env();
    let verify = verify_fn(|_access_token, _refresh_token, profile: NormalizedProfile| async move {
        Ok(Some(profile))
    });
    let strategy = AmebaStrategy::new(options, verify)?;

    let callback = AuthorizationCallback {
        code: std::env::var("AMEBA_CODE").ok(),
        ..Default::default()
    };

    match strategy.authenticate(callback).await? {
        AuthOutcome::Redirect(redirect) => {
            println!("Open this URL to sign in with {}:", strategy.name());
            println!("{}", redirect.url);
            if let Some(state) = redirect.state {
                println!("State: {}", state);
            }
        }
        AuthOutcome::Success(profile) => {
            info!("Authenticated {:?}", profile.id);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        AuthOutcome::Failure { message } => {
            println!("Authentication failed: {}", message);
        }
    }

    Ok(())
}
