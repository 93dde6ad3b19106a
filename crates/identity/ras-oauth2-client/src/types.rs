//! OAuth2 protocol types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authorization URL to redirect the user agent to, with the state it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: Option<String>,
}

/// OAuth2 token response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Any provider-specific fields.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl TokenResponse {
    /// Parse a form-encoded token response (`access_token=...&token_type=...`).
    pub(crate) fn from_form(body: &str) -> Option<Self> {
        let mut fields: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect();

        let access_token = fields.remove("access_token")?;
        let expires_in = fields.remove("expires_in").and_then(|v| v.parse().ok());

        Some(Self {
            access_token,
            token_type: fields.remove("token_type"),
            expires_in,
            refresh_token: fields.remove("refresh_token"),
            scope: fields.remove("scope"),
            extra: fields
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect(),
        })
    }
}
