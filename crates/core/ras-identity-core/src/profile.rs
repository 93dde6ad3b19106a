//! Provider-agnostic user profile.

use serde::{Deserialize, Serialize};

/// Normalized profile produced by a strategy after fetching the provider's user resource.
///
/// Optional fields are omitted when serialized, so an absent `emails` list stays distinct
/// from an empty one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedProfile {
    /// Provider label written by the strategy, not by the normalizer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: ProfileName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<ProfileValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<ProfileValue>>,
    /// Response body exactly as received from the provider.
    #[serde(rename = "_raw", default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Decoded response body.
    #[serde(rename = "_json", default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
}

/// Structured name. Always present on a profile; each part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
}

/// Single entry of a multi-valued profile attribute such as `emails` or `photos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileValue {
    pub value: String,
}

impl ProfileValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl NormalizedProfile {
    /// First email address, if any.
    pub fn primary_email(&self) -> Option<&str> {
        self.emails
            .as_ref()
            .and_then(|emails| emails.first())
            .map(|email| email.value.as_str())
    }
}
