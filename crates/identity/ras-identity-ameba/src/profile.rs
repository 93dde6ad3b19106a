//! Ameba user resource to normalized profile mapping.

use ras_identity_core::{NormalizedProfile, ProfileName, ProfileValue};
use serde_json::Value;

/// Input accepted by [`parse`]: an already decoded document or its JSON text.
#[derive(Debug, Clone, Copy)]
pub enum ProfileSource<'a> {
    Json(&'a Value),
    Text(&'a str),
}

impl<'a> From<&'a Value> for ProfileSource<'a> {
    fn from(value: &'a Value) -> Self {
        Self::Json(value)
    }
}

impl<'a> From<&'a str> for ProfileSource<'a> {
    fn from(text: &'a str) -> Self {
        Self::Text(text)
    }
}

impl<'a> From<&'a String> for ProfileSource<'a> {
    fn from(text: &'a String) -> Self {
        Self::Text(text.as_str())
    }
}

/// Map an Ameba user document to a [`NormalizedProfile`].
///
/// Text input is decoded first; a decode failure is returned as-is. The result never has
/// `provider`, `_raw` or `_json` set, those belong to the strategy.
pub fn parse<'a>(input: impl Into<ProfileSource<'a>>) -> serde_json::Result<NormalizedProfile> {
    match input.into() {
        ProfileSource::Json(value) => Ok(from_json(value)),
        ProfileSource::Text(text) => {
            let value: Value = serde_json::from_str(text)?;
            Ok(from_json(&value))
        }
    }
}

fn from_json(json: &Value) -> NormalizedProfile {
    NormalizedProfile {
        provider: None,
        id: field(json, "id"),
        description: field(json, "description"),
        display_name: field(json, "name"),
        name: ProfileName {
            family_name: field(json, "last_name"),
            given_name: field(json, "first_name"),
            middle_name: field(json, "middle_name"),
        },
        gender: field(json, "gender"),
        birthday: field(json, "birthday"),
        emails: single_value(json, "email"),
        photos: single_value(json, "picture"),
        raw: None,
        json: None,
    }
}

/// String form of a scalar field. `null`, arrays and objects count as absent.
fn field(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// One-element list for a truthy scalar field. `false`, `0`, `""` and `null` count as unset.
fn single_value(json: &Value, key: &str) -> Option<Vec<ProfileValue>> {
    let value = match json.get(key)? {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) if n.as_f64().is_some_and(|n| n != 0.0) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => return None,
    };
    Some(vec![ProfileValue::new(value)])
}
