// Apple-specific utility functions
use crate::models::PersonName;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Name block of the `user` parameter Apple posts on first authorization
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AppleUserName {
    #[serde(rename = "firstName")]
    pub first_name: Option<String>,
    #[serde(rename = "middleName", default)]
    pub middle_name: Option<String>,
    #[serde(rename = "lastName")]
    pub last_name: Option<String>,
}

/// The `user` parameter of Apple's web `form_post` callback
///
/// Apple sends it only the first time a user authorizes the app, as a JSON
/// string next to `code`, `id_token` and `state`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct AppleUserInfo {
    #[serde(default)]
    pub name: AppleUserName,
    pub email: Option<String>,
}

impl AppleUserInfo {
    /// Structured name, or `None` when Apple sent no name components
    #[must_use]
    pub fn person_name(&self) -> Option<PersonName> {
        let name = PersonName {
            given_name: self.name.first_name.clone(),
            middle_name: self.name.middle_name.clone(),
            family_name: self.name.last_name.clone(),
            ..PersonName::default()
        };
        (!name.is_empty()).then_some(name)
    }
}

/// Parse Apple user information from a JSON value
///
/// Accepts either an object or a string containing JSON, since the web
/// callback delivers the `user` field form-encoded.
///
/// Returns `None`, after a debug log, when the value does not hold a user object.
#[must_use]
pub fn process_apple_user_info(user_value: &Value) -> Option<AppleUserInfo> {
    let parsed = match user_value {
        Value::Object(_) => serde_json::from_value::<AppleUserInfo>(user_value.clone()).ok(),
        Value::String(json_str) => serde_json::from_str::<AppleUserInfo>(json_str).ok(),
        _ => None,
    };

    if parsed.is_none() {
        log::debug!("Ignoring unparseable Apple user info");
    }
    parsed
}
