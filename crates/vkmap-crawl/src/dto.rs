//! DTOs for decoding VK API JSON.
//!
//! Responses are decoded into these transport DTOs first, then mapped into
//! the domain records of `vkmap-core` in one pass. Nothing loosely typed
//! leaves this module.

use serde::Deserialize;
use vkmap_core::{Sex, SubscriptionEntry, SubscriptionKind, UserId, UserProfile, VkmapError};

use crate::error::FetchError;

/// Outer envelope: exactly one of `response` or `error` is present.
#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeDto {
    pub(crate) response: Option<serde_json::Value>,
    pub(crate) error: Option<ApiErrorDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDto {
    pub(crate) error_code: i64,
    #[serde(default)]
    pub(crate) error_msg: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CityDto {
    #[serde(default)]
    pub(crate) title: String,
}

/// One element of a `users.get` response.
#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    #[serde(default)]
    pub(crate) first_name: String,
    #[serde(default)]
    pub(crate) last_name: String,
    pub(crate) screen_name: Option<String>,
    pub(crate) sex: Option<i64>,
    pub(crate) home_town: Option<String>,
    pub(crate) city: Option<CityDto>,
    pub(crate) followers_count: Option<u64>,
}

/// A `{count, items}` page of follower ids.
#[derive(Debug, Deserialize)]
pub(crate) struct FollowersPageDto {
    #[serde(default)]
    pub(crate) items: Vec<i64>,
}

/// A `{count, items}` page of extended subscription records.
#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionsPageDto {
    #[serde(default)]
    pub(crate) items: Vec<serde_json::Value>,
}

/// One element of an extended `users.getSubscriptions` page.
#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionItemDto {
    pub(crate) id: i64,
    #[serde(rename = "type")]
    pub(crate) item_type: String,
    pub(crate) name: Option<String>,
    #[serde(default)]
    pub(crate) first_name: String,
    #[serde(default)]
    pub(crate) last_name: String,
    pub(crate) screen_name: Option<String>,
}

impl UserDto {
    pub(crate) fn into_domain(self) -> Result<UserProfile, VkmapError> {
        Ok(UserProfile {
            id: UserId::new(self.id)?,
            name: display_name(&self.first_name, &self.last_name),
            screen_name: non_empty(self.screen_name),
            sex: self.sex.map(Sex::from_code),
            home_town: non_empty(self.home_town),
            city: non_empty(self.city.map(|c| c.title)),
            followers_count: self.followers_count,
        })
    }
}

impl SubscriptionItemDto {
    pub(crate) fn into_domain(self) -> Result<SubscriptionEntry, VkmapError> {
        let kind = SubscriptionKind::from_api_type(&self.item_type)?;
        let name = match kind {
            SubscriptionKind::Profile => display_name(&self.first_name, &self.last_name),
            SubscriptionKind::Group => self.name.unwrap_or_default(),
        };
        Ok(SubscriptionEntry {
            id: self.id,
            name,
            screen_name: non_empty(self.screen_name),
            kind,
        })
    }
}

/// Split a raw body into its payload or its API error.
pub(crate) fn decode_envelope(body: &[u8]) -> Result<serde_json::Value, FetchError> {
    let envelope: EnvelopeDto = serde_json::from_slice(body)
        .map_err(|e| FetchError::Decode(format!("invalid API JSON payload: {e}")))?;

    match (envelope.response, envelope.error) {
        (_, Some(err)) => Err(FetchError::Api {
            code: err.error_code,
            message: err.error_msg,
        }),
        (Some(payload), None) => Ok(payload),
        (None, None) => Err(FetchError::Decode(
            "payload has neither `response` nor `error`".to_string(),
        )),
    }
}

/// Decode a payload into a DTO, mapping failures to [`FetchError::Decode`].
pub(crate) fn from_payload<T: serde::de::DeserializeOwned>(
    payload: serde_json::Value,
) -> Result<T, FetchError> {
    serde_json::from_value(payload).map_err(|e| FetchError::Decode(e.to_string()))
}

fn display_name(first: &str, last: &str) -> String {
    format!("{first} {last}").trim().to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
