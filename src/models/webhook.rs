// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava webhook event payload.

use serde::{Deserialize, Deserializer};

/// Strava webhook event.
///
/// Strava sends numeric IDs; they are normalized to strings so they can be
/// compared against the text `strava_id` property on Notion pages. Missing
/// fields deserialize to empty values and are handled by the reconciler.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct WebhookEvent {
    #[serde(default, deserialize_with = "lenient_string")]
    pub object_type: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub aspect_type: String,
    #[serde(default, deserialize_with = "id_as_string")]
    pub object_id: String,
    #[serde(default, deserialize_with = "id_as_string")]
    pub owner_id: String,
    #[serde(default)]
    pub event_time: Option<i64>,
    #[serde(default)]
    pub subscription_id: Option<u64>,
    #[serde(default)]
    pub updates: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Kind of object the event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Activity,
    Other,
}

/// What happened to the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectType {
    Create,
    Update,
    Delete,
    Other,
}

impl WebhookEvent {
    pub fn object_type(&self) -> ObjectType {
        match self.object_type.as_str() {
            "activity" => ObjectType::Activity,
            _ => ObjectType::Other,
        }
    }

    pub fn aspect_type(&self) -> AspectType {
        match self.aspect_type.as_str() {
            "create" => AspectType::Create,
            "update" => AspectType::Update,
            "delete" => AspectType::Delete,
            _ => AspectType::Other,
        }
    }
}

/// Accept any JSON value; anything but a string becomes empty and
/// classifies as `Other`.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Accept an ID given as a JSON number, a string, or null.
fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s.trim().to_string()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected an ID as number or string, got {other}"
        ))),
    }
}
