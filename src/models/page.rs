// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notion page model (downstream side of the sync).

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Notion property names as constants.
pub mod properties {
    /// Text property holding the stringified Strava activity ID (correlation key)
    pub const STRAVA_ID: &str = "strava_id";
    pub const NAME: &str = "Name";
    pub const MOVING_TIME: &str = "Moving Time";
    pub const ELAPSED_TIME: &str = "Elapsed Time";
    pub const ELEVATION_GAIN: &str = "Elevation Gain";
    pub const DATE: &str = "Date";
    pub const DAY: &str = "Day";
    pub const AVERAGE_SPEED: &str = "Average Speed";
    pub const MAX_SPEED: &str = "Max Speed";
    pub const AVERAGE_TEMP: &str = "Average Temp";
    pub const AVERAGE_HEART_RATE: &str = "Average Heart Rate";
    pub const MAX_HEART_RATE: &str = "Max Heart Rate";
    pub const MAX_ELEVATION: &str = "Max Elevation";
    pub const MIN_ELEVATION: &str = "Min Elevation";
    pub const CATEGORY: &str = "Category";
    pub const WEIGHT_CATEGORY: &str = "Weight Category";
    pub const SUB_CATEGORY: &str = "Sub Category";
    pub const DISTANCE: &str = "Distance";
    /// Relation to the exercises database
    pub const EXERCISES_DONE: &str = "Exercises Done";
}

/// A page as returned by the Notion API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownstreamPage {
    pub id: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

impl DownstreamPage {
    /// The `strava_id` correlation value, if the property is populated.
    pub fn strava_id(&self) -> Option<&str> {
        first_text(self.properties.get(properties::STRAVA_ID)?, "rich_text")
    }

    /// Plain text of the page's title property (whatever its name).
    pub fn title(&self) -> Option<&str> {
        self.properties
            .values()
            .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
            .or_else(|| self.properties.get(properties::NAME))
            .and_then(|p| first_text(p, "title"))
    }

    /// Page IDs referenced by a relation property.
    pub fn relation_ids(&self, property: &str) -> Vec<String> {
        self.properties
            .get(property)
            .and_then(|p| p.get("relation"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|r| r.get("id").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// First non-empty text fragment of a rich text or title property.
fn first_text<'a>(property: &'a Value, kind: &str) -> Option<&'a str> {
    let fragment = property.get(kind)?.as_array()?.first()?;
    fragment
        .get("plain_text")
        .or_else(|| fragment.get("text").and_then(|t| t.get("content")))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Page properties produced by the field mapper, before relations are resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageDraft {
    pub properties: Map<String, Value>,
    /// Exercise names for the "Exercises Done" relation
    pub exercises: Vec<String>,
}

impl PageDraft {
    pub fn strava_id(&self) -> Option<&str> {
        first_text(self.properties.get(properties::STRAVA_ID)?, "rich_text")
    }

    /// Name of a select property.
    pub fn select(&self, property: &str) -> Option<&str> {
        self.properties
            .get(property)?
            .get("select")?
            .get("name")?
            .as_str()
    }

    /// Value of a number property.
    pub fn number(&self, property: &str) -> Option<f64> {
        self.properties.get(property)?.get("number")?.as_f64()
    }

    /// First text fragment of a rich text property.
    pub fn text(&self, property: &str) -> Option<&str> {
        first_text(self.properties.get(property)?, "rich_text")
    }

    /// Final property map, with the exercise relation attached when non-empty.
    pub fn into_properties(self, relation_ids: &[String]) -> Map<String, Value> {
        let mut props = self.properties;
        if !relation_ids.is_empty() {
            let relation: Vec<Value> = relation_ids.iter().map(|id| json!({ "id": id })).collect();
            props.insert(
                properties::EXERCISES_DONE.to_string(),
                json!({ "relation": relation }),
            );
        }
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(props: Value) -> DownstreamPage {
        serde_json::from_value(json!({ "id": "page-1", "properties": props })).unwrap()
    }

    #[test]
    fn test_strava_id_from_plain_text() {
        let p = page(json!({
            "strava_id": {
                "type": "rich_text",
                "rich_text": [{ "plain_text": "12345", "text": { "content": "12345" } }]
            }
        }));
        assert_eq!(p.strava_id(), Some("12345"));
    }

    #[test]
    fn test_strava_id_missing_or_empty() {
        assert_eq!(page(json!({})).strava_id(), None);
        assert_eq!(page(json!({ "strava_id": { "rich_text": [] } })).strava_id(), None);
    }

    #[test]
    fn test_title_and_relation_ids() {
        let p = page(json!({
            "Exercise": { "type": "title", "title": [{ "plain_text": "Cat Cow" }] },
            "Exercises Done": { "type": "relation", "relation": [{ "id": "a" }, { "id": "b" }] }
        }));
        assert_eq!(p.title(), Some("Cat Cow"));
        assert_eq!(p.relation_ids(properties::EXERCISES_DONE), vec!["a", "b"]);
        assert!(p.relation_ids("Other").is_empty());
    }

    #[test]
    fn test_into_properties_attaches_relation() {
        let draft = PageDraft::default();
        let props = draft.clone().into_properties(&["x".to_string()]);
        assert_eq!(props["Exercises Done"]["relation"][0]["id"], "x");

        let props = draft.into_properties(&[]);
        assert!(!props.contains_key("Exercises Done"));
    }
}
