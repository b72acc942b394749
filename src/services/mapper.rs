// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Maps a Strava activity onto the Notion activity database schema.

use crate::models::page::properties;
use crate::models::PageDraft;
use crate::services::strava::StravaActivity;
use crate::units;
use serde_json::{json, Value};

/// Stretches logged alongside every weight training session.
pub const STRETCH_ROUTINE: [&str; 8] = [
    "Cat Cow",
    "Asian Squat",
    "Downward Dog",
    "Front Neck Stretch",
    "Seal Stretch",
    "Tree Pose",
    "Wall Arm Raises",
    "Worlds Greatest Stretch",
];

/// Notion "Category" for a Strava activity type.
pub fn category_for(kind: &str) -> &'static str {
    match kind {
        "Hike" => "Hikes",
        _ => "Habits",
    }
}

/// Notion "Weight Category" for a Strava activity type.
pub fn weight_category_for(kind: &str) -> &'static str {
    match kind {
        "AlpineSki" | "BackcountrySki" | "Hike" | "Run" => "Cardio",
        "Walk" => "Rest",
        "WeightTraining" => "Weights",
        _ => "Cardio",
    }
}

/// Exercises done for an activity type, appended to `seed` without duplicates.
///
/// Seeding with the page's current relation keeps earlier entries when an
/// activity is updated.
pub fn exercises_done(kind: Option<&str>, seed: &[String]) -> Vec<String> {
    let added: &[&str] = match kind {
        Some("Hike") => &["Hike"],
        Some("Run") => &["Run"],
        Some("WeightTraining") => &STRETCH_ROUTINE,
        _ => &[],
    };

    let mut merged: Vec<String> = Vec::with_capacity(seed.len() + added.len());
    for name in seed.iter().map(String::as_str).chain(added.iter().copied()) {
        if !merged.iter().any(|existing| existing == name) {
            merged.push(name.to_string());
        }
    }
    merged
}

fn rich_text(content: impl Into<String>) -> Value {
    json!({ "rich_text": [{ "text": { "content": content.into() } }] })
}

fn number(value: f64) -> Value {
    json!({ "number": value })
}

fn select(name: &str) -> Value {
    json!({ "select": { "name": name } })
}

fn multi_select(name: &str) -> Value {
    json!({ "multi_select": [{ "name": name }] })
}

/// Build the page properties for an activity.
///
/// Returns `None` when the activity carries no ID, since a page without the
/// `strava_id` correlation key could never be found again.
pub fn format_page(activity: &StravaActivity, relation_seed: &[String]) -> Option<PageDraft> {
    let id = activity.id?;
    let mut draft = PageDraft::default();
    let props = &mut draft.properties;

    props.insert(properties::STRAVA_ID.into(), rich_text(id.to_string()));

    if let Some(name) = &activity.name {
        props.insert(
            properties::NAME.into(),
            json!({ "title": [{ "text": { "content": name } }] }),
        );
        if name.to_lowercase().contains("dog") {
            props.insert(properties::SUB_CATEGORY.into(), multi_select("Dog Walk"));
        }
    }

    if let Some(secs) = activity.moving_time {
        props.insert(
            properties::MOVING_TIME.into(),
            rich_text(units::seconds_to_time(secs)),
        );
    }
    if let Some(secs) = activity.elapsed_time {
        props.insert(
            properties::ELAPSED_TIME.into(),
            rich_text(units::seconds_to_time(secs)),
        );
    }

    if let Some(start) = &activity.start_date_local {
        props.insert(properties::DATE.into(), json!({ "date": { "start": start } }));
        match units::date_to_day_of_week(start) {
            Some(day) => {
                props.insert(properties::DAY.into(), multi_select(day));
            }
            None => tracing::debug!(start = %start, "Unparseable start date, skipping Day"),
        }
    }

    let lengths_in_feet = [
        (properties::ELEVATION_GAIN, activity.total_elevation_gain),
        (properties::MAX_ELEVATION, activity.elev_high),
        (properties::MIN_ELEVATION, activity.elev_low),
    ];
    for (property, meters) in lengths_in_feet {
        if let Some(m) = meters {
            props.insert(property.into(), number(units::meters_to_feet(m)));
        }
    }

    if let Some(m) = activity.distance {
        props.insert(
            properties::DISTANCE.into(),
            number(units::meters_to_miles(m)),
        );
    }

    let speeds = [
        (properties::AVERAGE_SPEED, activity.average_speed),
        (properties::MAX_SPEED, activity.max_speed),
    ];
    for (property, mps) in speeds {
        if let Some(v) = mps {
            props.insert(property.into(), number(units::meters_per_sec_to_mph(v)));
        }
    }

    if let Some(celsius) = activity.average_temp {
        props.insert(
            properties::AVERAGE_TEMP.into(),
            rich_text(format!(
                "{}°F | {}°C",
                units::celsius_to_fahrenheit(celsius),
                celsius
            )),
        );
    }

    if let Some(bpm) = activity.average_heartrate {
        props.insert(properties::AVERAGE_HEART_RATE.into(), number(bpm));
    }
    if let Some(bpm) = activity.max_heartrate {
        props.insert(properties::MAX_HEART_RATE.into(), number(bpm));
    }

    if let Some(kind) = activity.kind() {
        props.insert(properties::CATEGORY.into(), select(category_for(kind)));
        props.insert(
            properties::WEIGHT_CATEGORY.into(),
            select(weight_category_for(kind)),
        );
    }

    draft.exercises = exercises_done(activity.kind(), relation_seed);
    Some(draft)
}
