// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Correlation lookup from a Strava activity ID to its Notion page.

use crate::models::DownstreamPage;
use std::fmt::Display;

/// Find the page whose `strava_id` equals `source_id`.
///
/// The correlation key is stored as text, so the source ID is stringified
/// before comparing. Pages are scanned in listing order and the first match
/// wins, which keeps duplicates (from racing creates) deterministic.
pub fn find_by_source_id<'a>(
    pages: &'a [DownstreamPage],
    source_id: impl Display,
) -> Option<&'a str> {
    let wanted = source_id.to_string();
    pages
        .iter()
        .find(|page| page.strava_id().is_some_and(|id| id.trim() == wanted))
        .map(|page| page.id.as_str())
}
