// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webhook reconciliation: turns one Strava event into the matching Notion
//! create, update or archive.
//!
//! Each delivery is handled start to finish within its request:
//! 1. Classify the event (non-activity and unknown aspects are ignored)
//! 2. Ensure a valid Strava token for the owner
//! 3. Fetch the activity (gone on Strava means nothing to do)
//! 4. Locate the existing page by `strava_id` (updates and deletes)
//! 5. Map and write
//!
//! Errors are caught at the flow boundary and returned as a `FlowFailure`
//! after the reauthorization check has run.

use crate::error::AppError;
use crate::models::page::properties;
use crate::models::{AspectType, ObjectType, WebhookEvent};
use crate::services::index::find_by_source_id;
use crate::services::mapper;
use crate::services::notion::NotionClient;
use crate::services::reauth::{self, ReauthorizationRequired};
use crate::services::strava::{StravaActivity, StravaService};

/// Which flow an event was dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Create,
    Update,
    Delete,
}

impl Flow {
    /// Message reported to the webhook sender when this flow fails.
    pub fn failure_message(self) -> &'static str {
        match self {
            Flow::Create => "Error creating Strava webhook event.",
            Flow::Update => "Error updating Strava webhook event.",
            Flow::Delete => "Error deleting Strava webhook event.",
        }
    }
}

/// How an acknowledged event was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// New page created (also reached from an update with no existing page)
    Created { page_id: String },
    Updated { page_id: String },
    Archived { page_id: String },
    /// Delete for an activity that has no page
    AlreadyAbsent,
    /// Strava no longer has the activity
    ActivityGone,
    /// The mapper produced no page for the activity
    EmptyDraft,
    /// Event type this service does not handle
    Ignored,
}

/// A flow that aborted with an error.
#[derive(Debug)]
pub struct FlowFailure {
    pub flow: Flow,
    pub error: AppError,
    /// Set when the error means the owner's Strava access was revoked
    pub reauthorization: Option<ReauthorizationRequired>,
}

/// Reconciles Strava webhook events against the Notion activity database.
#[derive(Clone)]
pub struct Reconciler {
    strava: StravaService,
    notion: NotionClient,
}

impl Reconciler {
    pub fn new(strava: StravaService, notion: NotionClient) -> Self {
        Self { strava, notion }
    }

    /// Dispatch one webhook event.
    pub async fn handle(&self, event: &WebhookEvent) -> Result<Outcome, FlowFailure> {
        if event.object_type() != ObjectType::Activity {
            tracing::warn!(
                object_type = %event.object_type,
                "Unexpected Strava object_type, ignoring"
            );
            return Ok(Outcome::Ignored);
        }

        let (flow, result) = match event.aspect_type() {
            AspectType::Delete => (Flow::Delete, self.delete_flow(event).await),
            AspectType::Create => (Flow::Create, self.create_flow(event).await),
            AspectType::Update => (Flow::Update, self.update_flow(event).await),
            AspectType::Other => {
                tracing::warn!(
                    aspect_type = %event.aspect_type,
                    "Unexpected Strava aspect_type, ignoring"
                );
                return Ok(Outcome::Ignored);
            }
        };

        result.map_err(|error| {
            let reauthorization = reauth::intercept(&error, &event.owner_id);
            tracing::error!(
                flow = ?flow,
                activity_id = %event.object_id,
                owner_id = %event.owner_id,
                error = %error,
                "Error processing Strava webhook event"
            );
            FlowFailure {
                flow,
                error,
                reauthorization,
            }
        })
    }

    async fn create_flow(&self, event: &WebhookEvent) -> Result<Outcome, AppError> {
        let Some(activity) = self.fetch(event).await? else {
            return Ok(Outcome::ActivityGone);
        };
        self.create_page(&activity).await
    }

    async fn update_flow(&self, event: &WebhookEvent) -> Result<Outcome, AppError> {
        let Some(activity) = self.fetch(event).await? else {
            return Ok(Outcome::ActivityGone);
        };

        let pages = self.notion.list_strava_pages().await?;
        let Some(page) = find_by_source_id(&pages, &event.object_id)
            .and_then(|id| pages.iter().find(|p| p.id == id))
        else {
            tracing::info!(
                activity_id = %event.object_id,
                "Update from unknown Strava activity, creating new Notion page"
            );
            return self.create_flow(event).await;
        };

        let exercises = self.notion.exercise_index().await?;
        let existing_ids = page.relation_ids(properties::EXERCISES_DONE);
        let seed = exercises
            .as_ref()
            .map(|index| index.names_for(&existing_ids))
            .unwrap_or_default();

        let Some(draft) = mapper::format_page(&activity, &seed) else {
            tracing::error!(
                page_id = %page.id,
                "Error updating Notion page: empty formatted notion object"
            );
            return Ok(Outcome::EmptyDraft);
        };

        let relation_ids = exercises
            .map(|index| index.merged_relation(&existing_ids, &draft.exercises))
            .unwrap_or_default();

        let updated = self
            .notion
            .update_page(&page.id, draft.into_properties(&relation_ids))
            .await?;

        Ok(Outcome::Updated {
            page_id: updated.id,
        })
    }

    async fn delete_flow(&self, event: &WebhookEvent) -> Result<Outcome, AppError> {
        if event.object_id.is_empty() {
            tracing::info!("Delete event without object_id, nothing to delete");
            return Ok(Outcome::AlreadyAbsent);
        }

        let pages = self.notion.list_strava_pages().await?;
        let Some(page_id) = find_by_source_id(&pages, &event.object_id) else {
            tracing::info!(
                activity_id = %event.object_id,
                "No Notion page for deleted activity"
            );
            return Ok(Outcome::AlreadyAbsent);
        };

        self.notion.archive_page(page_id).await?;
        Ok(Outcome::Archived {
            page_id: page_id.to_string(),
        })
    }

    /// Token refresh and activity fetch shared by create and update.
    async fn fetch(&self, event: &WebhookEvent) -> Result<Option<StravaActivity>, AppError> {
        let token = self.strava.ensure_valid_token(&event.owner_id).await?;
        self.strava.fetch_activity(&event.object_id, &token).await
    }

    async fn create_page(&self, activity: &StravaActivity) -> Result<Outcome, AppError> {
        let Some(draft) = mapper::format_page(activity, &[]) else {
            tracing::error!("Error creating Notion page: empty formatted notion object");
            return Ok(Outcome::EmptyDraft);
        };

        let relation_ids = match self.notion.exercise_index().await? {
            Some(index) => index.ids_for(&draft.exercises),
            None => Vec::new(),
        };

        let page = self
            .notion
            .create_page(draft.into_properties(&relation_ids))
            .await?;

        Ok(Outcome::Created { page_id: page.id })
    }
}
