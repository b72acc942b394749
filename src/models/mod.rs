// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod credentials;
pub mod page;
pub mod webhook;

pub use credentials::Credentials;
pub use page::{DownstreamPage, PageDraft};
pub use webhook::{AspectType, ObjectType, WebhookEvent};
