// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod action;
pub mod assistant;
pub mod calendar;
pub mod completion;
pub mod credentials;
pub mod prompt;
pub mod topic_gate;

pub use action::{ActionExtractor, ActionPayload};
pub use assistant::Assistant;
pub use calendar::{CalendarError, CalendarProvider, CalendarService, GoogleCalendarClient};
pub use completion::{CompletionError, CompletionOracle, GeminiClient};
pub use credentials::{
    CredentialError, CredentialState, CredentialStore, GoogleOAuthClient, TokenEndpoint,
};
pub use prompt::PromptBuilder;
pub use topic_gate::TopicGate;
