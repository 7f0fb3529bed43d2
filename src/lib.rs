// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FitBot: a Gemini-backed gym assistant with Google Calendar scheduling.
//!
//! This crate provides the backend API that answers fitness questions and,
//! once the user explicitly confirms, books workouts on their calendar.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{Assistant, CalendarService, CredentialStore};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// `None` when no Gemini API key is configured.
    pub assistant: Option<Assistant>,
    pub calendar: CalendarService,
    pub credentials: Arc<CredentialStore>,
}
