// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google Calendar delegate for workout events.
//!
//! Every operation needs a usable credential from the [`CredentialStore`];
//! without one it fails with [`CalendarError::NotInitialized`] (or
//! [`CalendarError::Unavailable`] after a failed token refresh) before any
//! network call. Provider failures are wrapped, never retried.

use crate::models::{CreatedEvent, UpcomingWorkout, WorkoutEvent};
use crate::services::credentials::{CredentialState, CredentialStore};
use crate::time_utils::{format_local_datetime, format_utc_rfc3339};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Google Calendar v3 REST base URL.
pub const GOOGLE_CALENDAR_API: &str = "https://www.googleapis.com/calendar/v3";

/// Server-side search filter for workout events.
pub const WORKOUT_QUERY: &str = "workout OR gym OR fitness OR latihan";

/// Calendar color used for workouts (green).
pub const WORKOUT_COLOR_ID: &str = "4";

/// Popup reminders, minutes before start.
pub const REMINDER_MINUTES: [u32; 2] = [30, 10];

const CALENDAR_HTTP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Calendar delegate errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("Google Calendar service not initialized")]
    NotInitialized,

    #[error("Google Calendar service unavailable")]
    Unavailable,

    #[error("{0}")]
    Provider(String),
}

// ─── Wire format ─────────────────────────────────────────────

/// Event resource as sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBody {
    pub summary: String,
    pub description: String,
    pub start: EventDateTime,
    pub end: EventDateTime,
    pub color_id: String,
    pub reminders: Reminders,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    /// All-day events carry a date instead of a date-time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: u32,
}

/// Event resource as returned by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEvent {
    pub id: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
}

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<ProviderEvent>,
}

/// Window and filter for listing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    pub search: String,
}

/// Build the provider event for a workout.
pub fn build_event_body(event: &WorkoutEvent, timezone: &str) -> EventBody {
    let at = |dt| EventDateTime {
        date_time: Some(format_local_datetime(dt)),
        date: None,
        time_zone: Some(timezone.to_string()),
    };

    EventBody {
        summary: event.title.clone(),
        description: event.description.clone(),
        start: at(event.start()),
        end: at(event.end()),
        color_id: WORKOUT_COLOR_ID.to_string(),
        reminders: Reminders {
            use_default: false,
            overrides: REMINDER_MINUTES
                .iter()
                .map(|&minutes| ReminderOverride {
                    method: "popup".to_string(),
                    minutes,
                })
                .collect(),
        },
    }
}

/// Calendar provider operations on the primary calendar.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn insert_event(
        &self,
        access_token: &str,
        body: &EventBody,
    ) -> Result<ProviderEvent, CalendarError>;

    async fn list_events(
        &self,
        access_token: &str,
        query: &EventQuery,
    ) -> Result<Vec<ProviderEvent>, CalendarError>;

    async fn delete_event(&self, access_token: &str, event_id: &str)
        -> Result<(), CalendarError>;
}

// ─────────────────────────────────────────────────────────────────────────────
// GoogleCalendarClient - REST client
// ─────────────────────────────────────────────────────────────────────────────

/// Google Calendar API client.
#[derive(Clone)]
pub struct GoogleCalendarClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    #[serde(default)]
    message: String,
}

impl GoogleCalendarClient {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(GOOGLE_CALENDAR_API)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(CALENDAR_HTTP_TIMEOUT)
            .build()
            .context("failed building Calendar HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/primary/events", self.base_url)
    }

    /// Check response status and turn Google's error body into a message.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, CalendarError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GoogleErrorBody>(&body)
            .ok()
            .map(|b| b.error.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP {}", status));

        tracing::warn!(status = %status, "Google Calendar request failed");
        Err(CalendarError::Provider(message))
    }

    async fn parse_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        self.check_response(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::Provider(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    async fn insert_event(
        &self,
        access_token: &str,
        body: &EventBody,
    ) -> Result<ProviderEvent, CalendarError> {
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;

        self.parse_json(response).await
    }

    async fn list_events(
        &self,
        access_token: &str,
        query: &EventQuery,
    ) -> Result<Vec<ProviderEvent>, CalendarError> {
        let response = self
            .http
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&[
                ("timeMin", format_utc_rfc3339(query.time_min)),
                ("timeMax", format_utc_rfc3339(query.time_max)),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("q", query.search.clone()),
            ])
            .send()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;

        let list: EventList = self.parse_json(response).await?;
        Ok(list.items)
    }

    async fn delete_event(
        &self,
        access_token: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| CalendarError::Provider(e.to_string()))?;

        self.check_response(response).await?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CalendarService - workout operations behind the credential store
// ─────────────────────────────────────────────────────────────────────────────

/// Workout scheduling on top of a calendar provider.
#[derive(Clone)]
pub struct CalendarService {
    credentials: Arc<CredentialStore>,
    provider: Arc<dyn CalendarProvider>,
    timezone: String,
}

impl CalendarService {
    pub fn new(
        credentials: Arc<CredentialStore>,
        provider: Arc<dyn CalendarProvider>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            provider,
            timezone: timezone.into(),
        }
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    async fn access_token(&self) -> Result<String, CalendarError> {
        if let Some(token) = self.credentials.access_token().await {
            return Ok(token);
        }
        match self.credentials.state().await {
            CredentialState::RefreshFailed => Err(CalendarError::Unavailable),
            _ => Err(CalendarError::NotInitialized),
        }
    }

    /// Create a workout event with the fixed reminder policy.
    pub async fn create_event(&self, event: &WorkoutEvent) -> Result<CreatedEvent, CalendarError> {
        let token = self.access_token().await?;
        let body = build_event_body(event, &self.timezone);

        let created = self
            .provider
            .insert_event(&token, &body)
            .await
            .map_err(|e| CalendarError::Provider(format!("Error creating event: {}", e)))?;

        tracing::info!(
            event_id = %created.id,
            date = %event.date_label(),
            duration_hours = event.duration_hours,
            "Workout event created"
        );

        Ok(CreatedEvent {
            message: format!(
                "✅ Workout '{}' berhasil dijadwalkan pada {} {}",
                event.title,
                event.date_label(),
                event.time_label()
            ),
            event_id: created.id,
            event_link: created.html_link,
            start_time: event.start(),
        })
    }

    /// Workout events between now and `days_ahead` days from now.
    pub async fn list_upcoming(
        &self,
        days_ahead: u32,
    ) -> Result<Vec<UpcomingWorkout>, CalendarError> {
        let token = self.access_token().await?;
        let now = Utc::now();
        let query = EventQuery {
            time_min: now,
            time_max: now + Duration::days(i64::from(days_ahead)),
            search: WORKOUT_QUERY.to_string(),
        };

        let events = self
            .provider
            .list_events(&token, &query)
            .await
            .map_err(|e| CalendarError::Provider(format!("Error fetching events: {}", e)))?;

        tracing::debug!(days_ahead, count = events.len(), "Listed upcoming workouts");

        Ok(events.into_iter().map(to_upcoming).collect())
    }

    /// Delete an event by id. Missing events surface as provider errors.
    pub async fn delete_event(&self, event_id: &str) -> Result<String, CalendarError> {
        let token = self.access_token().await?;

        self.provider
            .delete_event(&token, event_id)
            .await
            .map_err(|e| CalendarError::Provider(format!("Error deleting event: {}", e)))?;

        tracing::info!(event_id, "Workout event deleted");
        Ok("✅ Event berhasil dihapus".to_string())
    }
}

fn to_upcoming(event: ProviderEvent) -> UpcomingWorkout {
    let start_time = event
        .start
        .and_then(|s| s.date_time.or(s.date))
        .unwrap_or_default();

    UpcomingWorkout {
        title: event.summary.unwrap_or_else(|| "No Title".to_string()),
        start_time,
        description: event.description.unwrap_or_default(),
        event_id: event.id,
    }
}
