// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Workout event models shared by the action extractor, the calendar
//! delegate and the HTTP routes.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Shortest workout that can be scheduled, in hours.
pub const MIN_DURATION_HOURS: i64 = 1;
/// Longest workout that can be scheduled, in hours.
pub const MAX_DURATION_HOURS: i64 = 6;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// A validated request to create a workout event.
///
/// Only constructed through [`WorkoutEvent::parse`], so every instance has a
/// non-empty title and a duration within bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_hours: u8,
    pub description: String,
}

/// Why a workout event request was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventValidationError {
    #[error("title must not be empty")]
    EmptyTitle,

    #[error("date must be YYYY-MM-DD, got {0:?}")]
    InvalidDate(String),

    #[error("time must be HH:MM (24h), got {0:?}")]
    InvalidTime(String),

    #[error("duration must be between 1 and 6 hours, got {0}")]
    DurationOutOfRange(i64),
}

impl WorkoutEvent {
    /// Validate raw request fields into a workout event.
    pub fn parse(
        title: &str,
        date: &str,
        time: &str,
        duration_hours: i64,
        description: Option<&str>,
    ) -> Result<Self, EventValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EventValidationError::EmptyTitle);
        }

        let date = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
            .map_err(|_| EventValidationError::InvalidDate(date.to_string()))?;
        let time = NaiveTime::parse_from_str(time.trim(), TIME_FORMAT)
            .map_err(|_| EventValidationError::InvalidTime(time.to_string()))?;

        if !(MIN_DURATION_HOURS..=MAX_DURATION_HOURS).contains(&duration_hours) {
            return Err(EventValidationError::DurationOutOfRange(duration_hours));
        }

        Ok(Self {
            title: title.to_string(),
            date,
            time,
            // Range-checked above
            duration_hours: duration_hours as u8,
            description: description.unwrap_or_default().to_string(),
        })
    }

    /// Local wall-clock start.
    pub fn start(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }

    /// Local wall-clock end (start + duration).
    pub fn end(&self) -> NaiveDateTime {
        self.start() + Duration::hours(i64::from(self.duration_hours))
    }

    /// `YYYY-MM-DD` form of the date, as shown to users.
    pub fn date_label(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// `HH:MM` form of the start time, as shown to users.
    pub fn time_label(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }
}

/// Event created by the calendar provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedEvent {
    pub event_id: String,
    pub event_link: Option<String>,
    pub start_time: NaiveDateTime,
    pub message: String,
}

/// Upcoming workout as listed to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpcomingWorkout {
    pub title: String,
    /// RFC3339 date-time, or a plain date for all-day events
    pub start_time: String,
    pub description: String,
    pub event_id: String,
}
