// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Direct calendar routes (outside the chat flow).

use super::extract::{ApiJson, ApiQuery};
use crate::error::{AppError, Result};
use crate::models::{UpcomingWorkout, WorkoutEvent};
use crate::AppState;
use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const DEFAULT_DAYS_AHEAD: u32 = 7;
const MAX_DAYS_AHEAD: u32 = 90;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-workout-event", post(create_workout_event))
        .route("/upcoming-workouts", get(upcoming_workouts))
        .route("/delete-workout", delete(delete_workout))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateWorkoutRequest {
    pub title: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    #[serde(default = "default_duration")]
    pub duration: i64,
    #[serde(default)]
    pub description: String,
}

fn default_duration() -> i64 {
    1
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateWorkoutResponse {
    pub success: bool,
    pub event_id: String,
    pub event_link: Option<String>,
    pub message: String,
}

async fn create_workout_event(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<CreateWorkoutRequest>,
) -> Result<Json<CreateWorkoutResponse>> {
    let event = WorkoutEvent::parse(
        &request.title,
        &request.date,
        &request.time,
        request.duration,
        Some(&request.description),
    )?;

    let created = state.calendar.create_event(&event).await?;

    Ok(Json(CreateWorkoutResponse {
        success: true,
        event_id: created.event_id,
        event_link: created.event_link,
        message: created.message,
    }))
}

// ─── List ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpcomingParams {
    #[serde(default)]
    days: Option<i64>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpcomingWorkoutsResponse {
    pub success: bool,
    pub events: Vec<UpcomingWorkout>,
}

async fn upcoming_workouts(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<UpcomingParams>,
) -> Result<Json<UpcomingWorkoutsResponse>> {
    let days = match params.days {
        None => DEFAULT_DAYS_AHEAD,
        Some(days) => u32::try_from(days)
            .ok()
            .filter(|d| (1..=MAX_DAYS_AHEAD).contains(d))
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "days must be between 1 and {}, got {}",
                    MAX_DAYS_AHEAD, days
                ))
            })?,
    };

    let events = state.calendar.list_upcoming(days).await?;

    Ok(Json(UpcomingWorkoutsResponse {
        success: true,
        events,
    }))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteWorkoutRequest {
    pub event_id: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

async fn delete_workout(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<DeleteWorkoutRequest>,
) -> Result<Json<MessageResponse>> {
    let event_id = request.event_id.trim();
    if event_id.is_empty() {
        return Err(AppError::BadRequest("event_id must not be empty".to_string()));
    }

    let message = state.calendar.delete_event(event_id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}
