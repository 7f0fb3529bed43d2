// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chat;
pub mod credential;
pub mod workout;

pub use chat::{CalendarAnnotation, ChatTurn};
pub use credential::Credential;
pub use workout::{CreatedEvent, EventValidationError, UpcomingWorkout, WorkoutEvent};
