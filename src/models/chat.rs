// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Record of a single chat turn. Nothing here outlives the request.

use crate::services::action::ActionPayload;

/// Outcome of the calendar side effect triggered by a confirmed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarAnnotation {
    Created {
        message: String,
        event_link: Option<String>,
    },
    Failed(String),
}

/// Everything the assistant did to answer one question.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_question: String,
    /// True when the topic gate rejected the question.
    pub gated: bool,
    pub prompt: Option<String>,
    pub raw_response: Option<String>,
    pub extracted_action: Option<ActionPayload>,
    pub calendar: Option<CalendarAnnotation>,
    pub final_text: String,
}
