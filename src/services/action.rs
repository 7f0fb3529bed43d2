// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Extraction of confirmed calendar actions from free-form completion text.
//!
//! Two stages:
//! 1. Lexical scan for flat `{ ... "action" ... }` objects (no nested braces),
//!    dropping any candidate whose preceding text window carries an example
//!    marker ("contoh", "example", ...).
//! 2. Strict schema validation of each remaining candidate.
//!
//! The first candidate that passes both stages wins; later ones are ignored.
//! Nothing is ever executed from a payload that lacks `"confirmed": true`.

use crate::models::{EventValidationError, WorkoutEvent};
use crate::policy::CREATE_EVENT_ACTION;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Characters of text before a candidate inspected for example markers.
pub const LOOKBACK_CHARS: usize = 120;

/// Words that mark the following JSON as illustrative.
pub const EXAMPLE_MARKERS: &[&str] = &[
    "contoh",
    "misalnya",
    "ilustrasi",
    "example",
    "sample",
    "template",
];

static ACTION_OBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{[^{}]*"action"[^{}]*\}"#).expect("action object pattern is valid")
});

/// A validated, confirmed action found in completion text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPayload {
    CreateCalendarEvent(WorkoutEvent),
}

/// Candidate object located by the lexical scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate<'a> {
    /// Byte offset of the opening brace.
    pub start: usize,
    pub text: &'a str,
}

/// Why a candidate was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionRejection {
    #[error("preceded by example marker {0:?}")]
    ExampleContext(&'static str),

    #[error("not valid JSON: {0}")]
    Unparsable(String),

    #[error("not a JSON object")]
    NotAnObject,

    #[error("unknown action")]
    UnknownAction,

    #[error("action not confirmed")]
    NotConfirmed,

    #[error("field {0:?} missing or not a string")]
    NotAString(&'static str),

    #[error("duration missing or not an integer")]
    InvalidDuration,

    #[error("description is not a string")]
    InvalidDescription,

    #[error(transparent)]
    InvalidEvent(#[from] EventValidationError),
}

/// Scans completion text for confirmed action payloads.
#[derive(Debug, Clone)]
pub struct ActionExtractor {
    lookback_chars: usize,
    markers: &'static [&'static str],
}

impl Default for ActionExtractor {
    fn default() -> Self {
        Self {
            lookback_chars: LOOKBACK_CHARS,
            markers: EXAMPLE_MARKERS,
        }
    }
}

impl ActionExtractor {
    /// Return the first confirmed, valid action in document order.
    pub fn extract(&self, raw_text: &str) -> Option<ActionPayload> {
        for candidate in self.candidates(raw_text) {
            match self.evaluate(raw_text, candidate) {
                Ok(payload) => {
                    tracing::info!(offset = candidate.start, "Confirmed action extracted");
                    return Some(payload);
                }
                Err(reason) => {
                    tracing::debug!(
                        offset = candidate.start,
                        reason = %reason,
                        "Discarding action candidate"
                    );
                }
            }
        }
        None
    }

    /// Stage 1: flat objects mentioning `"action"`, in document order.
    pub fn candidates<'a>(&self, raw_text: &'a str) -> Vec<Candidate<'a>> {
        ACTION_OBJECT
            .find_iter(raw_text)
            .map(|m| Candidate {
                start: m.start(),
                text: m.as_str(),
            })
            .collect()
    }

    /// Run both stages on a single candidate.
    pub fn evaluate(
        &self,
        raw_text: &str,
        candidate: Candidate<'_>,
    ) -> Result<ActionPayload, ActionRejection> {
        if let Some(marker) = self.example_marker_before(raw_text, candidate.start) {
            return Err(ActionRejection::ExampleContext(marker));
        }

        let value: Value = serde_json::from_str(candidate.text)
            .map_err(|e| ActionRejection::Unparsable(e.to_string()))?;

        validate(&value)
    }

    fn example_marker_before(&self, raw_text: &str, start: usize) -> Option<&'static str> {
        let prefix = &raw_text[..start];
        let window_start = prefix
            .char_indices()
            .rev()
            .nth(self.lookback_chars.saturating_sub(1))
            .map_or(0, |(idx, _)| idx);
        let window = prefix[window_start..].to_lowercase();

        self.markers
            .iter()
            .copied()
            .find(|marker| window.contains(marker))
    }
}

/// Stage 2: strict schema validation.
pub fn validate(value: &Value) -> Result<ActionPayload, ActionRejection> {
    let obj = value.as_object().ok_or(ActionRejection::NotAnObject)?;

    match obj.get("action") {
        Some(Value::String(action)) if action == CREATE_EVENT_ACTION => {}
        _ => return Err(ActionRejection::UnknownAction),
    }

    // Only a real boolean `true` counts; "true", 1 and friends do not.
    if obj.get("confirmed") != Some(&Value::Bool(true)) {
        return Err(ActionRejection::NotConfirmed);
    }

    let title = string_field(obj, "title")?;
    let date = string_field(obj, "date")?;
    let time = string_field(obj, "time")?;

    // Booleans are a separate JSON type and never reach `as_i64`; floats
    // (including 2.0) are rejected.
    let duration = match obj.get("duration") {
        Some(Value::Number(n)) => n.as_i64().ok_or(ActionRejection::InvalidDuration)?,
        _ => return Err(ActionRejection::InvalidDuration),
    };

    let description = match obj.get("description") {
        None => None,
        Some(Value::String(s)) => Some(s.as_str()),
        Some(_) => return Err(ActionRejection::InvalidDescription),
    };

    let event = WorkoutEvent::parse(title, date, time, duration, description)?;
    Ok(ActionPayload::CreateCalendarEvent(event))
}

fn string_field<'a>(
    obj: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ActionRejection> {
    obj.get(key)
        .and_then(Value::as_str)
        .ok_or(ActionRejection::NotAString(key))
}

/// Extract with the default extractor.
pub fn extract(raw_text: &str) -> Option<ActionPayload> {
    ActionExtractor::default().extract(raw_text)
}
