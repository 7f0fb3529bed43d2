// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat route.

use super::extract::ApiJson;
use crate::error::Result;
use crate::policy::{ASSISTANT_DISABLED_TEXT, QUESTION_TOO_LONG_TEXT};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 2000;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

#[derive(Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ChatResponse {
    pub answer: String,
}

/// Answer one question. Upstream failures and over-long questions are part of
/// the answer text; an empty question gets the capability notice from the gate.
async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let question = request.question.trim();
    let chars = question.chars().count();
    if chars > MAX_QUESTION_CHARS {
        tracing::info!(chars, "Question over length limit");
        return Ok(Json(ChatResponse {
            answer: QUESTION_TOO_LONG_TEXT.to_string(),
        }));
    }

    let answer = match &state.assistant {
        Some(assistant) => assistant.chat(question).await,
        None => ASSISTANT_DISABLED_TEXT.to_string(),
    };

    Ok(Json(ChatResponse { answer }))
}
