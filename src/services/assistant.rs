// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat orchestration: gate → prompt → completion → action → calendar.
//!
//! Always produces display text. Upstream failures become annotated
//! messages, never errors.

use crate::models::{CalendarAnnotation, ChatTurn};
use crate::policy::{
    CALENDAR_FAILURE_TEXT, CAPABILITY_TEXT, DISCLAIMER, MALFORMED_RESPONSE_TEXT, TIMEOUT_TEXT, TRANSPORT_ERROR_TEXT,
    UNEXPECTED_ERROR_TEXT,
};
use crate::services::action::{ActionExtractor, ActionPayload};
use crate::services::calendar::{CalendarError, CalendarService};
use crate::services::completion::{CompletionError, CompletionOracle};
use crate::services::prompt::PromptBuilder;
use std::sync::Arc;

/// Gym assistant answering one question per call.
#[derive(Clone)]
pub struct Assistant {
    prompts: PromptBuilder,
    completion: Arc<dyn CompletionOracle>,
    extractor: ActionExtractor,
    calendar: CalendarService,
}

impl Assistant {
    pub fn new(completion: Arc<dyn CompletionOracle>, calendar: CalendarService) -> Self {
        Self {
            prompts: PromptBuilder::default(),
            completion,
            extractor: ActionExtractor::default(),
            calendar,
        }
    }

    /// Answer `user_question`, returning only the display text.
    pub async fn chat(&self, user_question: &str) -> String {
        self.respond(user_question).await.final_text
    }

    /// Answer `user_question`, returning the full record of the turn.
    pub async fn respond(&self, user_question: &str) -> ChatTurn {
        let Some(prompt) = self.prompts.build(user_question) else {
            tracing::info!("Question outside fitness domain, skipping completion");
            return ChatTurn {
                user_question: user_question.to_string(),
                gated: true,
                prompt: None,
                raw_response: None,
                extracted_action: None,
                calendar: None,
                final_text: CAPABILITY_TEXT.to_string(),
            };
        };

        let (raw_response, mut text) = match self.completion.complete(&prompt).await {
            Ok(text) => (Some(text.clone()), text),
            Err(e) => {
                tracing::warn!(error = %e, "Completion failed");
                (None, failure_text(&e).to_string())
            }
        };

        let extracted_action = raw_response
            .as_deref()
            .and_then(|raw| self.extractor.extract(raw));

        let calendar = match &extracted_action {
            Some(ActionPayload::CreateCalendarEvent(event)) => {
                let annotation = match self.calendar.create_event(event).await {
                    Ok(created) => CalendarAnnotation::Created {
                        message: created.message,
                        event_link: created.event_link,
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "Calendar action failed");
                        CalendarAnnotation::Failed(calendar_failure_text(&e))
                    }
                };
                text.push_str(&render_annotation(&annotation));
                Some(annotation)
            }
            None => None,
        };

        text.push_str(DISCLAIMER);

        ChatTurn {
            user_question: user_question.to_string(),
            gated: false,
            prompt: Some(prompt),
            raw_response,
            extracted_action,
            calendar,
            final_text: text,
        }
    }
}

/// User-facing text for a completion failure.
pub fn failure_text(err: &CompletionError) -> &'static str {
    match err {
        CompletionError::Timeout => TIMEOUT_TEXT,
        CompletionError::Transport(_) => TRANSPORT_ERROR_TEXT,
        CompletionError::MalformedResponse(_) => MALFORMED_RESPONSE_TEXT,
        CompletionError::Unexpected(_) => UNEXPECTED_ERROR_TEXT,
    }
}

/// User-facing text for a failed calendar action. Provider details stay in the logs.
fn calendar_failure_text(err: &CalendarError) -> String {
    match err {
        CalendarError::Provider(_) => CALENDAR_FAILURE_TEXT.to_string(),
        CalendarError::NotInitialized | CalendarError::Unavailable => err.to_string(),
    }
}

fn render_annotation(annotation: &CalendarAnnotation) -> String {
    match annotation {
        CalendarAnnotation::Created {
            message,
            event_link: Some(link),
        } => format!("\n\n📅 {}\n🔗 Link: {}", message, link),
        CalendarAnnotation::Created {
            message,
            event_link: None,
        } => format!("\n\n📅 {}", message),
        CalendarAnnotation::Failed(error) => format!("\n\n❌ Gagal membuat jadwal: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_maps_to_fixed_text() {
        assert_eq!(failure_text(&CompletionError::Timeout), TIMEOUT_TEXT);
        assert_eq!(
            failure_text(&CompletionError::Transport("HTTP 500: secret body".into())),
            TRANSPORT_ERROR_TEXT
        );
        assert_eq!(
            failure_text(&CompletionError::MalformedResponse("eof".into())),
            MALFORMED_RESPONSE_TEXT
        );
        assert_eq!(
            failure_text(&CompletionError::Unexpected("x".into())),
            UNEXPECTED_ERROR_TEXT
        );
    }

    #[test]
    fn annotation_rendering() {
        let created = CalendarAnnotation::Created {
            message: "ok".to_string(),
            event_link: Some("https://calendar/e1".to_string()),
        };
        assert_eq!(
            render_annotation(&created),
            "\n\n📅 ok\n🔗 Link: https://calendar/e1"
        );

        let failed = CalendarAnnotation::Failed("Google Calendar service not initialized".into());
        assert_eq!(
            render_annotation(&failed),
            "\n\n❌ Gagal membuat jadwal: Google Calendar service not initialized"
        );
    }

    #[test]
    fn calendar_provider_detail_is_not_shown() {
        let err = CalendarError::Provider(
            "Error creating event: Request had invalid authentication credentials; internal-id=abc"
                .to_string(),
        );
        let text = calendar_failure_text(&err);
        assert_eq!(text, CALENDAR_FAILURE_TEXT);
        assert!(!text.contains("internal-id"));

        assert_eq!(
            calendar_failure_text(&CalendarError::NotInitialized),
            "Google Calendar service not initialized"
        );
    }
}
