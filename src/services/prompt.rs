// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt construction: policy preamble + user question + answer rules.

use crate::policy::{ANSWER_INSTRUCTIONS, POLICY_PREAMBLE, POLICY_VERSION};
use crate::services::topic_gate::TopicGate;

/// Composes completion prompts for in-domain questions.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    gate: TopicGate,
    preamble: &'static str,
    instructions: &'static str,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(TopicGate::default())
    }
}

impl PromptBuilder {
    pub fn new(gate: TopicGate) -> Self {
        Self {
            gate,
            preamble: POLICY_PREAMBLE,
            instructions: ANSWER_INSTRUCTIONS,
        }
    }

    pub fn gate(&self) -> &TopicGate {
        &self.gate
    }

    /// Build the prompt for `user_question`, or `None` if the gate rejects it.
    pub fn build(&self, user_question: &str) -> Option<String> {
        if !self.gate.is_in_domain(user_question) {
            tracing::debug!(
                question_len = user_question.len(),
                "Question rejected by topic gate"
            );
            return None;
        }

        tracing::debug!(
            policy_version = POLICY_VERSION,
            question_len = user_question.len(),
            "Building prompt"
        );

        Some(format!(
            "{}\n\nPERTANYAAN USER: {}\n\n{}",
            self.preamble, user_question, self.instructions
        ))
    }
}
