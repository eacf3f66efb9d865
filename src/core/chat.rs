//! The tool-calling conversation loop
//!
//! One `chat` call drives a full turn against the model:
//! 1. Compose the message sequence: persona system prompt, the caller's
//!    history, the new user message.
//! 2. Call the model with the registry's tool definitions attached.
//! 3. On a tool-call response, dispatch every request in emitted order,
//!    append the assistant message and one tagged result per request, and
//!    call the model again.
//! 4. Return the text of the first non-tool response.
//!
//! The model decides how many tool rounds a turn needs; a bounded call
//! counter keeps a confused model from looping forever.

use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::conversation::{Message, ToolCallRequest};
use crate::persona::Persona;
use crate::providers::{ChatProvider, ProviderError};
use crate::tools::ToolRegistry;

/// Maximum model calls per turn before the conversation is declared
/// non-terminating.
const MAX_MODEL_CALLS: usize = 10;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("conversation did not terminate within {limit} model calls")]
    NonTermination { limit: usize },
}

pub struct ChatEngine {
    provider: Arc<dyn ChatProvider>,
    tools: Arc<ToolRegistry>,
    persona: Arc<Persona>,
}

impl ChatEngine {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        tools: Arc<ToolRegistry>,
        persona: Arc<Persona>,
    ) -> Self {
        Self {
            provider,
            tools,
            persona,
        }
    }

    /// Run one user turn to completion. The caller owns the history; the
    /// engine keeps no state between calls.
    pub async fn chat(&self, message: &str, history: &[Message]) -> Result<String, ChatError> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(self.persona.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(Message::user(message));

        let definitions = self.tools.definitions();

        for _ in 0..MAX_MODEL_CALLS {
            let turn = self.provider.complete(&messages, &definitions).await?;

            if !turn.wants_tools() {
                return Ok(turn.text());
            }

            // Append the assistant's request message first, then one
            // result per request in emitted order, so every tool message
            // references an id from the message directly before it.
            let requests = turn.tool_calls().to_vec();
            messages.push(turn.message);
            for request in &requests {
                let payload = self.run_tool(request).await;
                messages.push(Message::tool_result(&request.id, payload.to_string()));
            }
        }

        Err(ChatError::NonTermination {
            limit: MAX_MODEL_CALLS,
        })
    }

    /// Dispatch one requested call. Dispatch failures are folded into the
    /// result payload so the model can recover within the same turn
    /// instead of the whole conversation aborting.
    async fn run_tool(&self, request: &ToolCallRequest) -> Value {
        let name = &request.function.name;
        tracing::info!(tool = %name, "tool call requested");

        match self
            .tools
            .dispatch(name, &request.function.arguments)
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "tool dispatch failed");
                json!({"error": e.to_string()})
            }
        }
    }
}
