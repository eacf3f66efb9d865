//! Chat completion providers

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

use crate::conversation::{Message, ToolCallRequest};
use crate::tools::ToolDefinition;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One assistant turn from the model: the message to append to the
/// conversation plus the finish reason the API reported for it.
#[derive(Debug, Clone)]
pub struct ModelTurn {
    pub message: Message,
    pub finish_reason: Option<String>,
}

impl ModelTurn {
    /// Whether this turn asks the engine to run local tools before the
    /// model can answer. Keyed on the `tool_calls` finish reason, with the
    /// request list itself as a fallback for endpoints that omit it.
    pub fn wants_tools(&self) -> bool {
        self.finish_reason.as_deref() == Some("tool_calls")
            || self
                .message
                .tool_calls
                .as_ref()
                .is_some_and(|calls| !calls.is_empty())
    }

    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        self.message.tool_calls.as_deref().unwrap_or_default()
    }

    /// Final answer text. Empty when the turn carried only tool calls.
    pub fn text(&self) -> String {
        self.message.content.clone().unwrap_or_default()
    }
}

/// Seam between the conversation engine and the hosted model, so the
/// engine can be driven by a scripted provider in tests.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::FunctionCall;

    fn tool_call(id: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.into(),
            call_type: "function".into(),
            function: FunctionCall {
                name: "record_unknown_question".into(),
                arguments: "{}".into(),
            },
        }
    }

    #[test]
    fn finish_reason_signals_tool_round() {
        let turn = ModelTurn {
            message: Message {
                role: crate::conversation::Role::Assistant,
                content: None,
                tool_calls: Some(vec![tool_call("call_1")]),
                tool_call_id: None,
            },
            finish_reason: Some("tool_calls".into()),
        };
        assert!(turn.wants_tools());
        assert_eq!(turn.tool_calls().len(), 1);
    }

    #[test]
    fn tool_list_alone_signals_tool_round() {
        let turn = ModelTurn {
            message: Message {
                role: crate::conversation::Role::Assistant,
                content: None,
                tool_calls: Some(vec![tool_call("call_1")]),
                tool_call_id: None,
            },
            finish_reason: None,
        };
        assert!(turn.wants_tools());
    }

    #[test]
    fn plain_answer_is_final() {
        let turn = ModelTurn {
            message: Message::assistant("All done."),
            finish_reason: Some("stop".into()),
        };
        assert!(!turn.wants_tools());
        assert_eq!(turn.text(), "All done.");
    }
}
