//! Scripted providers for exercising the engine and routes without a
//! network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::{FunctionCall, Message, Role, ToolCallRequest};
use crate::providers::{ChatProvider, ModelTurn, ProviderError};
use crate::tools::ToolDefinition;

/// Replays a fixed sequence of model turns and records every message
/// sequence it was called with.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<ModelTurn>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<ModelTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Script consisting only of plain text answers.
    pub fn answering(texts: Vec<&str>) -> Self {
        Self::new(texts.into_iter().map(Self::answer).collect())
    }

    pub fn answer(text: &str) -> ModelTurn {
        ModelTurn {
            message: Message::assistant(text),
            finish_reason: Some("stop".into()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn recorded_calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ProviderError::InvalidResponse("script exhausted".into()))
    }
}

/// Fails every call, counting how often it was asked.
#[derive(Default)]
pub struct FailingProvider {
    calls: AtomicUsize,
}

impl FailingProvider {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for FailingProvider {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<ModelTurn, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Api {
            status: 503,
            message: "upstream unavailable".into(),
        })
    }
}

/// Assistant turn requesting the given tool calls.
pub fn tool_turn(calls: Vec<ToolCallRequest>) -> ModelTurn {
    ModelTurn {
        message: Message {
            role: Role::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        },
        finish_reason: Some("tool_calls".into()),
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.into(),
        call_type: "function".into(),
        function: FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        },
    }
}
