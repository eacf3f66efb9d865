//! Tool registry and the built-in recording tools
//!
//! Tools are the local functions the model may invoke mid-conversation.
//! The registry is a closed mapping built at startup: dispatch looks a
//! handler up by name and hands it the parsed argument payload, so every
//! reachable tool is registered explicitly rather than resolved from
//! arbitrary symbols at runtime.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::notify::Notifier;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid tool arguments: {0}")]
    BadArguments(#[from] serde_json::Error),
}

/// Definition advertised to the model so it can decide when to invoke the
/// tool. Static for the lifetime of the process.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the named parameters.
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn invoke(&self, args: Value) -> Result<Value, ToolError>;
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry with the two recording tools this service ships with.
    pub fn builtin(notifier: Arc<Notifier>) -> Self {
        let mut registry = Self::new();
        registry.register(RecordUserDetails {
            notifier: notifier.clone(),
        });
        registry.register(RecordUnknownQuestion { notifier });
        registry
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition()).collect()
    }

    /// Parse the model-supplied argument payload and invoke the named
    /// tool. Unknown names and malformed payloads come back as typed
    /// errors, never as panics.
    pub async fn dispatch(&self, name: &str, raw_arguments: &str) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args: Value = serde_json::from_str(raw_arguments)?;
        tool.invoke(args).await
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Built-in tools
// ============================================================================

/// Records that a visitor wants to be contacted.
struct RecordUserDetails {
    notifier: Arc<Notifier>,
}

#[derive(Debug, Deserialize)]
struct UserDetailsArgs {
    email: String,
    #[serde(default = "default_name")]
    name: String,
    #[serde(default = "default_notes")]
    notes: String,
}

fn default_name() -> String {
    "Name not provided".into()
}

fn default_notes() -> String {
    "not provided".into()
}

impl UserDetailsArgs {
    fn notification(&self) -> String {
        let email = if self.email.trim().is_empty() {
            "No email provided"
        } else {
            self.email.as_str()
        };

        let mut parts = vec![format!("New contact: {email}")];
        if self.name != default_name() && !self.name.trim().is_empty() {
            parts.push(format!("Name: {}", self.name));
        }
        if self.notes != default_notes() && !self.notes.trim().is_empty() {
            parts.push(format!("Conversation:\n{}", self.notes));
        }
        parts.join("\n")
    }
}

#[async_trait]
impl Tool for RecordUserDetails {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "record_user_details".into(),
            description: "Use this tool to record that a user is interested in being in \
                touch and provided an email address. Always include the user's message or \
                a summary of the conversation in the notes field."
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "email": {
                        "type": "string",
                        "description": "The email address of this user"
                    },
                    "name": {
                        "type": "string",
                        "description": "The user's name, if they provided it"
                    },
                    "notes": {
                        "type": "string",
                        "description": "The user's message or a brief summary of what they discussed"
                    }
                },
                "required": ["email"],
                "additionalProperties": false
            }),
        }
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: UserDetailsArgs = serde_json::from_value(args)?;
        self.notifier.send(&args.notification()).await;
        Ok(json!({"recorded": "ok"}))
    }
}

/// Records a question the persona could not answer.
struct RecordUnknownQuestion {
    notifier: Arc<Notifier>,
}

#[derive(Debug, Deserialize)]
struct UnknownQuestionArgs {
    question: String,
}

#[async_trait]
impl Tool for RecordUnknownQuestion {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "record_unknown_question".into(),
            description: "Always use this tool to record any question that couldn't be \
                answered as you didn't know the answer"
                .into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "The question that couldn't be answered"
                    }
                },
                "required": ["question"]
            }),
        }
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolError> {
        let args: UnknownQuestionArgs = serde_json::from_value(args)?;
        self.notifier
            .send(&format!("Recording unknown question: {}", args.question))
            .await;
        Ok(json!({"recorded": "ok"}))
    }
}
