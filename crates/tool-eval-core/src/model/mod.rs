//! Model invocation collaborator
//!
//! The engine never talks to a provider directly. A [`ModelClient`] receives
//! the chat messages and tool list for one run and returns the tool calls the
//! model made.

mod replay;

pub use replay::{RecordedResponses, ReplayModel, ScriptedModel};

use crate::case::ToolCall;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

/// Everything a provider needs for one completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelRequest {
    pub model: String,
    pub case_name: String,
    pub user_message: String,
    pub run_index: usize,
    pub messages: Vec<Value>,
    pub tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Chat history for a case: system, then additional messages, then user
pub fn build_messages(
    system_message: &str,
    additional_messages: &[Value],
    user_message: &str,
) -> Vec<Value> {
    let mut messages = Vec::with_capacity(additional_messages.len() + 2);
    messages.push(json!({"role": "system", "content": system_message}));
    messages.extend(additional_messages.iter().cloned());
    messages.push(json!({"role": "user", "content": user_message}));
    messages
}

/// Provider-agnostic model invocation
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider label recorded in reports
    fn provider(&self) -> &str;

    /// Whether seeds are forwarded to the provider
    fn supports_seed(&self) -> bool {
        false
    }

    /// Run one completion and return the tool calls the model produced
    async fn complete(&self, request: &ModelRequest) -> Result<Vec<ToolCall>>;
}
