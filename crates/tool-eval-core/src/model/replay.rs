use super::{ModelClient, ModelRequest};
use crate::case::ToolCall;
use crate::error::{EvalError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Recorded tool calls keyed by user message (or case name), one list per run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedResponses {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub responses: BTreeMap<String, Vec<Vec<ToolCall>>>,
}

/// Model double that answers from recorded responses
#[derive(Debug, Clone)]
pub struct ReplayModel {
    provider: String,
    responses: BTreeMap<String, Vec<Vec<ToolCall>>>,
}

impl ReplayModel {
    pub fn new(recorded: RecordedResponses) -> Self {
        Self {
            provider: recorded.provider.unwrap_or_else(|| "replay".to_string()),
            responses: recorded.responses,
        }
    }

    /// Load a recorded-responses YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let recorded: RecordedResponses = serde_yaml::from_str(content)?;
        Ok(Self::new(recorded))
    }

    /// Calls recorded for a request; runs beyond the recordings repeat the
    /// last list
    fn lookup(&self, request: &ModelRequest) -> Option<&Vec<ToolCall>> {
        let runs = self
            .responses
            .get(&request.user_message)
            .or_else(|| self.responses.get(&request.case_name))?;
        runs.get(request.run_index).or_else(|| runs.last())
    }
}

#[async_trait]
impl ModelClient for ReplayModel {
    fn provider(&self) -> &str {
        &self.provider
    }

    fn supports_seed(&self) -> bool {
        true
    }

    async fn complete(&self, request: &ModelRequest) -> Result<Vec<ToolCall>> {
        self.lookup(request).cloned().ok_or_else(|| {
            EvalError::Model(format!(
                "no recorded response for case '{}'",
                request.case_name
            ))
        })
    }
}

type Responder = dyn Fn(&ModelRequest) -> Result<Vec<ToolCall>> + Send + Sync;

/// Model double driven by a closure; records every request it receives
pub struct ScriptedModel {
    responder: Arc<Responder>,
    supports_seed: bool,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ModelRequest) -> Result<Vec<ToolCall>> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            supports_seed: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_seed_support(mut self, supports_seed: bool) -> Self {
        self.supports_seed = supports_seed;
        self
    }

    /// Requests seen so far, in arrival order
    pub fn requests(&self) -> Vec<ModelRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, request: &ModelRequest) {
        let mut guard = match self.requests.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(request.clone());
    }
}

impl std::fmt::Debug for ScriptedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedModel")
            .field("supports_seed", &self.supports_seed)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn supports_seed(&self) -> bool {
        self.supports_seed
    }

    async fn complete(&self, request: &ModelRequest) -> Result<Vec<ToolCall>> {
        self.record(request);
        (self.responder)(request)
    }
}
