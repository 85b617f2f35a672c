//! Error types and exit codes for tool-eval
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (including failed evaluation cases)
//! - 2: Usage/configuration error
//! - 3: Data error (unreadable or malformed suite/response files)

mod macros;

use thiserror::Error;

/// Exit codes used by the tool-eval binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or configuration error (2)
    Usage = 2,
    /// Data error - malformed suite or response file (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors raised by the evaluation engine.
///
/// Everything except `Model` and the I/O family is a configuration mistake
/// and surfaces before any model call is made.
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("unsupported {context}: {value} (supported: {supported})")]
    Unsupported {
        context: String,
        value: String,
        supported: String,
    },

    #[error("{context} already exists: {value}")]
    AlreadyExists { context: String, value: String },

    #[error("{context} not found: {value}")]
    NotFound { context: String, value: String },

    #[error(
        "tool name '{name}' is ambiguous (exists in multiple servers); \
         use 'server_tool' or 'server.tool' format to disambiguate"
    )]
    AmbiguousTool { name: String },

    #[error(
        "multiple critics detected for the field(s) '{fields}' in evaluation case '{case}'; \
         only one critic per field is permitted"
    )]
    DuplicateCritics { fields: String, case: String },

    #[error("no tools registered; add tool definitions or a tool catalog before running")]
    NoToolsRegistered,

    #[error("tool descriptor must have a 'name' field")]
    MissingName,

    #[error("invalid critic weights: {0}")]
    InvalidWeights(String),

    #[error(
        "schema nesting exceeds maximum depth of {max_depth}; \
         this may indicate a circular reference in the schema"
    )]
    SchemaDepthExceeded { max_depth: usize },

    #[error("model invocation failed: {0}")]
    Model(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

impl EvalError {
    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        EvalError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an unsupported value
    pub fn unsupported(
        context: &str,
        value: impl std::fmt::Display,
        supported: impl std::fmt::Display,
    ) -> Self {
        EvalError::Unsupported {
            context: context.to_string(),
            value: value.to_string(),
            supported: supported.to_string(),
        }
    }

    /// Create an error for an entity that already exists
    pub fn already_exists(context: &str, value: impl std::fmt::Display) -> Self {
        EvalError::AlreadyExists {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for an entity that was not found
    pub fn not_found(context: &str, value: impl std::fmt::Display) -> Self {
        EvalError::NotFound {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// True for errors caused by caller configuration rather than runtime conditions
    pub fn is_configuration(&self) -> bool {
        matches!(self.exit_code(), ExitCode::Usage)
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            EvalError::InvalidValue { .. }
            | EvalError::Unsupported { .. }
            | EvalError::AlreadyExists { .. }
            | EvalError::NotFound { .. }
            | EvalError::AmbiguousTool { .. }
            | EvalError::DuplicateCritics { .. }
            | EvalError::NoToolsRegistered
            | EvalError::MissingName
            | EvalError::InvalidWeights(_)
            | EvalError::SchemaDepthExceeded { .. } => ExitCode::Usage,

            EvalError::Yaml(_) | EvalError::Json(_) | EvalError::Toml(_) => ExitCode::Data,

            EvalError::Model(_) | EvalError::Io(_) | EvalError::Other(_) => ExitCode::Failure,
        }
    }

    /// Stable identifier for structured error output
    pub fn error_type(&self) -> &'static str {
        match self {
            EvalError::InvalidValue { .. } => "invalid_value",
            EvalError::Unsupported { .. } => "unsupported",
            EvalError::AlreadyExists { .. } => "already_exists",
            EvalError::NotFound { .. } => "not_found",
            EvalError::AmbiguousTool { .. } => "ambiguous_tool",
            EvalError::DuplicateCritics { .. } => "duplicate_critics",
            EvalError::NoToolsRegistered => "no_tools_registered",
            EvalError::MissingName => "missing_name",
            EvalError::InvalidWeights(_) => "invalid_weights",
            EvalError::SchemaDepthExceeded { .. } => "schema_depth_exceeded",
            EvalError::Model(_) => "model_error",
            EvalError::Io(_) => "io_error",
            EvalError::Yaml(_) => "yaml_error",
            EvalError::Json(_) => "json_error",
            EvalError::Toml(_) => "toml_error",
            EvalError::Other(_) => "other",
        }
    }

    /// Render as a JSON error envelope
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "error": {
                "code": i32::from(self.exit_code()),
                "type": self.error_type(),
                "message": self.to_string(),
            }
        })
        .to_string()
    }
}

/// Errors raised by a single critic while comparing one field.
///
/// These never abort a case: the evaluator records the field as a
/// zero-score, no-match result and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CriticError {
    #[error("expected a number for '{field}', got {value}")]
    NotNumeric { field: String, value: String },

    #[error("could not parse '{value}' as a datetime")]
    InvalidDatetime { value: String },

    #[error("invalid critic configuration: {0}")]
    Config(String),

    #[error("{0}")]
    Failed(String),
}

/// Result type alias for tool-eval operations
pub type Result<T> = std::result::Result<T, EvalError>;
