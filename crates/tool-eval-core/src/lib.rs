//! Tool Eval Core Library
//!
//! Scoring engine for evaluating how well a model selects and parameterizes
//! tool calls: critics, registries, optimal call matching, multi-run
//! aggregation and suite orchestration.

pub mod case;
pub mod config;
pub mod critic;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod multirun;
pub mod naming;
pub mod registry;
pub mod rubric;
pub mod suite;
pub mod text;
