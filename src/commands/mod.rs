//! Command implementations for tool-eval

pub mod capture;
pub mod dispatch;
pub mod format;
pub mod run;
pub mod tools;

mod shared;
