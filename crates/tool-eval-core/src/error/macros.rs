//! Error macros for tool-eval

/// Macro for returning invalid value errors
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::EvalError::invalid_value($context, $value))
    };
}

/// Macro for returning unsupported errors
#[macro_export]
macro_rules! bail_unsupported {
    ($context:expr, $value:expr, $supported:expr) => {
        return Err($crate::error::EvalError::unsupported(
            $context, $value, $supported,
        ))
    };
}
