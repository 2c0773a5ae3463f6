use thiserror::Error;

/// Failures raised by the invocation layer itself.
///
/// Errors produced *by* a wrapped callable are never translated into this
/// type; they reach the caller unchanged. Callers whose callables return
/// `Result<_, E>` implement `From<InvokeError> for E` so both kinds share one
/// error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("required argument `{name}` was not provided")]
    NullArgument { name: &'static str },
    #[error("argument `{name}` is invalid: {reason}")]
    InvalidArgument { name: &'static str, reason: String },
    #[error("{shape} wrapper has no callable bound")]
    NoCallable { shape: CallShape },
    #[error("operation was canceled before it started")]
    Canceled,
}

/// Which wrapper variant raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallShape {
    Action,
    Function,
    Tester,
}

impl CallShape {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Function => "function",
            Self::Tester => "tester",
        }
    }
}

impl std::fmt::Display for CallShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
