//! Execution outcomes.
//!
//! Every execute call resolves to a [`ScriptResult`]. Script-level problems
//! (bad syntax, runtime errors, cancellation, unreadable script files) are
//! reported here rather than through the host error type, so callers always
//! receive a result and never an unwound fault.

use rhai::Dynamic;

/// Classifies why an execution failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The snippet did not compile. The chained state is untouched.
    Compile,
    /// The snippet compiled but raised during execution. The chained state
    /// is rolled back to its pre-call value.
    Runtime,
    /// Execution was cancelled through a [`CancelToken`](crate::CancelToken).
    Cancelled,
    /// `execute_file` was given a path that does not exist.
    FileNotFound,
    /// The script file existed but could not be read.
    Io,
}

/// Outcome of a single snippet or file execution.
///
/// Constructed once per call and handed to the caller; the engine keeps no
/// reference to it.
#[derive(Debug, Clone)]
pub enum ScriptResult {
    /// Execution completed. Carries the last expression's value, or `None`
    /// when the snippet ended in a statement.
    Success(Option<Dynamic>),
    /// Execution failed. The chain is left exactly as it was before the call.
    Failure {
        kind: FailureKind,
        message: String,
    },
}

impl ScriptResult {
    /// Successful outcome with an optional return value.
    pub fn success(value: Option<Dynamic>) -> Self {
        ScriptResult::Success(value)
    }

    /// Failed outcome with a diagnostic message.
    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        ScriptResult::Failure {
            kind,
            message: message.into(),
        }
    }

    /// Whether the execution completed.
    pub fn is_success(&self) -> bool {
        matches!(self, ScriptResult::Success(_))
    }

    /// Return value of a successful execution. `None` on failure or when the
    /// snippet produced no value.
    pub fn value(&self) -> Option<&Dynamic> {
        match self {
            ScriptResult::Success(value) => value.as_ref(),
            ScriptResult::Failure { .. } => None,
        }
    }

    /// Diagnostic text of a failed execution. `None` on success.
    pub fn error(&self) -> Option<&str> {
        match self {
            ScriptResult::Success(_) => None,
            ScriptResult::Failure { message, .. } => Some(message),
        }
    }

    /// Failure classification. `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ScriptResult::Success(_) => None,
            ScriptResult::Failure { kind, .. } => Some(*kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_value_and_no_error() {
        let result = ScriptResult::success(Some(Dynamic::from(4_i64)));
        assert!(result.is_success());
        assert_eq!(result.value().unwrap().as_int().unwrap(), 4);
        assert!(result.error().is_none());
        assert!(result.failure_kind().is_none());
    }

    #[test]
    fn success_without_value() {
        let result = ScriptResult::success(None);
        assert!(result.is_success());
        assert!(result.value().is_none());
    }

    #[test]
    fn failure_exposes_kind_and_message() {
        let result = ScriptResult::failure(FailureKind::Compile, "bad syntax");
        assert!(!result.is_success());
        assert!(result.value().is_none());
        assert_eq!(result.error(), Some("bad syntax"));
        assert_eq!(result.failure_kind(), Some(FailureKind::Compile));
    }
}
