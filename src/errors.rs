use thiserror::Error;

/// Failures of the fallible parts of the library: converting text into
/// numbers and managing the evaluator registry.
///
/// Problems found while tokenizing, arranging or reducing an expression are
/// not errors, they are reported as [`Diagnostic`]s next to a best-effort
/// result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Failed to convert '{0}' to integer")]
    StrToInt(String),
    #[error("Failed to convert '{0}' to float")]
    StrToFloat(String),
    #[error("Failed to convert '{0}' to fraction")]
    StrToFraction(String),
    #[error("Failed to convert '{0}' to a special value")]
    StrToSpecial(String),

    #[error("Evaluator mode '{0}' is not registered")]
    UnknownMode(String),
    #[error("Evaluator '{name}' is already registered in mode '{mode}'")]
    DuplicateEvaluator { mode: String, name: String },
}

/// What went wrong at a given position of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DiagnosticKind {
    /// A character that is neither a digit of the current base nor the start
    /// of a registered operator or function name.
    #[error("invalid token")]
    InvalidToken,
    /// A token without a matching evaluator, e.g. `!` in prefix position.
    #[error("unhandled token")]
    UnhandledToken,
    /// An opening bracket that is never closed or a closing bracket without
    /// an opening one.
    #[error("mismatched bracket")]
    MismatchedBracket,
    /// An operator or function that found fewer values than it needs.
    #[error("missing operand")]
    MissingOperand,
    /// The reduction did not end with exactly one value.
    #[error("malformed expression")]
    MalformedExpression,
}

/// A non-fatal finding, positioned by character offset in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[error("{kind} at {position}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub position: usize,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, position: usize) -> Self {
        Diagnostic { kind, position }
    }
}
