use std::fmt;

/// Classification of a script failure, named after the host error constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    Reference,
    Type,
    Range,
    /// A sandbox resource limit (steps, output lines) was exhausted.
    Limit,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Reference => "ReferenceError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Range => "RangeError",
            ErrorKind::Limit => "LimitError",
        }
    }
}

/// An error raised while lexing, parsing or evaluating a script.
///
/// `Display` renders only the message, the way a host error's `message`
/// property reads. Callers add their own banner prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ScriptError {
            kind,
            message: message.into(),
        }
    }

    pub fn syntax(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn reference(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Reference, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Range, message)
    }

    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Limit, message)
    }

    pub fn not_defined(name: &str) -> Self {
        Self::reference(format!("{} is not defined", name))
    }

    pub fn unexpected_token(token: &str) -> Self {
        Self::syntax(format!("Unexpected token '{}'", token))
    }

    pub fn unexpected_end() -> Self {
        Self::syntax("Unexpected end of input")
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ScriptError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_message_only() {
        let err = ScriptError::not_defined("range");
        assert_eq!(err.to_string(), "range is not defined");
        assert_eq!(err.kind.name(), "ReferenceError");
    }
}
