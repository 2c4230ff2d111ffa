use crate::script::error::ScriptError;
use crate::script::value::Value;

/// Collects the lines written by the capture substitute for `console.log`.
///
/// The accumulator is handed to the interpreter and handed back when the run
/// finishes, so captured output is an explicit value rather than state shared
/// through a closure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputAccumulator {
    lines: Vec<String>,
    max_lines: Option<usize>,
}

impl OutputAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_lines: usize) -> Self {
        OutputAccumulator {
            lines: Vec::new(),
            max_lines: Some(max_lines),
        }
    }

    /// Records one print call: each argument stringified and quote-stripped,
    /// joined with single spaces.
    pub fn record(&mut self, args: &[Value]) -> Result<(), ScriptError> {
        let line = args
            .iter()
            .map(Value::to_captured)
            .collect::<Vec<_>>()
            .join(" ");
        self.push_line(line)
    }

    pub fn push_line(&mut self, line: String) -> Result<(), ScriptError> {
        if let Some(max) = self.max_lines {
            if self.lines.len() >= max {
                return Err(ScriptError::limit(format!(
                    "Output limit exceeded ({} lines)",
                    max
                )));
            }
        }
        self.lines.push(line);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All captured lines joined with newlines.
    pub fn into_text(self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arguments_are_space_joined() {
        let mut out = OutputAccumulator::new();
        out.record(&[Value::str("x ="), Value::Number(5.0)]).unwrap();
        out.record(&[]).unwrap();
        assert_eq!(out.into_text(), "x = 5\n");
    }

    #[test]
    fn test_line_limit() {
        let mut out = OutputAccumulator::with_limit(1);
        out.push_line("a".into()).unwrap();
        let err = out.push_line("b".into()).unwrap_err();
        assert_eq!(err.message, "Output limit exceeded (1 lines)");
    }
}
