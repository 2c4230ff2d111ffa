//! Runs lesson snippets written in any supported language.
//!
//! Every language goes through the same four stages, driven by its
//! [`LanguagePolicy`]:
//!
//! 1. an optional pre-check for required markers (`fn main`, ...),
//! 2. an ordered pipeline of text rewrites into the script dialect,
//! 3. a sandboxed run that captures `console.log` calls,
//! 4. formatting of the captured lines or the error into one text blob.
//!
//! HTML and CSS skip stages 2 and 3 and produce a static report instead.
//! [`Runner::run`] never fails and never panics; every problem ends up in
//! the returned text.

mod markup;
mod policy;
mod python;
mod rewrite;

pub use policy::{policy_for, LanguagePolicy, Mode, Precheck};
pub use rewrite::{apply_pipeline, decode_entities, RewriteStep};

use crate::config::LimitsConfig;
use crate::language::LanguageTag;
use crate::script::{self, Limits, OutputAccumulator};
use serde::Serialize;
use std::any::Any;
use std::thread;

/// Stack every interpreter thread gets before any script call.
const BASE_STACK_SIZE: usize = 64 * 1024 * 1024;

/// Stack added per permitted script call. A single call may hold an
/// expression tree as deep as the parser allows.
const STACK_PER_CALL: usize = 512 * 1024;

/// Stack for an interpreter thread running under `limits`.
fn engine_stack_size(limits: &Limits) -> usize {
    let calls = limits.max_call_depth.min(script::MAX_CALL_DEPTH);
    BASE_STACK_SIZE + calls * STACK_PER_CALL
}

/// Output of a single run: captured text or a synthesized diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub output_text: String,
}

impl ExecutionResult {
    fn new(output_text: impl Into<String>) -> Self {
        ExecutionResult {
            output_text: output_text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Runner {
    limits: Limits,
    max_source_bytes: usize,
}

impl Default for Runner {
    fn default() -> Self {
        Self::from_config(&LimitsConfig::default())
    }
}

impl Runner {
    pub fn new(limits: Limits, max_source_bytes: usize) -> Self {
        Runner {
            limits,
            max_source_bytes,
        }
    }

    pub fn from_config(config: &LimitsConfig) -> Self {
        Self::new(config.to_limits(), config.max_source_bytes)
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Runs `source` as `language` and returns the text to show.
    pub fn run(&self, source: &str, language: LanguageTag) -> ExecutionResult {
        let policy = policy_for(language);

        if source.len() > self.max_source_bytes {
            log::warn!(
                "Rejecting {} source of {} bytes (limit {})",
                language,
                source.len(),
                self.max_source_bytes
            );
            return ExecutionResult::new(format!(
                "{}Source exceeds the {} byte limit",
                policy.error_prefix(),
                self.max_source_bytes
            ));
        }

        if let Some(precheck) = &policy.precheck {
            if !precheck.passes(source) {
                log::debug!("{} pre-check failed", language);
                return ExecutionResult::new(precheck.failure);
            }
        }

        match policy.mode {
            Mode::Report(report) => ExecutionResult::new(report(source)),
            Mode::Execute {
                error_prefix,
                empty_output,
            } => {
                let code = apply_pipeline(source, policy.steps);
                log::debug!("Rewritten {} source:\n{}", language, code);

                match self.execute_isolated(code) {
                    Ok(text) if text.is_empty() => ExecutionResult::new(empty_output),
                    Ok(text) => ExecutionResult::new(text),
                    Err(message) => ExecutionResult::new(format!("{}{}", error_prefix, message)),
                }
            }
        }
    }

    /// Executes `code` on a dedicated interpreter thread. A panic on that
    /// thread is turned into an error message.
    fn execute_isolated(&self, code: String) -> Result<String, String> {
        let limits = self.limits;
        let spawned = thread::Builder::new()
            .name("lesson-script".to_string())
            .stack_size(engine_stack_size(&limits))
            .spawn(move || {
                let output = OutputAccumulator::with_limit(limits.max_output_lines);
                script::execute(&code, output, &limits)
                    .map(OutputAccumulator::into_text)
                    .map_err(|err| err.to_string())
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => return Err(format!("Failed to start interpreter: {}", err)),
        };

        match handle.join() {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("Interpreter panicked: {}", message);
                Err(format!("Internal interpreter error: {}", message))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, language: LanguageTag) -> String {
        Runner::default().run(source, language).output_text
    }

    #[test]
    fn test_javascript_happy_path() {
        assert_eq!(run("console.log('hi')", LanguageTag::JavaScript), "hi");
    }

    #[test]
    fn test_javascript_without_output() {
        assert_eq!(run("1+1", LanguageTag::JavaScript), "undefined");
    }

    #[test]
    fn test_javascript_error_prefix() {
        assert_eq!(
            run("console.log(missing)", LanguageTag::JavaScript),
            "SyntaxError: missing is not defined"
        );
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(
            run("console.log(1 &lt; 2 &amp;&amp; 3 &gt; 2)", LanguageTag::JavaScript),
            "true"
        );
    }

    #[test]
    fn test_python_program() {
        let source = "total = 0\nfor i in range(4):\n    total = total + i\nprint(\"total:\", total)";
        assert_eq!(run(source, LanguageTag::Python), "total: 6");
    }

    #[test]
    fn test_python_if_else() {
        let source = "x = 7\ndone = False\nif x > 5 and not done:\n    print(\"medium\")\nelse:\n    print(\"other\")";
        assert_eq!(run(source, LanguageTag::Python), "medium");
    }

    #[test]
    fn test_python_no_output_is_empty() {
        assert_eq!(run("x = 1", LanguageTag::Python), "");
    }

    #[test]
    fn test_java_precheck_failure() {
        assert_eq!(
            run("int x=1;", LanguageTag::Java),
            "Error: Main method not found in class"
        );
    }

    #[test]
    fn test_java_program() {
        let source = "public class Main {\n    public static void main(String[] args) {\n        int a = 2;\n        int b = 3;\n        System.out.println(\"sum: \" + (a + b));\n    }\n}";
        assert_eq!(run(source, LanguageTag::Java), "sum: 5");
    }

    #[test]
    fn test_cpp_program() {
        let source = "#include <iostream>\nusing namespace std;\nint main() {\n    int x = 4;\n    cout << \"x = \" << x << endl;\n    return 0;\n}";
        assert_eq!(run(source, LanguageTag::Cpp), "x = 4");
    }

    #[test]
    fn test_cpp_precheck_failure() {
        assert_eq!(
            run("int main() {}", LanguageTag::Cpp),
            "fatal error: no input files\ncompilation terminated."
        );
    }

    #[test]
    fn test_php_program_and_placeholder() {
        assert_eq!(
            run("<?php\n$name = \"Ann\";\necho \"Hi \" . $name;\n?>", LanguageTag::Php),
            "Hi Ann"
        );
        assert_eq!(
            run("<?php $x = 1; ?>", LanguageTag::Php),
            "PHP script executed successfully"
        );
    }

    #[test]
    fn test_go_placeholder() {
        assert_eq!(
            run("package main\nfunc main(){}", LanguageTag::Go),
            "Process finished with exit code 0"
        );
        assert_eq!(
            run("func main(){}", LanguageTag::Go),
            "Error: No main package or function found"
        );
    }

    #[test]
    fn test_rust_program() {
        let source = "fn main() {\n    let mut n: i32 = 2;\n    n = n * 21;\n    println!(n);\n}";
        assert_eq!(run(source, LanguageTag::Rust), "42");
        assert_eq!(run("let x = 1;", LanguageTag::Rust), "Error: No main function found");
    }

    #[test]
    fn test_error_prefixes() {
        assert!(run("fn main() { let x = ; }", LanguageTag::Rust).starts_with("Compilation error: "));
        assert!(run("package main\nfunc main() { x := }", LanguageTag::Go).starts_with("Build error: "));
        assert!(run("<?php echo ; ?>", LanguageTag::Php).starts_with("Parse error: "));
    }

    #[test]
    fn test_html_and_css_reports() {
        assert_eq!(
            run("<p>Hello</p>", LanguageTag::Html),
            "HTML rendered successfully.\nText content: Hello"
        );
        assert!(run("a { b: c }", LanguageTag::Css).contains("Status: Valid"));
    }

    #[test]
    fn test_infinite_loop_hits_step_limit() {
        let runner = Runner::new(
            Limits {
                max_steps: 10_000,
                ..Limits::default()
            },
            usize::MAX,
        );
        let output = runner.run("while (true) {}", LanguageTag::JavaScript).output_text;
        assert!(output.starts_with("SyntaxError: Execution step limit exceeded"));
    }

    #[test]
    fn test_source_size_limit() {
        let runner = Runner::new(Limits::default(), 4);
        assert_eq!(
            runner.run("console.log(1)", LanguageTag::JavaScript).output_text,
            "SyntaxError: Source exceeds the 4 byte limit"
        );
    }

    #[test]
    fn test_recursion_at_deepest_allowed_limit() {
        let config = LimitsConfig {
            max_call_depth: script::MAX_CALL_DEPTH,
            ..LimitsConfig::default()
        };
        config.validate().unwrap();
        let runner = Runner::from_config(&config);

        let nested = format!("{}f(n - 1){}", "1 + (".repeat(20), ")".repeat(20));
        let source = format!(
            "function f(n) {{ if (n > 0) {{ return {}; }} return 0; }} console.log(f(990))",
            nested
        );
        assert_eq!(runner.run(&source, LanguageTag::JavaScript).output_text, "19800");

        let output = runner
            .run(
                "function f(n) { return n > 0 ? 1 + f(n - 1) : 0 } console.log(f(5000))",
                LanguageTag::JavaScript,
            )
            .output_text;
        assert_eq!(output, "SyntaxError: Maximum call stack size exceeded");
    }

    #[test]
    fn test_unvalidated_call_depth_is_capped() {
        let runner = Runner::new(
            Limits {
                max_call_depth: usize::MAX,
                ..Limits::default()
            },
            usize::MAX,
        );
        let output = runner
            .run(
                "function f(n) { return n > 0 ? 1 + f(n - 1) : 0 } f(5000)",
                LanguageTag::JavaScript,
            )
            .output_text;
        assert_eq!(output, "SyntaxError: Maximum call stack size exceeded");
    }
}
