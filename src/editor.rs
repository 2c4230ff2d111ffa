//! Editor session state: the source being edited, its language, and the
//! results of the last run.

use crate::config::EditorConfig;
use crate::language::LanguageTag;
use crate::runner::{ExecutionResult, Runner};
use serde::{Deserialize, Serialize};

/// The text in the editor and the language it is written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDocument {
    pub text: String,
    pub language: LanguageTag,
}

/// A file offered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub filename: String,
    pub content: String,
}

/// An expected-output check attached to an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseTest {
    pub description: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub description: String,
    pub passed: bool,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Clone)]
pub struct CodeEditor {
    document: SourceDocument,
    initial_source: String,
    output: Option<ExecutionResult>,
    test_results: Vec<TestResult>,
    runner: Runner,
    config: EditorConfig,
}

impl CodeEditor {
    /// Starts a session in the configured default language with its starter.
    pub fn new(runner: Runner, config: EditorConfig) -> Self {
        let language = config.default_language;
        let initial_source = config.starter_for(language).to_string();
        CodeEditor {
            document: SourceDocument {
                text: initial_source.clone(),
                language,
            },
            initial_source,
            output: None,
            test_results: Vec::new(),
            runner,
            config,
        }
    }

    /// Starts a session on existing source, which `reset` returns to.
    pub fn with_source(runner: Runner, language: LanguageTag, source: impl Into<String>) -> Self {
        let source = source.into();
        CodeEditor {
            document: SourceDocument {
                text: source.clone(),
                language,
            },
            initial_source: source,
            output: None,
            test_results: Vec::new(),
            runner,
            config: EditorConfig::default(),
        }
    }

    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    pub fn output(&self) -> Option<&ExecutionResult> {
        self.output.as_ref()
    }

    pub fn test_results(&self) -> &[TestResult] {
        &self.test_results
    }

    pub fn set_source(&mut self, text: impl Into<String>) {
        self.document.text = text.into();
    }

    /// Switches language. An unedited document is replaced by the new
    /// language's starter; edited text is kept as is.
    pub fn set_language(&mut self, language: LanguageTag) {
        if language == self.document.language {
            return;
        }
        let unedited = self.document.text == self.initial_source;
        self.document.language = language;
        if unedited {
            self.initial_source = self.config.starter_for(language).to_string();
            self.document.text = self.initial_source.clone();
        }
        self.output = None;
        self.test_results.clear();
    }

    /// Runs the current source and keeps the result for display.
    pub fn run(&mut self) -> &ExecutionResult {
        let result = self.runner.run(&self.document.text, self.document.language);
        log::debug!(
            "{} run produced {} bytes of output",
            self.document.language,
            result.output_text.len()
        );
        self.output.insert(result)
    }

    /// Restores the initial source and clears output and test results.
    pub fn reset(&mut self) {
        self.document.text = self.initial_source.clone();
        self.output = None;
        self.test_results.clear();
    }

    /// The current source as `code.<ext>`.
    pub fn download(&self) -> Download {
        let extension = self.document.language.metadata().file_extension;
        Download {
            filename: format!("code{}", extension),
            content: self.document.text.clone(),
        }
    }

    /// Runs the source once and checks the output against each test.
    /// Surrounding whitespace is ignored in the comparison.
    pub fn run_tests(&mut self, tests: &[ExerciseTest]) -> &[TestResult] {
        let actual = self.run().output_text.clone();
        self.test_results = tests
            .iter()
            .map(|test| TestResult {
                description: test.description.clone(),
                passed: actual.trim() == test.expected_output.trim(),
                expected: test.expected_output.clone(),
                actual: actual.clone(),
            })
            .collect();
        &self.test_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor() -> CodeEditor {
        CodeEditor::new(Runner::default(), EditorConfig::default())
    }

    #[test]
    fn test_starts_with_starter_source() {
        let editor = editor();
        assert_eq!(editor.document().language, LanguageTag::JavaScript);
        assert_eq!(editor.document().text, LanguageTag::JavaScript.starter_source());
    }

    #[test]
    fn test_run_starter() {
        let mut editor = editor();
        assert_eq!(editor.run().output_text, "Hello, World!");
    }

    #[test]
    fn test_download_uses_extension() {
        let mut editor = editor();
        editor.set_language(LanguageTag::Python);
        let download = editor.download();
        assert_eq!(download.filename, "code.py");
        assert_eq!(download.content, "print(\"Hello, World!\")");

        editor.set_source("x = 1");
        assert_eq!(editor.download().content, "x = 1");
    }

    #[test]
    fn test_reset_restores_and_clears() {
        let mut editor = editor();
        editor.set_source("console.log(42)");
        editor.run_tests(&[ExerciseTest {
            description: "prints 42".into(),
            expected_output: "42".into(),
        }]);
        assert!(editor.output().is_some());
        assert_eq!(editor.test_results().len(), 1);

        editor.reset();
        assert_eq!(editor.document().text, LanguageTag::JavaScript.starter_source());
        assert!(editor.output().is_none());
        assert!(editor.test_results().is_empty());
    }

    #[test]
    fn test_run_tests_compares_trimmed_output() {
        let mut editor = CodeEditor::with_source(
            Runner::default(),
            LanguageTag::JavaScript,
            "console.log(1 + 1)",
        );
        let results = editor.run_tests(&[
            ExerciseTest {
                description: "sum".into(),
                expected_output: "2\n".into(),
            },
            ExerciseTest {
                description: "wrong".into(),
                expected_output: "3".into(),
            },
        ]);
        assert!(results[0].passed);
        assert!(!results[1].passed);
        assert_eq!(results[1].actual, "2");
    }

    #[test]
    fn test_edited_source_survives_language_switch() {
        let mut editor = editor();
        editor.set_source("console.log('mine')");
        editor.set_language(LanguageTag::Rust);
        assert_eq!(editor.document().text, "console.log('mine')");
        assert_eq!(editor.download().filename, "code.rs");
    }
}
