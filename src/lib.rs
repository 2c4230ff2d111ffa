//! lesson-sandbox library
//!
//! The core of a lesson viewer and code playground. Two independent pieces:
//!
//! - [`content::parse`] turns lesson markup into [`ContentBlock`]s, which
//!   [`render::render_html`] renders for a given [`render::Viewport`].
//! - [`Runner::run`] rewrites a snippet in one of nine languages into a small
//!   script dialect, runs it in a sandboxed interpreter, and returns the
//!   captured output or an error banner as text.
//!
//! [`CodeEditor`] ties a runner to an editable source document. The
//! `exercise` and `reporting` modules back the `check` command, which runs
//! the exercises embedded in markdown lessons.
//!
//! Additional utilities:
//! - [`get_language_metadata`] - Get metadata for a language (display name, extension, fence markers)
//! - [`SandboxConfig`] - Limits and editor defaults loaded from TOML

pub mod config;
pub mod content;
pub mod editor;
pub mod exercise;
pub mod extractor;
mod language;
pub mod render;
pub mod reporting;
pub mod runner;
pub mod script;

pub use config::SandboxConfig;
pub use content::ContentBlock;
pub use editor::{CodeEditor, Download, ExerciseTest, SourceDocument, TestResult};
pub use language::{get_language_metadata, LanguageMetadata, LanguageTag, LANGUAGES};
pub use runner::{ExecutionResult, Runner};
