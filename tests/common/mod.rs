//! Common test utilities for integration tests
//!
//! This module contains shared test fixtures and helper functions used across
//! integration tests. These utilities are not compiled into the library.

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test fixture with automatic cleanup
///
/// Holds a temporary directory that lesson, source and config files are
/// written into, allowing tests to run in parallel without interfering with
/// each other.
pub struct TestFixture {
    _dir: TempDir,
    root: PathBuf,
}

impl TestFixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        Ok(Self {
            root: dir.path().to_path_buf(),
            _dir: dir,
        })
    }

    /// Path to the fixture directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `content` to `name` inside the fixture and return its path
    pub fn write(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// The `lesson-sandbox` binary, with logging quieted
pub fn sandbox_cmd() -> Command {
    let mut cmd = Command::cargo_bin("lesson-sandbox").expect("binary is built");
    cmd.env("RUST_LOG", "error");
    cmd
}

/// Malformed or hostile inputs used to check that running never panics
pub fn malformed_inputs() -> Vec<String> {
    vec![
        String::new(),
        "(".to_string(),
        ")))".to_string(),
        "{".repeat(500),
        "(".repeat(5000),
        "[".repeat(5000),
        "\"unterminated".to_string(),
        "`${".to_string(),
        "`${`${`".to_string(),
        "/* open comment".to_string(),
        "function (".to_string(),
        "for (;;) {}".to_string(),
        "while (true) { var x = 1; }".to_string(),
        "function f() { return f(); } f()".to_string(),
        "var a = []; a[99999999] = 1;".to_string(),
        "1e999999 / 0".to_string(),
        "x = ".to_string(),
        "\u{0}\u{1}\u{7f}".to_string(),
        "😀 = 1".to_string(),
        "&amp;&lt;&gt;".to_string(),
        "<?php echo ; ?>".to_string(),
        "fn main() {".to_string(),
        "package main\nfunc main() {".to_string(),
        "public class public static void main".to_string(),
        "#include int main".to_string(),
        "if True:\n        print(1)\n  print(2)".to_string(),
        "for i in range(:\n".to_string(),
        "const x = 1; x = 2;".to_string(),
        "let a = 1; let a = 2;".to_string(),
        "null.p".to_string(),
        "undefined()".to_string(),
        "'a'.repeat(1e9)".to_string(),
        "var o = {}; o.o = o; JSON.stringify(o)".to_string(),
        "console.log(".to_string() + &"1,".repeat(1000) + ")",
        "<script>".repeat(100),
        "}{".repeat(100),
        "a=".repeat(20_000) + "1",
        "++".repeat(20_000) + "x",
        "1?1:".repeat(20_000) + "1",
        "1+".repeat(200_000) + "1",
        "a".to_string() + &".b".repeat(100_000),
        "f".to_string() + &"()".repeat(100_000),
        "`${".repeat(2_000) + &"}`".repeat(2_000),
    ]
}
