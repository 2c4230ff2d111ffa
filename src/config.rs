use crate::language::LanguageTag;
use crate::script::{Limits, MAX_CALL_DEPTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Configuration for the sandbox.
///
/// Deserialized from a TOML file. Every section and field is optional.
///
/// # Example
///
/// ```toml
/// [limits]
/// max_steps = 500000
/// max_call_depth = 64
/// max_output_lines = 1000
/// max_source_bytes = 65536
///
/// [editor]
/// default_language = "python"
///
/// [editor.starters]
/// python = "print(\"Welcome!\")"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SandboxConfig {
    pub limits: LimitsConfig,
    pub editor: EditorConfig,
}

/// Resource limits applied to every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Statement and expression evaluations allowed per run
    pub max_steps: u64,

    /// Maximum nesting of function calls
    pub max_call_depth: usize,

    /// Maximum number of captured output lines
    pub max_output_lines: usize,

    /// Sources longer than this are rejected before rewriting
    pub max_source_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = Limits::default();
        LimitsConfig {
            max_steps: limits.max_steps,
            max_call_depth: limits.max_call_depth,
            max_output_lines: limits.max_output_lines,
            max_source_bytes: 1_000_000,
        }
    }
}

impl LimitsConfig {
    pub fn to_limits(&self) -> Limits {
        Limits {
            max_steps: self.max_steps,
            max_call_depth: self.max_call_depth,
            max_output_lines: self.max_output_lines,
        }
    }

    /// Validate that every limit is usable
    pub fn validate(&self) -> Result<()> {
        if self.max_steps == 0 {
            anyhow::bail!("max_steps must be greater than zero");
        }
        if self.max_call_depth == 0 {
            anyhow::bail!("max_call_depth must be greater than zero");
        }
        if self.max_call_depth > MAX_CALL_DEPTH {
            anyhow::bail!(
                "max_call_depth cannot exceed {} (got {})",
                MAX_CALL_DEPTH,
                self.max_call_depth
            );
        }
        if self.max_output_lines == 0 {
            anyhow::bail!("max_output_lines must be greater than zero");
        }
        if self.max_source_bytes == 0 {
            anyhow::bail!("max_source_bytes must be greater than zero");
        }
        Ok(())
    }
}

/// Editor session defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Language selected when a session starts
    pub default_language: LanguageTag,

    /// Starter sources replacing the built-in ones, keyed by language
    pub starters: HashMap<LanguageTag, String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            default_language: LanguageTag::JavaScript,
            starters: HashMap::new(),
        }
    }
}

impl EditorConfig {
    /// Starter source for `language`, preferring a configured override.
    pub fn starter_for(&self, language: LanguageTag) -> &str {
        self.starters
            .get(&language)
            .map(String::as_str)
            .unwrap_or_else(|| language.starter_source())
    }
}

impl SandboxConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: SandboxConfig =
            toml::from_str(text).context("Failed to parse sandbox configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Load configuration from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                log::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.limits
            .validate()
            .context("Invalid configuration for section 'limits'")?;

        for (language, starter) in &self.editor.starters {
            if starter.len() > self.limits.max_source_bytes {
                log::warn!(
                    "Starter for {} is {} bytes, above max_source_bytes",
                    language,
                    starter.len()
                );
                anyhow::bail!(
                    "Starter source for '{}' exceeds max_source_bytes ({} > {})",
                    language,
                    starter.len(),
                    self.limits.max_source_bytes
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SandboxConfig::from_toml_str("").unwrap();
        assert_eq!(config, SandboxConfig::default());
        assert_eq!(config.limits.to_limits(), Limits::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = SandboxConfig::from_toml_str(
            r#"
[limits]
max_steps = 5000

[editor]
default_language = "python"

[editor.starters]
rust = "fn main() {}"
"#,
        )
        .unwrap();
        assert_eq!(config.limits.max_steps, 5000);
        assert_eq!(config.limits.max_call_depth, Limits::default().max_call_depth);
        assert_eq!(config.editor.default_language, LanguageTag::Python);
        assert_eq!(config.editor.starter_for(LanguageTag::Rust), "fn main() {}");
        assert_eq!(
            config.editor.starter_for(LanguageTag::Go),
            LanguageTag::Go.starter_source()
        );
    }

    #[test]
    fn test_zero_limit_rejected() {
        let err = SandboxConfig::from_toml_str("[limits]\nmax_steps = 0").unwrap_err();
        assert!(format!("{:#}", err).contains("max_steps must be greater than zero"));
    }

    #[test]
    fn test_call_depth_capped_at_engine_maximum() {
        let at_max = format!("[limits]\nmax_call_depth = {}", MAX_CALL_DEPTH);
        assert!(SandboxConfig::from_toml_str(&at_max).is_ok());

        let above = format!("[limits]\nmax_call_depth = {}", MAX_CALL_DEPTH + 1);
        let err = SandboxConfig::from_toml_str(&above).unwrap_err();
        assert!(format!("{:#}", err).contains("max_call_depth cannot exceed 1000"));
    }

    #[test]
    fn test_unknown_language_rejected() {
        let err = SandboxConfig::from_toml_str("[editor]\ndefault_language = \"cobol\"");
        assert!(err.is_err());
    }

    #[test]
    fn test_oversized_starter_rejected() {
        let err = SandboxConfig::from_toml_str(
            "[limits]\nmax_source_bytes = 4\n\n[editor.starters]\njavascript = \"console.log(1)\"",
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds max_source_bytes"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[limits]\nmax_output_lines = 3").unwrap();
        let config = SandboxConfig::from_file(file.path()).unwrap();
        assert_eq!(config.limits.max_output_lines, 3);

        let missing = SandboxConfig::from_file(Path::new("/nonexistent/sandbox.toml"));
        assert!(format!("{:#}", missing.unwrap_err()).contains("Failed to read config file"));
    }
}
