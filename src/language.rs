use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of languages the editor can run.
///
/// Serialized in lowercase (`"javascript"`, `"cpp"`, ...), which is also the
/// form accepted in configuration files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    JavaScript,
    Python,
    Java,
    Cpp,
    Php,
    Go,
    Rust,
    Html,
    Css,
}

/// Every language in menu order.
pub const LANGUAGES: [LanguageTag; 9] = [
    LanguageTag::JavaScript,
    LanguageTag::Python,
    LanguageTag::Java,
    LanguageTag::Cpp,
    LanguageTag::Php,
    LanguageTag::Go,
    LanguageTag::Rust,
    LanguageTag::Html,
    LanguageTag::Css,
];

/// Static metadata for a language: its label, the extension used for
/// downloads, and the fence markers that select it in lesson files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguageMetadata {
    pub display_name: &'static str,
    /// Extension with the leading dot, e.g. `".py"`.
    pub file_extension: &'static str,
    pub fence_markers: &'static [&'static str],
}

/// Get language metadata (display name, file extension, fence markers).
///
/// # Examples
///
/// ```
/// use lesson_sandbox::{get_language_metadata, LanguageTag};
///
/// let metadata = get_language_metadata(LanguageTag::Python);
/// assert_eq!(metadata.display_name, "Python");
/// assert_eq!(metadata.file_extension, ".py");
/// assert!(metadata.fence_markers.contains(&"py"));
/// ```
pub fn get_language_metadata(language: LanguageTag) -> LanguageMetadata {
    match language {
        LanguageTag::JavaScript => meta("JavaScript", ".js", &["javascript", "js", "jsx"]),
        LanguageTag::Python => meta("Python", ".py", &["python", "py", "python3"]),
        LanguageTag::Java => meta("Java", ".java", &["java"]),
        LanguageTag::Cpp => meta("C++", ".cpp", &["cpp", "c++", "cc", "cxx", "hpp"]),
        LanguageTag::Php => meta("PHP", ".php", &["php", "php3", "php4", "php5"]),
        LanguageTag::Go => meta("Go", ".go", &["go", "golang"]),
        LanguageTag::Rust => meta("Rust", ".rs", &["rust", "rs"]),
        LanguageTag::Html => meta("HTML", ".html", &["html", "xhtml", "htm"]),
        LanguageTag::Css => meta("CSS", ".css", &["css"]),
    }
}

fn meta(
    display_name: &'static str,
    file_extension: &'static str,
    fence_markers: &'static [&'static str],
) -> LanguageMetadata {
    LanguageMetadata {
        display_name,
        file_extension,
        fence_markers,
    }
}

impl LanguageTag {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        match self {
            LanguageTag::JavaScript => "javascript",
            LanguageTag::Python => "python",
            LanguageTag::Java => "java",
            LanguageTag::Cpp => "cpp",
            LanguageTag::Php => "php",
            LanguageTag::Go => "go",
            LanguageTag::Rust => "rust",
            LanguageTag::Html => "html",
            LanguageTag::Css => "css",
        }
    }

    pub fn metadata(&self) -> LanguageMetadata {
        get_language_metadata(*self)
    }

    /// Finds the language whose fence markers include `fence` (case-insensitive).
    pub fn from_fence(fence: &str) -> Option<Self> {
        let fence = fence.trim().to_ascii_lowercase();
        LANGUAGES
            .into_iter()
            .find(|lang| lang.metadata().fence_markers.contains(&fence.as_str()))
    }

    /// Maps a file extension (with or without the dot) to a language.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        match extension.as_str() {
            "htm" => Some(LanguageTag::Html),
            "mjs" | "cjs" => Some(LanguageTag::JavaScript),
            "cc" | "cxx" => Some(LanguageTag::Cpp),
            _ => LANGUAGES
                .into_iter()
                .find(|lang| lang.metadata().file_extension[1..] == extension),
        }
    }

    /// Source shown in a fresh editor for this language.
    pub fn starter_source(&self) -> &'static str {
        match self {
            LanguageTag::JavaScript => "console.log(\"Hello, World!\");",
            LanguageTag::Python => "print(\"Hello, World!\")",
            LanguageTag::Java => concat!(
                "public class Main {\n",
                "    public static void main(String[] args) {\n",
                "        System.out.println(\"Hello, World!\");\n",
                "    }\n",
                "}"
            ),
            LanguageTag::Cpp => concat!(
                "#include <iostream>\n",
                "using namespace std;\n",
                "\n",
                "int main() {\n",
                "    cout << \"Hello, World!\" << endl;\n",
                "    return 0;\n",
                "}"
            ),
            LanguageTag::Php => "<?php\necho \"Hello, World!\";\n?>",
            LanguageTag::Go => concat!(
                "package main\n",
                "\n",
                "import \"fmt\"\n",
                "\n",
                "func main() {\n",
                "    fmt.Println(\"Hello, World!\")\n",
                "}"
            ),
            LanguageTag::Rust => "fn main() {\n    println!(\"Hello, World!\");\n}",
            LanguageTag::Html => concat!(
                "<!DOCTYPE html>\n",
                "<html>\n",
                "<body>\n",
                "  <h1>Hello, World!</h1>\n",
                "</body>\n",
                "</html>"
            ),
            LanguageTag::Css => "body {\n  font-family: sans-serif;\n  color: #333;\n}",
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for LanguageTag {
    type Err = anyhow::Error;

    /// Accepts the canonical name or any fence marker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageTag::from_fence(s).ok_or_else(|| {
            let known = LANGUAGES.map(|lang| lang.name()).join(", ");
            anyhow::anyhow!("Unknown language '{}' (expected one of: {})", s, known)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(get_language_metadata(LanguageTag::Rust).file_extension, ".rs");
        assert_eq!(get_language_metadata(LanguageTag::Cpp).file_extension, ".cpp");
        assert_eq!(get_language_metadata(LanguageTag::Cpp).display_name, "C++");
    }

    #[test]
    fn test_from_fence_aliases() {
        assert_eq!(LanguageTag::from_fence("js"), Some(LanguageTag::JavaScript));
        assert_eq!(LanguageTag::from_fence("C++"), Some(LanguageTag::Cpp));
        assert_eq!(LanguageTag::from_fence("golang"), Some(LanguageTag::Go));
        assert_eq!(LanguageTag::from_fence("output"), None);
    }

    #[test]
    fn test_from_extension() {
        assert_eq!(LanguageTag::from_extension("py"), Some(LanguageTag::Python));
        assert_eq!(LanguageTag::from_extension(".java"), Some(LanguageTag::Java));
        assert_eq!(LanguageTag::from_extension("txt"), None);
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        for lang in LANGUAGES {
            assert_eq!(lang.name().parse::<LanguageTag>().unwrap(), lang);
            assert_eq!(lang.to_string(), lang.name());
        }
        let err = "cobol".parse::<LanguageTag>().unwrap_err();
        assert!(err.to_string().contains("Unknown language 'cobol'"));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&LanguageTag::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
    }
}
