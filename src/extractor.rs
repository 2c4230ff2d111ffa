use crate::language::LanguageTag;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Fence marker of a block holding the expected output of the block before it.
pub const OUTPUT_FENCE: &str = "output";

/// A fenced code block extracted from a markdown lesson.
///
/// Code blocks can have comma-separated attributes in the fence info string:
///
/// - `ignore` - Skip running this block
///
/// # Example
///
/// ````markdown
/// ```python
/// print(1 + 1)
/// ```
///
/// ```output
/// 2
/// ```
/// ````
#[derive(Debug, Clone)]
pub struct CodeBlock {
    /// The language from the fence marker (e.g., "python", "js", "output")
    pub language: String,
    /// The code content
    pub code: String,
    /// Whether this block should be skipped
    pub ignore: bool,
}

/// A runnable block of a lesson together with the output it should print.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonExercise {
    /// Position of the code block among all fenced blocks of the lesson
    pub block_index: usize,
    pub language: LanguageTag,
    pub code: String,
    /// Contents of the `output` fence right after the block, if any
    pub expected_output: Option<String>,
}

/// Language and flags of a fence info string such as `js,ignore`.
#[derive(Debug, PartialEq, Eq)]
struct FenceInfo<'a> {
    language: &'a str,
    flags: Vec<&'a str>,
}

impl FenceInfo<'_> {
    fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(&flag)
    }
}

fn parse_fence_info(info: &str) -> FenceInfo<'_> {
    let mut parts = info.split(',').map(str::trim);
    FenceInfo {
        language: parts.next().unwrap_or_default(),
        flags: parts.filter(|flag| !flag.is_empty()).collect(),
    }
}

/// Extracts fenced code blocks from markdown content using pulldown-cmark.
///
/// Indented code blocks carry no language and are skipped.
pub fn extract_code_blocks(content: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut open: Option<CodeBlock> = None;

    for event in Parser::new(content) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let fence = parse_fence_info(&info);
                open = Some(CodeBlock {
                    language: fence.language.to_string(),
                    code: String::new(),
                    ignore: fence.has_flag("ignore"),
                });
            }
            Event::Text(text) => {
                if let Some(block) = open.as_mut() {
                    block.code.push_str(&text);
                }
            }
            Event::End(TagEnd::CodeBlock) => blocks.extend(open.take()),
            _ => {}
        }
    }

    blocks
}

/// Extracts the runnable exercises of a lesson.
///
/// A block is runnable when its fence names a known language and it is not
/// marked `ignore`. When the next fenced block is an `output` block, its
/// contents become the expected output.
pub fn extract_exercises(content: &str) -> Vec<LessonExercise> {
    let blocks = extract_code_blocks(content);
    let mut exercises = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        if block.ignore {
            continue;
        }
        let Some(language) = LanguageTag::from_fence(&block.language) else {
            continue;
        };
        let expected_output = blocks
            .get(index + 1)
            .filter(|next| next.language == OUTPUT_FENCE)
            .map(|next| next.code.clone());

        exercises.push(LessonExercise {
            block_index: index,
            language,
            code: block.code.clone(),
            expected_output,
        });
    }

    exercises
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_code_block() {
        let markdown = r#"
# Test

```python
print("hi")
```
"#;

        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "python");
        assert!(!blocks[0].ignore);
        assert!(blocks[0].code.contains("print(\"hi\")"));
    }

    #[test]
    fn test_extract_with_ignore_flag() {
        let markdown = r#"
```js,ignore
This is ignored
```
"#;

        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].ignore);
        assert!(extract_exercises(markdown).is_empty());
    }

    #[test]
    fn test_exercise_with_expected_output() {
        let markdown = r#"
```js
console.log(1 + 1)
```

Expected:

```output
2
```

```rust
fn main() {}
```

```text
not code
```
"#;

        let exercises = extract_exercises(markdown);
        assert_eq!(exercises.len(), 2);

        assert_eq!(exercises[0].language, LanguageTag::JavaScript);
        assert_eq!(exercises[0].block_index, 0);
        assert_eq!(exercises[0].expected_output.as_deref(), Some("2\n"));

        assert_eq!(exercises[1].language, LanguageTag::Rust);
        assert_eq!(exercises[1].block_index, 2);
        assert_eq!(exercises[1].expected_output, None);
    }

    #[test]
    fn test_fence_info_flags() {
        assert_eq!(
            parse_fence_info("python"),
            FenceInfo {
                language: "python",
                flags: vec![]
            }
        );

        let fence = parse_fence_info(" js , ignore ,");
        assert_eq!(fence.language, "js");
        assert!(fence.has_flag("ignore"));
        assert_eq!(fence.flags.len(), 1);
    }

    #[test]
    fn test_indented_blocks_are_skipped() {
        let markdown = "Intro\n\n    indented code\n\n```go\npackage main\n```\n";
        let blocks = extract_code_blocks(markdown);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].language, "go");
        assert_eq!(blocks[0].code, "package main\n");
    }
}
