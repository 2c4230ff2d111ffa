//! Parser for the lesson markup dialect.
//!
//! The dialect is line based: fenced code blocks, `#`/`##`/`###` headings,
//! `- ` lists, paragraphs with inline `` `code` `` spans, and blank lines.
//! Parsing never fails; anything unrecognized becomes a paragraph.

use serde::Serialize;

const FENCE: &str = "```";

/// Language assumed for a fence without an info string.
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// One entry of a list block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub text: String,
    /// Leading whitespace characters of the source line.
    pub indent: usize,
}

/// A parsed unit of lesson content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Heading { level: u8, text: String },
    CodeBlock { language: String, text: String },
    ListBlock { items: Vec<ListItem> },
    Paragraph { html_text: String, indent: usize },
    Blank,
}

/// Parses lesson content into blocks in source order.
///
/// ```
/// use lesson_sandbox::content::{parse, ContentBlock};
///
/// let blocks = parse("# Intro\n```py\nprint(1)\n```");
/// assert_eq!(blocks[0], ContentBlock::Heading { level: 1, text: "Intro".into() });
/// assert_eq!(
///     blocks[1],
///     ContentBlock::CodeBlock { language: "py".into(), text: "print(1)".into() }
/// );
/// ```
pub fn parse(content: &str) -> Vec<ContentBlock> {
    let lines: Vec<&str> = content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let trimmed = line.trim();

        if let Some(info) = trimmed.strip_prefix(FENCE) {
            let language = match info.trim() {
                "" => DEFAULT_CODE_LANGUAGE.to_string(),
                info => info.to_string(),
            };
            i += 1;
            let mut body = Vec::new();
            while i < lines.len() && lines[i].trim() != FENCE {
                body.push(lines[i]);
                i += 1;
            }
            // Skip the closing fence when there is one.
            i += 1;
            blocks.push(ContentBlock::CodeBlock {
                language,
                text: body.join("\n"),
            });
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            blocks.push(ContentBlock::Heading {
                level,
                text: text.to_string(),
            });
        } else if trimmed.starts_with("- ") {
            let mut items = Vec::new();
            while i < lines.len() {
                let Some(text) = lines[i].trim().strip_prefix("- ") else {
                    break;
                };
                items.push(ListItem {
                    text: text.to_string(),
                    indent: leading_whitespace(lines[i]),
                });
                i += 1;
            }
            blocks.push(ContentBlock::ListBlock { items });
            continue;
        } else if !trimmed.is_empty() {
            blocks.push(ContentBlock::Paragraph {
                html_text: inline_markup(trimmed),
                indent: leading_whitespace(line),
            });
        } else {
            blocks.push(ContentBlock::Blank);
        }
        i += 1;
    }

    blocks
}

fn heading(trimmed: &str) -> Option<(u8, &str)> {
    [("### ", 3), ("## ", 2), ("# ", 1)]
        .into_iter()
        .find_map(|(prefix, level)| trimmed.strip_prefix(prefix).map(|text| (level, text)))
}

/// Number of leading whitespace characters.
pub fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Escapes `text` and wraps every closed `` `...` `` span in an inline code
/// element. An unmatched backtick is kept as a literal character.
pub fn inline_markup(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('`') else {
            break;
        };
        html.push_str(&escape_html(&rest[..open]));
        html.push_str("<code class=\"inline-code\">");
        html.push_str(&escape_html(&after[..close]));
        html.push_str("</code>");
        rest = &after[close + 1..];
    }
    html.push_str(&escape_html(rest));
    html
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str, indent: usize) -> ContentBlock {
        ContentBlock::Paragraph {
            html_text: text.to_string(),
            indent,
        }
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = "# T\n\n- a\n  - b\n```\nx\n```\ntext `c`";
        assert_eq!(parse(content), parse(content));
    }

    #[test]
    fn test_fence_absorption() {
        assert_eq!(
            parse("```py\nline1\nline2\n```"),
            vec![ContentBlock::CodeBlock {
                language: "py".into(),
                text: "line1\nline2".into()
            }]
        );
    }

    #[test]
    fn test_unterminated_fence() {
        assert_eq!(
            parse("```js\nfoo()"),
            vec![ContentBlock::CodeBlock {
                language: "js".into(),
                text: "foo()".into()
            }]
        );
    }

    #[test]
    fn test_fence_defaults_and_verbatim_lines() {
        let blocks = parse("```\n    # not a heading\n- nor a list\n  ```  \nafter");
        assert_eq!(
            blocks,
            vec![
                ContentBlock::CodeBlock {
                    language: "javascript".into(),
                    text: "    # not a heading\n- nor a list".into()
                },
                paragraph("after", 0),
            ]
        );
    }

    #[test]
    fn test_heading_levels() {
        assert_eq!(
            parse("# A\n## B\n### C"),
            vec![
                ContentBlock::Heading { level: 1, text: "A".into() },
                ContentBlock::Heading { level: 2, text: "B".into() },
                ContentBlock::Heading { level: 3, text: "C".into() },
            ]
        );
    }

    #[test]
    fn test_deep_heading_is_paragraph() {
        assert_eq!(parse("#### D"), vec![paragraph("#### D", 0)]);
        assert_eq!(parse("#NoSpace"), vec![paragraph("#NoSpace", 0)]);
    }

    #[test]
    fn test_list_grouping() {
        assert_eq!(
            parse("- a\n- b\ntext"),
            vec![
                ContentBlock::ListBlock {
                    items: vec![
                        ListItem { text: "a".into(), indent: 0 },
                        ListItem { text: "b".into(), indent: 0 },
                    ]
                },
                paragraph("text", 0),
            ]
        );
    }

    #[test]
    fn test_list_item_indent_preserved() {
        let blocks = parse("- top\n    - nested");
        assert_eq!(
            blocks,
            vec![ContentBlock::ListBlock {
                items: vec![
                    ListItem { text: "top".into(), indent: 0 },
                    ListItem { text: "nested".into(), indent: 4 },
                ]
            }]
        );
    }

    #[test]
    fn test_non_adjacent_lists_are_not_merged() {
        let blocks = parse("- a\n\n- b");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], ContentBlock::Blank);
    }

    #[test]
    fn test_inline_code_span() {
        let blocks = parse("use `x` here");
        assert_eq!(
            blocks,
            vec![paragraph("use <code class=\"inline-code\">x</code> here", 0)]
        );
    }

    #[test]
    fn test_inline_markup_escapes_and_unmatched_backtick() {
        assert_eq!(
            inline_markup("a < b `<i>` and `open"),
            "a &lt; b <code class=\"inline-code\">&lt;i&gt;</code> and `open"
        );
    }

    #[test]
    fn test_paragraph_indent_and_blank() {
        assert_eq!(
            parse("  indented\n   \r\nnext\r"),
            vec![paragraph("indented", 2), ContentBlock::Blank, paragraph("next", 0)]
        );
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(ContentBlock::Heading {
            level: 2,
            text: "B".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "heading");
        assert_eq!(json["level"], 2);
        let json = serde_json::to_value(ContentBlock::Blank).unwrap();
        assert_eq!(json, serde_json::json!({"type": "blank"}));
    }
}
