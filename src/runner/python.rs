//! Line-oriented rewrite of simple Python programs.
//!
//! Only one statement per line is understood. Blocks are recovered from
//! indentation in a final pass that counts 4-space steps, so nesting deeper
//! than one level is only partially closed.

use regex::{Captures, Regex};
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($pattern).expect("valid python pattern"));
    };
}

regex!(RE_PRINT, r"\bprint\(");
regex!(RE_TRUE, r"\bTrue\b");
regex!(RE_FALSE, r"\bFalse\b");
regex!(RE_NONE, r"\bNone\b");
regex!(RE_AND, r"\band\b");
regex!(RE_OR, r"\bor\b");
regex!(RE_NOT, r"\bnot\s+");
regex!(RE_COMMENT, r"(?m)#(.*)$");
regex!(RE_ASSIGN, r"(?m)^([ \t]*)([A-Za-z_]\w*)[ \t]*=([^=].*)$");
regex!(RE_FOR_IN, r"(?m)^([ \t]*)for\s+(\w+)\s+in\s+(\w+)\s*:[ \t]*$");
regex!(RE_FOR_RANGE, r"(?m)^([ \t]*)for\s+(\w+)\s+in\s+range\((.+)\)\s*:[ \t]*$");
regex!(RE_IF, r"(?m)^([ \t]*)if\s+(.+?)\s*:[ \t]*$");
regex!(RE_ELIF, r"(?m)^([ \t]*)elif\s+(.+?)\s*:[ \t]*$");
regex!(RE_ELSE, r"(?m)^([ \t]*)else\s*:[ \t]*$");
regex!(RE_WHILE, r"(?m)^([ \t]*)while\s+(.+?)\s*:[ \t]*$");

/// Width of one indentation level.
const INDENT_WIDTH: usize = 4;

pub fn print_capture(source: &str) -> String {
    RE_PRINT.replace_all(source, "console.log(").into_owned()
}

pub fn literals(source: &str) -> String {
    let text = RE_TRUE.replace_all(source, "true");
    let text = RE_FALSE.replace_all(&text, "false");
    RE_NONE.replace_all(&text, "null").into_owned()
}

pub fn logical_operators(source: &str) -> String {
    let text = RE_AND.replace_all(source, "&&");
    let text = RE_OR.replace_all(&text, "||");
    RE_NOT.replace_all(&text, "!").into_owned()
}

pub fn comments(source: &str) -> String {
    RE_COMMENT.replace_all(source, "//${1}").into_owned()
}

/// `x = 1` at the start of a line becomes `var x = 1`. Comparisons (`==`)
/// and compound assignments are left alone.
pub fn assignments(source: &str) -> String {
    RE_ASSIGN.replace_all(source, "${1}var ${2} =${3}").into_owned()
}

pub fn for_in(source: &str) -> String {
    RE_FOR_IN
        .replace_all(source, "${1}for (var ${2} of ${3}) {")
        .into_owned()
}

/// `range(n)`, `range(a, b)` and `range(a, b, step)` become counted loops.
pub fn for_range(source: &str) -> String {
    RE_FOR_RANGE
        .replace_all(source, |caps: &Captures| {
            let indent = &caps[1];
            let var = &caps[2];
            let args: Vec<&str> = caps[3].split(',').map(str::trim).collect();
            let (start, end, step) = match args.as_slice() {
                [end] => ("0", *end, "1"),
                [start, end] => (*start, *end, "1"),
                [start, end, step, ..] => (*start, *end, *step),
                [] => ("0", "0", "1"),
            };
            if step == "1" {
                format!(
                    "{indent}for (var {var} = {start}; {var} < {end}; {var}++) {{"
                )
            } else {
                format!(
                    "{indent}for (var {var} = {start}; ({step}) > 0 ? {var} < {end} : {var} > {end}; {var} += {step}) {{"
                )
            }
        })
        .into_owned()
}

pub fn conditionals(source: &str) -> String {
    let text = RE_IF.replace_all(source, "${1}if (${2}) {");
    let text = RE_ELIF.replace_all(&text, "${1}else if (${2}) {");
    RE_ELSE.replace_all(&text, "${1}else {").into_owned()
}

pub fn while_loops(source: &str) -> String {
    RE_WHILE
        .replace_all(source, "${1}while (${2}) {")
        .into_owned()
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { INDENT_WIDTH } else { 1 })
        .sum()
}

/// Inserts closing braces from indentation. Between consecutive non-blank
/// lines every 4-space decrease emits one `}` line ahead of the dedented
/// line. One more `}` closes the input when its last non-blank line is
/// indented.
pub fn close_blocks(source: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut previous: Option<usize> = None;

    for line in source.lines() {
        if line.trim().is_empty() {
            out.push(line.to_string());
            continue;
        }
        let indent = indent_of(line);
        if let Some(prev) = previous {
            if indent < prev {
                let levels = (prev - indent) / INDENT_WIDTH;
                for level in (0..levels).rev() {
                    out.push(format!("{}}}", " ".repeat(indent + level * INDENT_WIDTH)));
                }
            }
        }
        out.push(line.to_string());
        previous = Some(indent);
    }

    // Input ending at column zero has no open block left to close.
    if previous.is_some_and(|indent| indent > 0) {
        out.push("}".to_string());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_and_literals() {
        assert_eq!(print_capture("print(1)"), "console.log(1)");
        assert_eq!(literals("x = True or None"), "x = true or null");
        assert_eq!(logical_operators("a and not b or c"), "a && !b || c");
    }

    #[test]
    fn test_assignments() {
        assert_eq!(assignments("x = 5"), "var x = 5");
        assert_eq!(assignments("    total = total + i"), "    var total = total + i");
        assert_eq!(assignments("if x == 5:"), "if x == 5:");
        assert_eq!(assignments("x += 1"), "x += 1");
    }

    #[test]
    fn test_comments() {
        assert_eq!(comments("x = 1  # one"), "x = 1  // one");
    }

    #[test]
    fn test_loops() {
        assert_eq!(for_in("for fruit in fruits:"), "for (var fruit of fruits) {");
        assert_eq!(for_in("for i in range(3):"), "for i in range(3):");
        assert_eq!(
            for_range("for i in range(3):"),
            "for (var i = 0; i < 3; i++) {"
        );
        assert_eq!(
            for_range("  for i in range(1, 4):"),
            "  for (var i = 1; i < 4; i++) {"
        );
        assert_eq!(while_loops("while n > 0:"), "while (n > 0) {");
    }

    #[test]
    fn test_conditionals() {
        let text = conditionals("if x > 1:\n    a\nelif x > 0:\n    b\nelse:\n    c");
        assert_eq!(
            text,
            "if (x > 1) {\n    a\nelse if (x > 0) {\n    b\nelse {\n    c"
        );
    }

    #[test]
    fn test_close_blocks_single_level() {
        let text = close_blocks("if (x) {\n    a\nelse {\n    b");
        assert_eq!(text, "if (x) {\n    a\n}\nelse {\n    b\n}");
    }

    #[test]
    fn test_close_blocks_without_blocks() {
        assert_eq!(close_blocks("a\nb"), "a\nb");
    }

    #[test]
    fn test_close_blocks_two_levels_at_once() {
        let text = close_blocks("for (x) {\n    if (y) {\n        a\nb");
        assert_eq!(text, "for (x) {\n    if (y) {\n        a\n    }\n}\nb");
    }
}
