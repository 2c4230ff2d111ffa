//! Static reports for the markup languages. Nothing here executes code.

use regex::Regex;
use std::sync::LazyLock;

static RE_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script pattern")
});
static RE_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid style pattern")
});
static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));
static RE_SELECTOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^{}]+\{").expect("valid selector pattern"));
static RE_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid rule pattern"));

/// Visible text of an HTML document: scripts and styles dropped, tags
/// removed, whitespace collapsed.
pub fn text_content(source: &str) -> String {
    let text = RE_SCRIPT.replace_all(source, "");
    let text = RE_STYLE.replace_all(&text, "");
    let text = RE_TAG.replace_all(&text, " ");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

pub fn html_report(source: &str) -> String {
    let text = text_content(source);
    let text = if text.is_empty() {
        "Empty document"
    } else {
        text.as_str()
    };
    format!("HTML rendered successfully.\nText content: {}", text)
}

/// Counts selectors (text ahead of each `{`) and rule blocks. Every
/// stylesheet is reported valid.
pub fn css_report(source: &str) -> String {
    let selectors = RE_SELECTOR
        .find_iter(source)
        .filter(|m| !m.as_str().trim_end_matches('{').trim().is_empty())
        .count();
    let rules = RE_RULE.find_iter(source).count();
    format!(
        "CSS parsed successfully.\nSelectors: {}\nRules: {}\nStatus: Valid",
        selectors, rules
    )
}
