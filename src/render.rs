//! HTML rendering of parsed lesson content.
//!
//! Indentation is scaled by a [`Viewport`] passed in by the caller; the
//! stored indent values are never changed.

use crate::content::{escape_html, ContentBlock};

/// Widths below this many pixels use the narrow indentation unit.
pub const NARROW_BREAKPOINT: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Viewport {
    Narrow,
    #[default]
    Wide,
}

impl Viewport {
    pub fn from_width(width_px: u32) -> Self {
        if width_px < NARROW_BREAKPOINT {
            Viewport::Narrow
        } else {
            Viewport::Wide
        }
    }

    /// Pixels of padding per leading whitespace character.
    pub fn indent_unit(&self) -> usize {
        match self {
            Viewport::Narrow => 4,
            Viewport::Wide => 8,
        }
    }
}

/// Renders `blocks` to an HTML fragment, one element per block.
pub fn render_html(blocks: &[ContentBlock], viewport: Viewport) -> String {
    let unit = viewport.indent_unit();
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| render_block(index, block, unit))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(index: usize, block: &ContentBlock, unit: usize) -> String {
    match block {
        ContentBlock::Heading { level, text } => {
            format!(
                "<h{level} data-block=\"{index}\">{}</h{level}>",
                escape_html(text)
            )
        }
        ContentBlock::CodeBlock { language, text } => {
            let language = escape_html(language);
            let text = escape_html(text);
            format!(
                "<div class=\"code-block\" data-block=\"{index}\">\
                 <button class=\"copy-code\" data-copy=\"{text}\">Copy</button>\
                 <pre><code class=\"language-{language}\">{text}</code></pre></div>"
            )
        }
        ContentBlock::ListBlock { items } => {
            let items: String = items
                .iter()
                .map(|item| {
                    format!(
                        "<li style=\"margin-left: {}px\">{}</li>",
                        item.indent * unit,
                        escape_html(&item.text)
                    )
                })
                .collect();
            format!("<ul data-block=\"{index}\">{items}</ul>")
        }
        ContentBlock::Paragraph { html_text, indent } => {
            format!(
                "<p data-block=\"{index}\" style=\"padding-left: {}px\">{html_text}</p>",
                indent * unit
            )
        }
        ContentBlock::Blank => format!("<div class=\"spacer\" data-block=\"{index}\"></div>"),
    }
}
