//! HTML to text conversion utilities

use scraper::{Html, Node};

/// Elements whose content is never visible text
const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Elements that start a new line in the extracted text
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "caption",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "head",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "td",
    "th",
    "title",
    "tr",
    "ul",
];

/// Convert HTML to plain text
///
/// Parsing is lenient: any input produces some text, malformed markup
/// included. Script, style, noscript and template subtrees are dropped,
/// block elements and `<br>` become line breaks, and the result is
/// collapsed with [`collapse_lines`].
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut output = String::new();
    let mut pre_depth = 0usize;

    // (node, leaving): leaving entries close a block or <pre>
    let mut stack = vec![(document.tree.root(), false)];

    while let Some((node, leaving)) = stack.pop() {
        match node.value() {
            Node::Element(element) => {
                let name = element.name();
                if SKIP_TAGS.contains(&name) {
                    continue;
                }
                let is_block = BLOCK_TAGS.contains(&name);

                if leaving {
                    if name == "pre" {
                        pre_depth = pre_depth.saturating_sub(1);
                    }
                    if is_block {
                        output.push('\n');
                    }
                    continue;
                }

                if name == "br" {
                    output.push('\n');
                }
                if name == "pre" {
                    pre_depth += 1;
                }
                if is_block {
                    output.push('\n');
                    stack.push((node, true));
                }
                for child in node.children().rev() {
                    stack.push((child, false));
                }
            }
            Node::Text(text) => {
                if pre_depth > 0 {
                    output.push_str(text);
                } else {
                    push_collapsed(&mut output, text);
                }
            }
            Node::Document | Node::Fragment => {
                for child in node.children().rev() {
                    stack.push((child, false));
                }
            }
            _ => {}
        }
    }

    collapse_lines(&output)
}

/// Append inline text with whitespace runs folded into one space
fn push_collapsed(output: &mut String, text: &str) {
    let mut last_was_space = output.ends_with(' ');
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                output.push(' ');
                last_was_space = true;
            }
        } else {
            output.push(c);
            last_was_space = false;
        }
    }
}

/// Keep only non-blank lines, each trimmed, joined by `\n`
pub fn collapse_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
