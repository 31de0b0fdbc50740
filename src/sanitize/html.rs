//! HTML handling for text fields
//!
//! Input is parsed into a node tree with `scraper` and written back out, so
//! malformed markup can never leak through by confusing a string scanner.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Elements removed together with everything inside them.
const DROPPED_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "noscript", "template", "textarea", "select",
    "title", "head", "svg", "math",
];

/// Rich text policy: permitted tags and their permitted attributes.
static RICH_TEXT_TAGS: &[(&str, &[&str])] = &[
    ("a", &["href", "target", "rel"]),
    ("abbr", &[]),
    ("b", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("caption", &[]),
    ("code", &[]),
    ("del", &["datetime"]),
    ("div", &[]),
    ("em", &[]),
    ("h1", &[]),
    ("h2", &[]),
    ("h3", &[]),
    ("h4", &[]),
    ("h5", &[]),
    ("h6", &[]),
    ("hr", &[]),
    ("i", &[]),
    ("img", &["src", "alt", "width", "height"]),
    ("ins", &["datetime"]),
    ("li", &[]),
    ("ol", &["start"]),
    ("p", &[]),
    ("pre", &[]),
    ("s", &[]),
    ("span", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("sup", &[]),
    ("table", &[]),
    ("tbody", &[]),
    ("td", &["colspan", "rowspan"]),
    ("tfoot", &[]),
    ("th", &["colspan", "rowspan", "scope"]),
    ("thead", &[]),
    ("tr", &[]),
    ("u", &[]),
    ("ul", &[]),
];

/// Attributes permitted on every allowed tag.
const GLOBAL_ATTRS: &[&str] = &["class", "title", "lang", "dir"];

const URL_ATTRS: &[&str] = &["href", "src", "cite"];

const URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

/// Remove all markup, keeping the text. Script and style bodies are dropped.
pub fn strip_tags(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    collect_text(*fragment.root_element(), &mut out);
    out
}

/// Single line text: tags stripped, every whitespace run collapsed to a space.
pub fn plain_text(input: &str) -> String {
    strip_tags(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Multi-line text: tags stripped, line breaks kept, trailing spaces removed.
pub fn long_text(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    strip_tags(&normalized)
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// HTML restricted to the rich text allow-list.
pub fn rich_text(input: &str) -> String {
    let fragment = Html::parse_fragment(input);
    let mut out = String::with_capacity(input.len());
    write_allowed(*fragment.root_element(), &mut out);
    out.trim().to_string()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if DROPPED_WITH_CONTENT.contains(&el.name()) => {}
            Node::Element(el) => {
                // Keep words on either side of a line break apart
                if el.name() == "br" {
                    out.push('\n');
                }
                collect_text(child, out);
            }
            _ => {}
        }
    }
}

fn write_allowed(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => escape_text(text, out),
            Node::Element(el) => {
                let name = el.name();
                if DROPPED_WITH_CONTENT.contains(&name) {
                    continue;
                }

                let Some(tag_attrs) = allowed_attrs(name) else {
                    // Unknown wrapper: keep what it contains
                    write_allowed(child, out);
                    continue;
                };

                let mut attrs: Vec<(&str, &str)> = el
                    .attrs()
                    .filter(|(attr, _)| tag_attrs.contains(attr) || GLOBAL_ATTRS.contains(attr))
                    .filter(|(attr, value)| !URL_ATTRS.contains(attr) || is_safe_url(value))
                    .collect();
                // Parser attribute order is not stable
                attrs.sort_unstable_by_key(|(attr, _)| *attr);

                out.push('<');
                out.push_str(name);
                for (attr, value) in attrs {
                    out.push(' ');
                    out.push_str(attr);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_TAGS.contains(&name) {
                    continue;
                }
                write_allowed(child, out);
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            _ => {}
        }
    }
}

fn allowed_attrs(tag: &str) -> Option<&'static [&'static str]> {
    RICH_TEXT_TAGS
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, attrs)| *attrs)
}

/// Relative URLs and the permitted schemes only.
fn is_safe_url(value: &str) -> bool {
    // Browsers ignore whitespace and control characters inside a scheme
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = cleaned.find(':');
    let path_start = cleaned.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => URL_SCHEMES.contains(&&cleaned[..colon]),
        (None, _) => true,
    }
}

fn escape_text(input: &str, out: &mut String) {
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(input: &str, out: &mut String) {
    for c in input.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}
