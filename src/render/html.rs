//! Sanitizing HTML serializer for [`Rendered`] trees.
//!
//! Output is inert markup: no event handlers, no script-capable elements, no
//! script-bearing URLs. Text and attribute values are always escaped.

use super::{Keyed, Rendered};
use crate::markup::tree::format_number;
use crate::markup::{PropValue, Props};

/// Elements omitted together with their subtree.
const DENIED_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "link", "meta", "base", "frame", "frameset", "template",
    "animate", "set", "animatemotion", "animatetransform",
];

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Lowercase; attribute names are matched case-insensitively.
const URL_ATTRS: &[&str] = &["href", "src", "action", "formaction", "xlink:href", "poster", "srcset", "background", "cite"];

const DENIED_SCHEMES: &[&str] = &["javascript:", "data:", "vbscript:"];

/// Serialize a rendered tree.
#[must_use]
pub fn to_html(node: &Rendered) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &Rendered) {
    match node {
        Rendered::Text(text) => escape_into(out, text),
        Rendered::Fragment(children) => {
            for Keyed { node, .. } in children {
                write_node(out, node);
            }
        }
        Rendered::Element { tag, attrs, children } => write_element(out, tag, attrs, children),
    }
}

fn write_element(out: &mut String, name: &str, attrs: &Props, children: &[Rendered]) {
    let (tag, component) = if is_html_tag(name) { (name.to_ascii_lowercase(), None) } else { ("div".to_owned(), Some(name)) };
    if DENIED_TAGS.contains(&tag.as_str()) {
        return;
    }

    out.push('<');
    out.push_str(&tag);
    if let Some(component) = component {
        out.push_str(" data-component=\"");
        escape_into(out, component);
        out.push('"');
    }
    for (key, value) in attrs {
        write_attr(out, key, value);
    }
    out.push('>');

    if VOID_TAGS.contains(&tag.as_str()) {
        return;
    }
    for child in children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn write_attr(out: &mut String, key: &str, value: &PropValue) {
    let Some(name) = attr_name(key) else {
        return;
    };
    let text = match value {
        PropValue::Bool(false) | PropValue::Null => return,
        PropValue::Bool(true) => {
            out.push(' ');
            out.push_str(name);
            return;
        }
        PropValue::Str(s) => s.clone(),
        PropValue::Num(n) => format_number(*n),
    };
    if URL_ATTRS.contains(&key.to_ascii_lowercase().as_str()) && is_dangerous_url(&text) {
        return;
    }
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    escape_into(out, &text);
    out.push('"');
}

/// Output attribute name, or `None` when the attribute must be dropped.
fn attr_name(key: &str) -> Option<&str> {
    match key {
        "className" => return Some("class"),
        "htmlFor" => return Some("for"),
        "dangerouslySetInnerHTML" | "key" | "ref" | "children" => return None,
        _ => {}
    }
    let lower = key.to_ascii_lowercase();
    if lower.starts_with("on") || lower.starts_with("xmlns") {
        return None;
    }
    let valid = !key.is_empty()
        && key.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'));
    valid.then_some(key)
}

/// Names a browser would parse as a plain tag: lowercase ASCII start, then
/// letters, digits or hyphens. Component-style names (`Card`, `Tabs.List`)
/// are not tags.
fn is_html_tag(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase()) && chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_dangerous_url(value: &str) -> bool {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .flat_map(char::to_lowercase)
        .collect();
    DENIED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme) || normalized.contains(&format!(",{scheme}")))
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
#[path = "html_test.rs"]
mod tests;
