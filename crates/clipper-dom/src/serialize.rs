//! HTML-aware serialization of bridged DOM subtrees
//!
//! sxd's own writer only emits whole documents, so subtree serialization is
//! done here, with HTML void elements and raw-text elements handled the way
//! browsers expect.

use sxd_document::dom::{ChildOfElement, Element};

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// Serialize the element's children.
pub fn inner_html(element: Element<'_>) -> String {
    let mut out = String::new();
    write_children(&mut out, element);
    out
}

/// Serialize the element itself, tag included.
pub fn outer_xml(element: Element<'_>) -> String {
    let mut out = String::new();
    write_element(&mut out, element);
    out
}

fn write_element(out: &mut String, element: Element<'_>) {
    let name = element.name().local_part();
    out.push('<');
    out.push_str(name);
    for attribute in element.attributes() {
        out.push(' ');
        out.push_str(attribute.name().local_part());
        out.push_str("=\"");
        escape_attr(out, attribute.value());
        out.push('"');
    }

    if VOID_ELEMENTS.contains(&name) && element.children().is_empty() {
        out.push_str("/>");
        return;
    }

    out.push('>');
    if RAW_TEXT_ELEMENTS.contains(&name) {
        for child in element.children() {
            if let ChildOfElement::Text(text) = child {
                out.push_str(text.text());
            }
        }
    } else {
        write_children(out, element);
    }
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(out: &mut String, element: Element<'_>) {
    for child in element.children() {
        match child {
            ChildOfElement::Element(el) => write_element(out, el),
            ChildOfElement::Text(text) => escape_text(out, text.text()),
            ChildOfElement::Comment(comment) => {
                out.push_str("<!--");
                out.push_str(comment.text());
                out.push_str("-->");
            }
            ChildOfElement::ProcessingInstruction(_) => {}
        }
    }
}

fn escape_text(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// Escape text for direct inclusion in synthesized HTML.
pub fn escape(text: &str) -> String {
    let mut out = String::new();
    escape_text(&mut out, text);
    out
}

/// Escape an attribute value for direct inclusion in synthesized HTML.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::new();
    escape_attr(&mut out, value);
    out
}
