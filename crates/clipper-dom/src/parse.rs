//! html5ever → sxd-document bridge

use ego_tree::NodeRef;
use scraper::{Html, Node};
use sxd_document::dom::{Document, Element};
use sxd_document::Package;

/// Parse an HTML page into an XPath-addressable package.
///
/// html5ever normalizes tag soup while building its tree, so the result is
/// always well-formed; a tidy pre-pass is inherent to parsing.
pub fn parse_document(html: &str) -> Package {
    let parsed = Html::parse_document(html);
    let package = Package::new();
    {
        let doc = package.as_document();
        let root = doc.root();
        for child in parsed.tree.root().children() {
            match child.value() {
                Node::Element(_) => {
                    if let Some(element) = convert_element(doc, child) {
                        root.append_child(element);
                    }
                }
                Node::Comment(comment) => {
                    root.append_child(doc.create_comment(&comment.comment));
                }
                _ => {}
            }
        }
    }
    package
}

/// Parse an HTML fragment and materialize it inside `doc` as a detached
/// `<div>` container. Used to adopt heuristic extraction output into the
/// page's own document.
pub fn parse_fragment_into<'d>(doc: Document<'d>, html: &str) -> Element<'d> {
    let parsed = Html::parse_fragment(html);
    let container = doc.create_element("div");
    for child in parsed.root_element().children() {
        append_html_node(doc, container, child);
    }
    container
}

fn convert_element<'d>(doc: Document<'d>, node: NodeRef<'_, Node>) -> Option<Element<'d>> {
    let Node::Element(source) = node.value() else {
        return None;
    };

    let element = doc.create_element(source.name());
    for (name, value) in source.attrs() {
        element.set_attribute_value(name, value);
    }
    for child in node.children() {
        append_html_node(doc, element, child);
    }
    Some(element)
}

fn append_html_node<'d>(doc: Document<'d>, parent: Element<'d>, node: NodeRef<'_, Node>) {
    match node.value() {
        Node::Element(_) => {
            if let Some(element) = convert_element(doc, node) {
                parent.append_child(element);
            }
        }
        Node::Text(text) => {
            parent.append_child(doc.create_text(&text.text));
        }
        Node::Comment(comment) => {
            parent.append_child(doc.create_comment(&comment.comment));
        }
        _ => {}
    }
}
