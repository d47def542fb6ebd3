//! Node surgery: removal, cross-document import, cleanup passes

use once_cell::sync::Lazy;
use regex::Regex;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document, Element, ParentOfChild};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tags treated as trivial wrappers when they hold a single element child.
pub const WRAPPER_TAGS: [&str; 5] = ["div", "article", "section", "header", "footer"];

/// Deep-copy `source` (from any document) into `doc` and return the copy.
///
/// This is the adopt/import step multi-page composition relies on: appended
/// subtrees must belong to the first page's document before traversal
/// continues.
pub fn import_element<'d>(doc: Document<'d>, source: Element<'_>) -> Element<'d> {
    let copy = doc.create_element(source.name().local_part());
    for attribute in source.attributes() {
        copy.set_attribute_value(attribute.name().local_part(), attribute.value());
    }
    for child in source.children() {
        match child {
            ChildOfElement::Element(element) => {
                let imported = import_element(doc, element);
                copy.append_child(imported);
            }
            ChildOfElement::Text(text) => {
                copy.append_child(doc.create_text(text.text()));
            }
            ChildOfElement::Comment(comment) => {
                copy.append_child(doc.create_comment(comment.text()));
            }
            ChildOfElement::ProcessingInstruction(_) => {}
        }
    }
    copy
}

/// Detach a child node of any kind from its parent.
pub fn detach(child: ChildOfElement<'_>) {
    match child {
        ChildOfElement::Element(element) => element.remove_from_parent(),
        ChildOfElement::Text(text) => text.remove_from_parent(),
        ChildOfElement::Comment(comment) => comment.remove_from_parent(),
        ChildOfElement::ProcessingInstruction(pi) => pi.remove_from_parent(),
    }
}

/// The document's root element, when one exists.
pub fn document_element(doc: Document<'_>) -> Option<Element<'_>> {
    doc.root()
        .children()
        .into_iter()
        .find_map(|child| match child {
            ChildOfRoot::Element(element) => Some(element),
            _ => None,
        })
}

/// True when `element` sits inside (or is) `ancestor`.
pub fn is_within<'d>(element: Element<'d>, ancestor: Element<'d>) -> bool {
    let mut current = Some(element);
    while let Some(el) = current {
        if el == ancestor {
            return true;
        }
        current = match el.parent() {
            Some(ParentOfChild::Element(parent)) => Some(parent),
            _ => None,
        };
    }
    false
}

/// Collect every element under `root` (excluding `root` itself) in
/// document order.
pub fn descendant_elements(root: Element<'_>) -> Vec<Element<'_>> {
    let mut out = Vec::new();
    collect_descendants(root, &mut out);
    out
}

fn collect_descendants<'d>(element: Element<'d>, out: &mut Vec<Element<'d>>) {
    for child in element.children() {
        if let ChildOfElement::Element(el) = child {
            out.push(el);
            collect_descendants(el, out);
        }
    }
}

/// Replace an element by its children, preserving their position.
///
/// sxd's dom can only append, so the parent's children are detached and
/// re-appended in order with the target swapped for its content.
pub fn unwrap_element(element: Element<'_>) {
    let Some(ParentOfChild::Element(parent)) = element.parent() else {
        element.remove_from_parent();
        return;
    };

    let original = parent.children();
    for child in &original {
        detach(*child);
    }
    for child in original {
        match child {
            ChildOfElement::Element(el) if el == element => {
                for grandchild in el.children() {
                    detach(grandchild);
                    parent.append_child(grandchild);
                }
            }
            other => parent.append_child(other),
        }
    }
}

/// Descend through single-child wrapper chains
/// (`div|article|section|header|footer`) and return the innermost element
/// worth serializing.
pub fn collapse_wrappers(root: Element<'_>) -> Element<'_> {
    let mut current = root;
    loop {
        if !WRAPPER_TAGS.contains(&current.name().local_part()) {
            return current;
        }

        let mut only_element = None;
        let mut element_count = 0;
        let mut has_text = false;
        for child in current.children() {
            match child {
                ChildOfElement::Element(el) => {
                    element_count += 1;
                    only_element = Some(el);
                }
                ChildOfElement::Text(text) => {
                    if !text.text().trim().is_empty() {
                        has_text = true;
                    }
                }
                _ => {}
            }
        }

        match only_element {
            Some(next) if element_count == 1 && !has_text => current = next,
            _ => return current,
        }
    }
}

/// Collapse whitespace runs in text nodes and drop the ones left empty.
/// `<pre>` subtrees keep their layout.
pub fn normalize_whitespace(root: Element<'_>) {
    normalize_text_nodes(root, false);
}

fn normalize_text_nodes(element: Element<'_>, in_pre: bool) {
    let in_pre = in_pre || element.name().local_part() == "pre";
    for child in element.children() {
        match child {
            ChildOfElement::Element(el) => normalize_text_nodes(el, in_pre),
            ChildOfElement::Text(text) if !in_pre => {
                let collapsed = WHITESPACE_RUN.replace_all(text.text(), " ").into_owned();
                if collapsed.is_empty() {
                    text.remove_from_parent();
                } else {
                    text.set_text(&collapsed);
                }
            }
            _ => {}
        }
    }
}

/// Remove `<p>` elements that hold no elements and only whitespace text.
pub fn strip_empty_paragraphs(root: Element<'_>) {
    for element in descendant_elements(root) {
        if element.name().local_part() != "p" {
            continue;
        }
        let empty = element.children().iter().all(|child| match child {
            ChildOfElement::Text(text) => text.text().trim().is_empty(),
            ChildOfElement::Element(_) => false,
            _ => true,
        });
        if empty {
            element.remove_from_parent();
        }
    }
}

/// Remove every descendant with the given tag name.
pub fn remove_tags(root: Element<'_>, tag: &str) {
    for element in descendant_elements(root) {
        if element.name().local_part() == tag {
            element.remove_from_parent();
        }
    }
}
