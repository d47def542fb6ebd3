//! XPath evaluation over the bridged DOM

use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;
use sxd_document::dom::{Document, Element};
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};
use tracing::warn;

static FACTORY: Lazy<Factory> = Lazy::new(Factory::new);

/// Compiles and evaluates rule-file XPath expressions.
///
/// Rule files are community-maintained, so malformed expressions are a fact
/// of life: each offending expression is reported to the log once and then
/// treated as "no match".
#[derive(Debug, Default)]
pub struct XPathEngine {
    reported: Mutex<HashSet<String>>,
}

impl XPathEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate an expression against the document root. `None` covers both
    /// malformed expressions and evaluation failures.
    pub fn evaluate<'d>(&self, doc: Document<'d>, expr: &str) -> Option<Value<'d>> {
        let xpath = self.compile(expr)?;
        match xpath.evaluate(&Context::new(), doc.root()) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(expr, &err.to_string());
                None
            }
        }
    }

    /// First non-empty string produced by the expression: a string result
    /// directly, or the string-value of the first node in document order.
    pub fn first_string(&self, doc: Document<'_>, expr: &str) -> Option<String> {
        let value = self.evaluate(doc, expr)?;
        let text = match value {
            Value::String(s) => s,
            Value::Nodeset(nodes) => nodes.document_order_first()?.string_value(),
            Value::Number(n) => n.to_string(),
            Value::Boolean(_) => return None,
        };
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// All element nodes matched, in document order. String/number results
    /// yield nothing.
    pub fn elements<'d>(&self, doc: Document<'d>, expr: &str) -> Vec<Element<'d>> {
        match self.evaluate(doc, expr) {
            Some(Value::Nodeset(nodes)) => nodes
                .document_order()
                .into_iter()
                .filter_map(|node| match node {
                    Node::Element(element) => Some(element),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Resolve an expression to a URL-ish string the way link directives
    /// expect: a string value is taken as-is; for node results the first
    /// element carrying `href` wins, then the first attribute node, then
    /// the first node's text.
    pub fn link_string(&self, doc: Document<'_>, expr: &str) -> Option<String> {
        let value = self.evaluate(doc, expr)?;
        let text = match value {
            Value::String(s) => s,
            Value::Nodeset(nodes) => {
                let ordered = nodes.document_order();
                let from_href = ordered.iter().find_map(|node| match node {
                    Node::Element(element) => {
                        element.attribute("href").map(|a| a.value().to_string())
                    }
                    _ => None,
                });
                from_href.or_else(|| {
                    ordered.iter().find_map(|node| match node {
                        Node::Attribute(attr) => Some(attr.value().to_string()),
                        Node::Text(text) => Some(text.text().to_string()),
                        _ => None,
                    })
                })?
            }
            _ => return None,
        };
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    fn compile(&self, expr: &str) -> Option<XPath> {
        match FACTORY.build(expr) {
            Ok(Some(xpath)) => Some(xpath),
            Ok(None) => {
                self.report(expr, "empty expression");
                None
            }
            Err(err) => {
                self.report(expr, &err.to_string());
                None
            }
        }
    }

    /// Log each broken expression once per engine.
    fn report(&self, expr: &str, message: &str) {
        let mut reported = self
            .reported
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if reported.insert(expr.to_string()) {
            warn!(expr, message, "XPath expression unusable, treating as no match");
        }
    }
}
