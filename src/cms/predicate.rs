//! Query predicates in the content API's `q` syntax

use std::fmt;

/// A single `[at(path,"value")]` query predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub path: String,
    pub value: String,
}

impl Predicate {
    pub fn at(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// `document.type == doc_type`
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// `my.{doc_type}.uid == uid`
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(format!("my.{}.uid", doc_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[at({},{})]", self.path, quote(&self.value))
    }
}

/// Render a predicate list as the `q` query parameter
pub fn query_string(predicates: &[Predicate]) -> String {
    let parts: String = predicates.iter().map(|p| p.to_string()).collect();
    format!("[{}]", parts)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
