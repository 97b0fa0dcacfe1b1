//! Header directives (`;;import;target;name`, `;;export;target;name`)

use serde::{Deserialize, Serialize};

/// A module binding declared in the header block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Module the binding refers to
    pub target: String,
    /// Host-language name of the binding
    pub name: String,
    pub line: usize,
}

/// The leading block of `;;` directives of a source file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Header {
    pub imports: Vec<Binding>,
    pub exports: Vec<Binding>,
}

impl Header {
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.exports.is_empty()
    }
}
