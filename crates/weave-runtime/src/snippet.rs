//! Output function files and tags

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A `namespace:path` function identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId {
    pub namespace: String,
    /// `/`-separated path without extension
    pub path: String,
}

impl FunctionId {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Parse `namespace:path`
    pub fn parse(text: &str) -> Option<Self> {
        let (namespace, path) = text.split_once(':')?;
        (!namespace.is_empty() && !path.is_empty()).then(|| Self::new(namespace, path))
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// One output command file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: FunctionId,
    pub commands: Vec<String>,
}

impl Snippet {
    pub fn new(id: FunctionId) -> Self {
        Self {
            id,
            commands: Vec::new(),
        }
    }

    /// File content, one command per line
    pub fn content(&self) -> String {
        let mut content = String::new();
        for command in &self.commands {
            content.push_str(command);
            content.push('\n');
        }
        content
    }
}

/// Every function file and function tag produced by a compile run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputTree {
    pub snippets: Vec<Snippet>,
    /// Function tags keyed by `namespace:name`, values in insertion order
    pub tags: BTreeMap<String, Vec<String>>,
}

impl OutputTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &FunctionId) -> Option<&Snippet> {
        self.snippets.iter().find(|s| &s.id == id)
    }

    /// Look up a snippet by its `namespace:path` text
    pub fn find(&self, id: &str) -> Option<&Snippet> {
        FunctionId::parse(id).and_then(|id| self.get(&id))
    }

    /// Snippets whose invocation appears in `parent`
    pub fn children(&self, parent: &FunctionId) -> Vec<&Snippet> {
        let Some(parent) = self.get(parent) else {
            return Vec::new();
        };
        self.snippets
            .iter()
            .filter(|s| {
                let call = format!("function {}", s.id);
                parent.commands.iter().any(|c| c.ends_with(&call))
            })
            .collect()
    }

    /// Add a function to a tag, keeping values unique
    pub fn tag(&mut self, tag: &str, function: &FunctionId) {
        let values = self.tags.entry(tag.to_string()).or_default();
        let value = function.to_string();
        if !values.contains(&value) {
            values.push(value);
        }
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn namespaces(&self) -> Vec<&str> {
        let mut namespaces: Vec<&str> = self
            .snippets
            .iter()
            .map(|s| s.id.namespace.as_str())
            .collect();
        namespaces.sort_unstable();
        namespaces.dedup();
        namespaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_ids_parse_and_display() {
        let id = FunctionId::parse("demo:dir/main").expect("parse");
        assert_eq!(id.path, "dir/main");
        assert_eq!(id.to_string(), "demo:dir/main");
        assert_eq!(FunctionId::parse("main"), None);
        assert_eq!(FunctionId::parse(":main"), None);
    }

    #[test]
    fn tags_are_deduplicated() {
        let mut tree = OutputTree::new();
        let init = FunctionId::new("weave", "init");
        tree.tag("minecraft:load", &init);
        tree.tag("minecraft:load", &init);
        assert_eq!(tree.tags["minecraft:load"], vec!["weave:init"]);
    }

    #[test]
    fn children_follow_invocations() {
        let mut tree = OutputTree::new();
        let mut main = Snippet::new(FunctionId::new("demo", "main"));
        main.commands.push("execute if block ~ ~ ~ stone run function weave:demo/main/gen/a".into());
        tree.snippets.push(main);
        tree.snippets.push(Snippet::new(FunctionId::new("weave", "demo/main/gen/a")));
        tree.snippets.push(Snippet::new(FunctionId::new("weave", "demo/other/gen/b")));
        let children = tree.children(&FunctionId::new("demo", "main"));
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id.path, "demo/main/gen/a");
    }
}
