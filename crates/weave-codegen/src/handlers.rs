//! Registry of `@name(params) { ... }` block handlers

use std::collections::HashMap;
use std::fmt;

use weave_ast::template_literal;

use crate::CodegenError;

/// Host lines written around a lowered action body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockWrap {
    pub open: String,
    pub close: String,
}

/// Turns action params into the host code enclosing the action body
pub trait ActionHandler {
    fn wrap(&self, params: &str) -> Result<BlockWrap, String>;
}

impl<F> ActionHandler for F
where
    F: Fn(&str) -> Result<BlockWrap, String>,
{
    fn wrap(&self, params: &str) -> Result<BlockWrap, String> {
        self(params)
    }
}

/// `@execute(as @a at @s) { ... }` runs the body in a new function under
/// an `execute` prefix
pub struct ExecuteHandler;

impl ActionHandler for ExecuteHandler {
    fn wrap(&self, params: &str) -> Result<BlockWrap, String> {
        let prefix = params.trim();
        let predicate = if prefix.is_empty() {
            "\"\"".to_string()
        } else {
            template_literal(prefix)
        };
        Ok(BlockWrap {
            open: format!("jump({predicate}, |weave_jump| {{"),
            close: "});".to_string(),
        })
    }
}

/// `@repeat(n) { ... }` unrolls the body `n` times
pub struct RepeatHandler;

impl ActionHandler for RepeatHandler {
    fn wrap(&self, params: &str) -> Result<BlockWrap, String> {
        let count = params.trim();
        if count.is_empty() {
            return Err("expected a repeat count".to_string());
        }
        Ok(BlockWrap {
            open: format!("for weave_repeat in 0..({count}) {{"),
            close: "}".to_string(),
        })
    }
}

/// Name-keyed handlers; names are case-insensitive
pub struct ActionRegistry {
    handlers: HashMap<String, Box<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// A registry with the built-in `execute` and `repeat` handlers
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("execute", ExecuteHandler);
        registry.register("repeat", RepeatHandler);
        registry
    }

    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler, replacing any handler of the same name
    pub fn register(&mut self, name: &str, handler: impl ActionHandler + 'static) {
        self.handlers
            .insert(name.to_lowercase(), Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn ActionHandler> {
        self.handlers.get(&name.to_lowercase()).map(|h| h.as_ref())
    }

    /// Wrap an action body, failing on unknown names and rejected params
    pub fn wrap(&self, name: &str, params: &str, line: usize) -> Result<BlockWrap, CodegenError> {
        let handler = self.get(name).ok_or_else(|| CodegenError::UnknownHandler {
            name: name.to_string(),
            line,
        })?;
        handler
            .wrap(params)
            .map_err(|message| CodegenError::InvalidParams {
                name: name.to_string(),
                message,
                line,
            })
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_registered() {
        let registry = ActionRegistry::new();
        assert_eq!(registry.names(), vec!["execute", "repeat"]);
        let wrap = registry.wrap("Execute", "as @a", 1).expect("wrap");
        assert_eq!(wrap.open, "jump(`as @a`, |weave_jump| {");
        assert_eq!(wrap.close, "});");
    }

    #[test]
    fn unknown_names_are_errors() {
        let err = ActionRegistry::new().wrap("schedule", "", 4).unwrap_err();
        assert!(matches!(err, CodegenError::UnknownHandler { line: 4, .. }));
    }

    #[test]
    fn repeat_requires_a_count() {
        let err = ActionRegistry::new().wrap("repeat", " ", 2).unwrap_err();
        assert!(matches!(err, CodegenError::InvalidParams { .. }));
    }

    #[test]
    fn closures_are_handlers() {
        let mut registry = ActionRegistry::empty();
        registry.register("twice", |_: &str| {
            Ok(BlockWrap {
                open: "for weave_twice in 0..2 {".to_string(),
                close: "}".to_string(),
            })
        });
        assert!(registry.get("TWICE").is_some());
    }
}
