//! Sandboxed, time-bounded validation of host fragments

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use rhai::module_resolvers::DummyModuleResolver;
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Module, Scope};

use crate::ProbeConfig;

/// Why a fragment was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The fragment does not compile; `line` is 1-based within the fragment
    Syntax { message: String, line: usize },
    /// The wall-clock budget or operation cap ran out
    Timeout,
    /// Stack depth or data size limits were exceeded
    Resource(String),
}

/// A host engine with no-op capabilities and a persistent scope
pub struct Probe {
    engine: Engine,
    scope: Scope<'static>,
    deadline: Rc<Cell<Instant>>,
    budget: Duration,
}

impl Probe {
    pub fn new(config: &ProbeConfig) -> Self {
        let mut engine = Engine::new();
        engine.set_strict_variables(true);
        engine.set_max_operations(config.max_operations);
        engine.set_max_call_levels(config.max_call_levels);
        engine.set_max_string_size(config.max_string_size);
        engine.set_max_array_size(config.max_array_size);
        engine.set_max_map_size(config.max_array_size);
        engine.set_module_resolver(DummyModuleResolver::new());
        engine.on_print(|_| {});
        engine.on_debug(|_, _, _| {});

        let deadline = Rc::new(Cell::new(Instant::now()));
        let watched = Rc::clone(&deadline);
        engine.on_progress(move |_| (Instant::now() >= watched.get()).then_some(Dynamic::UNIT));

        engine.register_fn("emit", |_: ImmutableString| {});
        engine.register_fn("jump", |_: ImmutableString, _: FnPtr| {});

        Self {
            engine,
            scope: Scope::new(),
            deadline,
            budget: Duration::from_millis(config.budget_ms),
        }
    }

    /// Make `alias::name` paths resolvable at compile time
    pub fn declare_module(&mut self, alias: &str) {
        self.engine.register_static_module(alias, Module::new().into());
    }

    /// Bring a variable into scope with a placeholder value
    pub fn declare(&mut self, name: &str) {
        if !self.scope.contains(name) {
            self.scope.push_dynamic(name.to_string(), Dynamic::UNIT);
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.scope.contains(name)
    }

    pub fn mark(&self) -> usize {
        self.scope.len()
    }

    pub fn rewind(&mut self, mark: usize) {
        self.scope.rewind(mark);
    }

    /// Compile `code` against the current scope and, if `run`, execute it
    ///
    /// Returns whether the fragment defines functions. Runtime failures
    /// caused by placeholder values are not errors.
    pub fn check(&mut self, code: &str, run: bool) -> Result<bool, ProbeError> {
        let ast = self
            .engine
            .compile_with_scope(&self.scope, code)
            .map_err(|err| ProbeError::Syntax {
                message: err.err_type().to_string(),
                line: err.position().line().unwrap_or(1),
            })?;
        let defines_functions = ast.iter_functions().next().is_some();
        if !run {
            return Ok(defines_functions);
        }

        self.deadline.set(Instant::now() + self.budget);
        match self.engine.run_ast_with_scope(&mut self.scope, &ast) {
            Ok(()) => Ok(defines_functions),
            Err(err) => match *err {
                EvalAltResult::ErrorTerminated(..) | EvalAltResult::ErrorTooManyOperations(..) => {
                    Err(ProbeError::Timeout)
                }
                EvalAltResult::ErrorStackOverflow(..) | EvalAltResult::ErrorDataTooLarge(..) => {
                    Err(ProbeError::Resource(err.to_string()))
                }
                other => {
                    log::trace!("ignoring probe runtime error: {other}");
                    Ok(defines_functions)
                }
            },
        }
    }
}

/// Names introduced by `let` / `const` in a fragment
pub fn declared_names(code: &str) -> Vec<String> {
    let words: Vec<&str> = code
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();
    words
        .windows(2)
        .filter(|pair| pair[0] == "let" || pair[0] == "const")
        .map(|pair| pair[1].to_string())
        .collect()
}

/// Loop variables bound by `for` params: `i in ..` or `(x, i) in ..`
pub fn loop_variables(params: &str) -> Vec<String> {
    let Some((bindings, _)) = params.split_once(" in ") else {
        return Vec::new();
    };
    bindings
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
