//! Execution of generated host programs

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::rc::Rc;

use rhai::module_resolvers::{FileModuleResolver, ModuleResolversCollection, StaticModuleResolver};
use rhai::{Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Module, NativeCallContext, Scope};
use weave_ast::Header;
use weave_codegen::{HostProgram, IdAllocator};

use crate::{FunctionId, OutputTree, RuntimeError, Snippet};

/// Where generated functions go and where script modules are found
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Namespace of every function created by `jump`
    pub namespace: String,
    /// Path segment separating a parent from its generated children
    pub marker: String,
    /// Directory searched for `.rhai` modules named by imports
    pub script_root: Option<PathBuf>,
    /// Call depth cap; every nested jump takes one level
    pub max_call_levels: usize,
}

/// Default cap on nested function and continuation calls
pub const DEFAULT_MAX_CALL_LEVELS: usize = 1024;

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            namespace: "weave".to_string(),
            marker: "gen".to_string(),
            script_root: None,
            max_call_levels: DEFAULT_MAX_CALL_LEVELS,
        }
    }
}

/// A generated program and the function it writes to
#[derive(Debug, Clone, Copy)]
pub struct RunUnit<'a> {
    /// Display name used in diagnostics
    pub name: &'a str,
    pub id: &'a FunctionId,
    pub program: &'a HostProgram,
    pub header: &'a Header,
}

/// Snippets under construction and the stack of active ones
struct State {
    snippets: Vec<Snippet>,
    active: Vec<usize>,
    ids: IdAllocator,
    namespace: String,
    marker: String,
}

impl State {
    fn active(&self) -> Result<usize, String> {
        self.active
            .last()
            .copied()
            .ok_or_else(|| "no active function".to_string())
    }

    fn emit(&mut self, command: &str) -> Result<(), String> {
        let index = self.active()?;
        let commands = &mut self.snippets[index].commands;
        commands.extend(
            command
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
        Ok(())
    }

    /// Create a child of the active snippet, invoke it and make it active
    fn open_child(&mut self, predicate: &str) -> Result<FunctionId, String> {
        let parent = self.active()?;
        let parent_id = &self.snippets[parent].id;
        let base = if parent_id.namespace == self.namespace {
            parent_id.path.clone()
        } else {
            format!("{}/{}", parent_id.namespace, parent_id.path)
        };
        let id = FunctionId::new(
            self.namespace.clone(),
            format!("{base}/{}/{}", self.marker, self.ids.next_id()),
        );

        let predicate = predicate.trim();
        let call = if predicate.is_empty() {
            format!("function {id}")
        } else {
            format!("execute {predicate} run function {id}")
        };
        self.snippets[parent].commands.push(call);
        self.snippets.push(Snippet::new(id.clone()));
        self.active.push(self.snippets.len() - 1);
        Ok(id)
    }
}

/// Runs generated programs with the `emit` and `jump` capabilities
pub struct Runtime {
    engine: Engine,
    state: Rc<RefCell<State>>,
    exports: BTreeMap<String, Module>,
    script_root: Option<PathBuf>,
}

impl Runtime {
    pub fn new(config: RuntimeConfig, ids: IdAllocator) -> Self {
        let state = Rc::new(RefCell::new(State {
            snippets: Vec::new(),
            active: Vec::new(),
            ids,
            namespace: config.namespace,
            marker: config.marker,
        }));

        let mut engine = Engine::new();
        engine.set_max_expr_depths(0, 0);
        engine.set_max_call_levels(config.max_call_levels);
        engine.on_print(|text| log::info!("{text}"));
        engine.on_debug(|text, source, pos| match source {
            Some(source) => log::debug!("{source} {pos}: {text}"),
            None => log::debug!("{pos}: {text}"),
        });

        let emitter = Rc::clone(&state);
        engine.register_fn(
            "emit",
            move |command: ImmutableString| -> Result<(), Box<EvalAltResult>> {
                emitter.borrow_mut().emit(&command)?;
                Ok(())
            },
        );

        let jumper = Rc::clone(&state);
        engine.register_fn(
            "jump",
            move |ctx: NativeCallContext,
                  predicate: ImmutableString,
                  continuation: FnPtr|
                  -> Result<(), Box<EvalAltResult>> {
                let id = jumper.borrow_mut().open_child(&predicate)?;
                log::trace!("jump into {id}");
                let result = continuation.call_within_context::<Dynamic>(&ctx, (id.to_string(),));
                jumper.borrow_mut().active.pop();
                result.map(|_| ())
            },
        );

        Self {
            engine,
            state,
            exports: BTreeMap::new(),
            script_root: config.script_root,
        }
    }

    /// Execute one program, appending its output to the tree
    pub fn run(&mut self, unit: RunUnit<'_>) -> Result<(), RuntimeError> {
        self.engine.set_module_resolver(self.resolver());
        let ast = self
            .engine
            .compile(&unit.program.code)
            .map_err(|err| RuntimeError::Compile {
                file: unit.name.to_string(),
                message: err.err_type().to_string(),
                line: err
                    .position()
                    .line()
                    .and_then(|line| unit.program.source_line(line)),
            })?;

        {
            let mut state = self.state.borrow_mut();
            state.snippets.push(Snippet::new(unit.id.clone()));
            let index = state.snippets.len() - 1;
            state.active = vec![index];
        }

        let mut scope = Scope::new();
        let result = self.engine.run_ast_with_scope(&mut scope, &ast);
        self.state.borrow_mut().active.clear();
        result.map_err(|err| script_error(unit, err))?;

        for binding in &unit.header.exports {
            let value = scope
                .get_value::<Dynamic>(&binding.name)
                .ok_or_else(|| RuntimeError::MissingExport {
                    file: unit.name.to_string(),
                    name: binding.name.clone(),
                    line: binding.line,
                })?;
            log::debug!("{} exports {} to '{}'", unit.name, binding.name, binding.target);
            self.exports
                .entry(binding.target.clone())
                .or_default()
                .set_var(binding.name.as_str(), value);
        }
        Ok(())
    }

    /// Whether some program has exported into `target`
    pub fn has_module(&self, target: &str) -> bool {
        self.exports.contains_key(target)
    }

    /// The finished output tree and the allocator, for further ids
    pub fn finish(self) -> Result<(OutputTree, IdAllocator), RuntimeError> {
        drop(self.engine);
        let state = Rc::try_unwrap(self.state)
            .map_err(|_| RuntimeError::Internal("runtime state is still shared".to_string()))?
            .into_inner();
        let tree = OutputTree {
            snippets: state.snippets,
            ..OutputTree::default()
        };
        Ok((tree, state.ids))
    }

    fn resolver(&self) -> ModuleResolversCollection {
        let mut modules = StaticModuleResolver::new();
        for (target, module) in &self.exports {
            modules.insert(target.as_str(), module.clone());
        }
        let mut resolvers = ModuleResolversCollection::new();
        resolvers.push(modules);
        if let Some(root) = &self.script_root {
            resolvers.push(FileModuleResolver::new_with_path(root));
        }
        resolvers
    }
}

fn innermost(err: EvalAltResult) -> EvalAltResult {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => innermost(*inner),
        other => other,
    }
}

fn script_error(unit: RunUnit<'_>, err: Box<EvalAltResult>) -> RuntimeError {
    let mut inner = innermost(*err);
    let line = inner
        .position()
        .line()
        .and_then(|line| unit.program.source_line(line));
    inner.clear_position();
    RuntimeError::Script {
        file: unit.name.to_string(),
        message: inner.to_string(),
        line,
    }
}
