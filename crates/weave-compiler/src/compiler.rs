//! The compile pipeline

use std::path::PathBuf;

use weave_ast::SourceFile;
use weave_checker::Checker;
use weave_codegen::{generate, ActionRegistry, HostProgram, IdAllocator};
use weave_runtime::{FunctionId, OutputTree, RunUnit, Runtime, RuntimeConfig, Snippet};

use crate::order::execution_order;
use crate::{CompileError, CompilerConfig};

/// Tag every function that runs on datapack load
pub const LOAD_TAG: &str = "minecraft:load";

/// One source function file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub namespace: String,
    /// `/`-separated path without extension
    pub path: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(namespace: impl Into<String>, path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> FunctionId {
        FunctionId::new(self.namespace.clone(), self.path.clone())
    }

    pub fn name(&self) -> String {
        self.id().to_string()
    }
}

/// A unit that passed the front end and code generation
struct Lowered<'a> {
    unit: &'a SourceUnit,
    name: String,
    file: SourceFile,
    program: HostProgram,
}

pub struct Compiler {
    config: CompilerConfig,
    registry: ActionRegistry,
    script_root: Option<PathBuf>,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            registry: ActionRegistry::new(),
            script_root: None,
        }
    }

    /// Resolve unbound imports against `.rhai` files under `root`
    pub fn with_script_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.script_root = Some(root.into());
        self
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    /// Parse and check one unit
    pub fn front_end(&self, unit: &SourceUnit) -> Result<SourceFile, CompileError> {
        let name = unit.name();
        if unit.namespace == self.config.namespace {
            return Err(CompileError::ReservedNamespace {
                file: name,
                namespace: unit.namespace.clone(),
            });
        }
        let file = weave_parser::parse(&unit.text).map_err(|source| CompileError::Parse {
            file: name.clone(),
            source,
        })?;
        Checker::new(&self.config.probe)
            .check_file(&file)
            .map_err(|errors| CompileError::Semantic { file: name, errors })?;
        Ok(file)
    }

    /// Check every unit, reporting all failures
    pub fn check(&self, units: &[SourceUnit]) -> Result<(), Vec<CompileError>> {
        let errors: Vec<CompileError> = units
            .iter()
            .filter_map(|unit| self.front_end(unit).err())
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// The host program generated for one unit
    pub fn lower(&self, unit: &SourceUnit) -> Result<HostProgram, CompileError> {
        let file = self.front_end(unit)?;
        let mut ids = self.allocator();
        self.generate(unit, &file, &mut ids)
    }

    /// Compile every unit into one output tree
    ///
    /// Fails as a whole: no tree is produced if any unit fails.
    pub fn compile(&self, units: &[SourceUnit]) -> Result<OutputTree, Vec<CompileError>> {
        let mut ids = self.allocator();
        let mut lowered = Vec::with_capacity(units.len());
        let mut errors = Vec::new();
        for unit in units {
            let result = self
                .front_end(unit)
                .and_then(|file| Ok((self.generate(unit, &file, &mut ids)?, file)));
            match result {
                Ok((program, file)) => lowered.push(Lowered {
                    unit,
                    name: unit.name(),
                    file,
                    program,
                }),
                Err(err) => errors.push(err),
            }
        }
        if !errors.is_empty() {
            log::debug!("{} of {} file(s) failed", errors.len(), units.len());
            return Err(errors);
        }

        let names: Vec<String> = lowered.iter().map(|l| l.name.clone()).collect();
        let headers: Vec<_> = lowered.iter().map(|l| &l.file.header).collect();
        let order = execution_order(&names, &headers).map_err(|err| vec![err])?;

        let runtime_config = RuntimeConfig {
            namespace: self.config.namespace.clone(),
            marker: self.config.marker.clone(),
            script_root: self.script_root.clone(),
            max_call_levels: self.config.max_call_levels,
        };
        let mut runtime = Runtime::new(runtime_config, ids);
        for index in order {
            let lowered = &lowered[index];
            log::debug!("running {}", lowered.name);
            let id = lowered.unit.id();
            runtime
                .run(RunUnit {
                    name: &lowered.name,
                    id: &id,
                    program: &lowered.program,
                    header: &lowered.file.header,
                })
                .map_err(|err| vec![err.into()])?;
        }

        let (mut tree, _) = runtime.finish().map_err(|err| vec![err.into()])?;
        if lowered.iter().any(|l| l.program.uses_flags) {
            let init = FunctionId::new(self.config.namespace.clone(), "init");
            let mut snippet = Snippet::new(init.clone());
            snippet
                .commands
                .push(format!("scoreboard objectives add {} dummy", self.config.objective));
            tree.snippets.push(snippet);
            tree.tag(LOAD_TAG, &init);
        }

        log::info!(
            "compiled {} file(s) into {} function(s)",
            units.len(),
            tree.len()
        );
        Ok(tree)
    }

    fn generate(&self, unit: &SourceUnit, file: &SourceFile, ids: &mut IdAllocator) -> Result<HostProgram, CompileError> {
        generate(file, &self.registry, ids, &self.config.objective).map_err(|source| CompileError::Codegen {
            file: unit.name(),
            source,
        })
    }

    fn allocator(&self) -> IdAllocator {
        match self.config.seed {
            Some(seed) => IdAllocator::seeded(seed, self.config.id_length),
            None => IdAllocator::new(self.config.id_length),
        }
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}
