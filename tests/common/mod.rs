#![allow(dead_code)]

use std::path::{Path, PathBuf};

use weave::compiler::{Compiler, CompilerConfig, OutputTree, SourceUnit};

/// Root of the sample datapack under demos/
pub fn demo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("data")
}

/// A unit in the `demo` namespace
pub fn unit(path: &str, text: &str) -> SourceUnit {
    SourceUnit::new("demo", path, text)
}

/// Compiler with a fixed id seed
pub fn seeded_compiler(seed: u64) -> Compiler {
    Compiler::new(CompilerConfig {
        seed: Some(seed),
        ..CompilerConfig::default()
    })
}

/// Assert that compiling the units succeeds
pub fn assert_compiles(units: &[SourceUnit]) -> OutputTree {
    match seeded_compiler(1).compile(units) {
        Ok(tree) => tree,
        Err(errors) => panic!("Expected units to compile, got {:#?}", errors),
    }
}

/// Commands of a function, panicking if it is missing
pub fn commands<'a>(tree: &'a OutputTree, id: &str) -> Vec<&'a str> {
    tree.find(id)
        .unwrap_or_else(|| panic!("Expected function with id: {}", id))
        .commands
        .iter()
        .map(String::as_str)
        .collect()
}
