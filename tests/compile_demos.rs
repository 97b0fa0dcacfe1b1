//! End-to-end tests over the sample datapack in demos/

mod common;

use std::fs;

use common::*;
use weave::compiler::{Compiler, ProjectConfig, LOAD_TAG};
use weave::datapack::{discover, DatapackWriter, TagFile};

#[test]
fn demo_sources_parse_and_check() {
    let units = discover(&demo_root()).expect("discover demos");
    assert!(!units.is_empty(), "No demo sources found! Check demos/data/.");

    let mut failures = Vec::new();
    for unit in &units {
        match weave::parser::parse(&unit.text) {
            Ok(_) => println!("✓ Parsed: {}", unit.name()),
            Err(err) => failures.push(format!("{}: {}", unit.name(), err)),
        }
    }
    assert!(failures.is_empty(), "Failed to parse:\n{}", failures.join("\n"));

    let config = ProjectConfig::discover(&demo_root()).expect("config");
    assert_eq!(config.compiler.probe.budget_ms, 50);
    Compiler::new(config.compiler)
        .check(&units)
        .unwrap_or_else(|errors| panic!("{:#?}", errors));
}

#[test]
fn demo_datapack_builds() {
    let root = demo_root();
    let out = tempfile::tempdir().expect("tempdir");
    let units = discover(&root).expect("discover demos");
    let tree = seeded_compiler(3)
        .with_script_root(&root)
        .compile(&units)
        .unwrap_or_else(|errors| panic!("{:#?}", errors));

    assert_eq!(commands(&tree, "demo:palette"), vec!["say palette ready"]);

    let main = commands(&tree, "demo:main");
    assert_eq!(
        &main[..4],
        &["say Loaded weave", "say round 0 of 6", "say round 1 of 6", "say round 2 of 6"]
    );
    assert_eq!(main.len(), 9);
    assert!(main[6].starts_with("execute if block ~ ~-1 ~ minecraft:stone run function weave:demo/main/gen/"));
    assert!(main[8].starts_with("execute as @a at @s run function weave:demo/main/gen/"));

    let climb = commands(&tree, "demo:effects/climb");
    assert!(climb[0].starts_with("function weave:demo/effects/climb/gen/"));
    assert_eq!(
        &climb[1..],
        &["say red", "say red", "say green", "say green", "say blue", "say blue"]
    );

    DatapackWriter::new(out.path())
        .write(&tree, Some(&root))
        .expect("write");
    assert!(out.path().join("demo/loot_tables/bonus.json").is_file());
    assert!(out.path().join("demo/functions/effects/climb.mcfunction").is_file());
    let load: TagFile = serde_json::from_str(
        &fs::read_to_string(out.path().join("minecraft/tags/functions/load.json")).expect("load tag"),
    )
    .expect("tag json");
    assert_eq!(
        load.values,
        vec![serde_json::json!("demo:palette"), serde_json::json!("weave:init")]
    );
    assert_eq!(tree.tags[LOAD_TAG], vec!["weave:init"]);
}
