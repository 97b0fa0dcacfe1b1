use weave_compiler::*;

fn compiler() -> Compiler {
    Compiler::new(CompilerConfig {
        seed: Some(11),
        ..CompilerConfig::default()
    })
}

fn unit(path: &str, text: &str) -> SourceUnit {
    SourceUnit::new("demo", path, text)
}

/// Replace generated ids so trees from different runs compare equal
fn masked(tree: &OutputTree) -> Vec<(String, Vec<String>)> {
    let mask = |text: &str| -> String {
        text.split(' ')
            .map(|word| {
                if word.starts_with('#') {
                    return "#*".to_string();
                }
                match word.split_once("/gen/") {
                    Some((head, _)) => format!("{head}/gen/*"),
                    None => word.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    };
    tree.snippets
        .iter()
        .map(|s| (mask(&s.id.to_string()), s.commands.iter().map(|c| mask(c)).collect()))
        .collect()
}

#[test]
fn command_only_file_round_trips() {
    let text = "say hello\nscoreboard players add @s x 1\ntellraw @a \"done\"\n";
    let tree = compiler().compile(&[unit("main", text)]).expect("compile");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.snippets[0].content(), text);
    assert!(tree.tags.is_empty());
}

#[test]
fn mixed_condition_emits_one_jump() {
    let text = "let a = 2;\nif (\"block ~ ~ ~ stone\" && a != 1) {\n    say 1\n}\n";
    let tree = compiler().compile(&[unit("main", text)]).expect("compile");
    assert_eq!(tree.len(), 2);
    let main = tree.find("demo:main").expect("main");
    assert_eq!(main.commands.len(), 1);
    assert!(main.commands[0].starts_with("execute if block ~ ~ ~ stone run function weave:demo/main/gen/"));
    assert_eq!(tree.snippets[1].commands, vec!["say 1"]);
}

#[test]
fn host_false_skips_the_jump() {
    let text = "let a = 1;\nif (\"block ~ ~ ~ stone\" && a != 1) {\n    say 1\n}\n";
    let tree = compiler().compile(&[unit("main", text)]).expect("compile");
    assert_eq!(tree.len(), 1);
    assert!(tree.snippets[0].commands.is_empty());
}

#[test]
fn disjunction_else_adds_the_flag_objective() {
    let text = "if (\"A\" || \"B\") {\n    say 1\n} else {\n    say 2\n}\n";
    let tree = compiler().compile(&[unit("main", text)]).expect("compile");
    let main = tree.find("demo:main").expect("main");
    let last = main.commands.last().expect("alternate jump");
    assert!(last.starts_with("execute unless score #"));

    let init = tree.find("weave:init").expect("init");
    assert_eq!(init.commands, vec!["scoreboard objectives add weave.logic dummy"]);
    assert_eq!(tree.tags[LOAD_TAG], vec!["weave:init"]);
}

#[test]
fn unknown_action_aborts_every_file() {
    let units = [
        unit("good", "say fine\n"),
        unit("bad", "@teleport(~ ~ ~) {\n    say b\n}\n"),
    ];
    let errors = compiler().compile(&units).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file(), Some("demo:bad"));
    assert!(matches!(
        &errors[0],
        CompileError::Codegen {
            source: weave_codegen::CodegenError::UnknownHandler { .. },
            ..
        }
    ));
}

#[test]
fn every_failing_file_is_reported() {
    let units = [
        unit("a", "if (\"A\" {\n    say 1\n}\n"),
        unit("b", "let x = y;\n"),
        unit("c", "say ok\n"),
    ];
    let errors = compiler().compile(&units).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0], CompileError::Parse { .. }));
    assert!(matches!(errors[1], CompileError::Semantic { .. }));
}

#[test]
fn recompiles_differ_only_in_ids() {
    let text = "if (\"A\" || \"B\") {\n    say 1\n} else {\n    if (\"C\") {\n        say 2\n    }\n}\n";
    let config = CompilerConfig::default();
    let first = Compiler::new(config.clone()).compile(&[unit("main", text)]).expect("first");
    let second = Compiler::new(config).compile(&[unit("main", text)]).expect("second");
    assert_ne!(first, second);
    assert_eq!(masked(&first), masked(&second));
}

#[test]
fn exports_flow_to_importers() {
    let units = [
        unit("main", ";;import;colors;colors\nsay ${colors::primary}\n"),
        unit("palette", ";;export;colors;primary\nlet primary = \"red\";\n"),
    ];
    let tree = compiler().compile(&units).expect("compile");
    assert_eq!(tree.find("demo:main").expect("main").commands, vec!["say red"]);
}

#[test]
fn import_cycles_are_rejected() {
    let units = [
        unit("a", ";;import;b;b\n;;export;a;x\nlet x = 1;\n"),
        unit("b", ";;import;a;a\n;;export;b;x\nlet x = 2;\n"),
    ];
    let errors = compiler().compile(&units).unwrap_err();
    assert!(matches!(errors.as_slice(), [CompileError::ImportCycle { .. }]));
}

#[test]
fn generated_namespace_is_reserved() {
    let errors = compiler()
        .compile(&[SourceUnit::new("weave", "main", "say hi\n")])
        .unwrap_err();
    assert!(matches!(errors[0], CompileError::ReservedNamespace { .. }));
}

#[test]
fn lower_shows_the_host_program() {
    let program = compiler().lower(&unit("main", "say ${1 + 1}\n")).expect("lower");
    assert_eq!(program.code, "emit(`say ${1 + 1}`);\n");
}

#[test]
fn deeply_nested_jumps_compile() {
    let depth = 16;
    let mut text = String::new();
    for level in 0..depth {
        text.push_str(&format!("if (\"entity @s[tag=t{level}]\") {{\n"));
    }
    text.push_str("say deep\n");
    for _ in 0..depth {
        text.push_str("}\n");
    }

    let tree = compiler().compile(&[unit("main", &text)]).expect("compile");
    assert_eq!(tree.len(), depth + 1);
    let deepest = tree.snippets.last().expect("deepest");
    assert_eq!(deepest.commands, vec!["say deep"]);
    assert_eq!(deepest.id.path.matches("/gen/").count(), depth);
}

#[test]
fn call_level_cap_applies_to_generation() {
    let compiler = Compiler::new(CompilerConfig {
        max_call_levels: 4,
        ..CompilerConfig::default()
    });
    let mut text = String::new();
    for level in 0..12 {
        text.push_str(&format!("if (\"entity @s[tag=t{level}]\") {{\n"));
    }
    text.push_str("say deep\n");
    text.push_str(&"}\n".repeat(12));

    let errors = compiler.compile(&[unit("main", &text)]).unwrap_err();
    assert!(matches!(errors[0], CompileError::Runtime(_)), "{errors:?}");
}
