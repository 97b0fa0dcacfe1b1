//! End-to-end integration tests for the weave compiler
//!
//! These tests verify the full pipeline from source text to function files.

mod common;

use common::*;
use weave::compiler::CompileError;

#[test]
fn e2e_command_lines_round_trip() {
    let text = "say one\nexecute as @a run say two\nfunction demo:other\nreturn 1\n";
    let tree = assert_compiles(&[unit("main", text)]);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.snippets[0].content(), text);
}

#[test]
fn e2e_comments_are_dropped() {
    let tree = assert_compiles(&[unit("main", "# a comment\n// another\nsay kept\n")]);
    assert_eq!(commands(&tree, "demo:main"), vec!["say kept"]);
}

#[test]
fn e2e_siblings_follow_jumps_in_the_parent() {
    let text = "say before\nif (\"entity @s[tag=a]\") {\n    say inside\n}\nsay after\n";
    let tree = assert_compiles(&[unit("main", text)]);
    let main = commands(&tree, "demo:main");
    assert_eq!(main.len(), 3);
    assert_eq!(main[0], "say before");
    assert_eq!(main[2], "say after");
    let child = tree.children(&tree.snippets[0].id);
    assert_eq!(child.len(), 1);
    assert_eq!(child[0].commands, vec!["say inside"]);
}

#[test]
fn e2e_negated_group_marks_a_reference_flag() {
    let text = "if (\"A\" && !(\"B\" && \"C\")) {\n    say yes\n}\n";
    let tree = assert_compiles(&[unit("main", text)]);
    let main = commands(&tree, "demo:main");
    assert_eq!(main.len(), 3);
    assert!(main[0].starts_with("scoreboard players set #"));
    assert!(main[1].starts_with("execute if B if C run scoreboard players set #"));
    assert!(main[2].starts_with("execute if A unless score #"));
    assert!(tree.find("weave:init").is_some());
}

#[test]
fn e2e_interpolated_native_atoms() {
    let text = "let tag = \"boss\";\nif (\"entity @s[tag=${tag}]\") {\n    say boss\n}\n";
    let tree = assert_compiles(&[unit("main", text)]);
    let main = commands(&tree, "demo:main");
    assert!(main[0].starts_with("execute if entity @s[tag=boss] run function "));
}

#[test]
fn e2e_semantic_errors_are_accumulated() {
    let text = "let x = missing;\nif () {\n    say a\n}\nfor () {\n    say b\n}\n";
    let errors = seeded_compiler(1).compile(&[unit("main", text)]).unwrap_err();
    let [CompileError::Semantic { errors, .. }] = errors.as_slice() else {
        panic!("expected one semantic failure, got {:#?}", errors);
    };
    assert_eq!(errors.len(), 3);
}

#[test]
fn e2e_infinite_host_loop_times_out() {
    let errors = seeded_compiler(1)
        .compile(&[unit("main", "let n = 0;\nwhile (true) {\n    n += 1;\n}\nloop { }\n")])
        .unwrap_err();
    assert!(matches!(errors.as_slice(), [CompileError::Semantic { .. }]));
}
