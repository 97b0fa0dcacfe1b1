//! Weave CLI - command line interface for the weave datapack compiler

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};

use weave_compiler::{CompileError, Compiler, ProjectConfig, SourceUnit};
use weave_datapack::{discover, DatapackWriter, SourceWatcher, FUNCTIONS_DIR, FUNCTION_EXTENSION};

#[derive(Parser)]
#[command(name = "weave")]
#[command(about = "Compiler for mcfunction files with embedded Rhai logic", long_about = None)]
struct Cli {
    /// Log pipeline details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a datapack data directory
    Build {
        /// Source data directory (`<dir>/<namespace>/functions/...`)
        dir: PathBuf,
        /// Output data directory
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Rebuild whenever a source file changes
        #[arg(short, long)]
        watch: bool,
        /// Fixed seed for generated ids
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Parse and check every source file without writing output
    Check {
        /// Source data directory
        dir: PathBuf,
    },
    /// Parse a file and output the AST as JSON
    Parse {
        /// Input file
        file: PathBuf,
        /// Pretty print the output
        #[arg(short, long)]
        pretty: bool,
    },
    /// Print the host program generated for a file
    Lower {
        /// Input file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Build {
            dir,
            output,
            watch,
            seed,
        } => cmd_build(&dir, output, watch, seed),
        Commands::Check { dir } => cmd_check(&dir),
        Commands::Parse { file, pretty } => cmd_parse(&file, pretty),
        Commands::Lower { file } => cmd_lower(&file),
    }
}

fn load_config(dir: &Path) -> ProjectConfig {
    match ProjectConfig::discover(dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn read_source(file: &Path) -> String {
    match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn cmd_build(dir: &Path, output: Option<PathBuf>, watch: bool, seed: Option<u64>) {
    let mut config = load_config(dir);
    if seed.is_some() {
        config.compiler.seed = seed;
    }
    let out = output.unwrap_or_else(|| config.output.path.clone());

    let ok = build_once(dir, &config, &out);
    if !watch {
        if !ok {
            std::process::exit(1);
        }
        return;
    }

    let watcher = match SourceWatcher::new(dir, vec![out.clone()]) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error watching {}: {}", dir.display(), e);
            std::process::exit(1);
        }
    };
    log::info!("watching {} for changes", watcher.root().display());
    loop {
        match watcher.wait() {
            Ok(changed) => {
                log::info!("{} path(s) changed, rebuilding", changed.len());
                build_once(dir, &config, &out);
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}

/// One full rebuild; failures are reported, never fatal
fn build_once(dir: &Path, config: &ProjectConfig, out: &Path) -> bool {
    let units = match discover(dir) {
        Ok(units) => units,
        Err(e) => {
            eprintln!("Error reading sources: {}", e);
            return false;
        }
    };

    let compiler = Compiler::new(config.compiler.clone()).with_script_root(dir);
    let tree = match compiler.compile(&units) {
        Ok(tree) => tree,
        Err(errors) => {
            report_errors(dir, &units, &errors);
            eprintln!("✗ build failed with {} error(s), nothing written", errors.len());
            return false;
        }
    };

    match DatapackWriter::new(out).write(&tree, Some(dir)) {
        Ok(summary) => {
            println!(
                "✓ {} source file(s) -> {} function(s) in {}",
                units.len(),
                summary.functions,
                out.display()
            );
            true
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", out.display(), e);
            false
        }
    }
}

fn cmd_check(dir: &Path) {
    let config = load_config(dir);
    let units = match discover(dir) {
        Ok(units) => units,
        Err(e) => {
            eprintln!("Error reading sources: {}", e);
            std::process::exit(1);
        }
    };

    match Compiler::new(config.compiler).check(&units) {
        Ok(()) => println!("✓ {} file(s) ok", units.len()),
        Err(errors) => {
            report_errors(dir, &units, &errors);
            eprintln!("✗ {} of {} file(s) have errors", errors.len(), units.len());
            std::process::exit(1);
        }
    }
}

fn cmd_parse(file: &Path, pretty: bool) {
    let source = read_source(file);
    match weave_parser::parse(&source) {
        Ok(parsed) => {
            let json = if pretty {
                serde_json::to_string_pretty(&parsed)
            } else {
                serde_json::to_string(&parsed)
            };
            match json {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            let span = e.span();
            report(&file.display().to_string(), &source, span.start..span.end, &e.to_string());
            std::process::exit(1);
        }
    }
}

fn cmd_lower(file: &Path) {
    let source = read_source(file);
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "main".to_string());
    let unit = SourceUnit::new("local", stem, source);
    let config = load_config(file.parent().unwrap_or_else(|| Path::new(".")));

    match Compiler::new(config.compiler).lower(&unit) {
        Ok(program) => print!("{}", program.code),
        Err(e) => {
            report_error(&file.display().to_string(), &unit.text, &e);
            std::process::exit(1);
        }
    }
}

// === Diagnostics ===

fn report_errors(dir: &Path, units: &[SourceUnit], errors: &[CompileError]) {
    for error in errors {
        let unit = error
            .file()
            .and_then(|name| units.iter().find(|u| u.name() == name));
        match unit {
            Some(unit) => {
                let path = dir
                    .join(&unit.namespace)
                    .join(FUNCTIONS_DIR)
                    .join(format!("{}.{}", unit.path, FUNCTION_EXTENSION));
                report_error(&path.display().to_string(), &unit.text, error);
            }
            None => eprintln!("Error: {}", error),
        }
    }
}

fn report_error(name: &str, source: &str, error: &CompileError) {
    match error {
        CompileError::Parse { source: e, .. } => {
            let span = e.span();
            report(name, source, span.start..span.end, &e.to_string());
        }
        CompileError::Semantic { errors, .. } => {
            for e in errors {
                let range = match e.span() {
                    Some(span) => span.start..span.end,
                    None => line_range(source, e.line()),
                };
                report(name, source, range, &e.to_string());
            }
        }
        CompileError::Codegen { source: e, .. } => {
            report(name, source, line_range(source, e.line()), &e.to_string());
        }
        CompileError::Runtime(e) => match e.line() {
            Some(line) => report(name, source, line_range(source, line), &e.to_string()),
            None => eprintln!("Error: {}", e),
        },
        other => eprintln!("Error: {}", other),
    }
}

/// Byte range of a 1-based line, without its newline
fn line_range(source: &str, line: usize) -> Range<usize> {
    let mut start = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let end = start + text.trim_end_matches(['\r', '\n']).len();
            return start..end;
        }
        start += text.len();
    }
    source.len()..source.len()
}

fn report(name: &str, source: &str, range: Range<usize>, message: &str) {
    let result = Report::build(ReportKind::Error, name.to_string(), range.start)
        .with_message(message)
        .with_label(
            Label::new((name.to_string(), range))
                .with_message(message)
                .with_color(Color::Red),
        )
        .finish()
        .eprint((name.to_string(), Source::from(source)));
    if let Err(e) = result {
        eprintln!("Error: {} ({})", message, e);
    }
}
