//! Scope-aware semantic walk

use std::collections::HashSet;

use weave_ast::*;

use crate::probe::{declared_names, loop_variables, Probe, ProbeError};
use crate::{ProbeConfig, SemanticError};

pub struct Checker {
    probe: Probe,
    errors: Vec<SemanticError>,
    /// Nesting depth of structural blocks
    depth: usize,
    /// Host bindings declared at the top level
    top_level: HashSet<String>,
    budget_ms: u64,
}

impl Checker {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            probe: Probe::new(config),
            errors: Vec::new(),
            depth: 0,
            top_level: HashSet::new(),
            budget_ms: config.budget_ms,
        }
    }

    /// Check a whole file, accumulating every diagnostic
    pub fn check_file(mut self, file: &SourceFile) -> Result<(), Vec<SemanticError>> {
        for binding in &file.header.imports {
            self.probe.declare_module(&binding.name);
        }

        for stmt in &file.program.body {
            self.check_statement(stmt);
        }

        for binding in &file.header.exports {
            if !self.top_level.contains(&binding.name) {
                self.errors.push(SemanticError::UnboundExport {
                    name: binding.name.clone(),
                    line: binding.line,
                });
            }
        }

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn check_block(&mut self, block: &Block) {
        let mark = self.probe.mark();
        self.depth += 1;
        for stmt in &block.statements {
            self.check_statement(stmt);
        }
        self.depth -= 1;
        self.probe.rewind(mark);
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match &stmt.kind {
            StatementKind::Command(text) => {
                if text.contains("${") {
                    let code = format!("emit({});", template_literal(text));
                    self.probe_fragment(&code, stmt, false);
                }
            }
            StatementKind::HostCode(code) => {
                let defines_functions = self.probe_fragment(code, stmt, true);
                if defines_functions && self.depth > 0 {
                    self.errors.push(SemanticError::NestedFunction {
                        line: stmt.line,
                        span: stmt.span,
                    });
                }
                for name in declared_names(code) {
                    self.probe.declare(&name);
                    if self.depth == 0 {
                        self.top_level.insert(name);
                    }
                }
            }
            StatementKind::If {
                condition,
                consequent,
                alternate,
            } => {
                self.check_condition(condition, stmt, false);
                self.check_block(consequent);
                if let Some(alternate) = alternate {
                    self.check_block(alternate);
                }
            }
            StatementKind::While { condition, body } => {
                self.check_condition(condition, stmt, true);
                self.check_block(body);
            }
            StatementKind::For { params, body } => {
                if params.trim().is_empty() {
                    self.errors.push(SemanticError::EmptyForParams {
                        line: stmt.line,
                        span: stmt.span,
                    });
                    return;
                }
                self.probe_fragment(&format!("for {params} {{}}"), stmt, false);
                let mark = self.probe.mark();
                for name in loop_variables(params) {
                    self.probe.declare(&name);
                }
                self.check_block(body);
                self.probe.rewind(mark);
            }
            StatementKind::Action { body, .. } => self.check_block(body),
        }
    }

    fn check_condition(&mut self, condition: &Condition, stmt: &Statement, is_loop: bool) {
        let line = stmt.line;
        let span = condition.span;
        if condition.missing_operand {
            self.errors.push(SemanticError::DanglingOperator { line, span });
        } else if condition.is_empty() {
            self.errors.push(SemanticError::EmptyCondition { line, span });
            return;
        }

        if condition.has_native() {
            if let Err(err) = weave_logic::normalize_str(&condition.native) {
                self.errors.push(SemanticError::InvalidNativeCondition {
                    message: err.to_string(),
                    line,
                    span,
                });
            }
            if condition.native.contains("${") {
                let code = format!("emit({});", template_literal(&condition.native));
                self.probe_fragment(&code, stmt, false);
            }
        }

        if condition.has_host() {
            self.probe_fragment(&format!("if {} {{}}", condition.host), stmt, true);
        }

        if is_loop && condition.combinator == Some(Combinator::Or) {
            self.errors.push(SemanticError::MixedOrLoop { line, span });
        }
    }

    /// Probe a fragment and record its diagnostic; returns whether it defines functions
    fn probe_fragment(&mut self, code: &str, stmt: &Statement, run: bool) -> bool {
        match self.probe.check(code, run) {
            Ok(defines_functions) => defines_functions,
            Err(ProbeError::Syntax { message, line }) => {
                self.errors.push(SemanticError::InvalidHost {
                    message,
                    line: stmt.line + line.saturating_sub(1),
                    span: stmt.span,
                });
                false
            }
            Err(ProbeError::Timeout) => {
                self.errors.push(SemanticError::Timeout {
                    budget_ms: self.budget_ms,
                    line: stmt.line,
                    span: stmt.span,
                });
                false
            }
            Err(ProbeError::Resource(message)) => {
                self.errors.push(SemanticError::ResourceLimit {
                    message,
                    line: stmt.line,
                    span: stmt.span,
                });
                false
            }
        }
    }
}
