//! Lowering of structural statements to a host program

use weave_ast::*;
use weave_logic::{segments, SignedAtom};

use crate::writer::{HostProgram, HostWriter};
use crate::{ActionRegistry, CodegenError, IdAllocator};

/// Code appended to the consequent of a native branch
struct Tail {
    code: String,
    line: usize,
}

pub struct Generator<'a> {
    registry: &'a ActionRegistry,
    ids: &'a mut IdAllocator,
    objective: &'a str,
    out: HostWriter,
    uses_flags: bool,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a ActionRegistry, ids: &'a mut IdAllocator, objective: &'a str) -> Self {
        Self {
            registry,
            ids,
            objective,
            out: HostWriter::new(),
            uses_flags: false,
        }
    }

    pub fn generate(mut self, file: &SourceFile) -> Result<HostProgram, CodegenError> {
        for binding in &file.header.imports {
            let target = binding.target.replace('\\', "\\\\").replace('"', "\\\"");
            self.out
                .line(&format!("import \"{target}\" as {};", binding.name), binding.line);
        }
        for stmt in &file.program.body {
            self.statement(stmt)?;
        }
        Ok(self.out.finish(self.uses_flags))
    }

    fn block(&mut self, block: &Block) -> Result<(), CodegenError> {
        for stmt in &block.statements {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Statement) -> Result<(), CodegenError> {
        let line = stmt.line;
        match &stmt.kind {
            StatementKind::Command(text) => {
                self.out.line(&emit(text), line);
            }
            StatementKind::HostCode(code) => self.out.verbatim(code, line),
            StatementKind::If {
                condition,
                consequent,
                alternate,
            } => self.lower_if(condition, consequent, alternate.as_ref(), line)?,
            StatementKind::While { condition, body } => self.lower_while(condition, body, line)?,
            StatementKind::For { params, body } => {
                self.out.open(&format!("for {} {{", params.trim()), line);
                self.block(body)?;
                self.out.close("}", line);
            }
            StatementKind::Action { name, params, body } => {
                let wrap = self.registry.wrap(name, params, line)?;
                self.out.open(&wrap.open, line);
                self.block(body)?;
                self.out.close(&wrap.close, line);
            }
        }
        Ok(())
    }

    fn lower_if(
        &mut self,
        condition: &Condition,
        consequent: &Block,
        alternate: Option<&Block>,
        line: usize,
    ) -> Result<(), CodegenError> {
        match (condition.has_native(), condition.has_host()) {
            (false, false) => Err(CodegenError::EmptyCondition { line }),
            (false, true) => {
                self.out.open(&format!("if ({}) {{", condition.host.trim()), line);
                self.block(consequent)?;
                if let Some(alternate) = alternate {
                    self.out.reopen("} else {", line);
                    self.block(alternate)?;
                }
                self.out.close("}", line);
                Ok(())
            }
            (true, false) => self.native_if(&condition.native, consequent, alternate, None, line),
            (true, true) => {
                self.out.open(&format!("if ({}) {{", condition.host.trim()), line);
                match condition.combinator.unwrap_or(Combinator::And) {
                    Combinator::And => {
                        self.native_if(&condition.native, consequent, alternate, None, line)?;
                        if let Some(alternate) = alternate {
                            self.out.reopen("} else {", line);
                            self.block(alternate)?;
                        }
                    }
                    Combinator::Or => {
                        self.block(consequent)?;
                        self.out.reopen("} else {", line);
                        self.native_if(&condition.native, consequent, alternate, None, line)?;
                    }
                }
                self.out.close("}", line);
                Ok(())
            }
        }
    }

    fn lower_while(&mut self, condition: &Condition, body: &Block, line: usize) -> Result<(), CodegenError> {
        if !condition.has_native() {
            if !condition.has_host() {
                return Err(CodegenError::EmptyCondition { line });
            }
            self.out.open(&format!("while ({}) {{", condition.host.trim()), line);
            self.block(body)?;
            self.out.close("}", line);
            return Ok(());
        }

        let guarded = condition.has_host();
        if guarded {
            if condition.combinator == Some(Combinator::Or) {
                return Err(CodegenError::MixedOrLoop { line });
            }
            self.out.open(&format!("if ({}) {{", condition.host.trim()), line);
        }

        let handle = format!("weave_loop_{}", self.ids.next_id());
        self.out.open(&format!("jump(\"\", |{handle}| {{"), line);
        let tail = Tail {
            code: emit(&format!("function ${{{handle}}}")),
            line,
        };
        self.native_if(&condition.native, body, None, Some(tail), line)?;
        self.out.close("});", line);

        if guarded {
            self.out.close("}", line);
        }
        Ok(())
    }

    /// Lower a native condition into flag marks and guarded jumps
    fn native_if(
        &mut self,
        native: &str,
        consequent: &Block,
        alternate: Option<&Block>,
        tail: Option<Tail>,
        line: usize,
    ) -> Result<(), CodegenError> {
        let expr = weave_logic::normalize_str(native).map_err(|err| CodegenError::InvalidCondition {
            message: err.to_string(),
            line,
        })?;
        let segments = segments(&expr);
        log::trace!("line {line}: `{native}` normalized to {expr} in {} segment(s)", segments.len());

        let first_marked = if alternate.is_some() { 0 } else { 1 };
        let flags: Vec<Option<String>> = (0..segments.len())
            .map(|i| (i >= first_marked).then(|| self.ids.next_id()))
            .collect();

        for index in (first_marked..segments.len()).rev() {
            let flag = self.flag(&flags, index, line)?.to_string();
            self.uses_flags = true;
            let clauses = self.clauses(&segments[index].atoms, &flags, line)?;
            self.out.line(&emit(&format!("scoreboard players set #{flag} {} 0", self.objective)), line);
            let set = format!("scoreboard players set #{flag} {} 1", self.objective);
            let command = if clauses.is_empty() {
                set
            } else {
                format!("execute {clauses} run {set}")
            };
            self.out.line(&emit(&command), line);
        }

        let clauses = self.clauses(&segments[0].atoms, &flags, line)?;
        self.out
            .open(&format!("jump({}, |weave_jump| {{", predicate(&clauses)), line);
        self.block(consequent)?;
        if let Some(tail) = tail {
            self.out.line(&tail.code, tail.line);
        }
        self.out.close("});", line);

        if let Some(alternate) = alternate {
            let check = self.flag_check(&flags, 0, false, line)?;
            self.out
                .open(&format!("jump({}, |weave_jump| {{", predicate(&check)), line);
            self.block(alternate)?;
            self.out.close("});", line);
        }
        Ok(())
    }

    fn flag<'f>(&self, flags: &'f [Option<String>], index: usize, line: usize) -> Result<&'f str, CodegenError> {
        flags
            .get(index)
            .and_then(|flag| flag.as_deref())
            .ok_or_else(|| CodegenError::InvalidCondition {
                message: format!("segment {index} has no reference flag"),
                line,
            })
    }

    fn flag_check(
        &mut self,
        flags: &[Option<String>],
        index: usize,
        positive: bool,
        line: usize,
    ) -> Result<String, CodegenError> {
        let flag = self.flag(flags, index, line)?;
        self.uses_flags = true;
        Ok(format!(
            "{} score #{flag} {} matches 1",
            keyword(positive),
            self.objective
        ))
    }

    /// `if <atom>` / `unless score #flag obj matches 1` clauses of a segment
    fn clauses(&mut self, atoms: &[SignedAtom], flags: &[Option<String>], line: usize) -> Result<String, CodegenError> {
        let mut clauses = Vec::with_capacity(atoms.len());
        for atom in atoms {
            clauses.push(match atom {
                SignedAtom::Atom { text, positive } => format!("{} {text}", keyword(*positive)),
                SignedAtom::Ref { segment, positive } => {
                    self.flag_check(flags, *segment, *positive, line)?
                }
            });
        }
        Ok(clauses.join(" "))
    }
}

fn keyword(positive: bool) -> &'static str {
    if positive {
        "if"
    } else {
        "unless"
    }
}

fn emit(command: &str) -> String {
    format!("emit({});", template_literal(command))
}

fn predicate(clauses: &str) -> String {
    if clauses.is_empty() {
        "\"\"".to_string()
    } else {
        template_literal(clauses)
    }
}
