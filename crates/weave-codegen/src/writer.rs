//! Host program text with a generated-line to source-line map

/// A generated host program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostProgram {
    pub code: String,
    /// Source line of every generated line, indexed by generated line - 1
    pub line_map: Vec<usize>,
    /// Whether the program reads or writes reference flags
    pub uses_flags: bool,
}

impl HostProgram {
    /// Source line a 1-based generated line came from
    pub fn source_line(&self, generated: usize) -> Option<usize> {
        generated.checked_sub(1).and_then(|i| self.line_map.get(i)).copied()
    }
}

#[derive(Debug, Default)]
pub struct HostWriter {
    code: String,
    line_map: Vec<usize>,
    indent: usize,
}

impl HostWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one indented line
    pub fn line(&mut self, text: &str, source_line: usize) {
        for _ in 0..self.indent {
            self.code.push_str("    ");
        }
        self.code.push_str(text);
        self.code.push('\n');
        self.line_map.push(source_line);
    }

    /// Write a fragment as-is; its lines map to consecutive source lines
    pub fn verbatim(&mut self, text: &str, source_line: usize) {
        for (offset, line) in text.lines().enumerate() {
            self.code.push_str(line);
            self.code.push('\n');
            self.line_map.push(source_line + offset);
        }
    }

    /// Write a line that opens a block
    pub fn open(&mut self, text: &str, source_line: usize) {
        self.line(text, source_line);
        self.indent += 1;
    }

    /// Write a line that closes a block
    pub fn close(&mut self, text: &str, source_line: usize) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text, source_line);
    }

    /// Close a block and open the next one (`} else {`)
    pub fn reopen(&mut self, text: &str, source_line: usize) {
        self.close(text, source_line);
        self.indent += 1;
    }

    pub fn finish(self, uses_flags: bool) -> HostProgram {
        HostProgram {
            code: self.code,
            line_map: self.line_map,
            uses_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lines_and_indentation() {
        let mut writer = HostWriter::new();
        writer.open("if x {", 3);
        writer.verbatim("let a = 1;\nlet b = 2;", 4);
        writer.reopen("} else {", 3);
        writer.line("emit(`say`);", 7);
        writer.close("}", 3);
        let program = writer.finish(false);
        assert_eq!(
            program.code,
            "if x {\nlet a = 1;\nlet b = 2;\n} else {\n    emit(`say`);\n}\n"
        );
        assert_eq!(program.line_map, vec![3, 4, 5, 3, 7, 3]);
        assert_eq!(program.source_line(5), Some(7));
        assert_eq!(program.source_line(0), None);
    }
}
