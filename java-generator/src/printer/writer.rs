//! Indent-tracking writer for Java source text.
//!
//! Indentation is held in an `Rc<Cell<usize>>` so an [`IndentGuard`] can
//! live across mutable writes without borrow conflicts.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

pub struct CodeWriter<W> {
    writer: W,
    indent_level: Rc<Cell<usize>>,
    indent_width: usize,
    at_line_start: bool,
}

impl<W: fmt::Write> CodeWriter<W> {
    pub fn new(writer: W, indent_width: usize) -> Self {
        Self {
            writer,
            indent_level: Rc::new(Cell::new(0)),
            indent_width,
            at_line_start: true,
        }
    }

    /// Columns taken by the current indentation.
    pub fn indent_columns(&self) -> usize {
        self.indent_level.get() * self.indent_width
    }

    /// Write text without a newline. Adds indentation if at line start.
    pub fn write(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            return Ok(());
        }
        if self.at_line_start {
            let pad = self.indent_columns();
            write!(self.writer, "{:pad$}", "")?;
            self.at_line_start = false;
        }
        self.writer.write_str(text)
    }

    pub fn writeln(&mut self, text: &str) -> fmt::Result {
        self.write(text)?;
        self.writer.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    /// Write a line with `extra` columns of continuation indent on top of
    /// the current level.
    pub fn writeln_continued(&mut self, extra: usize, text: &str) -> fmt::Result {
        let pad = self.indent_columns() + extra;
        writeln!(self.writer, "{:pad$}{text}", "")?;
        self.at_line_start = true;
        Ok(())
    }

    /// An empty line, never indented.
    pub fn blank_line(&mut self) -> fmt::Result {
        self.writer.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    /// Indentation increases while the guard is alive.
    pub fn indent(&mut self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// One `// text` line per line of `text`.
    pub fn line_comment(&mut self, text: &str) -> fmt::Result {
        for line in text.lines() {
            if line.is_empty() {
                self.writeln("//")?;
            } else {
                self.writeln(&format!("// {line}"))?;
            }
        }
        Ok(())
    }

    /// `/* ... */` block with ` * ` prefixed lines.
    pub fn block_comment(&mut self, lines: &[String]) -> fmt::Result {
        self.writeln("/*")?;
        for line in lines {
            if line.is_empty() {
                self.writeln(" *")?;
            } else {
                self.writeln(&format!(" * {line}"))?;
            }
        }
        self.writeln(" */")
    }

    /// `header {`, body, `}`.
    pub fn block<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.writeln(&format!("{header} {{"))?;
        {
            let _indent = self.indent();
            body(self)?;
        }
        self.writeln("}")
    }
}

/// Restores the previous indentation level when dropped.
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_level.get();
        self.indent_level.set(current.saturating_sub(1));
    }
}
