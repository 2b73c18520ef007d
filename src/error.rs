//! Diagnostics (spec.md §4.4, §7 "Error format").
//!
//! Grounded on the teacher's `src/error.rs`: a flat error enum carrying a
//! source position plus a `display_with_source` renderer that underlines
//! the offending column, reusing `style.rs` for the caret/message color.

use std::fmt;

use crate::style::Style;
use crate::token::Position;

/// `{:?}` (via `#[derive(Debug)]`) is this enum's only rendering — the
/// user-facing diagnostic tag is the literal `[ERROR]` spec.md §4.4
/// fixes, not a kind-specific label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    Lex,
    Parse,
    Resolve,
    Check,
    Emit,
    Io,
}

#[derive(Debug, Clone)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub pos: Position,
    pub message: String,
}

impl CompileError {
    pub fn new(kind: CompileErrorKind, pos: Position, message: impl Into<String>) -> Self {
        Self { kind, pos, message: message.into() }
    }

    pub fn parse(pos: Position, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Parse, pos, message)
    }

    pub fn check(pos: Position, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Check, pos, message)
    }

    pub fn resolve(pos: Position, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Resolve, pos, message)
    }

    pub fn emit(pos: Position, message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Emit, pos, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CompileErrorKind::Io, Position::start(), message)
    }

    /// Render with the offending line quoted and a caret under the column,
    /// per spec.md §7's example diagnostic layout. Falls back to the plain
    /// one-liner when `pos.line` is out of range for `source`. Matches
    /// spec.md §4.4's literal `<file>:<line>:<col>: [ERROR] <message>`.
    pub fn display_with_source(&self, source: &str) -> String {
        let line_text = source.lines().nth(self.pos.line.saturating_sub(1));
        let header = format!("{}: {} {}", self.pos, Style::bold_red("[ERROR]"), self.message);
        match line_text {
            Some(text) => {
                let caret_col = self.pos.column.saturating_sub(1);
                let caret = format!("{}^", " ".repeat(caret_col));
                format!("{}\n  {}\n  {}", header, text, Style::cyan(&caret))
            }
            None => header,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: [ERROR] {}", self.pos, self.message)
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_and_message() {
        let e = CompileError::parse(Position::new(2, 5), "unexpected token");
        let s = e.to_string();
        assert!(s.contains("2:5"));
        assert!(s.contains("unexpected token"));
    }

    #[test]
    fn display_with_source_underlines_column() {
        let e = CompileError::check(Position::new(1, 5), "type mismatch");
        let rendered = e.display_with_source("let x: u8 = foo;");
        assert!(rendered.contains("let x: u8 = foo;"));
        assert!(rendered.contains('^'));
    }

    #[test]
    fn tag_matches_the_literal_error_format() {
        let e = CompileError::check(Position::new(2, 5), "type mismatch");
        assert_eq!(e.to_string(), "2:5: [ERROR] type mismatch");
        assert!(e.display_with_source("").contains("2:5: [ERROR] type mismatch"));
    }
}
