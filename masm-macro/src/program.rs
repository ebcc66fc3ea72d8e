//! Source programs as seen by the macro engine
//!
//! A program hands out, for any 1-based line number, both the raw source text
//! and the token list lexed from it. Macro definitions keep a shared handle to
//! the program that contains their body.

use crate::lexer::{tokenize_line, Token, TokenList};
use masm_common::MasmError;

/// Line-addressed access to a lexed source file
pub trait SourceProgram: Send + Sync {
    /// File name used in diagnostics
    fn name(&self) -> &str;

    fn line_count(&self) -> usize;

    /// Raw text of a 1-based line
    fn source_line(&self, line: usize) -> Option<&str>;

    /// Tokens of a 1-based line
    fn tokens(&self, line: usize) -> Option<&[Token]>;
}

/// A source file lexed line by line
#[derive(Debug, Clone)]
pub struct Program {
    name: String,
    lines: Vec<String>,
    tokens: Vec<TokenList>,
}

impl Program {
    pub fn from_source(name: &str, source: &str) -> Result<Self, MasmError> {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        let tokens = lines
            .iter()
            .enumerate()
            .map(|(i, line)| tokenize_line(name, line, i + 1))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Lexed {} lines of '{}'", lines.len(), name);

        Ok(Self {
            name: name.to_string(),
            lines,
            tokens,
        })
    }
}

impl SourceProgram for Program {
    fn name(&self) -> &str {
        &self.name
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn source_line(&self, line: usize) -> Option<&str> {
        let index = line.checked_sub(1)?;
        self.lines.get(index).map(String::as_str)
    }

    fn tokens(&self, line: usize) -> Option<&[Token]> {
        let index = line.checked_sub(1)?;
        self.tokens.get(index).map(Vec::as_slice)
    }
}
