//! Error handling for the macro engine
//!
//! Hard errors (contract violations, malformed definitions, I/O) are
//! `MasmError` values. Soft errors found while expanding a macro body are
//! `Diagnostic`s collected by an `ErrorReporter` so expansion can continue.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Hard errors raised by the macro engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MasmError {
    #[error("Lexical error at {location}: {message}")]
    LexError {
        location: SourceLocation,
        message: String,
    },

    #[error("Macro syntax error at {location}: {message}")]
    MacroSyntax {
        location: SourceLocation,
        message: String,
    },

    #[error("Line {line} is outside the body of macro '{macro_name}' (lines {from_line}..={to_line})")]
    LineOutOfRange {
        macro_name: String,
        line: usize,
        from_line: usize,
        to_line: usize,
    },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("IO error: {message}")]
    IoError { message: String },
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with location and severity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
    pub notes: Vec<String>,
}

impl Diagnostic {
    pub fn error(message: String, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Error,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn warning(message: String, location: SourceLocation) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            location,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)?;

        for note in &self.notes {
            write!(f, "\n  note: {}", note)?;
        }

        Ok(())
    }
}

/// Collects diagnostics reported during scanning and expansion
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an already built diagnostic
    pub fn report(&mut self, diagnostic: Diagnostic) -> &mut Diagnostic {
        match diagnostic.severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Note => {}
        }
        let index = self.diagnostics.len();
        self.diagnostics.push(diagnostic);
        &mut self.diagnostics[index]
    }

    /// Report an error diagnostic
    pub fn error(&mut self, message: String, location: SourceLocation) -> &mut Diagnostic {
        self.report(Diagnostic::error(message, location))
    }

    /// Report a warning diagnostic
    pub fn warning(&mut self, message: String, location: SourceLocation) -> &mut Diagnostic {
        self.report(Diagnostic::warning(message, location))
    }

    /// Check if any errors have been reported
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Print all diagnostics to stderr
    pub fn print_diagnostics(&self) {
        for diagnostic in &self.diagnostics {
            eprintln!("{}", diagnostic);
        }
    }

    /// Render the diagnostics as a JSON array
    pub fn to_json(&self) -> Result<String, MasmError> {
        Ok(serde_json::to_string_pretty(&self.diagnostics)?)
    }

    /// Create a summary string
    pub fn summary(&self) -> String {
        match (self.error_count, self.warning_count) {
            (0, 0) => "No errors or warnings".to_string(),
            (0, w) => format!("{} warning{}", w, if w == 1 { "" } else { "s" }),
            (e, 0) => format!("{} error{}", e, if e == 1 { "" } else { "s" }),
            (e, w) => format!(
                "{} error{} and {} warning{}",
                e,
                if e == 1 { "" } else { "s" },
                w,
                if w == 1 { "" } else { "s" }
            ),
        }
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for MasmError {
    fn from(err: std::io::Error) -> Self {
        MasmError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for MasmError {
    fn from(err: serde_json::Error) -> Self {
        MasmError::InvalidConfig {
            message: err.to_string(),
        }
    }
}
