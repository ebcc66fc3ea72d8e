//! Line substitution: the macro expansion core
//!
//! Each body line is rewritten token by token, right to left. Parameter
//! references become the bound call arguments and labels declared in the
//! body get `<suffix><invocation id>` appended so every expansion defines
//! its own labels.
//!
//! Substitutes are spliced into the line text. With
//! [`SpliceStrategy::TrackOffsets`] a substitute lands at its token's byte
//! offset; because tokens are handled from the highest offset down, a
//! splice never moves a token that is still waiting. With
//! [`SpliceStrategy::FirstOccurrence`] the first textual match of the token
//! is replaced instead, which goes wrong when the same text occurs earlier
//! on the line (for example `%a` inside a string before the real `%a`).

use crate::classify::{is_macro_local_label, is_macro_parameter};
use crate::lexer::Token;
use crate::macro_def::MacroDefinition;
use crate::options::{ExpansionOptions, SpliceStrategy};
use crate::registers::{MipsRegisters, RegisterLookup};
use log::{debug, trace};
use masm_common::{Diagnostic, ErrorReporter, MasmError, SourceLocation};
use std::sync::Arc;

/// Arguments bound at a call site. Slot 0 holds the macro name; the
/// argument for parameter `i` sits in slot `i + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArguments {
    slots: Vec<String>,
}

impl CallArguments {
    pub fn new(macro_name: &str, arguments: Vec<String>) -> Self {
        let mut slots = Vec::with_capacity(arguments.len() + 1);
        slots.push(macro_name.to_string());
        slots.extend(arguments);
        Self { slots }
    }

    /// Build from a slot list whose first entry is the macro name
    pub fn from_slots(slots: Vec<String>) -> Self {
        Self { slots }
    }

    pub fn macro_name(&self) -> &str {
        self.slots.first().map(String::as_str).unwrap_or("")
    }

    pub fn arity(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    /// Argument bound to the parameter at `index` (0-based)
    pub fn parameter(&self, index: usize) -> Option<&str> {
        self.slots.get(index + 1).map(String::as_str)
    }

    pub fn arguments(&self) -> &[String] {
        self.slots.get(1..).unwrap_or(&[])
    }
}

pub struct MacroExpander {
    options: ExpansionOptions,
    registers: Arc<dyn RegisterLookup>,
}

impl MacroExpander {
    /// Create an expander using the MIPS register files
    pub fn new(options: ExpansionOptions) -> Self {
        Self::with_registers(options, Arc::new(MipsRegisters))
    }

    pub fn with_registers(options: ExpansionOptions, registers: Arc<dyn RegisterLookup>) -> Self {
        Self { options, registers }
    }

    pub fn options(&self) -> &ExpansionOptions {
        &self.options
    }

    /// Parameter classification with this expander's settings
    pub fn is_parameter(&self, text: &str) -> bool {
        is_macro_parameter(text, self.options.accept_spim_parameters, self.registers.as_ref())
    }

    /// Substitute one line of a macro definition.
    ///
    /// `line` must lie within the definition's range. Unknown parameters and
    /// missing arguments are reported to `reporter` and leave the token as
    /// written; they never fail the call.
    pub fn substitute_line(
        &self,
        def: &MacroDefinition,
        line: usize,
        args: &CallArguments,
        invocation: u64,
        reporter: &mut ErrorReporter,
    ) -> Result<String, MasmError> {
        let range = def.range();
        let program = def.program();
        let out_of_range = || MasmError::LineOutOfRange {
            macro_name: def.name().to_string(),
            line,
            from_line: range.from_line,
            to_line: range.to_line,
        };

        if !range.contains(line) {
            return Err(out_of_range());
        }
        let (Some(source), Some(tokens)) = (program.source_line(line), program.tokens(line)) else {
            return Err(out_of_range());
        };

        let mut ordered: Vec<&Token> = tokens.iter().collect();
        ordered.sort_by(|a, b| b.offset.cmp(&a.offset));

        let mut text = source.to_string();
        for token in ordered {
            let substitute = if self.is_parameter(&token.text) {
                match def.parameter_index(&token.text) {
                    Some(index) => match args.parameter(index) {
                        Some(argument) => argument.to_string(),
                        None => {
                            let message =
                                format!("Missing argument for macro parameter '{}'", token.text);
                            let note = format!(
                                "macro '{}' was called with {} argument(s)",
                                def.name(),
                                args.arity()
                            );
                            reporter.report(
                                Diagnostic::error(message, self.location(def, token))
                                    .with_note(note),
                            );
                            token.text.clone()
                        }
                    },
                    None => {
                        let note = format!(
                            "'{}' is not a parameter of macro '{}'",
                            token.text,
                            def.name()
                        );
                        reporter.report(
                            Diagnostic::error(
                                "Unknown macro parameter".to_string(),
                                self.location(def, token),
                            )
                            .with_note(note),
                        );
                        token.text.clone()
                    }
                }
            } else if is_macro_local_label(&token.text, def.locals()) {
                format!("{}{}{}", token.text, self.options.label_suffix, invocation)
            } else {
                continue;
            };

            trace!("line {}: '{}' -> '{}'", line, token.text, substitute);
            text = self.splice(&text, token, &substitute);
        }

        Ok(text)
    }

    /// Substitute every line between `.macro` and `.end_macro`
    pub fn expand(
        &self,
        def: &MacroDefinition,
        args: &CallArguments,
        invocation: u64,
        reporter: &mut ErrorReporter,
    ) -> Result<Vec<String>, MasmError> {
        debug!(
            "Expanding macro '{}' as invocation {} with {:?}",
            def.signature(),
            invocation,
            args.arguments()
        );
        def.range()
            .body_lines()
            .map(|line| self.substitute_line(def, line, args, invocation, reporter))
            .collect()
    }

    fn splice(&self, text: &str, token: &Token, substitute: &str) -> String {
        let len = token.text.len();
        let at = match self.options.splice {
            SpliceStrategy::TrackOffsets
                if text.get(token.offset..token.offset + len) == Some(token.text.as_str()) =>
            {
                Some(token.offset)
            }
            _ => text.find(token.text.as_str()),
        };

        match at {
            Some(pos) => format!("{}{}{}", &text[..pos], substitute, &text[pos + len..]),
            None => text.to_string(),
        }
    }

    // Diagnostics point into the macro's own source file
    fn location(&self, def: &MacroDefinition, token: &Token) -> SourceLocation {
        let line = def.range().original_line(token.line).unwrap_or(token.line);
        SourceLocation::new(def.program().name(), line as u32, token.column as u32)
    }
}

impl Default for MacroExpander {
    fn default() -> Self {
        Self::new(ExpansionOptions::default())
    }
}
