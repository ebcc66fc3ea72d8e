//! Macro definitions
//!
//! A definition is collected with a [`MacroBuilder`] while the first pass
//! walks a `.macro` ... `.end_macro` block. [`MacroBuilder::ready_for_commit`]
//! sorts the local labels and freezes the result into a [`MacroDefinition`],
//! which is what the pool stores and the expander reads.

use crate::program::SourceProgram;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// The key macros are looked up by: a name plus a parameter count
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacroSignature {
    pub name: String,
    pub arity: usize,
}

impl MacroSignature {
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            arity,
        }
    }
}

impl fmt::Display for MacroSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// Lines of a definition, from the `.macro` line to the `.end_macro` line.
///
/// `from_line`/`to_line` index the program buffer the definition lives in;
/// the `original_*` pair is where the block sits in its own source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyRange {
    pub from_line: usize,
    pub to_line: usize,
    pub original_from_line: usize,
    pub original_to_line: usize,
}

impl BodyRange {
    pub fn contains(&self, line: usize) -> bool {
        self.from_line <= line && line <= self.to_line
    }

    /// Lines strictly between the two directives
    pub fn body_lines(&self) -> Range<usize> {
        (self.from_line + 1)..self.to_line.max(self.from_line + 1)
    }

    /// Map a buffer line to the line in the macro's own source file.
    /// `None` outside `from_line..=to_line`.
    pub fn original_line(&self, line: usize) -> Option<usize> {
        if !self.contains(line) {
            return None;
        }
        line.checked_sub(self.from_line)
            .map(|offset| offset + self.original_from_line)
    }
}

/// Labels declared inside a macro body, kept sorted for binary search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalLabels(Vec<String>);

impl LocalLabels {
    pub fn from_unsorted(mut labels: Vec<String>) -> Self {
        labels.sort();
        Self(labels)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.binary_search_by(|label| label.as_str().cmp(name)).is_ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// A macro definition still being scanned
pub struct MacroBuilder {
    name: String,
    program: Arc<dyn SourceProgram>,
    parameters: Vec<String>,
    labels: Vec<String>,
    range: BodyRange,
}

impl MacroBuilder {
    pub fn new(name: &str, program: Arc<dyn SourceProgram>) -> Self {
        Self {
            name: name.to_string(),
            program,
            parameters: Vec::new(),
            labels: Vec::new(),
            range: BodyRange::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a formal parameter. Duplicates are not rejected.
    pub fn add_parameter(&mut self, name: &str) -> &mut Self {
        self.parameters.push(name.to_string());
        self
    }

    /// Record a label declared in the body. Duplicates are not rejected.
    pub fn add_label(&mut self, name: &str) -> &mut Self {
        self.labels.push(name.to_string());
        self
    }

    /// Line of the `.macro` directive, both in the buffer and in its file
    pub fn set_from_line(&mut self, line: usize, original: usize) -> &mut Self {
        self.range.from_line = line;
        self.range.original_from_line = original;
        self
    }

    /// Line of the `.end_macro` directive, both in the buffer and in its file
    pub fn set_to_line(&mut self, line: usize, original: usize) -> &mut Self {
        self.range.to_line = line;
        self.range.original_to_line = original;
        self
    }

    pub fn range(&self) -> BodyRange {
        self.range
    }

    /// Sort the local labels and freeze the definition
    pub fn ready_for_commit(self) -> MacroDefinition {
        MacroDefinition {
            name: self.name,
            program: self.program,
            parameters: self.parameters,
            locals: LocalLabels::from_unsorted(self.labels),
            range: self.range,
        }
    }
}

/// A committed, immutable macro definition
#[derive(Clone)]
pub struct MacroDefinition {
    name: String,
    program: Arc<dyn SourceProgram>,
    parameters: Vec<String>,
    locals: LocalLabels,
    range: BodyRange,
}

impl MacroDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &dyn SourceProgram {
        self.program.as_ref()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    pub fn locals(&self) -> &LocalLabels {
        &self.locals
    }

    pub fn range(&self) -> BodyRange {
        self.range
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn signature(&self) -> MacroSignature {
        MacroSignature::new(&self.name, self.arity())
    }

    /// Same callable signature: equal name and equal parameter count.
    /// Labels and body contents are not compared.
    pub fn matches(&self, name: &str, arity: usize) -> bool {
        self.name == name && self.parameters.len() == arity
    }

    /// Position of a formal parameter, by exact name
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| p == name)
    }
}

impl fmt::Debug for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroDefinition")
            .field("name", &self.name)
            .field("program", &self.program.name())
            .field("parameters", &self.parameters)
            .field("locals", &self.locals)
            .field("range", &self.range)
            .finish()
    }
}
