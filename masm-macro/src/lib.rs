//! Macro engine for a MIPS assembler.
//!
//! Macros are written as `.macro name %a, %b` ... `.end_macro` blocks. A call
//! `name $t0, $t1` is replaced by the block's body with every parameter
//! reference substituted and every label declared in the body renamed to
//! `label_M<id>`, where `<id>` is unique to that call.

pub mod classify;
pub mod counter;
pub mod expander;
pub mod lexer;
pub mod macro_def;
pub mod options;
pub mod pool;
pub mod program;
pub mod registers;
pub mod scanner;

pub use classify::{is_macro_local_label, is_macro_parameter};
pub use counter::InvocationCounter;
pub use expander::{CallArguments, MacroExpander};
pub use lexer::{Token, TokenKind, TokenList};
pub use macro_def::{BodyRange, LocalLabels, MacroBuilder, MacroDefinition, MacroSignature};
pub use options::{ExpansionOptions, SpliceStrategy};
pub use pool::MacroPool;
pub use program::{Program, SourceProgram};
pub use registers::{MipsRegisters, RegisterFile, RegisterLookup};
pub use scanner::{expand_program, parse_call, scan_definitions, MacroCall, ScanResult};

use masm_common::{ErrorReporter, MasmError};
use std::sync::Arc;

/// Scan and expand one source file with the given options.
///
/// Soft errors end up in `reporter`; the returned text is produced even when
/// some were reported.
pub fn expand_source(
    name: &str,
    source: &str,
    options: ExpansionOptions,
    reporter: &mut ErrorReporter,
) -> Result<String, MasmError> {
    let program: Arc<dyn SourceProgram> = Arc::new(Program::from_source(name, source)?);
    let counter = InvocationCounter::starting_at(options.first_invocation);
    let expander = MacroExpander::new(options);

    let scan = scan_definitions(&program, &expander, reporter)?;
    expand_program(program.as_ref(), &scan, &expander, &counter, reporter)
}
