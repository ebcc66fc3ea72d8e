//! MIPS assembler macro engine - Common Types and Diagnostics
//! 
//! This crate contains the source location type, the error enum and the
//! diagnostics sink shared by the macro engine and its driver.

pub mod error;
pub mod source_loc;

pub use error::{Diagnostic, ErrorReporter, MasmError, Severity};
pub use source_loc::SourceLocation;
