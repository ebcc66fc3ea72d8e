//! Token classification inside macro bodies

use crate::macro_def::LocalLabels;
use crate::registers::RegisterLookup;

/// Is `text` a reference to a macro parameter?
///
/// `%name` (at least one character after the sigil) is always a parameter.
/// With `accept_spim_style`, `$name` is one too unless it names a register in
/// any register file, so `$t0`, `$12` and `$f2` keep their meaning.
pub fn is_macro_parameter(
    text: &str,
    accept_spim_style: bool,
    registers: &dyn RegisterLookup,
) -> bool {
    if accept_spim_style && text.starts_with('$') && !registers.is_register(text) {
        return true;
    }
    text.len() > 1 && text.starts_with('%')
}

/// Is `text` a label declared inside the macro body?
pub fn is_macro_local_label(text: &str, locals: &LocalLabels) -> bool {
    locals.contains(text)
}
