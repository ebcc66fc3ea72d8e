use crate::macro_def::{MacroDefinition, MacroSignature};
use std::collections::HashMap;

/// Committed macro definitions, keyed by name and parameter count
#[derive(Debug, Default)]
pub struct MacroPool {
    macros: HashMap<MacroSignature, MacroDefinition>,
}

impl MacroPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a definition, returning the one it replaces
    pub fn commit(&mut self, def: MacroDefinition) -> Option<MacroDefinition> {
        log::debug!(
            "Committing macro '{}' ({} local labels)",
            def.signature(),
            def.locals().len()
        );
        self.macros.insert(def.signature(), def)
    }

    /// Resolve a call by name and argument count
    pub fn lookup(&self, name: &str, arity: usize) -> Option<&MacroDefinition> {
        self.macros.get(&MacroSignature::new(name, arity))
    }

    /// True if some macro has this name, whatever its arity
    pub fn contains_name(&self, name: &str) -> bool {
        self.macros.keys().any(|sig| sig.name == name)
    }

    /// Parameter counts defined for `name`, ascending
    pub fn arities(&self, name: &str) -> Vec<usize> {
        let mut arities: Vec<usize> = self
            .macros
            .keys()
            .filter(|sig| sig.name == name)
            .map(|sig| sig.arity)
            .collect();
        arities.sort_unstable();
        arities
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MacroDefinition> {
        self.macros.values()
    }
}
