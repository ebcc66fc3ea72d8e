//! Register-name tables consulted to tell `$name` macro parameters apart
//! from genuine register references.

/// The register files whose names share the `$` sigil
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterFile {
    General,
    Coprocessor0,
    Coprocessor1,
}

impl RegisterFile {
    pub const ALL: [RegisterFile; 3] = [
        RegisterFile::General,
        RegisterFile::Coprocessor0,
        RegisterFile::Coprocessor1,
    ];
}

/// Read-only register-name lookup
pub trait RegisterLookup: Send + Sync {
    /// Register number of `name` in `file`, if `name` is a register there
    fn number(&self, file: RegisterFile, name: &str) -> Option<u32>;

    /// True if `name` names a register in any register file
    fn is_register(&self, name: &str) -> bool {
        RegisterFile::ALL
            .iter()
            .any(|&file| self.number(file, name).is_some())
    }
}

#[rustfmt::skip]
const GENERAL_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3",
    "$t0", "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7",
    "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7",
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

// Coprocessor 0 exposes vaddr, status, cause and epc
const COPROCESSOR0_NUMBERS: [u32; 4] = [8, 12, 13, 14];

/// The MIPS32 register files
#[derive(Debug, Clone, Copy, Default)]
pub struct MipsRegisters;

impl RegisterLookup for MipsRegisters {
    fn number(&self, file: RegisterFile, name: &str) -> Option<u32> {
        match file {
            RegisterFile::General => GENERAL_NAMES
                .iter()
                .position(|&n| n == name)
                .map(|i| i as u32)
                .or_else(|| name.strip_prefix('$').and_then(register_index)),
            RegisterFile::Coprocessor0 => name
                .strip_prefix('$')
                .and_then(register_index)
                .filter(|n| COPROCESSOR0_NUMBERS.contains(n)),
            RegisterFile::Coprocessor1 => name.strip_prefix("$f").and_then(register_index),
        }
    }
}

/// Parse a decimal register number in 0..=31
fn register_index(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|&n| n < 32)
}
