//! Resolving memory operands into flag bits and an address field.
//!
//! Format 3 and format 4 instructions carry six flag bits (`n i x b p e`)
//! alongside their address field. [`resolve`] decides which of these is set
//! for a given [`MemOperand`], and what value goes in the address field:
//!
//! 1. The marker (`#`, `@`, or none) sets `n` and `i`. With no marker, both are set.
//! 2. The `,X` suffix sets `x`. It cannot be combined with `#` or `@`.
//! 3. Extended instructions set `e` and take the operand's absolute value.
//! 4. An immediate operand which is not a defined symbol is also taken as is.
//! 5. Anything else is addressed by displacement: PC-relative if it is in range
//!    of the next instruction, otherwise base-relative if a base is declared.

use std::ops::{BitOr, BitOrAssign};

use crate::ast::mnemonic::InstrRecord;
use crate::ast::{Marker, MemOperand, Value};

use super::{AsmErrKind, OperandRangeErr, SymbolTable};

/// The range of a PC-relative displacement.
pub const PC_RANGE: std::ops::RangeInclusive<i64> = -2048..=2047;
/// The range of a base-relative displacement.
pub const BASE_RANGE: std::ops::RangeInclusive<i64> = 0..=4095;

/// The six flag bits of a format 3 or format 4 instruction.
///
/// The flags are laid out as `n i x b p e`, from most to least significant.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Default)]
pub struct Flags(u8);
impl Flags {
    /// Indirect (`n`).
    pub const N: Flags = Flags(0b100000);
    /// Immediate (`i`).
    pub const I: Flags = Flags(0b010000);
    /// Indexed (`x`).
    pub const X: Flags = Flags(0b001000);
    /// Base-relative (`b`).
    pub const B: Flags = Flags(0b000100);
    /// PC-relative (`p`).
    pub const P: Flags = Flags(0b000010);
    /// Extended (`e`).
    pub const E: Flags = Flags(0b000001);
    /// Simple addressing (`n` and `i`).
    pub const SIMPLE: Flags = Flags(Flags::N.0 | Flags::I.0);

    /// Computes the flags implied by an operand's marker and suffix, and the instruction's format.
    ///
    /// This errors if the operand is indexed and also immediate or indirect.
    ///
    /// ```
    /// use sicxe_asm::asm::addressing::Flags;
    /// use sicxe_asm::ast::Marker;
    ///
    /// assert_eq!(Flags::compose(Marker::Simple, true, false), Ok(Flags::SIMPLE | Flags::X));
    /// assert_eq!(Flags::compose(Marker::Immediate, false, true), Ok(Flags::I | Flags::E));
    /// assert!(Flags::compose(Marker::Indirect, true, false).is_err());
    /// ```
    pub fn compose(marker: Marker, indexed: bool, extended: bool) -> Result<Flags, AsmErrKind> {
        let mut flags = match marker {
            Marker::Simple    => Flags::SIMPLE,
            Marker::Immediate => Flags::I,
            Marker::Indirect  => Flags::N,
        };
        if indexed {
            if marker != Marker::Simple { return Err(AsmErrKind::IndexedConflict); }
            flags |= Flags::X;
        }
        if extended {
            flags |= Flags::E;
        }
        Ok(flags)
    }

    /// The raw 6-bit value of these flags.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Whether every flag in `other` is also set in `self`.
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether these flags select the given addressing mode.
    pub fn has(self, mode: AddressingMode) -> bool {
        match mode {
            AddressingMode::Simple    => self.contains(Flags::SIMPLE),
            AddressingMode::Immediate => self.contains(Flags::I) && !self.contains(Flags::N),
            AddressingMode::Indirect  => self.contains(Flags::N) && !self.contains(Flags::I),
            AddressingMode::Indexed      => self.contains(Flags::X),
            AddressingMode::BaseRelative => self.contains(Flags::B),
            AddressingMode::PcRelative   => self.contains(Flags::P),
            AddressingMode::Extended     => self.contains(Flags::E),
        }
    }
}
impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Self) -> Self::Output {
        Flags(self.0 | rhs.0)
    }
}
impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
impl std::fmt::Debug for Flags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Flags(nixbpe={:06b})", self.0)
    }
}

/// An addressing mode, as selected by a set of [`Flags`].
///
/// `Simple`, `Immediate`, and `Indirect` are mutually exclusive.
/// The rest can be combined with them, subject to the rules in [`resolve`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AddressingMode {
    /// `#value`: the operand is the value itself.
    Immediate,
    /// `@value`: the operand is at the address stored at the value.
    Indirect,
    /// `value`: the operand is at the value.
    Simple,
    /// `value,X`: the index register is added to the address.
    Indexed,
    /// The address field is a displacement from the next instruction.
    PcRelative,
    /// The address field is a displacement from the base register.
    BaseRelative,
    /// The address field is a 20-bit absolute value (format 4).
    Extended,
}

/// The value placed in the address field of an instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Target {
    /// A signed displacement from the next instruction's address.
    PcRelative(i64),
    /// An unsigned displacement from the base register.
    BaseRelative(i64),
    /// A value used without any displacement arithmetic.
    Direct(i64),
}
impl Target {
    /// The number stored in the address field.
    pub fn field_value(self) -> i64 {
        match self {
            Target::PcRelative(d) | Target::BaseRelative(d) | Target::Direct(d) => d,
        }
    }
}

/// A fully resolved memory operand.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ResolvedOperand {
    /// The flag bits of the instruction.
    pub flags: Flags,
    /// The address field of the instruction.
    pub target: Target,
}

/// The reason a displacement could not be computed.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum AddrRangeErr {
    /// The operand is out of PC-relative range, and no base is declared.
    NoBase,
    /// The operand is out of both PC-relative and base-relative range.
    OutOfRange,
}
impl std::fmt::Display for AddrRangeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddrRangeErr::NoBase     => f.write_str("operand is out of PC-relative range and no BASE is declared"),
            AddrRangeErr::OutOfRange => f.write_str("operand is out of both PC-relative and base-relative range"),
        }
    }
}

/// Computes the numeric value of an operand value.
///
/// Symbols resolve to their address, and literals to their big-endian byte value.
pub(crate) fn value_of(mnemonic: &'static str, value: &Value, symbols: &SymbolTable) -> Result<i64, AsmErrKind> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Symbol(s) => symbols.resolve(s).map(i64::from),
        Value::Literal(l) => l.value()
            .ok_or(AsmErrKind::OperandRange(mnemonic, OperandRangeErr::LiteralTooLarge)),
    }
}

/// Resolves a memory operand into the flags and address field of its instruction.
///
/// Parameters:
/// - `record`: The instruction this operand belongs to
/// - `op`: The operand
/// - `extended`: Whether the instruction has the extended marker
/// - `next`: The address of the instruction following this one
/// - `symbols`: The symbol table
/// - `base`: The current base register value, if one is declared
///
/// # Example
///
/// ```
/// use sicxe_asm::asm::SymbolTable;
/// use sicxe_asm::asm::addressing::{resolve, Flags, Target};
/// use sicxe_asm::ast::mnemonic::{lookup, Mnemonic};
/// use sicxe_asm::ast::{Marker, MemOperand, Value};
///
/// let Ok(Mnemonic::Instr(j)) = lookup("J") else { unreachable!() };
/// let mut symbols = SymbolTable::new();
/// symbols.define("CLOOP", 0x006).unwrap();
///
/// let op = MemOperand { marker: Marker::Simple, value: Value::Symbol("CLOOP".into()), indexed: false };
/// let resolved = resolve(j, &op, false, 0x01A, &symbols, None).unwrap();
/// assert_eq!(resolved.flags, Flags::SIMPLE | Flags::P);
/// assert_eq!(resolved.target, Target::PcRelative(-0x14));
/// ```
pub fn resolve(
    record: &'static InstrRecord,
    op: &MemOperand,
    extended: bool,
    next: u32,
    symbols: &SymbolTable,
    base: Option<u32>,
) -> Result<ResolvedOperand, AsmErrKind> {
    let flags = Flags::compose(op.marker, op.indexed, extended)?;
    let value = || value_of(record.name, &op.value, symbols);

    // Format 4 always takes the absolute value.
    if extended {
        return Ok(ResolvedOperand { flags, target: Target::Direct(value()?) });
    }
    // An immediate constant is not an address.
    let is_symbol = matches!(&op.value, Value::Symbol(s) if symbols.is_defined(s));
    if op.marker == Marker::Immediate && !is_symbol {
        return Ok(ResolvedOperand { flags, target: Target::Direct(value()?) });
    }

    let value = value()?;
    let pc_disp = value - i64::from(next);
    if PC_RANGE.contains(&pc_disp) {
        return Ok(ResolvedOperand { flags: flags | Flags::P, target: Target::PcRelative(pc_disp) });
    }

    let base = base.ok_or(AsmErrKind::AddressingRange(AddrRangeErr::NoBase))?;
    let base_disp = value - i64::from(base);
    match BASE_RANGE.contains(&base_disp) {
        true  => Ok(ResolvedOperand { flags: flags | Flags::B, target: Target::BaseRelative(base_disp) }),
        false => Err(AsmErrKind::AddressingRange(AddrRangeErr::OutOfRange)),
    }
}
