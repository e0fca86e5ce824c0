//! The mnemonic directory.
//!
//! Every SIC/XE mnemonic this assembler understands is listed here, either as one of
//! the assembler directives ([`DirectiveKind`]) or as a machine instruction
//! ([`InstrRecord`]). The table is static and never mutated.
//!
//! A mnemonic may carry a leading `+` to request the extended (format 4) encoding.
//! [`lookup`] strips this marker; callers use [`split_extended`] to keep track of it.

use crate::asm::AsmErrKind;

/// The marker which promotes a format 3 instruction into format 4.
pub const EXTENDED_MARKER: char = '+';

/// The base encoding format of an instruction.
///
/// Format 4 is not listed here, because it is only reachable
/// by extending a [`Format::Three`] instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Format {
    /// 1 byte: opcode only.
    One,
    /// 2 bytes: opcode and two 4-bit operand fields.
    Two,
    /// 3 bytes: 6-bit opcode, 6 flag bits, and a 12-bit displacement.
    Three,
}
impl Format {
    /// The number of bytes an instruction of this format occupies.
    pub fn byte_len(self) -> u32 {
        match self {
            Format::One   => 1,
            Format::Two   => 2,
            Format::Three => 3,
        }
    }
}

/// The kind of a single operand expected by an instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OperandKind {
    /// A register name (e.g., `A`, `X`, `SW`).
    Register,
    /// A shift count in `1..=16` (`SHIFTL`, `SHIFTR`).
    ShiftCount,
    /// A supervisor call number in `0..16` (`SVC`).
    Interrupt,
    /// A memory operand (formats 3 and 4).
    Memory,
}
impl std::fmt::Display for OperandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperandKind::Register   => f.write_str("register"),
            OperandKind::ShiftCount => f.write_str("shift count"),
            OperandKind::Interrupt  => f.write_str("interrupt number"),
            OperandKind::Memory     => f.write_str("memory operand"),
        }
    }
}

/// A machine instruction entry in the directory.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct InstrRecord {
    /// The mnemonic (without any extended marker).
    pub name: &'static str,
    /// The base format of the instruction.
    pub format: Format,
    /// The full 8-bit opcode.
    ///
    /// Formats 3 and 4 only use the top 6 bits of this opcode.
    pub opcode: u8,
    /// The operands the instruction expects, in order.
    ///
    /// An empty shape means any operand text is ignored (format 1, `RSUB`).
    pub shape: &'static [OperandKind],
}
impl InstrRecord {
    /// Whether this instruction can be promoted to format 4.
    pub fn can_extend(&self) -> bool {
        self.format == Format::Three
    }

    /// The number of bytes this instruction occupies, with or without the extended marker.
    pub fn byte_len(&self, extended: bool) -> u32 {
        self.format.byte_len() + u32::from(extended)
    }
}

/// The assembler directives.
///
/// These are special-cased by name, since their length and encoding rules
/// do not follow any instruction format.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum DirectiveKind {
    #[allow(missing_docs)]
    Start,
    #[allow(missing_docs)]
    End,
    #[allow(missing_docs)]
    Base,
    #[allow(missing_docs)]
    NoBase,
    #[allow(missing_docs)]
    Resb,
    #[allow(missing_docs)]
    Resw,
    #[allow(missing_docs)]
    Word,
    #[allow(missing_docs)]
    Byte,
}
impl DirectiveKind {
    const ALL: [DirectiveKind; 8] = [
        DirectiveKind::Start, DirectiveKind::End, DirectiveKind::Base, DirectiveKind::NoBase,
        DirectiveKind::Resb, DirectiveKind::Resw, DirectiveKind::Word, DirectiveKind::Byte,
    ];

    /// The directive's name in source code.
    pub fn name(self) -> &'static str {
        match self {
            DirectiveKind::Start  => "START",
            DirectiveKind::End    => "END",
            DirectiveKind::Base   => "BASE",
            DirectiveKind::NoBase => "NOBASE",
            DirectiveKind::Resb   => "RESB",
            DirectiveKind::Resw   => "RESW",
            DirectiveKind::Word   => "WORD",
            DirectiveKind::Byte   => "BYTE",
        }
    }

    /// The number of bytes this directive occupies, if that does not depend on its operand.
    ///
    /// Only `RESB`, `RESW`, and `BYTE` are sized by their operand.
    pub fn fixed_len(self) -> Option<u32> {
        match self {
            DirectiveKind::Start | DirectiveKind::End | DirectiveKind::Base | DirectiveKind::NoBase => Some(0),
            DirectiveKind::Word => Some(3),
            DirectiveKind::Resb | DirectiveKind::Resw | DirectiveKind::Byte => None,
        }
    }

    /// Whether this directive's listing line has an address column.
    ///
    /// `START`, `END`, `BASE`, and `NOBASE` only control the assembler,
    /// so they are listed without one.
    pub fn has_address(self) -> bool {
        !matches!(self, DirectiveKind::Start | DirectiveKind::End | DirectiveKind::Base | DirectiveKind::NoBase)
    }
}

/// The result of a directory lookup.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Mnemonic {
    /// An assembler directive.
    Directive(DirectiveKind),
    /// A machine instruction.
    Instr(&'static InstrRecord),
}

macro_rules! instructions {
    ($($name:ident => $fmt:ident, $opcode:literal, [$($kind:ident),*];)+) => {
        static INSTRUCTIONS: &[InstrRecord] = &[
            $(
                InstrRecord {
                    name: stringify!($name),
                    format: Format::$fmt,
                    opcode: $opcode,
                    shape: &[$(OperandKind::$kind),*],
                }
            ),+
        ];
    };
}
instructions! {
    ADD    => Three, 0x18, [Memory];
    ADDF   => Three, 0x58, [Memory];
    ADDR   => Two,   0x90, [Register, Register];
    AND    => Three, 0x40, [Memory];
    CLEAR  => Two,   0xB4, [Register];
    COMP   => Three, 0x28, [Memory];
    COMPF  => Three, 0x88, [Memory];
    COMPR  => Two,   0xA0, [Register, Register];
    DIV    => Three, 0x24, [Memory];
    DIVF   => Three, 0x64, [Memory];
    DIVR   => Two,   0x9C, [Register, Register];
    FIX    => One,   0xC4, [];
    FLOAT  => One,   0xC0, [];
    HIO    => One,   0xF4, [];
    J      => Three, 0x3C, [Memory];
    JEQ    => Three, 0x30, [Memory];
    JGT    => Three, 0x34, [Memory];
    JLT    => Three, 0x38, [Memory];
    JSUB   => Three, 0x48, [Memory];
    LDA    => Three, 0x00, [Memory];
    LDB    => Three, 0x68, [Memory];
    LDCH   => Three, 0x50, [Memory];
    LDF    => Three, 0x70, [Memory];
    LDL    => Three, 0x08, [Memory];
    LDS    => Three, 0x6C, [Memory];
    LDT    => Three, 0x74, [Memory];
    LDX    => Three, 0x04, [Memory];
    LPS    => Three, 0xD0, [Memory];
    MUL    => Three, 0x20, [Memory];
    MULF   => Three, 0x60, [Memory];
    MULR   => Two,   0x98, [Register, Register];
    NORM   => One,   0xC8, [];
    OR     => Three, 0x44, [Memory];
    RD     => Three, 0xD8, [Memory];
    RMO    => Two,   0xAC, [Register, Register];
    RSUB   => Three, 0x4C, [];
    SHIFTL => Two,   0xA4, [Register, ShiftCount];
    SHIFTR => Two,   0xA8, [Register, ShiftCount];
    SIO    => One,   0xF0, [];
    SSK    => Three, 0xEC, [Memory];
    STA    => Three, 0x0C, [Memory];
    STB    => Three, 0x78, [Memory];
    STCH   => Three, 0x54, [Memory];
    STF    => Three, 0x80, [Memory];
    STI    => Three, 0xD4, [Memory];
    STL    => Three, 0x14, [Memory];
    STS    => Three, 0x7C, [Memory];
    STSW   => Three, 0xE8, [Memory];
    STT    => Three, 0x84, [Memory];
    STX    => Three, 0x10, [Memory];
    SUB    => Three, 0x1C, [Memory];
    SUBF   => Three, 0x5C, [Memory];
    SUBR   => Two,   0x94, [Register, Register];
    SVC    => Two,   0xB0, [Interrupt];
    TD     => Three, 0xE0, [Memory];
    TIO    => One,   0xF8, [];
    TIX    => Three, 0x2C, [Memory];
    TIXR   => Two,   0xB8, [Register];
    WD     => Three, 0xDC, [Memory];
}

/// Splits off the extended-format marker from a mnemonic.
///
/// ```
/// use sicxe_asm::ast::mnemonic::split_extended;
///
/// assert_eq!(split_extended("+JSUB"), ("JSUB", true));
/// assert_eq!(split_extended("JSUB"), ("JSUB", false));
/// ```
pub fn split_extended(name: &str) -> (&str, bool) {
    match name.strip_prefix(EXTENDED_MARKER) {
        Some(base) => (base, true),
        None       => (name, false),
    }
}

/// Looks up a mnemonic in the directory.
///
/// The lookup is case-insensitive, and a leading extended marker is ignored.
///
/// ```
/// use sicxe_asm::ast::mnemonic::{lookup, DirectiveKind, Mnemonic};
///
/// let Ok(Mnemonic::Instr(lda)) = lookup("+LDA") else { panic!("LDA should be an instruction") };
/// assert_eq!(lda.opcode, 0x00);
/// assert_eq!(lookup("resw"), Ok(Mnemonic::Directive(DirectiveKind::Resw)));
/// assert!(lookup("LTORG").is_err());
/// ```
pub fn lookup(name: &str) -> Result<Mnemonic, AsmErrKind> {
    let (base, _) = split_extended(name);
    let upper = base.to_ascii_uppercase();

    if let Some(&d) = DirectiveKind::ALL.iter().find(|d| d.name() == upper) {
        return Ok(Mnemonic::Directive(d));
    }
    INSTRUCTIONS.iter()
        .find(|r| r.name == upper)
        .map(Mnemonic::Instr)
        .ok_or_else(|| AsmErrKind::UnknownMnemonic(name.to_string()))
}

/// Looks up a mnemonic in the directory, also checking its extended marker.
///
/// This returns the mnemonic and whether it was extended,
/// and errors if the marker is used on anything other than a format 3 instruction.
///
/// ```
/// use sicxe_asm::ast::mnemonic::lookup_extended;
///
/// let (_, extended) = lookup_extended("+JSUB").unwrap();
/// assert!(extended);
/// assert!(lookup_extended("+WORD").is_err());
/// assert!(lookup_extended("+CLEAR").is_err());
/// ```
pub fn lookup_extended(name: &str) -> Result<(Mnemonic, bool), AsmErrKind> {
    let (_, extended) = split_extended(name);
    let mnemonic = lookup(name)?;

    let allowed = match mnemonic {
        Mnemonic::Directive(_) => !extended,
        Mnemonic::Instr(r) => !extended || r.can_extend(),
    };
    match allowed {
        true  => Ok((mnemonic, extended)),
        false => Err(AsmErrKind::ExtendedNotAllowed(name.to_string())),
    }
}

/// Iterates over every machine instruction in the directory.
pub fn instructions() -> impl Iterator<Item=&'static InstrRecord> {
    INSTRUCTIONS.iter()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{instructions, lookup, DirectiveKind, Format, Mnemonic, OperandKind};
    use crate::asm::AsmErrKind;

    fn instr(name: &str) -> &'static super::InstrRecord {
        match lookup(name) {
            Ok(Mnemonic::Instr(r)) => r,
            other => panic!("expected {name} to be an instruction, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_instr() {
        let stl = instr("STL");
        assert_eq!((stl.format, stl.opcode), (Format::Three, 0x14));

        let rmo = instr("rmo");
        assert_eq!((rmo.format, rmo.opcode), (Format::Two, 0xAC));
        assert_eq!(rmo.shape, &[OperandKind::Register, OperandKind::Register]);

        let fix = instr("FIX");
        assert_eq!((fix.format, fix.opcode), (Format::One, 0xC4));
        assert!(fix.shape.is_empty());

        assert_eq!(instr("SVC").shape, &[OperandKind::Interrupt]);
        assert_eq!(instr("SHIFTL").shape, &[OperandKind::Register, OperandKind::ShiftCount]);
        assert!(instr("RSUB").shape.is_empty());
    }

    #[test]
    fn test_lookup_extended() {
        assert_eq!(instr("+STL"), instr("STL"));
        assert_eq!(instr("+LDT").byte_len(true), 4);
        assert_eq!(instr("LDT").byte_len(false), 3);
        assert!(instr("LDT").can_extend());
        assert!(!instr("CLEAR").can_extend());
    }

    #[test]
    fn test_lookup_directive() {
        for d in DirectiveKind::ALL {
            assert_eq!(lookup(d.name()), Ok(Mnemonic::Directive(d)));
        }
        assert!(!DirectiveKind::Base.has_address());
        assert!(DirectiveKind::Resb.has_address());
    }

    #[test]
    fn test_lookup_unknown() {
        assert_eq!(lookup("LTORG"), Err(AsmErrKind::UnknownMnemonic("LTORG".to_string())));
        assert_eq!(lookup("+FOO"), Err(AsmErrKind::UnknownMnemonic("+FOO".to_string())));
        assert!(lookup("").is_err());
    }

    #[test]
    fn test_table_integrity() {
        let mut names = HashSet::new();
        for r in instructions() {
            assert!(names.insert(r.name), "{} is in the directory twice", r.name);
            if r.shape.contains(&OperandKind::Memory) {
                assert_eq!(r.format, Format::Three, "{} takes a memory operand but is not format 3", r.name);
            }
            if r.format == Format::Three {
                assert_eq!(r.opcode & 0b11, 0, "{} has bits in the flag positions of its opcode", r.name);
            }
        }
    }
}
