//! Components relating to the abstract syntax trees (ASTs)
//! used in representing SIC/XE source lines.
//!
//! These components together are used to construct [`Stmt`]
//! (a data structure holding one parsed source line).
//! The instruction set itself is described by [`mnemonic`].

pub mod mnemonic;

use std::fmt::Write as _;

use mnemonic::{DirectiveKind, InstrRecord};

/// A SIC/XE register.
///
/// Each register is bound to a fixed 4-bit code, which is what
/// format 2 instructions encode.
///
/// ## Examples
///
/// ```text
/// CLEAR X
///       ~
/// COMPR A,S
///       ~ ~
/// SHIFTL T,4
///        ~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Reg {
    /// Accumulator.
    A,
    /// Index register.
    X,
    /// Linkage register.
    L,
    /// Base register.
    B,
    /// General working register.
    S,
    /// General working register.
    T,
    /// Program counter.
    PC,
    /// Status word.
    SW,
}
impl Reg {
    /// Gets the 4-bit register code of this [`Reg`].
    pub fn code(self) -> u8 {
        match self {
            Reg::A  => 0,
            Reg::X  => 1,
            Reg::L  => 2,
            Reg::B  => 3,
            Reg::S  => 4,
            Reg::T  => 5,
            Reg::PC => 8,
            Reg::SW => 9,
        }
    }
}
impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}
impl std::str::FromStr for Reg {
    type Err = ();

    /// Parses a register name. This is case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match &*s.to_ascii_uppercase() {
            "A"  => Ok(Reg::A),
            "X"  => Ok(Reg::X),
            "L"  => Ok(Reg::L),
            "B"  => Ok(Reg::B),
            "S"  => Ok(Reg::S),
            "T"  => Ok(Reg::T),
            "PC" => Ok(Reg::PC),
            "SW" => Ok(Reg::SW),
            _    => Err(()),
        }
    }
}

/// A literal constant.
///
/// ## Examples
///
/// ```text
/// EOF    BYTE  C'EOF'
///              ~~~~~~
/// INPUT  BYTE  X'F1'
///              ~~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Literal {
    /// A hex literal (`X'..'`).
    ///
    /// This holds the (uppercase) hex digits between the quotes.
    Hex(String),
    /// A character literal (`C'..'`).
    ///
    /// This holds the characters between the quotes. Each is known to fit in a byte.
    Char(String),
}
impl Literal {
    /// The hex digit encoding of this literal.
    ///
    /// See [`crate::asm::bits::decode_literal`].
    pub fn to_hex(&self) -> String {
        match self {
            Literal::Hex(digits) => digits.clone(),
            Literal::Char(chars) => crate::asm::bits::chars_to_hex(chars),
        }
    }

    /// The numeric value of this literal, reading its bytes as a big-endian integer.
    ///
    /// This is `None` if the value does not fit in an `i64`.
    pub fn value(&self) -> Option<i64> {
        match self {
            Literal::Hex(digits) => {
                u64::from_str_radix(digits, 16).ok()
                    .and_then(|v| i64::try_from(v).ok())
            },
            Literal::Char(chars) => {
                chars.chars().try_fold(0i64, |acc, c| {
                    acc.checked_mul(0x100)?.checked_add(i64::from(u32::from(c)))
                })
            },
        }
    }
}
impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Hex(digits) => write!(f, "X'{digits}'"),
            Literal::Char(chars) => write!(f, "C'{chars}'"),
        }
    }
}

/// A single value in operand position: a number, a symbol, or a literal.
///
/// ## Examples
///
/// ```text
/// LDA    #3
///         ~
/// STA    BUFFER
///        ~~~~~~
/// WORD   X'00FF'
///        ~~~~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Value {
    /// A decimal integer.
    Number(i64),
    /// A symbol, resolved through the symbol table.
    Symbol(String),
    /// A literal constant.
    Literal(Literal),
}
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => n.fmt(f),
            Value::Symbol(s) => f.write_str(s),
            Value::Literal(l) => l.fmt(f),
        }
    }
}

/// The prefix marker on a memory operand.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum Marker {
    /// No marker (simple addressing).
    #[default]
    Simple,
    /// `#` (immediate addressing).
    Immediate,
    /// `@` (indirect addressing).
    Indirect,
}

/// A memory operand of a format 3 or format 4 instruction.
///
/// ## Examples
///
/// ```text
/// J      @RETADR
///        ~~~~~~~
/// STCH   BUFFER,X
///        ~~~~~~~~
/// +LDT   #4096
///        ~~~~~
/// ```
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MemOperand {
    /// The addressing marker in front of the value.
    pub marker: Marker,
    /// The value the operand refers to.
    pub value: Value,
    /// Whether the operand has the `,X` indexed suffix.
    pub indexed: bool,
}
impl std::fmt::Display for MemOperand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.marker {
            Marker::Simple    => {},
            Marker::Immediate => f.write_char('#')?,
            Marker::Indirect  => f.write_char('@')?,
        }
        self.value.fmt(f)?;
        if self.indexed {
            f.write_str(",X")?;
        }
        Ok(())
    }
}

/// A single field of a format 2 instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Field {
    #[allow(missing_docs)]
    Reg(Reg),
    /// A numeric operand (a shift count or supervisor call number).
    Count(i64),
}

/// The parsed operand of an instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Operand {
    /// The instruction does not use an operand.
    None,
    /// A memory operand (formats 3 and 4).
    Memory(MemOperand),
    /// Register and count fields (format 2), in source order.
    Fields(Vec<Field>),
}

/// A machine instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Instr {
    /// The directory entry for this instruction.
    pub record: &'static InstrRecord,
    /// Whether the `+` extended marker was present.
    pub extended: bool,
    /// The instruction's operand.
    pub operand: Operand,
}

/// An assembler directive.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Directive {
    /// The start of the program.
    ///
    /// This holds the starting address if one was given and is honored
    /// (see [`crate::asm::AsmFlags::honor_start`]).
    Start(Option<u32>),
    /// The end of the program.
    End,
    /// Sets the base register to the given value.
    Base(Value),
    /// Clears the base register.
    NoBase,
    /// Reserves the given number of bytes.
    Resb(u32),
    /// Reserves the given number of words.
    Resw(u32),
    /// A single 3-byte word.
    Word(Value),
    /// A sequence of bytes, given as their hex digits.
    Byte(String),
}
impl Directive {
    /// The directory kind of this directive.
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Start(_) => DirectiveKind::Start,
            Directive::End      => DirectiveKind::End,
            Directive::Base(_)  => DirectiveKind::Base,
            Directive::NoBase   => DirectiveKind::NoBase,
            Directive::Resb(_)  => DirectiveKind::Resb,
            Directive::Resw(_)  => DirectiveKind::Resw,
            Directive::Word(_)  => DirectiveKind::Word,
            Directive::Byte(_)  => DirectiveKind::Byte,
        }
    }
}

/// The nucleus of a source line.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum StmtKind {
    /// A comment line. It is listed but not assembled.
    Comment,
    #[allow(missing_docs)]
    Directive(Directive),
    #[allow(missing_docs)]
    Instr(Instr),
}

/// A parsed source line.
///
/// This keeps the raw label, mnemonic, and operand text, so that the line
/// can be reproduced in a listing.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Stmt {
    /// The 1-based line number in the source.
    pub line: usize,
    /// The label, if the line has one.
    pub label: Option<String>,
    /// The mnemonic (including any extended marker) as written.
    /// For comment lines, this holds the whole line.
    pub mnemonic: String,
    /// The operand text as written.
    pub operand: String,
    /// The parsed line.
    pub kind: StmtKind,
}
