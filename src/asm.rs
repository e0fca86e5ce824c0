//! Assembling SIC/XE source lines into object code.
//!
//! This module converts source lines into a listing of object code, one entry per line,
//! alongside the symbol table of the program.
//!
//! Assembly happens in two passes:
//! 1. Every line is parsed and its length is computed, in order. Labels are defined in the
//!    [`SymbolTable`] at the location they occur.
//! 2. Every line is encoded, resolving symbols through the table from the first pass.
//!
//! The assembler module notably consists of:
//! - [`assemble`] and [`assemble_lines`]: The main functions which assemble source lines into an [`Assembly`].
//! - [`SymbolTable`]: a struct holding the symbol table, which maps labels to their addresses
//! - [`Assembly`]: a struct holding the symbol table and the listing of each line
//! - [`assembled_length`]: computes how many bytes a single line occupies
//! - [`bits`], [`addressing`], [`encoding`]: the codec, operand resolver, and encoder used in the second pass

pub mod addressing;
pub mod bits;
pub mod encoding;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::ast::mnemonic::{self, Mnemonic};
use crate::ast::{Directive, Stmt, StmtKind};
use crate::err::Error as _;
use crate::parse::lex::LexErr;
use crate::parse::{parse_directive, parse_line};

use self::addressing::{value_of, AddrRangeErr};
use self::bits::FieldOverflow;

/// The size of the SIC/XE address space (1 MiB).
///
/// Every assembled byte must lie below this address.
pub const MEMORY_SIZE: u32 = 0x100000;

/// Assembles SIC/XE source code with the default [`AsmFlags`].
///
/// # Example
/// ```
/// use sicxe_asm::asm::assemble;
///
/// let src = "
/// . adds two numbers
/// FIRST   LDA   ONE
///         ADD   TWO
///         STA   SUM
///         RSUB
/// ONE     WORD  1
/// TWO     WORD  2
/// SUM     RESW  1
/// ";
/// let asm = assemble(src.trim()).unwrap();
/// assert_eq!(asm.symbol_table().lookup("TWO"), Some(0x00F));
///
/// let codes: Vec<_> = asm.listing().iter().filter_map(|l| l.code()).collect();
/// assert_eq!(codes, ["032009", "1B2009", "0F2009", "4F0000", "000001", "000002"]);
/// ```
pub fn assemble(src: &str) -> Result<Assembly, AsmErr> {
    assemble_lines(src.lines(), AsmFlags::default())
}

/// Assembles a sequence of SIC/XE source lines.
///
/// Lines are numbered from 1 in the order given.
///
/// # Example
/// ```
/// use sicxe_asm::asm::{assemble_lines, AsmFlags};
///
/// let lines = ["PROG START 1000", "", "LOOP J LOOP"];
/// let flags = AsmFlags { honor_start: true, skip_blank_lines: true, ..Default::default() };
///
/// let asm = assemble_lines(lines, flags).unwrap();
/// assert_eq!(asm.symbol_table().lookup("LOOP"), Some(0x1000));
/// assert_eq!(asm.listing()[2].code(), Some("3F2FFD"));
/// ```
pub fn assemble_lines<I>(lines: I, flags: AsmFlags) -> Result<Assembly, AsmErr>
    where I: IntoIterator,
          I::Item: AsRef<str>
{
    let mut ctx = AssemblyContext::new();
    let stmts = ctx.pass_one(lines, &flags)?;
    let listing = ctx.pass_two(stmts)?;
    let end = ctx.loc;
    ctx.finish();

    Ok(Assembly { symbols: ctx.symbols, listing, start: ctx.start, end })
}

/// Computes how many bytes a line with the given mnemonic and operand occupies.
///
/// This is the computation which drives the location counter in the first pass.
/// Only `RESB`, `RESW`, and `BYTE` look at the operand;
/// every other line is sized by its mnemonic alone.
///
/// # Example
/// ```
/// use sicxe_asm::asm::{assembled_length, AsmErrKind};
///
/// assert_eq!(assembled_length("LDA", "#3"), Ok(3));
/// assert_eq!(assembled_length("+JSUB", "RDREC"), Ok(4));
/// assert_eq!(assembled_length("RESW", "2"), Ok(6));
/// assert_eq!(assembled_length("RESB", "X'10'"), Ok(16));
/// assert_eq!(assembled_length("BYTE", "C'EOF'"), Ok(3));
/// assert_eq!(assembled_length("BASE", "LENGTH"), Ok(0));
/// assert_eq!(assembled_length("WORD", ""), Ok(3));
/// assert_eq!(assembled_length("RESB", "C'ABC'"), Err(AsmErrKind::UnsupportedOperand("RESB")));
/// ```
pub fn assembled_length(mnemonic: &str, operand: &str) -> Result<u32, AsmErrKind> {
    match mnemonic::lookup_extended(mnemonic)? {
        (Mnemonic::Instr(record), extended) => Ok(record.byte_len(extended)),
        (Mnemonic::Directive(kind), _) => match kind.fixed_len() {
            Some(len) => Ok(len),
            None => parse_directive(kind, operand, &AsmFlags::default()).map(|d| d.byte_len()),
        },
    }
}

/// Configuration flags for the assembler.
///
/// The [`Default`] flags assemble source the way the classic SIC/XE listings are written.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct AsmFlags {
    /// The character which marks a comment line, when it is the first character of the line.
    ///
    /// The default is `.`.
    pub comment_marker: char,

    /// Whether `START` sets the initial location counter to its (hexadecimal) operand.
    ///
    /// By default, this is false and the location counter always starts at 0.
    pub honor_start: bool,

    /// Whether blank lines are allowed (and listed as empty comments).
    ///
    /// By default, this is false and blank lines raise [`AsmErrKind::MalformedLine`].
    pub skip_blank_lines: bool,
}
impl Default for AsmFlags {
    fn default() -> Self {
        Self {
            comment_marker: '.',
            honor_start: false,
            skip_blank_lines: false,
        }
    }
}

/// Kinds of errors that can occur from assembling given source code.
///
/// See [`AsmErr`] for this error type with line information included.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmErrKind {
    /// There were multiple labels of the same name (pass 1).
    DuplicateSymbol(String),
    /// The mnemonic is not an instruction or directive.
    UnknownMnemonic(String),
    /// A character literal was given as the count of `RESB` or `RESW`.
    UnsupportedOperand(&'static str),
    /// A literal used a quoting form other than `X'..'` or `C'..'`.
    UnsupportedLiteral,
    /// An operand of the given mnemonic was out of range.
    OperandRange(&'static str, OperandRangeErr),
    /// Indexed addressing was combined with immediate or indirect addressing (pass 2).
    IndexedConflict,
    /// A memory operand could not be addressed by a displacement (pass 2).
    AddressingRange(AddrRangeErr),
    /// A symbol was referenced which was never defined (pass 2).
    UndefinedSymbol(String),
    /// The operand of the given mnemonic did not have the expected form.
    MalformedOperand(&'static str),
    /// The line had no mnemonic.
    MalformedLine,
    /// The label was not a valid symbol name.
    InvalidLabel(String),
    /// The extended marker was used on a mnemonic which has no format 4 form.
    ExtendedNotAllowed(String),
    /// The program does not fit in memory.
    MemoryOverflow,
    /// `START` occurred after code (only when `START` is honored).
    MisplacedStart,
    /// The operand could not be tokenized.
    Lex(LexErr),
}
impl From<LexErr> for AsmErrKind {
    fn from(value: LexErr) -> Self {
        match value {
            LexErr::UnsupportedLiteral | LexErr::UnclosedLiteral => AsmErrKind::UnsupportedLiteral,
            e => AsmErrKind::Lex(e),
        }
    }
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateSymbol(s)    => write!(f, "symbol {s} was defined multiple times"),
            Self::UnknownMnemonic(s)    => write!(f, "unknown mnemonic {s}"),
            Self::UnsupportedOperand(m) => write!(f, "{m} does not support character operands"),
            Self::UnsupportedLiteral    => f.write_str("unsupported literal syntax"),
            Self::OperandRange(m, e)    => write!(f, "operand of {m} is out of range: {e}"),
            Self::IndexedConflict       => f.write_str("indexed addressing cannot be combined with immediate or indirect addressing"),
            Self::AddressingRange(e)    => e.fmt(f),
            Self::UndefinedSymbol(s)    => write!(f, "symbol {s} is not defined"),
            Self::MalformedOperand(m)   => write!(f, "invalid operand for {m}"),
            Self::MalformedLine         => f.write_str("line has no mnemonic"),
            Self::InvalidLabel(s)       => write!(f, "invalid label {s}"),
            Self::ExtendedNotAllowed(s) => write!(f, "{s} does not have an extended format"),
            Self::MemoryOverflow        => f.write_str("program does not fit in memory"),
            Self::MisplacedStart        => f.write_str("START must come before any code"),
            Self::Lex(e)                => e.fmt(f),
        }
    }
}

/// The specific range violation of an [`AsmErrKind::OperandRange`] error.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OperandRangeErr {
    /// A supervisor call number was not in `0..16`.
    Interrupt(i64),
    /// A shift count was not in `1..=16`.
    ShiftCount(i64),
    /// A value did not fit in its field.
    Field(FieldOverflow),
    /// A literal was too large to be used as a value.
    LiteralTooLarge,
}
impl std::fmt::Display for OperandRangeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupt(n)    => write!(f, "interrupt number {n} is not in [0, 15]"),
            Self::ShiftCount(n)   => write!(f, "shift count {n} is not in [1, 16]"),
            Self::Field(e)        => e.fmt(f),
            Self::LiteralTooLarge => f.write_str("literal is too large"),
        }
    }
}

/// Error from assembling given source code.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The 1-based line the error occurred on.
    pub line: usize,
}
impl AsmErr {
    /// Creates a new [`AsmErr`].
    pub fn new(kind: AsmErrKind, line: usize) -> Self {
        AsmErr { kind, line }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::Lex(e) => Some(e),
            AsmErrKind::OperandRange(_, OperandRangeErr::Field(e)) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::DuplicateSymbol(_)    => Some("labels must be unique within a program, try renaming one of the labels".into()),
            AsmErrKind::UnknownMnemonic(_)    => Some("check the spelling of the mnemonic".into()),
            AsmErrKind::UnsupportedOperand(_) => Some("give the count as a decimal number or a X'..' literal".into()),
            AsmErrKind::UnsupportedLiteral    => Some("literals are written X'hex digits' or C'characters', with both quotes".into()),
            AsmErrKind::OperandRange(_, OperandRangeErr::Field(e)) => e.help(),
            AsmErrKind::OperandRange(_, _)    => None,
            AsmErrKind::IndexedConflict       => Some("remove the ,X suffix or the addressing marker".into()),
            AsmErrKind::AddressingRange(AddrRangeErr::NoBase) => Some("declare a BASE near this operand, or use the extended (+) form of this instruction".into()),
            AsmErrKind::AddressingRange(AddrRangeErr::OutOfRange) => Some("move the BASE closer to this operand, or use the extended (+) form of this instruction".into()),
            AsmErrKind::UndefinedSymbol(_)    => Some("try adding this label before an instruction or directive".into()),
            AsmErrKind::MalformedOperand(_)   => None,
            AsmErrKind::MalformedLine         => Some("remove the blank line or turn it into a comment".into()),
            AsmErrKind::InvalidLabel(_)       => Some("labels start with a letter and consist of letters, digits, and underscores".into()),
            AsmErrKind::ExtendedNotAllowed(_) => Some("only format 3 instructions can be extended with +".into()),
            AsmErrKind::MemoryOverflow        => Some(format!("SIC/XE addresses must be below {MEMORY_SIZE:#X}").into()),
            AsmErrKind::MisplacedStart        => Some("move START to the beginning of the program".into()),
            AsmErrKind::Lex(e)                => e.help(),
        }
    }
}

/// The symbol table created in the first assembler pass.
///
/// This maps each label defined in the program to the address it labels.
/// Labels are case-sensitive.
///
/// ## Example
/// ```
/// use sicxe_asm::asm::{AsmErrKind, SymbolTable};
///
/// let mut sym = SymbolTable::new();
/// sym.define("RDREC", 0x1036).unwrap();
/// sym.define("FIRST", 0x0000).unwrap();
///
/// assert_eq!(sym.resolve("RDREC"), Ok(0x1036));
/// assert_eq!(sym.resolve("rdrec"), Err(AsmErrKind::UndefinedSymbol("rdrec".into())));
/// assert_eq!(sym.define("FIRST", 0x0000), Err(AsmErrKind::DuplicateSymbol("FIRST".into())));
///
/// // Iteration is in address order:
/// let names: Vec<_> = sym.iter().map(|(name, _)| name).collect();
/// assert_eq!(names, ["FIRST", "RDREC"]);
/// ```
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SymbolTable {
    /// A mapping from label to address.
    label_map: HashMap<String, u32>,
}
impl SymbolTable {
    /// Creates an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a symbol at the given address.
    ///
    /// This errors if the symbol was already defined, even at the same address.
    pub fn define(&mut self, name: &str, addr: u32) -> Result<(), AsmErrKind> {
        match self.label_map.entry(name.to_string()) {
            Entry::Occupied(e) => Err(AsmErrKind::DuplicateSymbol(e.key().clone())),
            Entry::Vacant(e) => {
                e.insert(addr);
                Ok(())
            }
        }
    }

    /// Gets the address of a symbol, erroring if it is not defined.
    pub fn resolve(&self, name: &str) -> Result<u32, AsmErrKind> {
        self.lookup(name)
            .ok_or_else(|| AsmErrKind::UndefinedSymbol(name.to_string()))
    }

    /// Gets the address of a symbol, if it is defined.
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.label_map.get(name).copied()
    }

    /// Whether the symbol is defined.
    pub fn is_defined(&self, name: &str) -> bool {
        self.label_map.contains_key(name)
    }

    /// The number of symbols in the table.
    pub fn len(&self) -> usize {
        self.label_map.len()
    }

    /// Whether the table has no symbols.
    pub fn is_empty(&self) -> bool {
        self.label_map.is_empty()
    }

    /// Iterates over every symbol and its address, ordered by address
    /// (and by name, for symbols sharing an address).
    pub fn iter(&self) -> impl Iterator<Item=(&str, u32)> + '_ {
        let mut entries: Vec<_> = self.label_map.iter()
            .map(|(name, &addr)| (name.as_str(), addr))
            .collect();
        entries.sort_by_key(|&(name, addr)| (addr, name));
        entries.into_iter()
    }
}
impl std::fmt::Display for SymbolTable {
    /// Writes the symbol report: one right-aligned symbol and its address per line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, addr) in self.iter() {
            writeln!(f, "{name:>10}: {addr:05X}")?;
        }
        Ok(())
    }
}

impl StmtKind {
    /// How many bytes this statement occupies in memory.
    pub fn byte_len(&self) -> u32 {
        match self {
            StmtKind::Comment      => 0,
            StmtKind::Directive(d) => d.byte_len(),
            StmtKind::Instr(i)     => i.record.byte_len(i.extended),
        }
    }
}
impl Directive {
    /// How many bytes this directive occupies in memory.
    fn byte_len(&self) -> u32 {
        match self {
            Directive::Start(_) => 0,
            Directive::End      => 0,
            Directive::Base(_)  => 0,
            Directive::NoBase   => 0,
            Directive::Resb(n)  => *n,
            Directive::Resw(n)  => 3 * n, // parse assures 3n fits in memory
            Directive::Word(_)  => 3,
            Directive::Byte(h)  => h.len() as u32 / 2,
        }
    }
}

/// A single line of the assembly listing.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum ListingLine {
    /// A comment line (or a skipped blank line).
    Comment {
        /// The 1-based source line.
        line: usize,
        /// The full text of the line.
        text: String,
    },
    /// An instruction or directive.
    Stmt {
        /// The 1-based source line.
        line: usize,
        /// The address of the statement.
        ///
        /// This is `None` for `START`, `END`, `BASE`, and `NOBASE`.
        address: Option<u32>,
        /// The label, if one was present.
        label: Option<String>,
        /// The mnemonic as written.
        mnemonic: String,
        /// The operand text as written.
        operand: String,
        /// The object code, in hex digits.
        ///
        /// This is empty for statements which produce no object code.
        code: String,
    },
}
impl ListingLine {
    /// The 1-based source line of this listing line.
    pub fn line(&self) -> usize {
        match self {
            ListingLine::Comment { line, .. } | ListingLine::Stmt { line, .. } => *line,
        }
    }

    /// The address of this listing line, if it has one.
    pub fn address(&self) -> Option<u32> {
        match self {
            ListingLine::Comment { .. } => None,
            ListingLine::Stmt { address, .. } => *address,
        }
    }

    /// The object code of this listing line, if it produced any.
    pub fn code(&self) -> Option<&str> {
        match self {
            ListingLine::Stmt { code, .. } if !code.is_empty() => Some(code),
            _ => None,
        }
    }
}
impl std::fmt::Display for ListingLine {
    /// Writes the line in tab-separated listing form:
    /// `address label mnemonic operand code`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingLine::Comment { text, .. } => write!(f, "\t{text}"),
            ListingLine::Stmt { address, label, mnemonic, operand, code, .. } => {
                if let Some(addr) = address {
                    write!(f, "{addr:05X}")?;
                }
                let label = label.as_deref().unwrap_or("");
                write!(f, "\t{label}\t{mnemonic}\t{operand}\t{code}")
            },
        }
    }
}

/// The result of assembling a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Assembly {
    symbols: SymbolTable,
    listing: Vec<ListingLine>,
    /// The starting address.
    start: u32,
    /// The address after the last byte.
    end: u32,
}
impl Assembly {
    /// The symbol table of the program.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The listing, which has one line per source line.
    pub fn listing(&self) -> &[ListingLine] {
        &self.listing
    }

    /// The address the program starts at.
    pub fn start_address(&self) -> u32 {
        self.start
    }

    /// The number of bytes the program occupies (including reserved space).
    pub fn program_length(&self) -> u32 {
        self.end - self.start
    }

    /// Iterates over the object code of each line which produced some, paired with its address.
    pub fn object_code(&self) -> impl Iterator<Item=(u32, &str)> + '_ {
        self.listing.iter()
            .filter_map(|l| Some((l.address()?, l.code()?)))
    }
}

/// The assembler passes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Pass {
    One,
    Two,
    Done,
}

/// The state threaded through both assembler passes.
#[derive(Debug)]
struct AssemblyContext {
    symbols: SymbolTable,
    /// The location counter.
    loc: u32,
    /// The starting address of the program.
    start: u32,
    /// The base register value, as declared by `BASE`.
    base: Option<u32>,
    pass: Pass,
}
impl AssemblyContext {
    fn new() -> Self {
        Self { symbols: SymbolTable::new(), loc: 0, start: 0, base: None, pass: Pass::One }
    }

    /// Resets the per-pass state for the next pass.
    fn begin(&mut self, pass: Pass) {
        log::debug!("beginning pass {pass:?}");
        self.pass = pass;
        self.loc = 0;
        self.start = 0;
        self.base = None;
    }

    fn finish(&mut self) {
        log::debug!("assembly done: {} symbols, {:#X} bytes", self.symbols.len(), self.loc - self.start);
        self.pass = Pass::Done;
    }

    /// Moves the location counter to the start of the program.
    fn start_at(&mut self, start: u32) -> Result<(), AsmErrKind> {
        if self.loc != 0 { return Err(AsmErrKind::MisplacedStart); }
        self.loc = start;
        self.start = start;
        Ok(())
    }

    /// Moves the location counter past `n` bytes, failing if that would leave memory.
    fn advance(&mut self, n: u32) -> Result<(), AsmErrKind> {
        self.loc = self.loc.checked_add(n)
            .filter(|&loc| loc <= MEMORY_SIZE)
            .ok_or(AsmErrKind::MemoryOverflow)?;
        Ok(())
    }

    /// The first pass, which parses every line and defines every label.
    ///
    /// Lines are handled in order, so the first failing line is the one reported.
    fn pass_one<I>(&mut self, lines: I, flags: &AsmFlags) -> Result<Vec<Stmt>, AsmErr>
        where I: IntoIterator,
              I::Item: AsRef<str>
    {
        self.begin(Pass::One);

        let mut stmts = vec![];
        for (i, text) in lines.into_iter().enumerate() {
            let stmt = parse_line(text.as_ref(), i + 1, flags)?;
            self.define_step(&stmt)
                .map_err(|e| AsmErr::new(e, stmt.line))?;
            stmts.push(stmt);
        }

        log::debug!("pass one complete: {} symbols, location counter at {:05X}", self.symbols.len(), self.loc);
        Ok(stmts)
    }

    fn define_step(&mut self, stmt: &Stmt) -> Result<(), AsmErrKind> {
        if let StmtKind::Directive(Directive::Start(Some(start))) = stmt.kind {
            self.start_at(start)?;
        }
        if let Some(label) = &stmt.label {
            self.symbols.define(label, self.loc)?;
        }
        self.advance(stmt.kind.byte_len())
    }

    /// The second pass, which encodes every line.
    fn pass_two(&mut self, stmts: Vec<Stmt>) -> Result<Vec<ListingLine>, AsmErr> {
        debug_assert_eq!(self.pass, Pass::One, "pass two must follow pass one");
        self.begin(Pass::Two);

        stmts.into_iter()
            .map(|stmt| {
                let line = stmt.line;
                self.encode_step(stmt).map_err(|e| AsmErr::new(e, line))
            })
            .collect()
    }

    fn encode_step(&mut self, stmt: Stmt) -> Result<ListingLine, AsmErrKind> {
        let Stmt { line, label, mnemonic, operand, kind } = stmt;
        let loc = self.loc;
        let len = kind.byte_len();

        let (address, code) = match &kind {
            StmtKind::Comment => return Ok(ListingLine::Comment { line, text: mnemonic }),
            StmtKind::Instr(instr) => {
                let code = instr.encode(loc + len, &self.symbols, self.base)?;
                (Some(loc), code.to_hex())
            },
            StmtKind::Directive(d) => {
                match d {
                    Directive::Start(Some(start)) => self.start_at(*start)?,
                    Directive::Base(value) => {
                        let base = value_of("BASE", value, &self.symbols)?;
                        let base = u32::try_from(base).ok()
                            .filter(|&b| b < MEMORY_SIZE)
                            .ok_or(AsmErrKind::OperandRange("BASE", OperandRangeErr::Field(FieldOverflow { value: base, width: 20 })))?;
                        log::debug!("line {line}: BASE set to {base:05X}");
                        self.base = Some(base);
                    },
                    Directive::NoBase => {
                        log::debug!("line {line}: BASE cleared");
                        self.base = None;
                    },
                    _ => {},
                }

                let address = d.kind().has_address().then_some(self.loc);
                (address, d.encode(&self.symbols)?.unwrap_or_default())
            },
        };

        log::trace!("line {line}: {:05X} {mnemonic} {operand} => {code}", self.loc);
        self.advance(len)?;

        Ok(ListingLine::Stmt { line, address, label, mnemonic, operand, code })
    }
}
