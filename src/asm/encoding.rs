//! Encoding parsed statements into object code.
//!
//! Instructions are encoded by format:
//! - Format 1: `opcode:8`
//! - Format 2: `opcode:8 r1:4 r2:4`
//! - Format 3: `opcode:6 nixbpe:6 disp:12`
//! - Format 4: `opcode:6 nixbpe:6 addr:20`
//!
//! Of the directives, only `WORD` and `BYTE` produce object code.

use crate::ast::mnemonic::{Format, InstrRecord, OperandKind};
use crate::ast::{Directive, Field, Instr, Marker, Operand, Value};

use super::addressing::{resolve, value_of, Flags};
use super::bits::BitField;
use super::{AsmErrKind, OperandRangeErr, SymbolTable};

/// The width of a format 3 displacement.
const DISP_WIDTH: u32 = 12;
/// The width of a format 4 address.
const ADDR_WIDTH: u32 = 20;
/// The width of a `WORD`.
const WORD_WIDTH: u32 = 24;

impl Instr {
    /// Encodes this instruction.
    ///
    /// Parameters:
    /// - `next`: The address of the instruction following this one
    /// - `symbols`: The symbol table
    /// - `base`: The current base register value, if one is declared
    ///
    /// # Example
    ///
    /// ```
    /// use sicxe_asm::asm::SymbolTable;
    /// use sicxe_asm::parse::parse_line;
    /// use sicxe_asm::ast::StmtKind;
    ///
    /// let stmt = parse_line("    +LDT  #4096", 1, &Default::default()).unwrap();
    /// let StmtKind::Instr(instr) = stmt.kind else { unreachable!() };
    ///
    /// let code = instr.encode(0x1044, &SymbolTable::new(), None).unwrap();
    /// assert_eq!(code.to_hex(), "75101000");
    /// ```
    pub fn encode(&self, next: u32, symbols: &SymbolTable, base: Option<u32>) -> Result<BitField, AsmErrKind> {
        let record = self.record;
        let opcode = BitField::new_trunc(u64::from(record.opcode), 8);

        match (record.format, &self.operand) {
            (Format::One, _) => Ok(opcode),
            (Format::Two, Operand::Fields(fields)) => {
                let [r1, r2] = encode_fields(record, fields)?;
                Ok(opcode.concat(r1).concat(r2))
            },
            // RSUB
            (Format::Three, Operand::None) => {
                let flags = Flags::compose(Marker::Simple, false, self.extended)?;
                Ok(format34(record, flags, BitField::new_trunc(0, field_width(self.extended))))
            },
            (Format::Three, Operand::Memory(op)) => {
                let resolved = resolve(record, op, self.extended, next, symbols, base)?;
                let field = BitField::new(resolved.target.field_value(), field_width(self.extended))
                    .map_err(|e| AsmErrKind::OperandRange(record.name, OperandRangeErr::Field(e)))?;

                Ok(format34(record, resolved.flags, field))
            },
            _ => Err(AsmErrKind::MalformedOperand(record.name)),
        }
    }
}

/// The width of the address field of a format 3 (or, if extended, format 4) instruction.
fn field_width(extended: bool) -> u32 {
    match extended {
        true  => ADDR_WIDTH,
        false => DISP_WIDTH,
    }
}

/// Assembles the header and address field of a format 3 or format 4 instruction.
fn format34(record: &InstrRecord, flags: Flags, field: BitField) -> BitField {
    BitField::new_trunc(u64::from(record.opcode >> 2), 6)
        .concat(BitField::new_trunc(u64::from(flags.bits()), 6))
        .concat(field)
}

/// Encodes the two 4-bit operand fields of a format 2 instruction.
///
/// Missing trailing fields are zero.
fn encode_fields(record: &'static InstrRecord, fields: &[Field]) -> Result<[BitField; 2], AsmErrKind> {
    if fields.len() != record.shape.len() {
        return Err(AsmErrKind::MalformedOperand(record.name));
    }

    let mut nibbles = [BitField::new_trunc(0, 4); 2];
    for (slot, (&kind, &field)) in nibbles.iter_mut().zip(std::iter::zip(record.shape, fields)) {
        let value = match (kind, field) {
            (OperandKind::Register, Field::Reg(r)) => r.code(),
            (OperandKind::Interrupt, Field::Count(n)) => match n {
                0..=15 => n as u8,
                _ => return Err(AsmErrKind::OperandRange(record.name, OperandRangeErr::Interrupt(n))),
            },
            (OperandKind::ShiftCount, Field::Count(n)) => match n {
                1..=16 => (n - 1) as u8,
                _ => return Err(AsmErrKind::OperandRange(record.name, OperandRangeErr::ShiftCount(n))),
            },
            _ => return Err(AsmErrKind::MalformedOperand(record.name)),
        };
        *slot = BitField::new_trunc(u64::from(value), 4);
    }

    Ok(nibbles)
}

impl Directive {
    /// Encodes the data of this directive into hex digits.
    ///
    /// This is `None` for directives which do not produce object code.
    ///
    /// # Example
    ///
    /// ```
    /// use sicxe_asm::asm::SymbolTable;
    /// use sicxe_asm::ast::{Directive, Value};
    ///
    /// let symbols = SymbolTable::new();
    /// assert_eq!(Directive::Word(Value::Number(-1)).encode(&symbols), Ok(Some("FFFFFF".to_string())));
    /// assert_eq!(Directive::Byte("454F46".to_string()).encode(&symbols), Ok(Some("454F46".to_string())));
    /// assert_eq!(Directive::Resw(3).encode(&symbols), Ok(None));
    /// ```
    pub fn encode(&self, symbols: &SymbolTable) -> Result<Option<String>, AsmErrKind> {
        const WORD: &str = "WORD";

        match self {
            Directive::Word(Value::Literal(lit)) => {
                let hex = lit.to_hex();
                let digits = (WORD_WIDTH / 4) as usize;
                match hex.len() <= digits {
                    true  => Ok(Some(format!("{hex:0>digits$}"))),
                    false => Err(AsmErrKind::OperandRange(WORD, OperandRangeErr::LiteralTooLarge)),
                }
            },
            Directive::Word(value) => {
                let value = value_of(WORD, value, symbols)?;
                let field = BitField::new(value, WORD_WIDTH)
                    .map_err(|e| AsmErrKind::OperandRange(WORD, OperandRangeErr::Field(e)))?;
                Ok(Some(field.to_hex()))
            },
            Directive::Byte(hex) => Ok(Some(hex.clone())),
            Directive::Start(_)
            | Directive::End
            | Directive::Base(_)
            | Directive::NoBase
            | Directive::Resb(_)
            | Directive::Resw(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::bits::FieldOverflow;
    use crate::asm::{AsmErrKind, AsmFlags, OperandRangeErr, SymbolTable};
    use crate::ast::{Directive, Literal, StmtKind, Value};
    use crate::parse::parse_line;

    fn encode(line: &str, next: u32, symbols: &SymbolTable, base: Option<u32>) -> Result<String, AsmErrKind> {
        let stmt = parse_line(line, 1, &AsmFlags::default()).unwrap();
        let StmtKind::Instr(instr) = stmt.kind else {
            panic!("{line:?} is not an instruction");
        };
        instr.encode(next, symbols, base).map(|b| b.to_hex())
    }
    fn encode_ok(line: &str) -> String {
        encode(line, 0, &SymbolTable::new(), None).unwrap()
    }
    fn encode_err(line: &str) -> AsmErrKind {
        encode(line, 0, &SymbolTable::new(), None).unwrap_err()
    }

    #[test]
    fn test_format1() {
        assert_eq!(encode_ok("    FIX"), "C4");
        assert_eq!(encode_ok("    SIO"), "F0");
        assert_eq!(encode_ok("    NORM"), "C8");
    }

    #[test]
    fn test_format2() {
        assert_eq!(encode_ok("    CLEAR X"), "B410");
        assert_eq!(encode_ok("    COMPR A,S"), "A004");
        assert_eq!(encode_ok("    TIXR  T"), "B850");
        assert_eq!(encode_ok("    RMO   SW,PC"), "AC98");
        assert_eq!(encode_ok("    SHIFTL T,4"), "A453");
        assert_eq!(encode_ok("    SHIFTR A,16"), "A80F");
        assert_eq!(encode_ok("    SHIFTR A,1"), "A800");
    }

    #[test]
    fn test_svc() {
        assert_eq!(encode_ok("    SVC 15"), "B0F0");
        assert_eq!(encode_ok("    SVC 0"), "B000");
        assert_eq!(encode_err("    SVC 16"), AsmErrKind::OperandRange("SVC", OperandRangeErr::Interrupt(16)));
        assert_eq!(encode_err("    SVC -1"), AsmErrKind::OperandRange("SVC", OperandRangeErr::Interrupt(-1)));
    }

    #[test]
    fn test_shift_range() {
        assert_eq!(encode_err("    SHIFTL A,0"), AsmErrKind::OperandRange("SHIFTL", OperandRangeErr::ShiftCount(0)));
        assert_eq!(encode_err("    SHIFTR A,17"), AsmErrKind::OperandRange("SHIFTR", OperandRangeErr::ShiftCount(17)));
    }

    #[test]
    fn test_rsub() {
        assert_eq!(encode_ok("    RSUB"), "4F0000");
        assert_eq!(encode_ok("    +RSUB"), "4F100000");
    }

    #[test]
    fn test_format3() {
        let mut symbols = SymbolTable::new();
        symbols.define("RETADR", 0x30).unwrap();
        symbols.define("LENGTH", 0x33).unwrap();
        symbols.define("BUFFER", 0x36).unwrap();

        assert_eq!(encode("FIRST STL RETADR", 0x003, &symbols, None), Ok("17202D".into()));
        assert_eq!(encode("    LDB   #LENGTH", 0x006, &symbols, None), Ok("69202D".into()));
        assert_eq!(encode("    J     @RETADR", 0x02D, &symbols, None), Ok("3E2003".into()));
        assert_eq!(encode("    COMP  #0", 0x013, &symbols, None), Ok("290000".into()));
        assert_eq!(encode("    LDA   #3", 0x023, &symbols, None), Ok("010003".into()));
        assert_eq!(encode("    STCH  BUFFER,X", 0x1054, &symbols, Some(0x33)), Ok("57C003".into()));
        assert_eq!(encode("EXIT STX LENGTH", 0x1059, &symbols, Some(0x33)), Ok("134000".into()));
    }

    #[test]
    fn test_format4() {
        let mut symbols = SymbolTable::new();
        symbols.define("RDREC", 0x1036).unwrap();

        assert_eq!(encode("CLOOP +JSUB RDREC", 0x00A, &symbols, None), Ok("4B101036".into()));
        assert_eq!(encode("    +LDT #4096", 0x1044, &symbols, None), Ok("75101000".into()));
        assert_eq!(encode("    +LDA @RDREC", 0, &symbols, None), Ok("02101036".into()));
    }

    #[test]
    fn test_immediate_overflow() {
        assert_eq!(
            encode_err("    LDA #4096"),
            AsmErrKind::OperandRange("LDA", OperandRangeErr::Field(FieldOverflow { value: 4096, width: 12 }))
        );
        assert_eq!(
            encode_err("    +LDA #1048576"),
            AsmErrKind::OperandRange("LDA", OperandRangeErr::Field(FieldOverflow { value: 0x100000, width: 20 }))
        );
        assert_eq!(encode_ok("    LDA #-1"), "010FFF");
    }

    #[test]
    fn test_word() {
        let mut symbols = SymbolTable::new();
        symbols.define("BUFFER", 0x36).unwrap();

        let word = |v: Value| Directive::Word(v).encode(&symbols);
        assert_eq!(word(Value::Number(5)), Ok(Some("000005".into())));
        assert_eq!(word(Value::Number(-1)), Ok(Some("FFFFFF".into())));
        assert_eq!(word(Value::Symbol("BUFFER".into())), Ok(Some("000036".into())));
        assert_eq!(word(Value::Literal(Literal::Hex("FF".into()))), Ok(Some("0000FF".into())));
        assert_eq!(word(Value::Literal(Literal::Char("AB".into()))), Ok(Some("004142".into())));

        assert_eq!(
            word(Value::Number(1 << 24)),
            Err(AsmErrKind::OperandRange("WORD", OperandRangeErr::Field(FieldOverflow { value: 1 << 24, width: 24 })))
        );
        assert_eq!(
            word(Value::Literal(Literal::Hex("1234567".into()))),
            Err(AsmErrKind::OperandRange("WORD", OperandRangeErr::LiteralTooLarge))
        );
        assert_eq!(word(Value::Symbol("NOWHERE".into())), Err(AsmErrKind::UndefinedSymbol("NOWHERE".into())));
    }
}
