//! Parsing SIC/XE source lines into statements.
//!
//! A source line is split into whitespace-separated fields (whitespace inside a
//! quoted literal does not split). The line then consists of:
//! - a label, if the line starts with a letter in its first column,
//! - a mnemonic, and
//! - an operand, if one is present.
//!
//! Any fields after the operand are remarks and are ignored.
//! A line starting with the comment marker (`.` by default) is a comment.
//!
//! The operand text is tokenized with [`lex`] and parsed according to
//! what the mnemonic expects.
//!
//! # Example
//!
//! ```
//! use sicxe_asm::parse::parse_line;
//! use sicxe_asm::ast::StmtKind;
//!
//! let stmt = parse_line("CLOOP  +JSUB  RDREC", 3, &Default::default()).unwrap();
//! assert_eq!(stmt.label.as_deref(), Some("CLOOP"));
//! assert_eq!(stmt.mnemonic, "+JSUB");
//! assert_eq!(stmt.operand, "RDREC");
//! assert!(matches!(stmt.kind, StmtKind::Instr(_)));
//! ```

pub mod lex;

use crate::asm::bits::BitField;
use crate::asm::{AsmErr, AsmErrKind, AsmFlags, OperandRangeErr, MEMORY_SIZE};
use crate::ast::mnemonic::{self, DirectiveKind, InstrRecord, Mnemonic, OperandKind};
use crate::ast::{Directive, Field, Instr, Literal, Marker, MemOperand, Operand, Stmt, StmtKind, Value};

use lex::{tokenize, Token};

/// Checks that a label is a letter followed by letters, digits, and underscores.
fn is_valid_label(label: &str) -> bool {
    let mut chars = label.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parses a single source line.
///
/// Parameters:
/// - `text`: The line, without its line terminator
/// - `line`: The 1-based line number, used for errors
/// - `flags`: The assembler configuration
///
/// This errors if the line is blank (unless [`AsmFlags::skip_blank_lines`] is set),
/// if the mnemonic is unknown, or if the operand does not match what the mnemonic expects.
pub fn parse_line(text: &str, line: usize, flags: &AsmFlags) -> Result<Stmt, AsmErr> {
    let comment = |text: &str| Stmt {
        line,
        label: None,
        mnemonic: text.to_string(),
        operand: String::new(),
        kind: StmtKind::Comment,
    };

    if text.starts_with(flags.comment_marker) {
        return Ok(comment(text));
    }

    let fields = lex::fields(text);
    if fields.is_empty() {
        return match flags.skip_blank_lines {
            true  => Ok(comment(text)),
            false => Err(AsmErr::new(AsmErrKind::MalformedLine, line)),
        };
    }

    // A lone field is always the mnemonic.
    let has_label = fields.len() > 1 && text.starts_with(|c: char| c.is_ascii_alphabetic());
    let (label, rest) = match has_label {
        true  => (Some(fields[0]), &fields[1..]),
        false => (None, &fields[..]),
    };
    if let Some(label) = label {
        if !is_valid_label(label) {
            return Err(AsmErr::new(AsmErrKind::InvalidLabel(label.to_string()), line));
        }
    }

    let mnemonic = rest[0];
    let operand = rest.get(1).copied().unwrap_or("");
    let kind = parse_kind(mnemonic, operand, flags)
        .map_err(|e| AsmErr::new(e, line))?;

    Ok(Stmt {
        line,
        label: label.map(str::to_string),
        mnemonic: mnemonic.to_string(),
        operand: operand.to_string(),
        kind,
    })
}

/// Parses the mnemonic and operand of a line.
fn parse_kind(mnemonic: &str, operand: &str, flags: &AsmFlags) -> Result<StmtKind, AsmErrKind> {
    match mnemonic::lookup_extended(mnemonic)? {
        (Mnemonic::Directive(d), _) => parse_directive(d, operand, flags).map(StmtKind::Directive),
        (Mnemonic::Instr(record), extended) => {
            let operand = parse_operand(record, operand)?;
            Ok(StmtKind::Instr(Instr { record, extended, operand }))
        },
    }
}

fn parse_value(token: &Token) -> Option<Value> {
    match token {
        Token::Decimal(n) => Some(Value::Number(*n)),
        Token::Ident(s)   => Some(Value::Symbol(s.clone())),
        Token::Literal(l) => Some(Value::Literal(l.clone())),
        _ => None,
    }
}

/// Parses an operand consisting of exactly one value.
fn parse_single_value(name: &'static str, text: &str) -> Result<Value, AsmErrKind> {
    match tokenize(text)?.as_slice() {
        [token] => parse_value(token).ok_or(AsmErrKind::MalformedOperand(name)),
        _ => Err(AsmErrKind::MalformedOperand(name)),
    }
}

/// Parses the operand of an instruction according to its shape.
fn parse_operand(record: &'static InstrRecord, text: &str) -> Result<Operand, AsmErrKind> {
    match record.shape {
        [] => Ok(Operand::None),
        [OperandKind::Memory] => parse_memory(record.name, &tokenize(text)?).map(Operand::Memory),
        shape => parse_fields(record.name, shape, &tokenize(text)?).map(Operand::Fields),
    }
}

fn parse_memory(name: &'static str, tokens: &[Token]) -> Result<MemOperand, AsmErrKind> {
    let (marker, rest) = match tokens {
        [Token::Hash, rest @ ..] => (Marker::Immediate, rest),
        [Token::At, rest @ ..]   => (Marker::Indirect, rest),
        rest => (Marker::Simple, rest),
    };
    let (value, indexed) = match rest {
        [value] => (value, false),
        [value, Token::Comma, Token::Ident(x)] if x.eq_ignore_ascii_case("X") => (value, true),
        _ => return Err(AsmErrKind::MalformedOperand(name)),
    };
    let value = parse_value(value).ok_or(AsmErrKind::MalformedOperand(name))?;

    Ok(MemOperand { marker, value, indexed })
}

fn parse_fields(name: &'static str, shape: &[OperandKind], tokens: &[Token]) -> Result<Vec<Field>, AsmErrKind> {
    let malformed = || AsmErrKind::MalformedOperand(name);
    let mut tokens = tokens.iter();
    let mut fields = Vec::with_capacity(shape.len());

    for (i, &kind) in shape.iter().enumerate() {
        if i > 0 && tokens.next() != Some(&Token::Comma) {
            return Err(malformed());
        }
        let field = match (kind, tokens.next()) {
            (OperandKind::Register, Some(Token::Ident(r))) => Field::Reg(r.parse().map_err(|_| malformed())?),
            (OperandKind::ShiftCount | OperandKind::Interrupt, Some(&Token::Decimal(n))) => Field::Count(n),
            _ => return Err(malformed()),
        };
        fields.push(field);
    }
    if tokens.next().is_some() {
        return Err(malformed());
    }

    Ok(fields)
}

pub(crate) fn parse_directive(kind: DirectiveKind, text: &str, flags: &AsmFlags) -> Result<Directive, AsmErrKind> {
    let name = kind.name();

    match kind {
        DirectiveKind::Start if flags.honor_start => {
            let start = u32::from_str_radix(text, 16)
                .map_err(|_| AsmErrKind::MalformedOperand(name))?;
            match start < MEMORY_SIZE {
                true  => Ok(Directive::Start(Some(start))),
                false => Err(AsmErrKind::MemoryOverflow),
            }
        },
        DirectiveKind::Start  => Ok(Directive::Start(None)),
        DirectiveKind::End    => Ok(Directive::End),
        DirectiveKind::Base   => parse_single_value(name, text).map(Directive::Base),
        DirectiveKind::NoBase => Ok(Directive::NoBase),
        DirectiveKind::Resb   => reserve_count(name, text, 1).map(Directive::Resb),
        DirectiveKind::Resw   => reserve_count(name, text, 3).map(Directive::Resw),
        DirectiveKind::Word   => parse_single_value(name, text).map(Directive::Word),
        DirectiveKind::Byte   => match parse_single_value(name, text)? {
            Value::Literal(lit) => {
                let hex = lit.to_hex();
                match hex.len() % 2 == 0 {
                    true  => Ok(Directive::Byte(hex)),
                    false => Err(AsmErrKind::MalformedOperand(name)),
                }
            },
            Value::Number(n) => BitField::new(n, 8)
                .map(|b| Directive::Byte(b.to_hex()))
                .map_err(|e| AsmErrKind::OperandRange(name, OperandRangeErr::Field(e))),
            Value::Symbol(_) => Err(AsmErrKind::MalformedOperand(name)),
        }
    }
}

/// Parses the count of a `RESB` or `RESW` directive.
///
/// The count is either a decimal number or the numeric value of a hex literal.
/// The reserved region (`count * unit` bytes) must fit in memory.
fn reserve_count(name: &'static str, text: &str, unit: u32) -> Result<u32, AsmErrKind> {
    let count = match parse_single_value(name, text)? {
        Value::Number(n) if n < 0 => return Err(AsmErrKind::MalformedOperand(name)),
        Value::Number(n) => n,
        Value::Literal(lit @ Literal::Hex(_)) => lit.value().ok_or(AsmErrKind::MemoryOverflow)?,
        Value::Literal(Literal::Char(_)) => return Err(AsmErrKind::UnsupportedOperand(name)),
        Value::Symbol(_) => return Err(AsmErrKind::MalformedOperand(name)),
    };

    u32::try_from(count).ok()
        .filter(|&n| n.checked_mul(unit).is_some_and(|len| len <= MEMORY_SIZE))
        .ok_or(AsmErrKind::MemoryOverflow)
}

#[cfg(test)]
mod tests {
    use super::parse_line;
    use crate::asm::bits::FieldOverflow;
    use crate::asm::{AsmErrKind, AsmFlags, OperandRangeErr};
    use crate::ast::{Directive, Field, Literal, Marker, MemOperand, Operand, Reg, StmtKind, Value};

    fn parse(text: &str) -> Result<StmtKind, AsmErrKind> {
        parse_line(text, 1, &AsmFlags::default())
            .map(|s| s.kind)
            .map_err(|e| e.kind)
    }
    fn directive(text: &str) -> Result<Directive, AsmErrKind> {
        match parse(text)? {
            StmtKind::Directive(d) => Ok(d),
            k => panic!("expected {text:?} to be a directive, got {k:?}"),
        }
    }
    fn operand(text: &str) -> Result<Operand, AsmErrKind> {
        match parse(text)? {
            StmtKind::Instr(i) => Ok(i.operand),
            k => panic!("expected {text:?} to be an instruction, got {k:?}"),
        }
    }

    #[test]
    fn test_label_detection() {
        let s = parse_line("FIRST STL RETADR", 1, &AsmFlags::default()).unwrap();
        assert_eq!((s.label.as_deref(), &*s.mnemonic, &*s.operand), (Some("FIRST"), "STL", "RETADR"));

        let s = parse_line("    STL RETADR", 1, &AsmFlags::default()).unwrap();
        assert_eq!((s.label.as_deref(), &*s.mnemonic, &*s.operand), (None, "STL", "RETADR"));

        let s = parse_line("RETADR RESW 1 return address", 1, &AsmFlags::default()).unwrap();
        assert_eq!((s.label.as_deref(), &*s.mnemonic, &*s.operand), (Some("RETADR"), "RESW", "1"));

        let s = parse_line("RSUB", 1, &AsmFlags::default()).unwrap();
        assert_eq!((s.label.as_deref(), &*s.mnemonic, &*s.operand), (None, "RSUB", ""));

        let s = parse_line("   J  CLOOP  loop again", 1, &AsmFlags::default()).unwrap();
        assert_eq!((s.label.as_deref(), &*s.mnemonic, &*s.operand), (None, "J", "CLOOP"));

        assert_eq!(parse("LOOP: J LOOP"), Err(AsmErrKind::InvalidLabel("LOOP:".into())));
    }

    #[test]
    fn test_comment_and_blank() {
        let s = parse_line(". this is a comment", 4, &AsmFlags::default()).unwrap();
        assert_eq!(s.kind, StmtKind::Comment);
        assert_eq!(s.mnemonic, ". this is a comment");

        assert_eq!(parse(""), Err(AsmErrKind::MalformedLine));
        assert_eq!(parse(" \t "), Err(AsmErrKind::MalformedLine));

        let flags = AsmFlags { skip_blank_lines: true, ..Default::default() };
        assert_eq!(parse_line("   ", 1, &flags).unwrap().kind, StmtKind::Comment);

        let flags = AsmFlags { comment_marker: '*', ..Default::default() };
        assert_eq!(parse_line("* comment", 1, &flags).unwrap().kind, StmtKind::Comment);
        assert!(parse_line(". comment", 1, &flags).is_err());
    }

    #[test]
    fn test_memory_operand() {
        let mem = |marker, value, indexed| Ok(Operand::Memory(MemOperand { marker, value, indexed }));

        assert_eq!(operand("  LDA  #3"), mem(Marker::Immediate, Value::Number(3), false));
        assert_eq!(operand("  J    @RETADR"), mem(Marker::Indirect, Value::Symbol("RETADR".into()), false));
        assert_eq!(operand("  STCH BUFFER,X"), mem(Marker::Simple, Value::Symbol("BUFFER".into()), true));
        assert_eq!(operand("  LDCH BUFFER,x"), mem(Marker::Simple, Value::Symbol("BUFFER".into()), true));
        assert_eq!(operand("  LDA  X'1F'"), mem(Marker::Simple, Value::Literal(Literal::Hex("1F".into())), false));
        // Indexed conflicts are caught by the resolver, not the parser
        assert_eq!(operand("  LDA  #BUF,X"), mem(Marker::Immediate, Value::Symbol("BUF".into()), true));

        assert_eq!(operand("  LDA"), Err(AsmErrKind::MalformedOperand("LDA")));
        assert_eq!(operand("  LDA  A,S"), Err(AsmErrKind::MalformedOperand("LDA")));
        assert_eq!(operand("  LDA  #"), Err(AsmErrKind::MalformedOperand("LDA")));
        assert_eq!(operand("  LDA  BUF,T"), Err(AsmErrKind::MalformedOperand("LDA")));
        assert_eq!(operand("  LDA  B'01'"), Err(AsmErrKind::UnsupportedLiteral));
        assert_eq!(operand("  LDA  C'EOF"), Err(AsmErrKind::UnsupportedLiteral));
    }

    #[test]
    fn test_field_operands() {
        assert_eq!(operand("  COMPR A,S"), Ok(Operand::Fields(vec![Field::Reg(Reg::A), Field::Reg(Reg::S)])));
        assert_eq!(operand("  CLEAR x"), Ok(Operand::Fields(vec![Field::Reg(Reg::X)])));
        assert_eq!(operand("  SHIFTL T,4"), Ok(Operand::Fields(vec![Field::Reg(Reg::T), Field::Count(4)])));
        assert_eq!(operand("  SVC 15"), Ok(Operand::Fields(vec![Field::Count(15)])));

        assert_eq!(operand("  COMPR A"), Err(AsmErrKind::MalformedOperand("COMPR")));
        assert_eq!(operand("  COMPR A,S,T"), Err(AsmErrKind::MalformedOperand("COMPR")));
        assert_eq!(operand("  CLEAR F"), Err(AsmErrKind::MalformedOperand("CLEAR")));
        assert_eq!(operand("  CLEAR 1"), Err(AsmErrKind::MalformedOperand("CLEAR")));
        assert_eq!(operand("  SVC A"), Err(AsmErrKind::MalformedOperand("SVC")));
        assert_eq!(operand("  SHIFTL T4"), Err(AsmErrKind::MalformedOperand("SHIFTL")));
    }

    #[test]
    fn test_ignored_operand() {
        assert_eq!(operand("  RSUB"), Ok(Operand::None));
        assert_eq!(operand("  RSUB  X"), Ok(Operand::None));
        assert_eq!(operand("  FIX   whatever"), Ok(Operand::None));
    }

    #[test]
    fn test_extended() {
        let StmtKind::Instr(i) = parse("  +JSUB RDREC").unwrap() else { panic!() };
        assert!(i.extended);
        assert_eq!(i.record.name, "JSUB");

        assert_eq!(parse("  +CLEAR X"), Err(AsmErrKind::ExtendedNotAllowed("+CLEAR".into())));
        assert_eq!(parse("  +FIX"), Err(AsmErrKind::ExtendedNotAllowed("+FIX".into())));
        assert_eq!(parse("  +WORD 3"), Err(AsmErrKind::ExtendedNotAllowed("+WORD".into())));
        assert_eq!(parse("  LTORG"), Err(AsmErrKind::UnknownMnemonic("LTORG".into())));
    }

    #[test]
    fn test_reserve() {
        assert_eq!(directive("BUFFER RESB 4096"), Ok(Directive::Resb(4096)));
        assert_eq!(directive("  RESB X'10'"), Ok(Directive::Resb(16)));
        assert_eq!(directive("  RESW 1"), Ok(Directive::Resw(1)));
        assert_eq!(directive("  RESW X'A'"), Ok(Directive::Resw(10)));

        assert_eq!(directive("  RESB C'ABC'"), Err(AsmErrKind::UnsupportedOperand("RESB")));
        assert_eq!(directive("  RESW C'ABC'"), Err(AsmErrKind::UnsupportedOperand("RESW")));
        assert_eq!(directive("  RESB -1"), Err(AsmErrKind::MalformedOperand("RESB")));
        assert_eq!(directive("  RESB"), Err(AsmErrKind::MalformedOperand("RESB")));
        assert_eq!(directive("  RESB 1048577"), Err(AsmErrKind::MemoryOverflow));
        assert_eq!(directive("  RESW 349526"), Err(AsmErrKind::MemoryOverflow));
    }

    #[test]
    fn test_data() {
        assert_eq!(directive("EOF BYTE C'EOF'"), Ok(Directive::Byte("454F46".into())));
        assert_eq!(directive("  BYTE X'F1'"), Ok(Directive::Byte("F1".into())));
        assert_eq!(directive("  BYTE 255"), Ok(Directive::Byte("FF".into())));
        assert_eq!(directive("  BYTE -128"), Ok(Directive::Byte("80".into())));
        assert_eq!(directive("  BYTE C'A B'"), Ok(Directive::Byte("412042".into())));

        assert_eq!(directive("  BYTE X'F'"), Err(AsmErrKind::MalformedOperand("BYTE")));
        assert_eq!(directive("  BYTE LABEL"), Err(AsmErrKind::MalformedOperand("BYTE")));
        assert_eq!(
            directive("  BYTE 256"),
            Err(AsmErrKind::OperandRange("BYTE", OperandRangeErr::Field(FieldOverflow { value: 256, width: 8 })))
        );

        assert_eq!(directive("  WORD 3"), Ok(Directive::Word(Value::Number(3))));
        assert_eq!(directive("  WORD BUFFER"), Ok(Directive::Word(Value::Symbol("BUFFER".into()))));
        assert_eq!(directive("  WORD 1,2"), Err(AsmErrKind::MalformedOperand("WORD")));
    }

    #[test]
    fn test_control_directives() {
        assert_eq!(directive("COPY START 1000"), Ok(Directive::Start(None)));
        assert_eq!(directive("  END FIRST"), Ok(Directive::End));
        assert_eq!(directive("  BASE LENGTH"), Ok(Directive::Base(Value::Symbol("LENGTH".into()))));
        assert_eq!(directive("  NOBASE"), Ok(Directive::NoBase));
        assert_eq!(directive("  BASE"), Err(AsmErrKind::MalformedOperand("BASE")));

        let flags = AsmFlags { honor_start: true, ..Default::default() };
        let start = |text| parse_line(text, 1, &flags).map(|s| s.kind).map_err(|e| e.kind);
        assert_eq!(start("COPY START 1000"), Ok(StmtKind::Directive(Directive::Start(Some(0x1000)))));
        assert_eq!(start("COPY START ZZ"), Err(AsmErrKind::MalformedOperand("START")));
        assert_eq!(start("COPY START 100000"), Err(AsmErrKind::MemoryOverflow));
    }

    #[test]
    fn test_error_line() {
        let err = parse_line("  LTORG", 17, &AsmFlags::default()).unwrap_err();
        assert_eq!(err.line, 17);
    }
}
