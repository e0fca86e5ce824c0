//! Tokenizing SIC/XE source text.
//!
//! This module holds the tokens that characterize the operand field of a SIC/XE
//! source line ([`Token`]). The parser uses it to convert raw operand text
//! into typed operands.
//!
//! Before that, [`fields`] splits a whole line into its label, mnemonic, and operand
//! fields. Which field is which is decided by column rules in [`crate::parse`].

use std::num::IntErrorKind;

use logos::{Lexer, Logos};

use crate::ast::Literal;

/// A unit of information in a SIC/XE operand field.
#[derive(Debug, Logos, PartialEq, Eq, Clone)]
#[logos(skip r"[ \t]+", error = LexErr)]
pub enum Token {
    /// A decimal integer (e.g., `4096`, `-3`).
    #[regex(r"-?[0-9]+", lex_decimal)]
    Decimal(i64),

    /// An identifier.
    ///
    /// This can refer to either:
    /// - a symbol (e.g., `RETADR`, `BUFFER`)
    /// - a register (e.g., `A`, `SW`)
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lx| lx.slice().to_string())]
    Ident(String),

    /// A quoted literal constant (e.g., `X'F1'`, `C'EOF'`).
    // The second pattern catches a literal whose closing quote is missing.
    #[regex(r"[A-Za-z]'[^']*'", lex_literal)]
    #[regex(r"[A-Za-z]'[^']*", lex_unclosed_literal)]
    Literal(Literal),

    /// The immediate addressing marker.
    #[token("#")]
    Hash,

    /// The indirect addressing marker.
    #[token("@")]
    At,

    /// A comma, which delineates operands of an instruction
    /// (and introduces the `,X` indexed suffix).
    #[token(",")]
    Comma,
}

/// A whitespace-separated field of a source line.
///
/// Whitespace between quotes does not end a field, so `C'A B'` stays whole.
#[derive(Debug, Logos, PartialEq, Eq, Clone, Copy)]
#[logos(skip r"\s+")]
enum FieldToken {
    #[regex(r"([^\s']|'[^']*')+")]
    // An unclosed quote runs to the end of the line.
    #[regex(r"([^\s']|'[^']*')*'[^']*")]
    Field,
}

/// Any errors raised in attempting to tokenize operand text.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum LexErr {
    /// Decimal literal cannot fit within the range of an i64
    NumberTooLarge,
    /// Decimal literal has invalid digits
    InvalidNumeric,
    /// Hex literal (`X'..'`) has non-hex digits
    InvalidHex,
    /// Literal has nothing between its quotes
    EmptyLiteral,
    /// Character literal (`C'..'`) contains a character which is not a byte
    NonByteChar,
    /// Literal is missing its closing quote
    UnclosedLiteral,
    /// Literal has a prefix other than `X` or `C`
    UnsupportedLiteral,
    /// A symbol was used which is not allowed in SIC/XE operands
    #[default]
    InvalidSymbol
}
impl std::fmt::Display for LexErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LexErr::NumberTooLarge     => f.write_str("numeric token does not fit 64-bit signed integer"),
            LexErr::InvalidNumeric     => f.write_str("invalid decimal literal"),
            LexErr::InvalidHex         => f.write_str("invalid hex literal"),
            LexErr::EmptyLiteral       => f.write_str("literal is empty"),
            LexErr::NonByteChar        => f.write_str("character literal contains a character wider than 8 bits"),
            LexErr::UnclosedLiteral    => f.write_str("unclosed literal"),
            LexErr::UnsupportedLiteral => f.write_str("unsupported literal syntax"),
            LexErr::InvalidSymbol      => f.write_str("unrecognized symbol"),
        }
    }
}
impl std::error::Error for LexErr {}
impl crate::err::Error for LexErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match self {
            LexErr::NumberTooLarge     => Some(format!("the range for a 64-bit signed integer is [{}, {}]", i64::MIN, i64::MAX).into()),
            LexErr::InvalidNumeric     => Some("a decimal literal only consists of digits 0-9".into()),
            LexErr::InvalidHex         => Some("a hex literal is written X'..' and consists of 0-9, A-F".into()),
            LexErr::EmptyLiteral       => Some("put at least one digit or character between the quotes".into()),
            LexErr::NonByteChar        => Some("character literals are encoded one byte per character".into()),
            LexErr::UnclosedLiteral    => Some("add a quote to the end of the literal".into()),
            LexErr::UnsupportedLiteral => Some("literals are written X'hex digits' or C'characters'".into()),
            LexErr::InvalidSymbol      => Some("this char does not occur in any token in SIC/XE operands".into()),
        }
    }
}

fn lex_decimal(lx: &Lexer<'_, Token>) -> Result<i64, LexErr> {
    lx.slice()
        .parse::<i64>()
        .map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => LexErr::NumberTooLarge,
            _ => LexErr::InvalidNumeric,
        })
}
fn lex_literal(lx: &Lexer<'_, Token>) -> Result<Literal, LexErr> {
    let slice = lx.slice();
    // The prefix letter and both quotes are ASCII.
    let body = &slice[2..(slice.len() - 1)];

    match slice.as_bytes()[0] {
        b'X' | b'x' => {
            if body.is_empty() { return Err(LexErr::EmptyLiteral); }
            match body.bytes().all(|b| b.is_ascii_hexdigit()) {
                true  => Ok(Literal::Hex(body.to_ascii_uppercase())),
                false => Err(LexErr::InvalidHex),
            }
        },
        b'C' | b'c' => {
            if body.is_empty() { return Err(LexErr::EmptyLiteral); }
            match body.chars().all(|c| u32::from(c) <= 0xFF) {
                true  => Ok(Literal::Char(body.to_string())),
                false => Err(LexErr::NonByteChar),
            }
        },
        _ => Err(LexErr::UnsupportedLiteral),
    }
}
fn lex_unclosed_literal(_: &Lexer<'_, Token>) -> Result<Literal, LexErr> {
    Err(LexErr::UnclosedLiteral)
}

/// Splits a source line into its fields.
///
/// ```
/// use sicxe_asm::parse::lex::fields;
///
/// assert_eq!(fields("MSG  BYTE  C'HI THERE'  greeting"), ["MSG", "BYTE", "C'HI THERE'", "greeting"]);
/// ```
pub fn fields(line: &str) -> Vec<&str> {
    FieldToken::lexer(line)
        .spanned()
        .filter_map(|(token, span)| token.ok().map(|_| &line[span]))
        .collect()
}

/// Splits operand text into tokens, failing at the first invalid token.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexErr> {
    Token::lexer(text).collect()
}

#[cfg(test)]
mod tests {
    use logos::Logos;

    use crate::ast::Literal;
    use crate::err::LexErr;
    use crate::parse::lex::{fields, tokenize, Token};

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }
    fn hex(s: &str) -> Token {
        Token::Literal(Literal::Hex(s.to_string()))
    }
    fn chars(s: &str) -> Token {
        Token::Literal(Literal::Char(s.to_string()))
    }

    #[test]
    fn test_decimal() {
        let mut tokens = Token::lexer("0 3 4096 -2048");
        assert_eq!(tokens.next(), Some(Ok(Token::Decimal(0))));
        assert_eq!(tokens.next(), Some(Ok(Token::Decimal(3))));
        assert_eq!(tokens.next(), Some(Ok(Token::Decimal(4096))));
        assert_eq!(tokens.next(), Some(Ok(Token::Decimal(-2048))));
        assert_eq!(tokens.next(), None);

        assert_eq!(Token::lexer("99999999999999999999").next(), Some(Err(LexErr::NumberTooLarge)));
        assert_eq!(Token::lexer("-99999999999999999999").next(), Some(Err(LexErr::NumberTooLarge)));
    }

    #[test]
    fn test_memory_operands() {
        assert_eq!(tokenize("#4096"), Ok(vec![Token::Hash, Token::Decimal(4096)]));
        assert_eq!(tokenize("@RETADR"), Ok(vec![Token::At, ident("RETADR")]));
        assert_eq!(tokenize("BUFFER,X"), Ok(vec![ident("BUFFER"), Token::Comma, ident("X")]));
        assert_eq!(tokenize("#LENGTH"), Ok(vec![Token::Hash, ident("LENGTH")]));
        assert_eq!(tokenize("A,S"), Ok(vec![ident("A"), Token::Comma, ident("S")]));
        assert_eq!(tokenize("T, 4"), Ok(vec![ident("T"), Token::Comma, Token::Decimal(4)]));
    }

    #[test]
    fn test_literals() {
        assert_eq!(tokenize("X'F1'"), Ok(vec![hex("F1")]));
        assert_eq!(tokenize("x'0a'"), Ok(vec![hex("0A")]));
        assert_eq!(tokenize("C'EOF'"), Ok(vec![chars("EOF")]));
        assert_eq!(tokenize("c'a b'"), Ok(vec![chars("a b")]));
        assert_eq!(tokenize("#X'10'"), Ok(vec![Token::Hash, hex("10")]));

        // A bare X is still an identifier:
        assert_eq!(tokenize("X"), Ok(vec![ident("X")]));
    }

    #[test]
    fn test_literal_invalid() {
        assert_eq!(tokenize("X'FG'"), Err(LexErr::InvalidHex));
        assert_eq!(tokenize("X''"), Err(LexErr::EmptyLiteral));
        assert_eq!(tokenize("C''"), Err(LexErr::EmptyLiteral));
        assert_eq!(tokenize("X'F1"), Err(LexErr::UnclosedLiteral));
        assert_eq!(tokenize("C'EOF"), Err(LexErr::UnclosedLiteral));
        assert_eq!(tokenize("B'0101'"), Err(LexErr::UnsupportedLiteral));
        assert_eq!(tokenize("Z'12'"), Err(LexErr::UnsupportedLiteral));
        assert_eq!(tokenize("C'\u{3042}'"), Err(LexErr::NonByteChar));
    }

    #[test]
    fn test_invalid_symbol() {
        for s in ["$", "%", "*", "+", "-", "'", "!", "="] {
            assert_eq!(
                Token::lexer(s).next(),
                Some(Err(LexErr::InvalidSymbol)),
                "Expected {s:?} to be an invalid symbol"
            );
        }
    }

    #[test]
    fn test_fields() {
        assert_eq!(fields("COPY  START  0"), ["COPY", "START", "0"]);
        assert_eq!(fields("\t\tRSUB\t"), ["RSUB"]);
        assert_eq!(fields("   "), Vec::<&str>::new());
        assert_eq!(fields("EOF BYTE C'E F' remark"), ["EOF", "BYTE", "C'E F'", "remark"]);
        assert_eq!(fields("  WORD X'01'  X'02'"), ["WORD", "X'01'", "X'02'"]);
        // An unclosed quote takes the rest of the line.
        assert_eq!(fields("  BYTE C'AB  CD"), ["BYTE", "C'AB  CD"]);
    }
}
