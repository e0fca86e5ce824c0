//! Fixed-width bit fields and their hex renderings.
//!
//! Every piece of object code is built up out of [`BitField`]s:
//! opcodes, flag bits, register codes, and displacements are each converted
//! into a field of a known width, concatenated, and then rendered as hex digits.
//!
//! Negative values are stored in two's complement. A value is accepted into a
//! `w`-bit field if it fits either as a signed or as an unsigned `w`-bit integer,
//! so a 12-bit field holds anything in `-2048..=4095`.

use crate::ast::Literal;
use crate::parse::lex::{tokenize, LexErr, Token};

/// The widest field a [`BitField`] can hold.
pub const MAX_WIDTH: u32 = u64::BITS;

fn mask(width: u32) -> u64 {
    match width {
        MAX_WIDTH => u64::MAX,
        w => (1 << w) - 1,
    }
}

/// The error raised when a value does not fit in a field of a given width.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct FieldOverflow {
    /// The value which did not fit.
    pub value: i64,
    /// The width of the field.
    pub width: u32,
}
impl std::fmt::Display for FieldOverflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "value {} does not fit in a {}-bit field", self.value, self.width)
    }
}
impl std::error::Error for FieldOverflow {}
impl crate::err::Error for FieldOverflow {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        let FieldOverflow { width, .. } = *self;
        if width >= 63 { return None; }

        let min = -1i64 << (width - 1);
        let max = (1i64 << width) - 1;
        Some(format!("a {width}-bit field holds values in [{min}, {max}]").into())
    }
}

/// A field of `width` bits.
///
/// Bits above `width` are always zero.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct BitField {
    bits: u64,
    width: u32,
}
impl BitField {
    /// Creates a new field holding a signed integer.
    ///
    /// Non-negative values are zero-extended and negative values are
    /// stored in two's complement. This errors if the value fits neither
    /// as a signed nor as an unsigned `width`-bit integer.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sicxe_asm::asm::bits::BitField;
    /// #
    /// assert_eq!(BitField::new(-4, 12).map(|b| b.bits()), Ok(0xFFC));
    /// assert_eq!(BitField::new(4095, 12).map(|b| b.bits()), Ok(0xFFF));
    /// assert!(BitField::new(4096, 12).is_err());
    /// assert!(BitField::new(-2049, 12).is_err());
    /// ```
    ///
    /// # Panics
    ///
    /// This will panic if `width` is not in `1..=64`.
    pub fn new(value: i64, width: u32) -> Result<Self, FieldOverflow> {
        assert!((1..=MAX_WIDTH).contains(&width), "bit width {width} must be in 1..={MAX_WIDTH}");

        let fits = match value >= 0 {
            true  => width >= 63 || value.unsigned_abs() <= mask(width),
            false => width == MAX_WIDTH || value >= (-1i64 << (width - 1)),
        };
        match fits {
            true  => Ok(Self { bits: value as u64 & mask(width), width }),
            false => Err(FieldOverflow { value, width }),
        }
    }

    /// Creates a new field from the low `width` bits of `bits`, discarding the rest.
    ///
    /// # Panics
    ///
    /// This will panic if `width` is not in `1..=64`.
    pub fn new_trunc(bits: u64, width: u32) -> Self {
        assert!((1..=MAX_WIDTH).contains(&width), "bit width {width} must be in 1..={MAX_WIDTH}");
        Self { bits: bits & mask(width), width }
    }

    /// The raw bits of this field.
    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// The width of this field.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Reads this field as a two's complement signed integer.
    pub fn to_signed(&self) -> i64 {
        let shift = MAX_WIDTH - self.width;
        ((self.bits << shift) as i64) >> shift
    }

    /// Appends `low` to the right of this field.
    ///
    /// # Panics
    ///
    /// This will panic if the combined width exceeds 64 bits.
    pub fn concat(self, low: BitField) -> BitField {
        let width = self.width + low.width;
        assert!(width <= MAX_WIDTH, "concatenated width {width} exceeds {MAX_WIDTH}");

        BitField { bits: (self.bits << low.width) | low.bits, width }
    }

    /// Renders this field as uppercase hex digits.
    ///
    /// The bits are grouped in nibbles from the least-significant end,
    /// so a width which is not a multiple of 4 yields a short leading nibble.
    ///
    /// ```
    /// # use sicxe_asm::asm::bits::BitField;
    /// #
    /// assert_eq!(BitField::new_trunc(0x3F, 6).to_hex(), "3F");
    /// assert_eq!(BitField::new_trunc(0x4F0000, 24).to_hex(), "4F0000");
    /// ```
    pub fn to_hex(&self) -> String {
        let digits = ((self.width + 3) / 4) as usize;
        format!("{:0digits$X}", self.bits)
    }
}

/// Converts a signed integer into a `width`-bit two's complement field.
///
/// See [`BitField::new`].
pub fn to_bit_field(value: i64, width: u32) -> Result<BitField, FieldOverflow> {
    BitField::new(value, width)
}

/// Renders a field as hex digits.
///
/// See [`BitField::to_hex`].
pub fn bits_to_hex(field: BitField) -> String {
    field.to_hex()
}

/// Reads hex digits into a field four bits per digit.
pub fn hex_to_bits(hex: &str) -> Result<BitField, LexErr> {
    if hex.is_empty() { return Err(LexErr::EmptyLiteral); }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) { return Err(LexErr::InvalidHex); }
    if hex.len() > (MAX_WIDTH / 4) as usize { return Err(LexErr::NumberTooLarge); }

    let bits = u64::from_str_radix(hex, 16).map_err(|_| LexErr::InvalidHex)?;
    Ok(BitField::new_trunc(bits, 4 * hex.len() as u32))
}

/// Encodes each character as one 8-bit field, in order, and renders the result as hex.
///
/// Characters are expected to fit in a byte; wider characters are truncated.
pub(crate) fn chars_to_hex(chars: &str) -> String {
    chars.chars()
        .map(|c| BitField::new_trunc(u64::from(c), 8).to_hex())
        .collect()
}

/// Decodes a literal token (`X'..'` or `C'..'`) into its hex digit encoding.
///
/// ```
/// # use sicxe_asm::asm::bits::decode_literal;
/// #
/// assert_eq!(decode_literal("X'F1'").as_deref(), Ok("F1"));
/// assert_eq!(decode_literal("C'EOF'").as_deref(), Ok("454F46"));
/// assert!(decode_literal("'EOF'").is_err());
/// ```
pub fn decode_literal(token: &str) -> Result<String, LexErr> {
    match tokenize(token)?.as_slice() {
        [Token::Literal(lit)] => Ok(Literal::to_hex(lit)),
        _ => Err(LexErr::UnsupportedLiteral),
    }
}
