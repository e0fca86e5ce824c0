//! Error interface for this crate.
//!
//! Every error raised by the lexer, parser, and assembler implements [`Error`],
//! which exposes the source line the error occurred on (if known)
//! and a hint on how to fix it (if one is available).
//!
//! [`report`] combines these into a single human-readable diagnostic.

use std::borrow::Cow;

pub use crate::asm::{AsmErr, AsmErrKind};
pub use crate::asm::bits::FieldOverflow;
pub use crate::parse::lex::LexErr;

/// Unified error interface for all errors in this crate.
///
/// Note that the [`std::fmt::Display`] implementation is used for the brief message.
pub trait Error: std::error::Error {
    /// The 1-based source line which caused this error, if known.
    fn line(&self) -> Option<usize> {
        None
    }

    /// A help message describing how to fix the error, if one is available.
    fn help(&self) -> Option<Cow<str>> {
        None
    }
}

/// Formats an error into a diagnostic message.
///
/// The message consists of the error, prefixed by its line if it has one,
/// followed by the help message on its own line if it has one.
///
/// ```
/// use sicxe_asm::asm::assemble;
/// use sicxe_asm::err::report;
///
/// let err = assemble("FOO LTORG").unwrap_err();
/// assert_eq!(report(&err), "line 1: unknown mnemonic LTORG\n  help: check the spelling of the mnemonic");
/// ```
pub fn report<E: Error + ?Sized>(err: &E) -> String {
    let mut out = match err.line() {
        Some(line) => format!("line {line}: {err}"),
        None => err.to_string(),
    };
    if let Some(help) = err.help() {
        out.push_str("\n  help: ");
        out.push_str(&help);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{report, AsmErr, AsmErrKind, LexErr};

    #[test]
    fn test_report_lex() {
        assert_eq!(
            report(&LexErr::UnclosedLiteral),
            "unclosed literal\n  help: add a quote to the end of the literal"
        );
    }

    #[test]
    fn test_report_line() {
        let err = AsmErr::new(AsmErrKind::DuplicateSymbol("LOOP".into()), 12);
        assert!(report(&err).starts_with("line 12: symbol LOOP was defined multiple times"));
    }

    #[test]
    fn test_report_help() {
        let err = AsmErr::new(AsmErrKind::MemoryOverflow, 3);
        assert_eq!(
            report(&err),
            "line 3: program does not fit in memory\n  help: SIC/XE addresses must be below 0x100000"
        );
    }
}
