//! A two-pass SIC/XE assembler.
//!
//! This assembles SIC/XE source lines into per-line object code
//! (formats 1 through 4, plus `WORD` and `BYTE` data) and a symbol table.
//!
//! # Usage
//!
//! To assemble SIC/XE source code, pass it to [`asm::assemble`]:
//! ```
//! use sicxe_asm::asm::assemble;
//!
//! let code = "
//! COPY    START   0
//! FIRST   STL     RETADR
//!         LDB     #LENGTH
//!         BASE    LENGTH
//! CLOOP   +JSUB   RDREC
//!         J       @RETADR
//! RETADR  RESW    1
//! LENGTH  RESW    1
//! RDREC   RSUB
//!         END     FIRST
//! ";
//! let asm = assemble(code.trim()).unwrap();
//!
//! assert_eq!(asm.symbol_table().lookup("RDREC"), Some(0x013));
//! for line in asm.listing() {
//!     println!("{line}");
//! }
//! ```
//!
//! Errors carry the line they occurred on, and can be turned into a full
//! diagnostic with [`err::report`]:
//! ```
//! use sicxe_asm::asm::assemble;
//! use sicxe_asm::err::report;
//!
//! let err = assemble("FIRST  SVC  16").unwrap_err();
//! assert_eq!(err.line, 1);
//! println!("{}", report(&err));
//! ```
//!
//! If more granularity is needed, each stage is exposed separately:
//! [`parse::parse_line`] parses a line, [`asm::assembled_length`] sizes it,
//! and [`ast::Instr::encode`] encodes an instruction.
#![warn(missing_docs)]

pub mod parse;
pub mod ast;
pub mod asm;
pub mod err;
