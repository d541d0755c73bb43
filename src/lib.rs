//! # Sigil — Transaction-Approval Logic Compiler
//!
//! Sigil is a small, statically-scoped scripting language for writing
//! transaction approval programs. This crate compiles Sigil source into
//! the linear stack-machine assembly dialect executed by the ledger's
//! approval VM: constants live in deduplicated pools referenced by
//! index, variables live in a flat slot space, and every `return`
//! lowers to a forced-true branch into one shared exit label.
//!
//! ## Architecture
//! Source → Lexer → Parser → AST → Codegen → assembly listing
//!
//! ## Key Features
//! - Two-pass code generation: pools and slots are finalized before a
//!   single instruction is rendered — no backpatching.
//! - Errors as values with source spans; the parser and the code
//!   generator each report every problem they find in one run.
//! - `FxHashMap` for the value→index and name→binding tables.
//! - `memchr` SIMD-accelerated scanning in the lexer.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod opcode;
pub mod parser;
pub mod pool;
pub mod sym;
pub mod token;
