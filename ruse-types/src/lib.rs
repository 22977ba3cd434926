//! Atomic types shared by the Ruse compiler tool chain.
//!
//! The parser and type checker live in the front end; this crate defines the
//! data they hand over: source spans, the type lattice, constant values, the
//! S-expression syntax tree, and the symbol-table records the back end reads.

#![warn(missing_docs)]
#![deny(unused_must_use)]

mod ast;
mod constant;
mod position;
mod symbol;
mod types;

#[cfg(any(test, feature = "test-helpers"))]
pub mod reader;

pub use ast::{Expr, Ident, List, NodeId, NumberLit, Qualified, StringLit};
pub use constant::{Constant, ConstantKind};
pub use position::Span;
pub use symbol::{Symbol, SymbolTable};
pub use types::{IntType, Signature, Type, WORD_BITS, WORD_BYTES};
