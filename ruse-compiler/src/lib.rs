//! The Ruse compiler back end for x86.
//!
//! Three tightly-coupled subsystems share one IR: SSA lowering from the
//! typed syntax tree, linear-scan register allocation against a pluggable
//! calling convention, and an S-expression assembler that selects the
//! shortest legal encoding from the instruction table. Machine-code
//! encoding itself lives in the `ruse-asm` crate.

#![warn(missing_docs)]
#![deny(unused_must_use)]

pub mod abi;
pub mod alloc;
pub mod asm;
pub mod compile;
pub mod error;
pub mod location;
pub mod lower;
pub mod package;
pub mod ssa;

pub use abi::{Abi, AbiError};
pub use alloc::{allocate, Alloc, AllocValue, Allocator};
pub use asm::assemble_function;
pub use compile::compile_function;
pub use error::{AllocError, AsmError, CompileError, Error, LowerError};
pub use location::Location;
pub use lower::lower;
pub use package::{compile_package, Package, PackageConstant, ARCH};
pub use ssa::{Block, BlockId, BlockKind, Callee, Extra, Function, Op, Value, ValueId};
