//! Error types for the back end.
//!
//! Every recoverable error carries the span of the offending expression so
//! drivers can print `file:line:col: message`. Invariant violations do not
//! appear here; they panic with a position prefix.

use ruse_asm::{EncodeError, Mode};
use ruse_types::{Span, Type};

use crate::abi::AbiError;

/// An error raised while compiling a function body to SSA.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// An expression kind the compiler does not handle.
    #[error("{span}: unsupported expression")]
    UnsupportedExpr {
        /// Where the expression is.
        span: Span,
    },
    /// A reference to an unknown identifier.
    #[error("{span}: unknown identifier {name}")]
    UnknownIdentifier {
        /// Where the reference is.
        span: Span,
        /// The identifier.
        name: String,
    },
    /// A call to an unknown function.
    #[error("{span}: unknown function {name}")]
    UnknownFunction {
        /// Where the call is.
        span: Span,
        /// The callee name.
        name: String,
    },
    /// A constant that does not fit its target type.
    #[error("{span}: constant overflows {ty}")]
    ConstantOverflow {
        /// Where the constant is.
        span: Span,
        /// The target type.
        ty: Type,
    },
    /// An invalid binding target in a `let` form.
    #[error("{span}: invalid let target")]
    InvalidLetTarget {
        /// Where the target is.
        span: Span,
    },
    /// A special form with the wrong number of arguments.
    #[error("{span}: {form} takes {expected} arguments")]
    WrongArity {
        /// Where the form is.
        span: Span,
        /// The form name.
        form: &'static str,
        /// How many arguments it takes.
        expected: &'static str,
    },
    /// An operand whose type does not fit the operation.
    #[error("{span}: cannot apply {form} to {ty}")]
    BadOperandType {
        /// Where the operand is.
        span: Span,
        /// The form name.
        form: String,
        /// The operand type.
        ty: Type,
    },
    /// Division of a constant by zero.
    #[error("{span}: division by zero")]
    DivisionByZero {
        /// Where the division is.
        span: Span,
    },
    /// A call with the wrong number of arguments.
    #[error("{span}: {name} takes {expected} arguments, got {got}")]
    WrongArgumentCount {
        /// Where the call is.
        span: Span,
        /// The callee name.
        name: String,
        /// Declared parameter count.
        expected: usize,
        /// Provided argument count.
        got: usize,
    },
    /// An invalid ABI description.
    #[error("{span}: {source}")]
    Abi {
        /// Where the function is declared.
        span: Span,
        /// The underlying error.
        source: AbiError,
    },
}

/// An error raised while assembling an `asm-func`.
#[derive(Debug, thiserror::Error)]
pub enum AsmError {
    /// A mnemonic absent from the instruction table.
    #[error("{span}: unknown mnemonic {name}")]
    UnknownMnemonic {
        /// Where the instruction is.
        span: Span,
        /// The mnemonic.
        name: String,
    },
    /// No instruction form matched the operands.
    #[error("{span}: no matching instruction for {mnemonic}")]
    NoMatch {
        /// Where the instruction is.
        span: Span,
        /// The mnemonic.
        mnemonic: String,
    },
    /// A `match` annotation naming a form the operands do not fit.
    #[error("{span}: operands do not match form {uid}")]
    MatchAnnotationFailed {
        /// Where the instruction is.
        span: Span,
        /// The required UID.
        uid: String,
    },
    /// Conflicting or duplicate prefixes.
    #[error("{span}: conflicting prefix {prefix}")]
    PrefixConflict {
        /// Where the prefix is.
        span: Span,
        /// The offending prefix.
        prefix: String,
    },
    /// A `rep` prefix on an instruction that rejects them.
    #[error("{span}: {mnemonic} does not accept rep prefixes")]
    RepNotAllowed {
        /// Where the instruction is.
        span: Span,
        /// The mnemonic.
        mnemonic: String,
    },
    /// A register unusable in the function's CPU mode.
    #[error("{span}: register {name} is not usable in {mode}")]
    RegisterMode {
        /// Where the operand is.
        span: Span,
        /// The register name.
        name: &'static str,
        /// The CPU mode.
        mode: Mode,
    },
    /// A label defined twice.
    #[error("{span}: label {name} is already defined")]
    DuplicateLabel {
        /// Where the second definition is.
        span: Span,
        /// The label.
        name: String,
    },
    /// A reference to an undefined label.
    #[error("{span}: unknown label {name}")]
    UnknownLabel {
        /// Where the reference is.
        span: Span,
        /// The label.
        name: String,
    },
    /// A label no instruction references.
    #[error("{span}: label {name} is never referenced")]
    UnreferencedLabel {
        /// Where the label is.
        span: Span,
        /// The label.
        name: String,
    },
    /// A jump whose distance exceeds the 32-bit signed range.
    #[error("{span}: jump distance {distance} is out of range")]
    JumpOutOfRange {
        /// Where the jump is.
        span: Span,
        /// The distance in bytes.
        distance: i64,
    },
    /// A scale outside {1, 2, 4, 8}.
    #[error("{span}: invalid scale {scale}")]
    InvalidScale {
        /// Where the operand is.
        span: Span,
        /// The scale.
        scale: i64,
    },
    /// A malformed far pointer.
    #[error("{span}: invalid far pointer")]
    InvalidFarPointer {
        /// Where the operand is.
        span: Span,
    },
    /// A malformed or misplaced annotation.
    #[error("{span}: invalid annotation")]
    BadAnnotation {
        /// Where the annotation is.
        span: Span,
    },
    /// A reference to an unknown constant or function.
    #[error("{span}: unknown symbol {name}")]
    UnknownSymbol {
        /// Where the reference is.
        span: Span,
        /// The symbol name.
        name: String,
    },
    /// A malformed instruction expression.
    #[error("{span}: expected an instruction or label")]
    BadInstruction {
        /// Where the expression is.
        span: Span,
    },
    /// An encoding failure for an otherwise matched instruction.
    #[error("{span}: {source}")]
    Encode {
        /// Where the instruction is.
        span: Span,
        /// The underlying error.
        source: EncodeError,
    },
}

/// An error raised during register allocation.
#[derive(Debug, thiserror::Error)]
pub enum AllocError {
    /// A value needs a stack slot, which the allocator does not place yet.
    #[error("{span}: out of registers; stack spilling is not implemented")]
    SpillRequired {
        /// Where the value is defined.
        span: Span,
    },
    /// An operation the allocator cannot place.
    #[error("{span}: cannot allocate {op}")]
    Unsupported {
        /// Where the value is defined.
        span: Span,
        /// The operation name.
        op: String,
    },
}

/// An error raised while lowering allocated values to instructions.
#[derive(Debug, thiserror::Error)]
pub enum LowerError {
    /// An operation with no machine lowering.
    #[error("{span}: cannot lower {op}")]
    Unsupported {
        /// Where the value is defined.
        span: Span,
        /// The operation name.
        op: String,
    },
    /// No instruction form fits the move or operation.
    #[error("{span}: no instruction for {what}")]
    NoInstruction {
        /// Where the value is defined.
        span: Span,
        /// What was being lowered.
        what: String,
    },
    /// An encoding failure.
    #[error("{span}: {source}")]
    Encode {
        /// Where the value is defined.
        span: Span,
        /// The underlying error.
        source: EncodeError,
    },
}

/// Any error the back end can report.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A compilation error.
    #[error(transparent)]
    Compile(#[from] CompileError),
    /// An assembly error.
    #[error(transparent)]
    Asm(#[from] AsmError),
    /// A register allocation error.
    #[error(transparent)]
    Alloc(#[from] AllocError),
    /// A lowering error.
    #[error(transparent)]
    Lower(#[from] LowerError),
    /// A package-level error.
    #[error("{span}: {message}")]
    Package {
        /// Where the definition is.
        span: Span,
        /// What went wrong.
        message: String,
    },
}
