use core::fmt;
use std::sync::Arc;

/// Register width of the target word, in bits.
pub const WORD_BITS: u16 = 64;

/// Register width of the target word, in bytes.
pub const WORD_BYTES: usize = 8;

/// A Ruse type, as resolved by the type checker.
///
/// The back end never infers types; it only queries identity and size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Boolean truth value.
    Bool,
    /// Fixed-width signed integer.
    Int8,
    /// Fixed-width signed integer.
    Int16,
    /// Fixed-width signed integer.
    Int32,
    /// Fixed-width signed integer.
    Int64,
    /// Fixed-width unsigned integer.
    Uint8,
    /// Fixed-width unsigned integer.
    Uint16,
    /// Fixed-width unsigned integer.
    Uint32,
    /// Fixed-width unsigned integer.
    Uint64,
    /// Word-sized signed integer.
    Int,
    /// Word-sized unsigned integer.
    Uint,
    /// Unsigned integer wide enough to hold a pointer.
    Uintptr,
    /// Immutable string; a pointer and a length.
    String,
    /// Integer constant that has not yet been given a concrete type.
    UntypedInt,
    /// String constant that has not yet been given a concrete type.
    UntypedString,
    /// A function signature.
    Function(Arc<Signature>),
}

impl Type {
    /// Size of a value of this type in bytes.
    ///
    /// Strings occupy two words: pointer and length.
    pub fn size(&self) -> usize {
        match self {
            Type::Bool | Type::Int8 | Type::Uint8 => 1,
            Type::Int16 | Type::Uint16 => 2,
            Type::Int32 | Type::Uint32 => 4,
            Type::Int64 | Type::Uint64 => 8,
            Type::Int | Type::Uint | Type::Uintptr => WORD_BYTES,
            Type::String | Type::UntypedString => 2 * WORD_BYTES,
            Type::UntypedInt => WORD_BYTES,
            Type::Function(_) => WORD_BYTES,
        }
    }

    /// Whether this is an integer type, untyped constants included.
    pub fn is_integer(&self) -> bool {
        self.int_type().is_some() || *self == Type::UntypedInt
    }

    /// The concrete integer representation of this type, if it has one.
    ///
    /// `Int`, `Uint` and `Uintptr` resolve to the target word width.
    pub fn int_type(&self) -> Option<IntType> {
        match self {
            Type::Int8 => Some(IntType::Int8),
            Type::Int16 => Some(IntType::Int16),
            Type::Int32 => Some(IntType::Int32),
            Type::Int64 | Type::Int => Some(IntType::Int64),
            Type::Uint8 => Some(IntType::Uint8),
            Type::Uint16 => Some(IntType::Uint16),
            Type::Uint32 => Some(IntType::Uint32),
            Type::Uint64 | Type::Uint | Type::Uintptr => Some(IntType::Uint64),
            _ => None,
        }
    }

    /// The type named by `name`, if `name` names a type.
    pub fn by_name(name: &str) -> Option<Type> {
        Some(match name {
            "bool" => Type::Bool,
            "int8" => Type::Int8,
            "int16" => Type::Int16,
            "int32" => Type::Int32,
            "int64" => Type::Int64,
            "uint8" => Type::Uint8,
            "uint16" => Type::Uint16,
            "uint32" => Type::Uint32,
            "uint64" => Type::Uint64,
            "int" => Type::Int,
            "uint" => Type::Uint,
            "uintptr" => Type::Uintptr,
            "string" => Type::String,
            _ => return None,
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Int8 => write!(f, "int8"),
            Type::Int16 => write!(f, "int16"),
            Type::Int32 => write!(f, "int32"),
            Type::Int64 => write!(f, "int64"),
            Type::Uint8 => write!(f, "uint8"),
            Type::Uint16 => write!(f, "uint16"),
            Type::Uint32 => write!(f, "uint32"),
            Type::Uint64 => write!(f, "uint64"),
            Type::Int => write!(f, "int"),
            Type::Uint => write!(f, "uint"),
            Type::Uintptr => write!(f, "uintptr"),
            Type::String => write!(f, "string"),
            Type::UntypedInt => write!(f, "untyped int"),
            Type::UntypedString => write!(f, "untyped string"),
            Type::Function(sig) => write!(f, "func {}", sig.name),
        }
    }
}

/// A sized integer representation.
///
/// This is the level at which the SSA opcode families are parameterised:
/// `AddInt8` is `Op::Add(IntType::Int8)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum IntType {
    /// 8-bit signed.
    Int8,
    /// 16-bit signed.
    Int16,
    /// 32-bit signed.
    Int32,
    /// 64-bit signed.
    Int64,
    /// 8-bit unsigned.
    Uint8,
    /// 16-bit unsigned.
    Uint16,
    /// 32-bit unsigned.
    Uint32,
    /// 64-bit unsigned.
    Uint64,
}

impl IntType {
    /// Width in bits.
    pub const fn bits(self) -> u16 {
        match self {
            IntType::Int8 | IntType::Uint8 => 8,
            IntType::Int16 | IntType::Uint16 => 16,
            IntType::Int32 | IntType::Uint32 => 32,
            IntType::Int64 | IntType::Uint64 => 64,
        }
    }

    /// Whether values are sign-extended.
    pub const fn signed(self) -> bool {
        matches!(
            self,
            IntType::Int8 | IntType::Int16 | IntType::Int32 | IntType::Int64
        )
    }

    /// The smallest and largest representable values.
    pub fn range(self) -> (i128, i128) {
        let bits = u32::from(self.bits());
        if self.signed() {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        }
    }

    /// The corresponding `Type`.
    pub fn ty(self) -> Type {
        match self {
            IntType::Int8 => Type::Int8,
            IntType::Int16 => Type::Int16,
            IntType::Int32 => Type::Int32,
            IntType::Int64 => Type::Int64,
            IntType::Uint8 => Type::Uint8,
            IntType::Uint16 => Type::Uint16,
            IntType::Uint32 => Type::Uint32,
            IntType::Uint64 => Type::Uint64,
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntType::Int8 => write!(f, "Int8"),
            IntType::Int16 => write!(f, "Int16"),
            IntType::Int32 => write!(f, "Int32"),
            IntType::Int64 => write!(f, "Int64"),
            IntType::Uint8 => write!(f, "Uint8"),
            IntType::Uint16 => write!(f, "Uint16"),
            IntType::Uint32 => write!(f, "Uint32"),
            IntType::Uint64 => write!(f, "Uint64"),
        }
    }
}

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    /// Function name, unqualified.
    pub name: String,
    /// Parameter names and types, in declaration order.
    pub params: Vec<(String, Type)>,
    /// Result type, if the function returns a value.
    pub result: Option<Type>,
}

impl Signature {
    /// A new signature.
    pub fn new(name: impl Into<String>, params: Vec<(String, Type)>, result: Option<Type>) -> Self {
        Signature {
            name: name.into(),
            params,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Type::Bool, 1)]
    #[case(Type::Int8, 1)]
    #[case(Type::Uint16, 2)]
    #[case(Type::Int32, 4)]
    #[case(Type::Uint64, 8)]
    #[case(Type::Int, 8)]
    #[case(Type::Uintptr, 8)]
    #[case(Type::String, 16)]
    fn type_sizes(#[case] ty: Type, #[case] size: usize) {
        assert_eq!(ty.size(), size);
    }

    #[test]
    fn word_sized_types_resolve_to_64_bits() {
        assert_eq!(Type::Int.int_type(), Some(IntType::Int64));
        assert_eq!(Type::Uint.int_type(), Some(IntType::Uint64));
        assert_eq!(Type::Uintptr.int_type(), Some(IntType::Uint64));
    }

    #[test]
    fn int_type_ranges() {
        assert_eq!(IntType::Int8.range(), (-128, 127));
        assert_eq!(IntType::Uint8.range(), (0, 255));
        assert_eq!(IntType::Uint64.range().1, u64::MAX as i128);
    }
}
