use core::fmt;
use std::sync::Arc;

use num_bigint::BigInt;

/// A compile-time constant value.
///
/// Integer constants are arbitrary precision until the type checker pins
/// them to a concrete type; range checks happen when they are emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Boolean constant.
    Bool(bool),
    /// String constant.
    String(Arc<str>),
    /// Integer constant.
    Int(BigInt),
}

/// Discriminator for [`Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter)]
pub enum ConstantKind {
    /// A [`Constant::Bool`].
    Bool,
    /// A [`Constant::String`].
    String,
    /// A [`Constant::Int`].
    Int,
}

impl Constant {
    /// The kind of this constant.
    pub fn kind(&self) -> ConstantKind {
        match self {
            Constant::Bool(_) => ConstantKind::Bool,
            Constant::String(_) => ConstantKind::String,
            Constant::Int(_) => ConstantKind::Int,
        }
    }

    /// An integer constant from a machine integer.
    pub fn from_int(value: impl Into<BigInt>) -> Self {
        Constant::Int(value.into())
    }

    /// The integer value, if this is an integer constant.
    pub fn as_int(&self) -> Option<&BigInt> {
        match self {
            Constant::Int(i) => Some(i),
            _ => None,
        }
    }

    /// The string value, if this is a string constant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Constant::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{b}"),
            Constant::String(s) => write!(f, "{s:?}"),
            Constant::Int(i) => write!(f, "{i}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        assert_eq!(Constant::Bool(true).kind(), ConstantKind::Bool);
        assert_eq!(Constant::from_int(7).kind(), ConstantKind::Int);
        assert_eq!(
            Constant::String(Arc::from("hi")).kind(),
            ConstantKind::String
        );
    }

    #[test]
    fn display() {
        assert_eq!(Constant::from_int(-40).to_string(), "-40");
        assert_eq!(Constant::String(Arc::from("a\"b")).to_string(), "\"a\\\"b\"");
    }
}
