use core::fmt;

use crate::reg::{Family, Reg};
use crate::reloc::RelocKind;

/// A memory operand.
///
/// `scale == 0` means "no scale": an implicit ×1 when an index is present.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Memory {
    /// Segment override register.
    pub segment: Option<&'static Reg>,
    /// Base register; may be a paired 16-bit base.
    pub base: Option<&'static Reg>,
    /// Index register.
    pub index: Option<&'static Reg>,
    /// Index multiplier: 0 (absent), 1, 2, 4 or 8.
    pub scale: u8,
    /// Signed displacement.
    pub displacement: i64,
    /// Whether a displacement was written, even if zero.
    pub have_displacement: bool,
}

impl Memory {
    /// A plain `(base)` dereference.
    pub fn base(base: &'static Reg) -> Self {
        Memory {
            segment: None,
            base: Some(base),
            index: None,
            scale: 0,
            displacement: 0,
            have_displacement: false,
        }
    }

    /// A `(base displacement)` dereference.
    pub fn base_disp(base: &'static Reg, displacement: i64) -> Self {
        Memory {
            displacement,
            have_displacement: true,
            ..Memory::base(base)
        }
    }

    /// A displacement-only absolute reference.
    pub fn disp(displacement: i64) -> Self {
        Memory {
            segment: None,
            base: None,
            index: None,
            scale: 0,
            displacement,
            have_displacement: true,
        }
    }

    /// Checks the structural invariants of the operand.
    ///
    /// Base and index must agree on width, paired 16-bit bases may carry
    /// neither index nor scale, and the scale must be 0, 1, 2, 4 or 8.
    pub fn validate(&self) -> Result<(), MemoryError> {
        if !matches!(self.scale, 0 | 1 | 2 | 4 | 8) {
            return Err(MemoryError::BadScale(self.scale));
        }
        if let Some(base) = self.base {
            if base.family == Family::Pair && (self.index.is_some() || self.scale != 0) {
                return Err(MemoryError::IndexedPair(base.name));
            }
        }
        if let (Some(base), Some(index)) = (self.base, self.index) {
            if base.bits != index.bits {
                return Err(MemoryError::WidthMismatch {
                    base: base.name,
                    index: index.name,
                });
            }
        }
        if let Some(index) = self.index {
            if index.reg3() == 0b100 && !index.rex_bit() && index.bits != 16 {
                // The stack pointer has no SIB index encoding.
                return Err(MemoryError::BadIndex(index.name));
            }
        }
        Ok(())
    }

    /// The address width in bits, from the registers involved.
    pub fn address_bits(&self) -> Option<u16> {
        self.base.or(self.index).map(|r| r.bits)
    }
}

impl fmt::Display for Memory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        if let Some(seg) = self.segment {
            write!(f, "{seg} ")?;
        }
        if let Some(base) = self.base {
            write!(f, "{base}")?;
        }
        if let Some(index) = self.index {
            if self.base.is_some() {
                write!(f, " ")?;
            }
            write!(f, "(* {index} {})", self.scale.max(1))?;
        }
        if self.have_displacement {
            if self.base.is_some() || self.index.is_some() {
                write!(f, " ")?;
            }
            write!(f, "{}", self.displacement)?;
        }
        write!(f, ")")
    }
}

/// A structural error in a memory operand.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Scale out of the permitted set.
    #[error("invalid scale {0}; must be 1, 2, 4 or 8")]
    BadScale(u8),
    /// A paired 16-bit base combined with an index or scale.
    #[error("16-bit base pair {0} cannot take an index or scale")]
    IndexedPair(&'static str),
    /// Base and index widths disagree.
    #[error("base {base} and index {index} have different widths")]
    WidthMismatch {
        /// The base register name.
        base: &'static str,
        /// The index register name.
        index: &'static str,
    },
    /// A register with no index encoding.
    #[error("{0} cannot be used as an index register")]
    BadIndex(&'static str),
}

/// A resolved instruction operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// An immediate value, sign bits included.
    Imm(i128),
    /// A register.
    Reg(&'static Reg),
    /// An x87 stack index, `st3`.
    StackIndex(u8),
    /// A code offset relative to the byte after the instruction.
    Rel(i64),
    /// An unresolved label reference; encodes as zero until linked.
    Label(String),
    /// A far pointer: 16-bit segment and an offset, packed with the
    /// segment in the high bits.
    Far {
        /// Segment selector.
        segment: u16,
        /// Offset within the segment.
        offset: u32,
    },
    /// A memory operand.
    Mem(Memory),
    /// An absolute memory offset, optionally segment-relative.
    Moffset {
        /// Segment override register.
        segment: Option<&'static Reg>,
        /// Absolute address.
        address: u64,
    },
    /// String destination operand, `(di)`/`(edi)`/`(rdi)`.
    StringDst(&'static Reg),
    /// String source operand, `(si)`/`(esi)`/`(rsi)`.
    StringSrc(&'static Reg),
    /// A symbolic reference that encodes as the relocation placeholder.
    Reloc {
        /// Referenced symbol.
        name: String,
        /// Relocation kind.
        kind: RelocKind,
    },
}

impl Operand {
    /// The register, if this operand is one.
    pub fn reg(&self) -> Option<&'static Reg> {
        match self {
            Operand::Reg(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_scale() {
        let mut mem = Memory::base(Reg::by_name("rax").unwrap());
        mem.index = Some(Reg::by_name("rcx").unwrap());
        mem.scale = 3;
        assert_eq!(mem.validate(), Err(MemoryError::BadScale(3)));
        mem.scale = 4;
        assert_eq!(mem.validate(), Ok(()));
    }

    #[test]
    fn validates_width_agreement() {
        let mut mem = Memory::base(Reg::by_name("rax").unwrap());
        mem.index = Some(Reg::by_name("ecx").unwrap());
        assert!(matches!(
            mem.validate(),
            Err(MemoryError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn pairs_reject_indexes() {
        let mut mem = Memory::base(Reg::by_name("bx+si").unwrap());
        assert_eq!(mem.validate(), Ok(()));
        mem.index = Some(Reg::by_name("di").unwrap());
        assert!(matches!(mem.validate(), Err(MemoryError::IndexedPair(_))));
    }

    #[test]
    fn stack_pointer_rejected_as_index() {
        let mut mem = Memory::base(Reg::by_name("rax").unwrap());
        mem.index = Some(Reg::by_name("rsp").unwrap());
        assert!(matches!(mem.validate(), Err(MemoryError::BadIndex(_))));
        mem.index = Some(Reg::by_name("r12").unwrap());
        assert_eq!(mem.validate(), Ok(()));
    }
}
