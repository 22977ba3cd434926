//! Run-time locations of values: registers and stack slots.

use core::fmt;

use ruse_asm::Reg;

/// Where a value lives at run time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location {
    /// A machine register, sized to the datum it holds.
    Register(&'static Reg),
    /// A stack slot relative to `base`.
    Stack {
        /// The register the offset is relative to.
        base: &'static Reg,
        /// Byte offset from `base`.
        offset: i64,
    },
}

impl Location {
    /// The register, if the location is one.
    pub fn reg(&self) -> Option<&'static Reg> {
        match self {
            Location::Register(reg) => Some(reg),
            Location::Stack { .. } => None,
        }
    }

    /// Whether two locations name the same place.
    ///
    /// Registers compare by machine identity, so `al` and `rax` coincide.
    pub fn same_place(&self, other: &Location) -> bool {
        match (self, other) {
            (Location::Register(a), Location::Register(b)) => {
                a.family == b.family && a.num == b.num
            }
            (
                Location::Stack { base: a, offset: x },
                Location::Stack { base: b, offset: y },
            ) => a.num == b.num && x == y,
            _ => false,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Register(reg) => write!(f, "{reg}"),
            Location::Stack { base, offset } => write!(f, "({base} {offset})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_coincide_across_widths() {
        let al = Location::Register(Reg::by_name("al").unwrap());
        let rax = Location::Register(Reg::by_name("rax").unwrap());
        let rcx = Location::Register(Reg::by_name("rcx").unwrap());
        assert!(al.same_place(&rax));
        assert!(!al.same_place(&rcx));
    }

    #[test]
    fn display() {
        let rsp = Reg::by_name("rsp").unwrap();
        assert_eq!(Location::Stack { base: rsp, offset: 8 }.to_string(), "(rsp 8)");
    }
}
