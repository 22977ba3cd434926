use core::fmt;

/// An x86 CPU mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::EnumIter)]
pub enum Mode {
    /// 16-bit real or protected mode.
    Bits16,
    /// 32-bit protected mode.
    Bits32,
    /// 64-bit long mode.
    Bits64,
}

impl Mode {
    /// The mode's nominal width in bits.
    pub const fn bits(self) -> u16 {
        match self {
            Mode::Bits16 => 16,
            Mode::Bits32 => 32,
            Mode::Bits64 => 64,
        }
    }

    /// The default address size in bits.
    pub const fn address_bits(self) -> u16 {
        self.bits()
    }

    /// The default operand size in bits; 32 in long mode.
    pub const fn operand_bits(self) -> u16 {
        match self {
            Mode::Bits16 => 16,
            Mode::Bits32 | Mode::Bits64 => 32,
        }
    }

    /// The mode with the given width, if 16, 32 or 64.
    pub const fn from_bits(bits: u64) -> Option<Mode> {
        match bits {
            16 => Some(Mode::Bits16),
            32 => Some(Mode::Bits32),
            64 => Some(Mode::Bits64),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit mode", self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn widths_round_trip() {
        for mode in Mode::iter() {
            assert_eq!(Mode::from_bits(u64::from(mode.bits())), Some(mode));
        }
        assert_eq!(Mode::from_bits(8), None);
    }

    #[test]
    fn long_mode_defaults_to_32_bit_operands() {
        assert_eq!(Mode::Bits64.operand_bits(), 32);
        assert_eq!(Mode::Bits64.address_bits(), 64);
        assert_eq!(Mode::Bits16.operand_bits(), 16);
    }
}
