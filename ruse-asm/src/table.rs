//! The instruction table.
//!
//! A read-only catalogue of every supported x86 instruction form, generated
//! from the instruction database. Each entry names its operand shapes and
//! the full encoding recipe; the assembler matches operands against every
//! candidate of a mnemonic and the encoder follows the recipe.

use bitflags::bitflags;

use crate::mode::Mode;

mod generated;

pub use generated::FORMS;

bitflags! {
    /// The CPU modes an instruction form is legal in.
    pub struct ModeSet: u8 {
        /// Legal in 16-bit mode.
        const M16 = 0b001;
        /// Legal in 32-bit mode.
        const M32 = 0b010;
        /// Legal in 64-bit mode.
        const M64 = 0b100;
        /// Legal everywhere.
        const ALL = Self::M16.bits | Self::M32.bits | Self::M64.bits;
        /// Legal outside 64-bit mode.
        const NOT64 = Self::M16.bits | Self::M32.bits;
        /// Legal in 32-bit and 64-bit modes.
        const M32PLUS = Self::M32.bits | Self::M64.bits;
    }
}

impl ModeSet {
    /// Whether `mode` is in the set.
    pub fn supports(self, mode: Mode) -> bool {
        match mode {
            Mode::Bits16 => self.contains(ModeSet::M16),
            Mode::Bits32 => self.contains(ModeSet::M32),
            Mode::Bits64 => self.contains(ModeSet::M64),
        }
    }
}

/// The type class of one instruction parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// A sign-extended immediate.
    SignedImmediate,
    /// A zero-extended immediate.
    UnsignedImmediate,
    /// A register operand.
    Register,
    /// An x87 stack index, `st`/`stN`.
    StackIndex,
    /// A code offset relative to the next instruction.
    RelativeAddress,
    /// A segment:offset pair.
    FarPointer,
    /// A memory operand.
    Memory,
    /// An absolute memory offset.
    MemoryOffset,
    /// An implicit string destination, `(rdi)`.
    StringDst,
    /// An implicit string source, `(rsi)`.
    StringSrc,
}

/// Where a parameter's value lands in the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Encodes nothing; fixed registers and literal values.
    None,
    /// The ModR/M `reg` field.
    ModRMReg,
    /// The ModR/M `r/m` field, possibly with SIB and displacement.
    ModRMRm,
    /// The VEX/EVEX `vvvv` field.
    VexVVVV,
    /// A trailing immediate byte's top nibble.
    VexIs4,
    /// Added to the final opcode byte.
    Modifier,
    /// An x87 stack index added to the final opcode byte.
    StackIndex,
    /// A relative code offset field.
    CodeOffset,
    /// A raw displacement field with no ModR/M.
    Displacement,
    /// An immediate field.
    Immediate,
}

/// A register class filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegClass {
    /// 8-bit general purpose registers.
    Gp8,
    /// 16-bit general purpose registers.
    Gp16,
    /// 32-bit general purpose registers.
    Gp32,
    /// 64-bit general purpose registers.
    Gp64,
    /// Segment registers.
    Sreg,
    /// XMM registers.
    Xmm,
    /// YMM registers.
    Ymm,
    /// ZMM registers.
    Zmm,
    /// AVX-512 mask registers.
    Mask,
}

impl RegClass {
    /// Whether `reg` belongs to this class.
    pub fn matches(self, reg: &crate::reg::Reg) -> bool {
        use crate::reg::Family;
        match self {
            RegClass::Gp8 => reg.family == Family::GeneralPurpose && reg.bits == 8,
            RegClass::Gp16 => reg.family == Family::GeneralPurpose && reg.bits == 16,
            RegClass::Gp32 => reg.family == Family::GeneralPurpose && reg.bits == 32,
            RegClass::Gp64 => reg.family == Family::GeneralPurpose && reg.bits == 64,
            RegClass::Sreg => reg.family == Family::Segment,
            RegClass::Xmm => reg.family == Family::Vector && reg.bits == 128,
            RegClass::Ymm => reg.family == Family::Vector && reg.bits == 256,
            RegClass::Zmm => reg.family == Family::Vector && reg.bits == 512,
            RegClass::Mask => reg.family == Family::Mask,
        }
    }
}

/// How operand values are restricted beyond their kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Filter {
    /// No restriction.
    Any,
    /// Registers of one class.
    Reg(RegClass),
    /// One concrete register.
    Exact(&'static str),
    /// One literal value.
    Literal(u64),
}

/// One parameter of an instruction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    /// Type class.
    pub kind: ParamKind,
    /// Width in bits of the encoded value or accessed datum.
    pub bits: u16,
    /// Encoding destination.
    pub slot: Slot,
    /// Additional restriction on accepted operands.
    pub filter: Filter,
}

/// VEX encoding details of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VexInfo {
    /// Vector length bit.
    pub l: bool,
    /// Implied-prefix field.
    pub pp: u8,
    /// Opcode map field.
    pub m_mmmm: u8,
    /// VEX.W, if the form pins it.
    pub w: Option<bool>,
}

/// EVEX encoding details of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvexInfo {
    /// L' vector length bit.
    pub lp: bool,
    /// L vector length bit.
    pub l: bool,
    /// Implied-prefix field.
    pub pp: u8,
    /// Opcode map field.
    pub mm: u8,
    /// EVEX.W, if the form pins it.
    pub w: Option<bool>,
    /// Displacement compression factor.
    pub disp8: u8,
    /// Displacement compression factor under broadcast.
    pub disp8_bcst: u8,
}

/// A canonical assembly rendering and its expected machine code, used by
/// the round-trip test suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    /// Canonical assembly text.
    pub text: &'static str,
    /// The CPU mode the example assembles under.
    pub mode: Mode,
    /// Expected machine code.
    pub code: &'static [u8],
}

/// One instruction form: a unique (mnemonic, operand shapes, encoding)
/// triple from the instruction database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Form {
    /// Stable unique identifier; `'(match UID)` selects it exactly.
    pub uid: &'static str,
    /// Lower-case mnemonic.
    pub mnemonic: &'static str,
    /// Ordered parameter descriptors.
    pub params: &'static [Param],
    /// Prefix-opcode bytes emitted before everything else.
    pub prefix_opcodes: &'static [u8],
    /// Legacy prefixes the form requires.
    pub mandatory_prefixes: &'static [u8],
    /// The 1–3 opcode bytes.
    pub opcodes: &'static [u8],
    /// Fixed value for the ModR/M `reg` field.
    pub modrm_reg: Option<u8>,
    /// Whether a ModR/M byte is present even without a fixed `reg`.
    pub modrm: bool,
    /// Whether a REX prefix is mandatory.
    pub rex: bool,
    /// Whether REX.W is mandatory.
    pub rex_w: bool,
    /// Whether REX.R is mandatory.
    pub rex_r: bool,
    /// VEX details, if VEX-encoded.
    pub vex: Option<VexInfo>,
    /// EVEX details, if EVEX-encoded.
    pub evex: Option<EvexInfo>,
    /// Modes the form is legal in.
    pub modes: ModeSet,
    /// Operand size driving the operand-size override prefix.
    pub operand_bits: u16,
    /// Data size; 64 triggers REX.W promotion in 64-bit mode, and smaller
    /// sizes win ties during form selection.
    pub data_bits: u16,
    /// Whether `rep` prefixes are rejected.
    pub no_rep: bool,
    /// Whether EVEX-extended registers are rejected.
    pub no_vex: bool,
    /// Trailing immediate bytes implied by the form.
    pub implied_imm: &'static [u8],
    /// Canonical round-trip example.
    pub example: Option<Example>,
}

impl Form {
    /// The number of operands the form takes.
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the form is VEX- or EVEX-encoded.
    pub fn vex_encoded(&self) -> bool {
        self.vex.is_some() || self.evex.is_some()
    }
}

/// All forms with the given mnemonic.
///
/// The generated table is sorted by mnemonic, so the candidate list is a
/// contiguous slice.
pub fn by_mnemonic(mnemonic: &str) -> &'static [Form] {
    let start = FORMS.partition_point(|f| f.mnemonic < mnemonic);
    let end = FORMS.partition_point(|f| f.mnemonic <= mnemonic);
    &FORMS[start..end]
}

/// The single form with the given UID, if any.
pub fn by_uid(uid: &str) -> Option<&'static Form> {
    FORMS.iter().find(|f| f.uid == uid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_table_is_sorted_by_mnemonic() {
        for pair in FORMS.windows(2) {
            assert!(
                pair[0].mnemonic <= pair[1].mnemonic,
                "{} sorts after {}",
                pair[0].uid,
                pair[1].uid
            );
        }
    }

    #[test]
    fn uids_are_unique() {
        for (i, a) in FORMS.iter().enumerate() {
            for b in &FORMS[i + 1..] {
                assert_ne!(a.uid, b.uid);
            }
        }
    }

    #[test]
    fn uids_resolve() {
        for form in FORMS {
            assert_eq!(by_uid(form.uid).unwrap().uid, form.uid);
        }
        assert!(by_uid("mov_r1_r2").is_none());
    }

    #[test]
    fn candidates_share_the_mnemonic() {
        let movs = by_mnemonic("mov");
        assert!(!movs.is_empty());
        assert!(movs.iter().all(|f| f.mnemonic == "mov"));
        assert!(by_mnemonic("zz").is_empty());
    }

    #[test]
    fn opcode_counts_are_legal() {
        for form in FORMS {
            assert!((1..=3).contains(&form.opcodes.len()), "{}", form.uid);
            assert!(form.params.len() <= 4, "{}", form.uid);
            assert!(form.prefix_opcodes.len() <= 5, "{}", form.uid);
        }
    }
}
