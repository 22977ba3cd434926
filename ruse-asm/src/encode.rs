//! The instruction encoder.
//!
//! Given a chosen form and its resolved operands, fills a [`CodeBuffer`]
//! with the exact byte groups: mandatory prefixes and opcode bytes from the
//! form, user prefixes, automatic segment/address-size/operand-size
//! overrides, REX.W promotion, then one encoding step per operand slot,
//! with the ModR/M + SIB + displacement assembly for every addressing mode.

use crate::bits::{
    FieldMod, NO_BASE, NO_INDEX, RM_DISP_ONLY_16, RM_DISP_ONLY_32, RM_SIB,
};
use crate::buffer::CodeBuffer;
use crate::insn::Insn;
use crate::mode::Mode;
use crate::operand::{Memory, MemoryError, Operand};
use crate::reg::{Family, Reg};
use crate::table::{Form, Slot};

/// The value encoded into a relocated field, truncated to the field width.
///
/// The pattern is recognisable in hex dumps and cannot be mistaken for a
/// real small address.
pub const RELOCATION_PLACEHOLDER: u64 = 0x1122_3344_5566_7788;

/// An error produced while encoding an instruction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    /// A structurally invalid memory operand.
    #[error(transparent)]
    Memory(#[from] MemoryError),
    /// Displacement too wide for the addressing mode.
    #[error("displacement {0} does not fit in the chosen addressing mode")]
    DisplacementRange(i64),
    /// Relative offset too wide for the field.
    #[error("code offset {0} does not fit in {1} bits")]
    CodeOffsetRange(i64, u16),
    /// A code-offset width the hardware does not define.
    #[error("unsupported code offset width {0}")]
    UnsupportedWidth(u16),
    /// 16-bit addressing requested in long mode.
    #[error("16-bit addressing is not available in 64-bit mode")]
    SixteenBitAddressing,
    /// An address width unavailable in the CPU mode.
    #[error("{0}-bit addressing is not available in {1}")]
    BadAddressSize(u16, Mode),
    /// A legacy high-byte register combined with a REX prefix.
    #[error("register {0} cannot be encoded with a REX prefix")]
    RexConflict(&'static str),
    /// An unusable 16-bit base register.
    #[error("register {0} is not a valid 16-bit base")]
    Bad16BitBase(&'static str),
    /// The operand list does not match the form's parameters; the caller
    /// matched operands incorrectly.
    #[error("form {form} expects {expected} operands, got {got}")]
    OperandCount {
        /// The form's UID.
        form: &'static str,
        /// Expected operand count.
        expected: usize,
        /// Provided operand count.
        got: usize,
    },
    /// The resolved operand cannot occupy the parameter's slot.
    #[error("form {0} is inconsistent with operand {1}")]
    Mismatch(&'static str, &'static str),
}

// Routes a register extension bit to the byte group that carries it for
// this form: EVEX, VEX, or REX.
fn set_ext_r(buf: &mut CodeBuffer, form: &Form, bit: bool) {
    if form.evex.is_some() {
        buf.evex.set_r(bit);
    } else if form.vex.is_some() {
        buf.vex.set_r(bit);
    } else {
        buf.rex.set_r(bit);
    }
}

fn set_ext_b(buf: &mut CodeBuffer, form: &Form, bit: bool) {
    if form.evex.is_some() {
        buf.evex.set_b(bit);
    } else if form.vex.is_some() {
        buf.vex.set_b(bit);
    } else {
        buf.rex.set_b(bit);
    }
}

fn set_ext_x(buf: &mut CodeBuffer, form: &Form, bit: bool) {
    if form.evex.is_some() {
        buf.evex.set_x(bit);
    } else if form.vex.is_some() {
        buf.vex.set_x(bit);
    } else {
        buf.rex.set_x(bit);
    }
}

fn segment_prefix(seg: &'static Reg) -> u8 {
    match seg.num {
        0 => 0x26, // es
        1 => 0x2e, // cs
        2 => 0x36, // ss
        3 => 0x3e, // ds
        4 => 0x64, // fs
        _ => 0x65, // gs
    }
}

/// Encodes `insn` into `buf` for the given CPU mode.
///
/// The buffer is reset first; encoding the same record twice produces
/// equal buffers.
pub fn encode(buf: &mut CodeBuffer, mode: Mode, insn: &Insn) -> Result<(), EncodeError> {
    buf.reset();
    let form = insn.form;

    if insn.args.len() != form.params.len() {
        return Err(EncodeError::OperandCount {
            form: form.uid,
            expected: form.params.len(),
            got: insn.args.len(),
        });
    }

    // Mandatory details from the form.
    for &byte in form.prefix_opcodes {
        buf.add_prefix_opcode(byte);
    }
    for &prefix in form.mandatory_prefixes {
        buf.add_prefix(prefix);
    }
    if form.rex {
        buf.rex.set_on();
    }
    buf.rex.set_w(form.rex_w);
    buf.rex.set_r(form.rex_r);
    if let Some(vex) = form.vex {
        buf.vex.set_on();
        buf.vex.set_l(vex.l);
        buf.vex.set_pp(vex.pp);
        buf.vex.set_m_mmmm(vex.m_mmmm);
        if let Some(w) = vex.w {
            buf.vex.set_w(w);
        }
    }
    if let Some(evex) = form.evex {
        buf.evex.set_on();
        buf.evex.set_lp(evex.lp);
        buf.evex.set_l(evex.l);
        buf.evex.set_pp(evex.pp);
        buf.evex.set_mm(evex.mm);
        if let Some(w) = evex.w {
            buf.evex.set_w(w);
        }
        buf.evex.set_z(insn.zero);
        buf.evex.set_aaa(insn.mask);
        buf.evex.set_bb(insn.broadcast);
    }
    if let Some(reg) = form.modrm_reg {
        buf.modrm.set_reg(reg);
        buf.set_use_modrm();
    }
    for &byte in form.opcodes {
        buf.add_opcode(byte);
    }

    // Prefixes requested in the source.
    for &prefix in &insn.prefixes {
        buf.add_prefix(prefix);
    }
    if insn.rex_w {
        buf.rex.set_w(true);
    }

    // Segment overrides and the address-size prefix, inferred from memory
    // and string operands.
    for arg in &insn.args {
        let addr_bits = match arg {
            Operand::Mem(mem) => {
                if let Some(seg) = mem.segment {
                    buf.add_prefix(segment_prefix(seg));
                }
                mem.address_bits()
            }
            Operand::Moffset { segment, .. } => {
                if let Some(seg) = segment {
                    buf.add_prefix(segment_prefix(seg));
                }
                None
            }
            Operand::StringDst(reg) | Operand::StringSrc(reg) => Some(reg.bits),
            _ => None,
        };
        if let Some(bits) = addr_bits {
            if bits != mode.address_bits() && bits > 8 {
                match (bits, mode) {
                    (16, Mode::Bits64) => return Err(EncodeError::SixteenBitAddressing),
                    (64, Mode::Bits16) | (64, Mode::Bits32) => {
                        return Err(EncodeError::BadAddressSize(bits, mode))
                    }
                    _ => buf.add_prefix(0x67),
                }
            }
        }
    }

    // Operand-size override.
    if !form.vex_encoded() && form.operand_bits != 0 {
        let needed = match mode {
            Mode::Bits16 => form.operand_bits == 32,
            Mode::Bits32 | Mode::Bits64 => form.operand_bits == 16,
        };
        if needed {
            buf.add_prefix(0x66);
        }
    }

    // REX.W promotion for 64-bit data in long mode.
    if mode == Mode::Bits64 && form.data_bits == 64 && !form.vex_encoded() {
        buf.rex.set_w(true);
    }

    let mut excludes_rex: Option<&'static str> = None;
    let mut track_gp8 = |buf: &mut CodeBuffer, reg: &'static Reg| {
        if reg.needs_rex {
            buf.rex.set_on();
        }
        if reg.excludes_rex && excludes_rex.is_none() {
            excludes_rex = Some(reg.name);
        }
    };

    for (param, arg) in form.params.iter().zip(&insn.args) {
        match param.slot {
            Slot::None => {}
            Slot::Immediate => match arg {
                Operand::Imm(value) => {
                    buf.set_immediate(*value as u64, usize::from(param.bits / 8));
                }
                Operand::Far { segment, offset } => {
                    let packed =
                        (u64::from(*segment) << param.bits) | u64::from(*offset);
                    buf.set_immediate(packed, usize::from(param.bits / 8) + 2);
                }
                Operand::Reloc { .. } => {
                    let placeholder = RELOCATION_PLACEHOLDER >> (64 - u32::from(param.bits));
                    buf.set_immediate(placeholder, usize::from(param.bits / 8));
                }
                _ => return Err(EncodeError::Mismatch(form.uid, "immediate")),
            },
            Slot::CodeOffset => {
                if !matches!(param.bits, 8 | 16 | 32 | 48) {
                    return Err(EncodeError::UnsupportedWidth(param.bits));
                }
                let bytes = usize::from(param.bits / 8);
                match arg {
                    Operand::Rel(value) => {
                        let limit = 1i64 << (param.bits - 1);
                        if *value < -limit || *value >= limit {
                            return Err(EncodeError::CodeOffsetRange(*value, param.bits));
                        }
                        buf.set_code_offset(*value, bytes);
                    }
                    // Labels encode as zero until distances are known.
                    Operand::Label(_) => buf.set_code_offset(0, bytes),
                    Operand::Reloc { .. } => {
                        let placeholder =
                            RELOCATION_PLACEHOLDER >> (64 - u32::from(param.bits));
                        buf.set_code_offset(placeholder as i64, bytes);
                    }
                    _ => return Err(EncodeError::Mismatch(form.uid, "code offset")),
                }
            }
            Slot::ModRMReg => {
                let reg = arg
                    .reg()
                    .ok_or(EncodeError::Mismatch(form.uid, "modrm.reg"))?;
                track_gp8(buf, reg);
                set_ext_r(buf, form, reg.rex_bit());
                buf.evex.set_rp(reg.evex_bit());
                buf.modrm.set_reg(reg.reg3());
                buf.set_use_modrm();
            }
            Slot::ModRMRm => match arg {
                Operand::Reg(reg) => {
                    track_gp8(buf, reg);
                    buf.modrm.set_mod(FieldMod::RegReg);
                    buf.modrm.set_rm(reg.reg3());
                    set_ext_b(buf, form, reg.rex_bit());
                    buf.evex.set_x(reg.evex_bit());
                    buf.set_use_modrm();
                }
                Operand::Mem(mem) => encode_memory(buf, mode, form, insn, mem)?,
                _ => return Err(EncodeError::Mismatch(form.uid, "modrm.rm")),
            },
            Slot::VexVVVV => {
                let reg = arg.reg().ok_or(EncodeError::Mismatch(form.uid, "vvvv"))?;
                buf.vex.set_vvvv(reg.num & 0b1111);
                buf.evex.set_vvvv(reg.num & 0b1111);
                buf.evex.set_vp(reg.evex_bit());
            }
            Slot::VexIs4 => {
                let reg = arg.reg().ok_or(EncodeError::Mismatch(form.uid, "is4"))?;
                buf.append_immediate(reg.is4());
            }
            Slot::Modifier => {
                let reg = arg
                    .reg()
                    .ok_or(EncodeError::Mismatch(form.uid, "register modifier"))?;
                track_gp8(buf, reg);
                buf.modify_last_opcode(reg.reg3());
                set_ext_b(buf, form, reg.rex_bit());
            }
            Slot::StackIndex => match arg {
                Operand::StackIndex(index) => buf.modify_last_opcode(*index),
                _ => return Err(EncodeError::Mismatch(form.uid, "stack index")),
            },
            Slot::Displacement => match arg {
                Operand::Moffset { address, .. } => {
                    buf.set_displacement(*address as i64, usize::from(param.bits / 8));
                }
                _ => return Err(EncodeError::Mismatch(form.uid, "memory offset")),
            },
        }
    }

    // Finalisation. EVEX carries the REX fields itself; an absent VEX/EVEX
    // group is reset so its vvvv default does not leak.
    if !buf.vex.on() && !buf.evex.on() {
        buf.vex.reset();
        buf.evex.reset();
    }
    if buf.evex.on() {
        buf.rex.reset();
    }
    if let Some(name) = excludes_rex {
        if buf.rex.on() {
            return Err(EncodeError::RexConflict(name));
        }
    }
    if buf.modrm.byte() != 0 || form.modrm {
        buf.set_use_modrm();
    }
    for &byte in form.implied_imm {
        buf.append_immediate(byte);
    }
    Ok(())
}

// The displacement widths the 32/64-bit addressing modes distinguish.
enum Disp {
    None,
    Small(i8),
    Large(i32),
}

fn classify_disp(
    disp: i64,
    forced: bool,
    form: &Form,
    insn: &Insn,
) -> Result<Disp, EncodeError> {
    if disp == 0 && !forced {
        return Ok(Disp::None);
    }
    let large = || {
        i32::try_from(disp)
            .map(Disp::Large)
            .map_err(|_| EncodeError::DisplacementRange(disp))
    };
    if let Some(evex) = form.evex {
        // EVEX displacement compression: scale down by the tuple factor
        // when it divides evenly, else fall back to the wide form.
        let n = i64::from(if insn.broadcast {
            evex.disp8_bcst
        } else {
            evex.disp8
        });
        if n > 0 && disp % n == 0 {
            if let Ok(compressed) = i8::try_from(disp / n) {
                return Ok(Disp::Small(compressed));
            }
        }
        return large();
    }
    match i8::try_from(disp) {
        Ok(small) => Ok(Disp::Small(small)),
        Err(_) => large(),
    }
}

fn scale_code(scale: u8) -> u8 {
    match scale {
        0 | 1 => 0,
        2 => 1,
        4 => 2,
        _ => 3,
    }
}

fn encode_memory(
    buf: &mut CodeBuffer,
    mode: Mode,
    form: &Form,
    insn: &Insn,
    mem: &Memory,
) -> Result<(), EncodeError> {
    mem.validate()?;
    buf.set_use_modrm();

    let addr_bits = mem.address_bits().unwrap_or(mode.address_bits());
    if addr_bits == 16 {
        if mode == Mode::Bits64 {
            return Err(EncodeError::SixteenBitAddressing);
        }
        return encode_memory16(buf, mem);
    }

    match (mem.base, mem.index) {
        (None, None) => {
            // Pure displacement.
            let disp = i32::try_from(mem.displacement)
                .map_err(|_| EncodeError::DisplacementRange(mem.displacement))?;
            buf.modrm.set_mod(FieldMod::DerefReg);
            if mode == Mode::Bits64 {
                buf.modrm.set_rm(RM_SIB);
                buf.sib.set_base(NO_BASE);
                buf.sib.set_index(NO_INDEX);
            } else {
                buf.modrm.set_rm(RM_DISP_ONLY_32);
            }
            buf.set_displacement(i64::from(disp), 4);
        }
        (None, Some(index)) => {
            // Scaled index with no base: SIB with a 32-bit displacement,
            // zero if absent.
            let disp = i32::try_from(mem.displacement)
                .map_err(|_| EncodeError::DisplacementRange(mem.displacement))?;
            buf.modrm.set_mod(FieldMod::DerefReg);
            buf.modrm.set_rm(RM_SIB);
            buf.sib.set_base(NO_BASE);
            buf.sib.set_index(index.reg3());
            buf.sib.set_scale(scale_code(mem.scale));
            set_ext_x(buf, form, index.rex_bit());
            buf.set_displacement(i64::from(disp), 4);
        }
        (Some(base), index) => {
            let use_sib = index.is_some() || base.reg3() == 0b100;
            // A base of BP or R13 has no mod=00 encoding; force a zero
            // 8-bit displacement.
            let forced = base.reg3() == 0b101;
            let rm = if use_sib {
                buf.sib.set_base(base.reg3());
                set_ext_b(buf, form, base.rex_bit());
                match index {
                    Some(index) => {
                        buf.sib.set_index(index.reg3());
                        buf.sib.set_scale(scale_code(mem.scale));
                        set_ext_x(buf, form, index.rex_bit());
                    }
                    None => buf.sib.set_index(NO_INDEX),
                }
                RM_SIB
            } else {
                set_ext_b(buf, form, base.rex_bit());
                base.reg3()
            };
            buf.modrm.set_rm(rm);
            match classify_disp(mem.displacement, forced, form, insn)? {
                Disp::None => buf.modrm.set_mod(FieldMod::DerefReg),
                Disp::Small(small) => {
                    buf.modrm.set_mod(FieldMod::SmallDisp);
                    buf.set_displacement(i64::from(small), 1);
                }
                Disp::Large(large) => {
                    buf.modrm.set_mod(FieldMod::LargeDisp);
                    buf.set_displacement(i64::from(large), 4);
                }
            }
        }
    }
    Ok(())
}

// 16-bit addressing per the Intel table: paired bases take r/m 0..3,
// single SI/DI/BP/BX take r/m 4..7.
fn encode_memory16(buf: &mut CodeBuffer, mem: &Memory) -> Result<(), EncodeError> {
    if let Some(index) = mem.index {
        return Err(EncodeError::Bad16BitBase(index.name));
    }
    let rm = match mem.base {
        None => {
            let disp = i16::try_from(mem.displacement)
                .map_err(|_| EncodeError::DisplacementRange(mem.displacement))?;
            buf.modrm.set_mod(FieldMod::DerefReg);
            buf.modrm.set_rm(RM_DISP_ONLY_16);
            buf.set_displacement(i64::from(disp), 2);
            return Ok(());
        }
        Some(base) if base.family == Family::Pair => base.num,
        Some(base) => match base.name {
            "si" => 0b100,
            "di" => 0b101,
            "bp" => 0b110,
            "bx" => 0b111,
            _ => return Err(EncodeError::Bad16BitBase(base.name)),
        },
    };
    buf.modrm.set_rm(rm);
    let forced = rm == RM_DISP_ONLY_16; // bare BP has no mod=00 encoding
    let disp = mem.displacement;
    if disp == 0 && !forced {
        buf.modrm.set_mod(FieldMod::DerefReg);
    } else if let Ok(small) = i8::try_from(disp) {
        buf.modrm.set_mod(FieldMod::SmallDisp);
        buf.set_displacement(i64::from(small), 1);
    } else {
        let large = i16::try_from(disp)
            .map_err(|_| EncodeError::DisplacementRange(disp))?;
        buf.modrm.set_mod(FieldMod::LargeDisp);
        buf.set_displacement(i64::from(large), 2);
    }
    Ok(())
}
