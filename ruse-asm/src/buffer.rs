use std::io;

use crate::bits::{Evex, FieldMod, ModRM, Rex, Sib, RM_SIB};

/// A fixed-layout buffer for one instruction's bytes.
///
/// The encoder fills individual field groups; `encode_to` serialises the
/// present groups in the canonical order: prefix opcodes, sorted legacy
/// prefixes, REX, VEX/EVEX, opcode bytes, ModR/M, SIB, displacement,
/// immediate, code offset.
#[derive(Debug, Default, Clone)]
pub struct CodeBuffer {
    prefix_opcodes: [u8; 5],
    prefix_opcodes_len: usize,

    prefixes: [u8; 14],
    prefixes_len: usize,

    /// The REX byte group.
    pub rex: Rex,
    /// The VEX byte group.
    pub vex: crate::bits::Vex,
    /// The EVEX byte group.
    pub evex: Evex,

    opcodes: [u8; 3],
    opcodes_len: usize,

    /// The ModR/M byte.
    pub modrm: ModRM,
    use_modrm: bool,
    /// The SIB byte; emitted only when ModR/M selects it.
    pub sib: Sib,

    displacement: [u8; 8],
    displacement_len: usize,

    immediate: [u8; 8],
    immediate_len: usize,

    code_offset: [u8; 6],
    code_offset_len: usize,
}

impl CodeBuffer {
    /// A new, empty buffer.
    pub fn new() -> Self {
        let mut buf = CodeBuffer::default();
        buf.reset();
        buf
    }

    /// Clears every group, restoring the VEX/EVEX default patterns.
    pub fn reset(&mut self) {
        *self = CodeBuffer {
            vex: crate::bits::Vex::default(),
            evex: Evex::default(),
            ..CodeBuffer::default()
        };
    }

    /// Appends a prefix opcode byte.
    pub fn add_prefix_opcode(&mut self, byte: u8) {
        self.prefix_opcodes[self.prefix_opcodes_len] = byte;
        self.prefix_opcodes_len += 1;
    }

    /// Adds a legacy prefix, ignoring duplicates.
    pub fn add_prefix(&mut self, byte: u8) {
        if self.prefixes[..self.prefixes_len].contains(&byte) {
            return;
        }
        self.prefixes[self.prefixes_len] = byte;
        self.prefixes_len += 1;
    }

    /// The legacy prefixes added so far, unsorted.
    pub fn prefixes(&self) -> &[u8] {
        &self.prefixes[..self.prefixes_len]
    }

    /// Appends an opcode byte.
    pub fn add_opcode(&mut self, byte: u8) {
        self.opcodes[self.opcodes_len] = byte;
        self.opcodes_len += 1;
    }

    /// Adds `delta` to the final opcode byte, for `+r` style encodings.
    pub fn modify_last_opcode(&mut self, delta: u8) {
        debug_assert!(self.opcodes_len > 0);
        self.opcodes[self.opcodes_len - 1] = self.opcodes[self.opcodes_len - 1].wrapping_add(delta);
    }

    /// Marks the ModR/M byte as present even if its value is zero.
    pub fn set_use_modrm(&mut self) {
        self.use_modrm = true;
    }

    /// Whether the ModR/M byte will be emitted.
    pub fn use_modrm(&self) -> bool {
        self.use_modrm
    }

    /// Whether a SIB byte follows ModR/M.
    pub fn sib_present(&self) -> bool {
        self.use_modrm
            && self.modrm.mod_bits() != FieldMod::RegReg as u8
            && self.modrm.rm() == RM_SIB
    }

    /// Stores a little-endian displacement of `bytes` bytes.
    pub fn set_displacement(&mut self, value: i64, bytes: usize) {
        debug_assert!(bytes <= 8);
        self.displacement[..8].copy_from_slice(&value.to_le_bytes());
        self.displacement_len = bytes;
    }

    /// Stores a little-endian immediate of `bytes` bytes.
    pub fn set_immediate(&mut self, value: u64, bytes: usize) {
        debug_assert!(bytes <= 8);
        self.immediate[..8].copy_from_slice(&value.to_le_bytes());
        self.immediate_len = bytes;
    }

    /// Appends one trailing immediate byte, used by implied immediates.
    pub fn append_immediate(&mut self, byte: u8) {
        self.immediate[self.immediate_len] = byte;
        self.immediate_len += 1;
    }

    /// Stores a little-endian code offset of `bytes` bytes.
    pub fn set_code_offset(&mut self, value: i64, bytes: usize) {
        debug_assert!(bytes <= 6);
        self.code_offset[..6].copy_from_slice(&value.to_le_bytes()[..6]);
        self.code_offset_len = bytes;
    }

    /// The total encoded length in bytes.
    pub fn len(&self) -> usize {
        let mut len = self.prefix_opcodes_len + self.prefixes_len + self.opcodes_len;
        if self.rex.on() {
            len += 1;
        }
        if self.vex.on() {
            len += 3;
        }
        if self.evex.on() {
            len += 4;
        }
        if self.use_modrm {
            len += 1;
        }
        if self.sib_present() {
            len += 1;
        }
        len + self.displacement_len + self.immediate_len + self.code_offset_len
    }

    /// Whether nothing has been encoded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialises the present field groups in canonical order.
    pub fn encode_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(&self.prefix_opcodes[..self.prefix_opcodes_len])?;

        let mut prefixes = [0u8; 14];
        let prefixes = &mut prefixes[..self.prefixes_len];
        prefixes.copy_from_slice(&self.prefixes[..self.prefixes_len]);
        prefixes.sort_unstable();
        out.write_all(prefixes)?;

        if self.rex.on() {
            out.write_all(&[self.rex.byte()])?;
        }
        if self.vex.on() {
            out.write_all(&self.vex.bytes())?;
        }
        if self.evex.on() {
            out.write_all(&self.evex.bytes())?;
        }
        out.write_all(&self.opcodes[..self.opcodes_len])?;
        if self.use_modrm {
            out.write_all(&[self.modrm.byte()])?;
        }
        if self.sib_present() {
            out.write_all(&[self.sib.byte()])?;
        }
        out.write_all(&self.displacement[..self.displacement_len])?;
        out.write_all(&self.immediate[..self.immediate_len])?;
        out.write_all(&self.code_offset[..self.code_offset_len])?;
        Ok(())
    }

    /// The encoded bytes as a vector.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        self.encode_to(&mut out).expect("writing to a Vec");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_emit_sorted_and_deduplicated() {
        let mut buf = CodeBuffer::new();
        buf.add_prefix(0xf0);
        buf.add_prefix(0x66);
        buf.add_prefix(0xf0);
        buf.add_opcode(0x90);
        assert_eq!(buf.to_bytes(), vec![0x66, 0xf0, 0x90]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn modrm_may_be_zero_and_present() {
        let mut buf = CodeBuffer::new();
        buf.add_opcode(0x88);
        buf.set_use_modrm();
        assert_eq!(buf.to_bytes(), vec![0x88, 0x00]);
    }

    #[test]
    fn sib_requires_modrm_selector() {
        let mut buf = CodeBuffer::new();
        buf.add_opcode(0x8b);
        buf.set_use_modrm();
        buf.modrm.set_mod(FieldMod::DerefReg);
        buf.modrm.set_rm(RM_SIB);
        buf.sib.set_base(0b001);
        assert!(buf.sib_present());
        assert_eq!(buf.to_bytes(), vec![0x8b, 0b00_000_100, 0b00_000_001]);

        buf.modrm.set_mod(FieldMod::RegReg);
        assert!(!buf.sib_present());
    }

    #[test]
    fn little_endian_fields() {
        let mut buf = CodeBuffer::new();
        buf.add_opcode(0xe9);
        buf.set_code_offset(-2, 4);
        assert_eq!(buf.to_bytes(), vec![0xe9, 0xfe, 0xff, 0xff, 0xff]);

        buf.reset();
        buf.add_opcode(0xb8);
        buf.set_immediate(0x0102_0304, 4);
        assert_eq!(buf.to_bytes(), vec![0xb8, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn reset_restores_vex_defaults() {
        let mut buf = CodeBuffer::new();
        buf.vex.set_vvvv(0b0101);
        buf.vex.set_on();
        buf.reset();
        assert!(!buf.vex.on());
        assert_eq!(buf.vex, crate::bits::Vex::default());
        assert!(buf.is_empty());
    }
}
