//! Typed wrappers around the x86 instruction byte groups.
//!
//! Each wrapper exposes named field mutators rather than ad-hoc shifts. The
//! VEX and EVEX groups start from their architectural default patterns
//! (`vvvv = 0b1111`, `V' = 1`) on reset, not on field writes.

/// The ModR/M `mod` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldMod {
    /// Dereference the base with no displacement.
    DerefReg = 0b00,
    /// Dereference with an 8-bit displacement.
    SmallDisp = 0b01,
    /// Dereference with a mode-sized displacement.
    LargeDisp = 0b10,
    /// Direct register operand.
    RegReg = 0b11,
}

/// ModR/M `r/m` value that selects a trailing SIB byte.
pub const RM_SIB: u8 = 0b100;

/// ModR/M `r/m` value for displacement-only addressing in 32-bit modes.
pub const RM_DISP_ONLY_32: u8 = 0b101;

/// ModR/M `r/m` value for displacement-only addressing in 16-bit mode.
pub const RM_DISP_ONLY_16: u8 = 0b110;

/// SIB index value meaning "no index".
pub const NO_INDEX: u8 = 0b100;

/// SIB base value meaning "no base" (with `mod = 00`).
pub const NO_BASE: u8 = 0b101;

/// SIB base value selecting the stack pointer.
pub const STACK_POINTER_BASE: u8 = 0b100;

/// The REX prefix byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rex {
    on: bool,
    w: bool,
    r: bool,
    x: bool,
    b: bool,
}

impl Rex {
    /// Marks the prefix as present without setting any bits.
    pub fn set_on(&mut self) {
        self.on = true;
    }

    /// Sets REX.W; marks the prefix present if `w` is set.
    pub fn set_w(&mut self, w: bool) {
        self.w |= w;
        self.on |= w;
    }

    /// Sets REX.R; marks the prefix present if `r` is set.
    pub fn set_r(&mut self, r: bool) {
        self.r |= r;
        self.on |= r;
    }

    /// Sets REX.X; marks the prefix present if `x` is set.
    pub fn set_x(&mut self, x: bool) {
        self.x |= x;
        self.on |= x;
    }

    /// Sets REX.B; marks the prefix present if `b` is set.
    pub fn set_b(&mut self, b: bool) {
        self.b |= b;
        self.on |= b;
    }

    /// Whether the prefix is present.
    pub fn on(&self) -> bool {
        self.on
    }

    /// Whether REX.W is set.
    pub fn w(&self) -> bool {
        self.w
    }

    /// Clears the prefix entirely.
    pub fn reset(&mut self) {
        *self = Rex::default();
    }

    /// The encoded prefix byte.
    pub fn byte(&self) -> u8 {
        0x40
            | (u8::from(self.w) << 3)
            | (u8::from(self.r) << 2)
            | (u8::from(self.x) << 1)
            | u8::from(self.b)
    }
}

/// The ModR/M byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModRM(u8);

impl ModRM {
    /// Sets the two-bit `mod` field.
    pub fn set_mod(&mut self, m: FieldMod) {
        self.0 = (self.0 & 0b0011_1111) | ((m as u8) << 6);
    }

    /// Sets the three-bit `reg` field.
    pub fn set_reg(&mut self, reg: u8) {
        self.0 = (self.0 & 0b1100_0111) | ((reg & 0b111) << 3);
    }

    /// Sets the three-bit `r/m` field.
    pub fn set_rm(&mut self, rm: u8) {
        self.0 = (self.0 & 0b1111_1000) | (rm & 0b111);
    }

    /// The `mod` field.
    pub fn mod_bits(&self) -> u8 {
        self.0 >> 6
    }

    /// The `r/m` field.
    pub fn rm(&self) -> u8 {
        self.0 & 0b111
    }

    /// The encoded byte.
    pub fn byte(&self) -> u8 {
        self.0
    }

    /// Clears the byte.
    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// The SIB byte.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Sib(u8);

impl Sib {
    /// Sets the two-bit scale code (0 → ×1 … 3 → ×8).
    pub fn set_scale(&mut self, code: u8) {
        self.0 = (self.0 & 0b0011_1111) | ((code & 0b11) << 6);
    }

    /// Sets the three-bit index field.
    pub fn set_index(&mut self, index: u8) {
        self.0 = (self.0 & 0b1100_0111) | ((index & 0b111) << 3);
    }

    /// Sets the three-bit base field.
    pub fn set_base(&mut self, base: u8) {
        self.0 = (self.0 & 0b1111_1000) | (base & 0b111);
    }

    /// The encoded byte.
    pub fn byte(&self) -> u8 {
        self.0
    }

    /// Clears the byte.
    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

/// The three-byte VEX prefix group: `0xc4` plus two payload bytes.
///
/// Extension and `vvvv` fields are stored inverted, as the hardware reads
/// them; the setters take logical values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vex {
    on: bool,
    b1: u8,
    b2: u8,
}

impl Default for Vex {
    fn default() -> Self {
        Vex {
            on: false,
            // R/X/B inverted off, m_mmmm = 1 (0f map).
            b1: 0b1110_0001,
            // vvvv inverted default 0b1111.
            b2: 0b0111_1000,
        }
    }
}

impl Vex {
    /// Marks the group present.
    pub fn set_on(&mut self) {
        self.on = true;
    }

    /// Whether the group is present.
    pub fn on(&self) -> bool {
        self.on
    }

    /// Restores the default pattern and marks the group absent.
    pub fn reset(&mut self) {
        *self = Vex::default();
    }

    /// Sets the logical R extension bit.
    pub fn set_r(&mut self, r: bool) {
        self.b1 = (self.b1 & 0b0111_1111) | (u8::from(!r) << 7);
    }

    /// Sets the logical X extension bit.
    pub fn set_x(&mut self, x: bool) {
        self.b1 = (self.b1 & 0b1011_1111) | (u8::from(!x) << 6);
    }

    /// Sets the logical B extension bit.
    pub fn set_b(&mut self, b: bool) {
        self.b1 = (self.b1 & 0b1101_1111) | (u8::from(!b) << 5);
    }

    /// Sets the five-bit opcode map field.
    pub fn set_m_mmmm(&mut self, m: u8) {
        self.b1 = (self.b1 & 0b1110_0000) | (m & 0b1_1111);
    }

    /// Sets VEX.W.
    pub fn set_w(&mut self, w: bool) {
        self.b2 = (self.b2 & 0b0111_1111) | (u8::from(w) << 7);
    }

    /// Sets the logical four-bit `vvvv` register field.
    pub fn set_vvvv(&mut self, v: u8) {
        self.b2 = (self.b2 & 0b1000_0111) | (((!v) & 0b1111) << 3);
    }

    /// Sets the vector length bit.
    pub fn set_l(&mut self, l: bool) {
        self.b2 = (self.b2 & 0b1111_1011) | (u8::from(l) << 2);
    }

    /// Sets the implied-prefix field.
    pub fn set_pp(&mut self, pp: u8) {
        self.b2 = (self.b2 & 0b1111_1100) | (pp & 0b11);
    }

    /// The encoded group, escape byte included.
    pub fn bytes(&self) -> [u8; 3] {
        [0xc4, self.b1, self.b2]
    }
}

/// The four-byte EVEX prefix group: `0x62` plus three payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evex {
    on: bool,
    p0: u8,
    p1: u8,
    p2: u8,
}

impl Default for Evex {
    fn default() -> Self {
        Evex {
            on: false,
            // R/X/B/R' inverted off.
            p0: 0b1111_0000,
            // vvvv inverted default, fixed bit 2.
            p1: 0b0111_1100,
            // V' inverted default.
            p2: 0b0000_1000,
        }
    }
}

impl Evex {
    /// Marks the group present.
    pub fn set_on(&mut self) {
        self.on = true;
    }

    /// Whether the group is present.
    pub fn on(&self) -> bool {
        self.on
    }

    /// Restores the default pattern and marks the group absent.
    pub fn reset(&mut self) {
        *self = Evex::default();
    }

    /// Sets the logical R extension bit.
    pub fn set_r(&mut self, r: bool) {
        self.p0 = (self.p0 & 0b0111_1111) | (u8::from(!r) << 7);
    }

    /// Sets the logical X extension bit.
    pub fn set_x(&mut self, x: bool) {
        self.p0 = (self.p0 & 0b1011_1111) | (u8::from(!x) << 6);
    }

    /// Sets the logical B extension bit.
    pub fn set_b(&mut self, b: bool) {
        self.p0 = (self.p0 & 0b1101_1111) | (u8::from(!b) << 5);
    }

    /// Sets the logical R' extension bit.
    pub fn set_rp(&mut self, rp: bool) {
        self.p0 = (self.p0 & 0b1110_1111) | (u8::from(!rp) << 4);
    }

    /// Sets the two-bit opcode map field.
    pub fn set_mm(&mut self, mm: u8) {
        self.p0 = (self.p0 & 0b1111_1100) | (mm & 0b11);
    }

    /// Sets EVEX.W.
    pub fn set_w(&mut self, w: bool) {
        self.p1 = (self.p1 & 0b0111_1111) | (u8::from(w) << 7);
    }

    /// Sets the logical four-bit `vvvv` register field.
    pub fn set_vvvv(&mut self, v: u8) {
        self.p1 = (self.p1 & 0b1000_0111) | (((!v) & 0b1111) << 3);
    }

    /// Sets the implied-prefix field.
    pub fn set_pp(&mut self, pp: u8) {
        self.p1 = (self.p1 & 0b1111_1100) | (pp & 0b11);
    }

    /// Sets the zeroing bit.
    pub fn set_z(&mut self, z: bool) {
        self.p2 = (self.p2 & 0b0111_1111) | (u8::from(z) << 7);
    }

    /// Sets the L' vector length bit.
    pub fn set_lp(&mut self, lp: bool) {
        self.p2 = (self.p2 & 0b1011_1111) | (u8::from(lp) << 6);
    }

    /// Sets the L vector length bit.
    pub fn set_l(&mut self, l: bool) {
        self.p2 = (self.p2 & 0b1101_1111) | (u8::from(l) << 5);
    }

    /// Sets the broadcast/rounding bit.
    pub fn set_bb(&mut self, b: bool) {
        self.p2 = (self.p2 & 0b1110_1111) | (u8::from(b) << 4);
    }

    /// Sets the logical V' extension bit.
    pub fn set_vp(&mut self, vp: bool) {
        self.p2 = (self.p2 & 0b1111_0111) | (u8::from(!vp) << 3);
    }

    /// Sets the three-bit mask register field.
    pub fn set_aaa(&mut self, aaa: u8) {
        self.p2 = (self.p2 & 0b1111_1000) | (aaa & 0b111);
    }

    /// The encoded group, escape byte included.
    pub fn bytes(&self) -> [u8; 4] {
        [0x62, self.p0, self.p1, self.p2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rex_setters_mark_presence() {
        let mut rex = Rex::default();
        assert!(!rex.on());
        rex.set_b(false);
        assert!(!rex.on());
        rex.set_b(true);
        assert!(rex.on());
        assert_eq!(rex.byte(), 0x41);
        rex.set_w(true);
        assert_eq!(rex.byte(), 0x49);
    }

    #[test]
    fn modrm_fields() {
        let mut modrm = ModRM::default();
        modrm.set_mod(FieldMod::RegReg);
        modrm.set_reg(0b010);
        modrm.set_rm(0b101);
        assert_eq!(modrm.byte(), 0b11_010_101);
    }

    #[test]
    fn sib_fields() {
        let mut sib = Sib::default();
        sib.set_scale(2); // ×4
        sib.set_index(0b001);
        sib.set_base(STACK_POINTER_BASE);
        assert_eq!(sib.byte(), 0b10_001_100);
    }

    #[test]
    fn vex_defaults_and_inversion() {
        let mut vex = Vex::default();
        assert_eq!(vex.bytes(), [0xc4, 0b1110_0001, 0b0111_1000]);
        vex.set_vvvv(0b0011);
        assert_eq!(vex.bytes()[2] >> 3 & 0b1111, 0b1100);
        vex.set_r(true);
        assert_eq!(vex.bytes()[1] & 0b1000_0000, 0);
        vex.reset();
        assert_eq!(vex, Vex::default());
    }

    #[test]
    fn evex_defaults() {
        let evex = Evex::default();
        assert_eq!(evex.bytes(), [0x62, 0xf0, 0x7c, 0x08]);
    }

    #[test]
    fn evex_mask_and_zeroing() {
        let mut evex = Evex::default();
        evex.set_aaa(0b101);
        evex.set_z(true);
        evex.set_bb(true);
        assert_eq!(evex.bytes()[3], 0b1001_1101);
    }
}
