//! Encoder tests against the Intel addressing tables and the encoding
//! invariants the rest of the tool chain relies on.

use rstest::rstest;

use crate::buffer::CodeBuffer;
use crate::encode::{EncodeError, RELOCATION_PLACEHOLDER};
use crate::insn::Insn;
use crate::mode::Mode;
use crate::operand::{Memory, Operand};
use crate::reg::Reg;
use crate::reloc::RelocKind;
use crate::table;

fn reg(name: &str) -> &'static Reg {
    Reg::by_name(name).unwrap_or_else(|| panic!("unknown register {name}"))
}

fn insn(uid: &str, args: Vec<Operand>) -> Insn {
    let form = table::by_uid(uid).unwrap_or_else(|| panic!("unknown form {uid}"));
    Insn::with_args(form, args)
}

fn encode(mode: Mode, insn: &Insn) -> Vec<u8> {
    let mut buf = CodeBuffer::new();
    insn.encode_into(&mut buf, mode)
        .unwrap_or_else(|e| panic!("encoding {}: {e}", insn.form.uid));
    buf.to_bytes()
}

fn mem(base: Option<&str>, index: Option<&str>, scale: u8, disp: i64) -> Memory {
    Memory {
        segment: None,
        base: base.map(reg),
        index: index.map(reg),
        scale,
        displacement: disp,
        have_displacement: disp != 0,
    }
}

// Intel SDM volume 2, table 2-1: 16-bit addressing forms with ModR/M.
#[rstest]
#[case(Some("bx+si"), 0, vec![0x00])]
#[case(Some("bx+di"), 0, vec![0x01])]
#[case(Some("bp+si"), 0, vec![0x02])]
#[case(Some("bp+di"), 0, vec![0x03])]
#[case(Some("si"), 0, vec![0x04])]
#[case(Some("di"), 0, vec![0x05])]
// Bare BP has no mod=00 encoding; a zero disp8 is forced.
#[case(Some("bp"), 0, vec![0x46, 0x00])]
#[case(Some("bx"), 0, vec![0x07])]
#[case(Some("bx+si"), 0x12, vec![0x40, 0x12])]
#[case(Some("bp+di"), -1, vec![0x43, 0xff])]
#[case(Some("bx"), 0x1234, vec![0x87, 0x34, 0x12])]
// Displacement-only is mod=00, r/m=110.
#[case(None, 0x1234, vec![0x06, 0x34, 0x12])]
fn addressing_16bit(
    #[case] base: Option<&str>,
    #[case] disp: i64,
    #[case] tail: Vec<u8>,
) {
    // mov ax, m16 keeps the ModR/M reg field zero.
    let m = mem(base, None, 0, disp);
    let i = insn("mov_r16_m16", vec![Operand::Reg(reg("ax")), Operand::Mem(m)]);
    let mut expect = vec![0x8b];
    expect.extend(tail);
    assert_eq!(encode(Mode::Bits16, &i), expect);
}

// Intel SDM volume 2, table 2-2: 32-bit addressing forms with ModR/M. The
// ModR/M reg field is ECX throughout.
#[rstest]
#[case(Some("eax"), None, 0, 0, vec![0x08])]
#[case(Some("ecx"), None, 0, 0, vec![0x09])]
#[case(Some("esi"), None, 0, 0, vec![0x0e])]
// ESP always goes through SIB.
#[case(Some("esp"), None, 0, 0, vec![0x0c, 0x24])]
// Bare EBP has no mod=00 encoding.
#[case(Some("ebp"), None, 0, 0, vec![0x4d, 0x00])]
#[case(Some("eax"), None, 0, 0x12, vec![0x48, 0x12])]
#[case(Some("eax"), None, 0, 0x12345678, vec![0x88, 0x78, 0x56, 0x34, 0x12])]
// Base+index selects SIB.
#[case(Some("eax"), Some("ebx"), 0, 0, vec![0x0c, 0x18])]
#[case(Some("eax"), Some("ebx"), 4, 0, vec![0x0c, 0x98])]
#[case(Some("edx"), Some("ebp"), 2, 0x40, vec![0x4c, 0x6a, 0x40])]
// Index with no base keeps a 32-bit displacement, zero if absent.
#[case(None, Some("ecx"), 8, 0, vec![0x0c, 0xcd, 0x00, 0x00, 0x00, 0x00])]
// Displacement-only is mod=00, r/m=101 outside long mode.
#[case(None, None, 0, 0x12345678, vec![0x0d, 0x78, 0x56, 0x34, 0x12])]
fn addressing_32bit(
    #[case] base: Option<&str>,
    #[case] index: Option<&str>,
    #[case] scale: u8,
    #[case] disp: i64,
    #[case] tail: Vec<u8>,
) {
    let m = mem(base, index, scale, disp);
    let i = insn("mov_r32_m32", vec![Operand::Reg(reg("ecx")), Operand::Mem(m)]);
    let mut expect = vec![0x8b];
    expect.extend(tail);
    assert_eq!(encode(Mode::Bits32, &i), expect);
}

// 64-bit corner cases: RSP/R12 force SIB, RBP/R13 force a displacement,
// and pure displacement uses SIB with no base and no index.
#[rstest]
#[case(Some("rsp"), vec![0x0c, 0x24])]
#[case(Some("r12"), vec![0x0c, 0x24])]
#[case(Some("rbp"), vec![0x4d, 0x00])]
#[case(Some("r13"), vec![0x4d, 0x00])]
#[case(None, vec![0x0c, 0x25, 0x00, 0x00, 0x00, 0x00])]
fn addressing_64bit_corners(#[case] base: Option<&str>, #[case] tail: Vec<u8>) {
    let m = mem(base, None, 0, 0);
    let i = insn("mov_r64_m64", vec![Operand::Reg(reg("rcx")), Operand::Mem(m)]);
    let rex_b = base.map(|b| reg(b).rex_bit()).unwrap_or(false);
    let mut expect = vec![if rex_b { 0x49 } else { 0x48 }, 0x8b];
    expect.extend(tail);
    assert_eq!(encode(Mode::Bits64, &i), expect);
}

#[test]
fn extended_registers_set_rex_bits() {
    let i = insn(
        "mov_rm64_r64",
        vec![Operand::Reg(reg("r8")), Operand::Reg(reg("r15"))],
    );
    // REX.W + REX.R + REX.B = 0x4d; ModRM = 11 111 000.
    assert_eq!(encode(Mode::Bits64, &i), vec![0x4d, 0x89, 0xf8]);
}

#[test]
fn low_byte_registers_require_a_rex_prefix() {
    let i = insn(
        "mov_rm8_r8",
        vec![Operand::Reg(reg("al")), Operand::Reg(reg("dil"))],
    );
    assert_eq!(encode(Mode::Bits64, &i), vec![0x40, 0x88, 0xf8]);
}

#[test]
fn high_byte_registers_conflict_with_rex() {
    let i = insn(
        "mov_rm8_r8",
        vec![Operand::Reg(reg("ah")), Operand::Reg(reg("r8b"))],
    );
    let mut buf = CodeBuffer::new();
    assert_eq!(
        i.encode_into(&mut buf, Mode::Bits64),
        Err(EncodeError::RexConflict("ah"))
    );
}

#[test]
fn legacy_prefixes_sort_ascending() {
    let m = Memory {
        segment: Some(reg("fs")),
        ..mem(Some("ecx"), None, 0, 0)
    };
    let mut i = insn(
        "add_m32_r32",
        vec![Operand::Mem(m), Operand::Reg(reg("edx"))],
    );
    i.prefixes.push(0xf0); // lock, added before the segment prefix
    // fs override 0x64 < address size 0x67 < lock 0xf0.
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x64, 0x67, 0xf0, 0x01, 0x11]
    );
}

#[test]
fn encoding_is_idempotent() {
    let mut i = insn(
        "mov_r64_m64",
        vec![
            Operand::Reg(reg("rcx")),
            Operand::Mem(mem(Some("rax"), Some("rdx"), 8, 0x40)),
        ],
    );
    let mut buf = CodeBuffer::new();
    let first = i.measure(&mut buf, Mode::Bits64).unwrap();
    let bytes = buf.to_bytes();
    let second = i.measure(&mut buf, Mode::Bits64).unwrap();
    assert_eq!(first, second);
    assert_eq!(bytes, buf.to_bytes());
    assert_eq!(usize::from(i.len), first);
}

#[test]
fn evex_displacement_compression() {
    // 256 = 4 × 64 compresses to a disp8 of 4.
    let i = insn(
        "vaddps_zmm_m512",
        vec![
            Operand::Reg(reg("zmm1")),
            Operand::Reg(reg("zmm2")),
            Operand::Mem(mem(Some("rax"), None, 0, 256)),
        ],
    );
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x62, 0xf1, 0x6c, 0x48, 0x58, 0x48, 0x04]
    );

    // 100 is not a multiple of 64; fall back to the 4-byte form.
    let i = insn(
        "vaddps_zmm_m512",
        vec![
            Operand::Reg(reg("zmm1")),
            Operand::Reg(reg("zmm2")),
            Operand::Mem(mem(Some("rax"), None, 0, 100)),
        ],
    );
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x62, 0xf1, 0x6c, 0x48, 0x58, 0x88, 0x64, 0x00, 0x00, 0x00]
    );
}

#[test]
fn evex_broadcast_changes_the_compression_factor() {
    let mut i = insn(
        "vaddps_zmm_m512",
        vec![
            Operand::Reg(reg("zmm1")),
            Operand::Reg(reg("zmm2")),
            Operand::Mem(mem(Some("rax"), None, 0, 16)),
        ],
    );
    i.broadcast = true;
    // 16 = 4 × 4 under broadcast; EVEX.b is set and disp8 is 4.
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x62, 0xf1, 0x6c, 0x58, 0x58, 0x48, 0x04]
    );
}

#[test]
fn evex_mask_and_zeroing_bits() {
    let mut i = insn(
        "vaddps_zmm",
        vec![
            Operand::Reg(reg("zmm1")),
            Operand::Reg(reg("zmm2")),
            Operand::Reg(reg("zmm3")),
        ],
    );
    i.mask = 0b101;
    i.zero = true;
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x62, 0xf1, 0x6c, 0xcd, 0x58, 0xcb]
    );
}

#[test]
fn evex_extension_bits_reach_the_prefix() {
    let i = insn(
        "vaddps_zmm",
        vec![
            Operand::Reg(reg("zmm17")),
            Operand::Reg(reg("zmm2")),
            Operand::Reg(reg("zmm25")),
        ],
    );
    // zmm17 needs EVEX.R'; zmm25 needs EVEX.B and EVEX.X.
    let bytes = encode(Mode::Bits64, &i);
    assert_eq!(bytes[0], 0x62);
    assert_eq!(bytes[1], 0b1000_0001); // R̄=1 X̄=0 B̄=0 R̄'=0 mm=01
    assert_eq!(bytes[4], 0x58);
}

#[test]
fn vex_is4_lands_in_the_top_nibble() {
    let i = insn(
        "vblendvps_xmm",
        vec![
            Operand::Reg(reg("xmm1")),
            Operand::Reg(reg("xmm2")),
            Operand::Reg(reg("xmm3")),
            Operand::Reg(reg("xmm9")),
        ],
    );
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0xc4, 0xe3, 0x69, 0x4a, 0xcb, 0x90]
    );
}

#[test]
fn relocation_placeholder_fills_the_field() {
    let i = insn(
        "mov_r64_imm64",
        vec![
            Operand::Reg(reg("rcx")),
            Operand::Reloc {
                name: "test.hw".into(),
                kind: RelocKind::FullAddress,
            },
        ],
    );
    assert_eq!(
        encode(Mode::Bits64, &i),
        vec![0x48, 0xb9, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
    );
    assert_eq!(RELOCATION_PLACEHOLDER >> 32, 0x1122_3344);
}

#[test]
fn far_pointers_pack_segment_high() {
    let i = insn(
        "jmp_far32",
        vec![Operand::Far {
            segment: 0x10,
            offset: 0x1000,
        }],
    );
    assert_eq!(
        encode(Mode::Bits32, &i),
        vec![0xea, 0x00, 0x10, 0x00, 0x00, 0x10, 0x00]
    );
}

#[test]
fn string_operands_get_an_address_size_prefix() {
    let i = insn(
        "movsb",
        vec![
            Operand::StringDst(reg("edi")),
            Operand::StringSrc(reg("esi")),
        ],
    );
    assert_eq!(encode(Mode::Bits64, &i), vec![0x67, 0xa4]);

    let i = insn(
        "movsb",
        vec![
            Operand::StringDst(reg("rdi")),
            Operand::StringSrc(reg("rsi")),
        ],
    );
    assert_eq!(encode(Mode::Bits64, &i), vec![0xa4]);
}

#[test]
fn sixteen_bit_addressing_is_rejected_in_long_mode() {
    let m = mem(Some("bx"), None, 0, 0);
    let i = insn("mov_r16_m16", vec![Operand::Reg(reg("ax")), Operand::Mem(m)]);
    let mut buf = CodeBuffer::new();
    assert_eq!(
        i.encode_into(&mut buf, Mode::Bits64),
        Err(EncodeError::SixteenBitAddressing)
    );
}

#[test]
fn address_size_prefix_for_narrower_addressing() {
    let m = mem(Some("eax"), None, 0, 0);
    let i = insn("mov_r64_m64", vec![Operand::Reg(reg("rcx")), Operand::Mem(m)]);
    assert_eq!(encode(Mode::Bits64, &i), vec![0x67, 0x48, 0x8b, 0x08]);

    let m = mem(Some("eax"), None, 0, 0);
    let i = insn("mov_r16_m16", vec![Operand::Reg(reg("cx")), Operand::Mem(m)]);
    assert_eq!(encode(Mode::Bits16, &i), vec![0x67, 0x8b, 0x08]);
}

#[test]
fn stack_index_modifies_the_opcode() {
    let i = insn("fld_st", vec![Operand::StackIndex(3)]);
    assert_eq!(encode(Mode::Bits64, &i), vec![0xd9, 0xc3]);
}

#[test]
fn all_table_examples_have_legal_modes() {
    for form in table::FORMS {
        if let Some(example) = form.example {
            assert!(
                form.modes.supports(example.mode),
                "{} example runs in an unsupported mode",
                form.uid
            );
        }
    }
}
