// Code generated from the x86 instruction database by ruse-gen-x86data.
// DO NOT EDIT.

use super::{EvexInfo, Example, Filter, Form, ModeSet, Param, ParamKind, RegClass, Slot, VexInfo};
use crate::mode::Mode;

const fn simm(bits: u16) -> Param {
    Param {
        kind: ParamKind::SignedImmediate,
        bits,
        slot: Slot::Immediate,
        filter: Filter::Any,
    }
}

const fn uimm(bits: u16) -> Param {
    Param {
        kind: ParamKind::UnsignedImmediate,
        bits,
        slot: Slot::Immediate,
        filter: Filter::Any,
    }
}

const fn reg(class: RegClass, bits: u16, slot: Slot) -> Param {
    Param {
        kind: ParamKind::Register,
        bits,
        slot,
        filter: Filter::Reg(class),
    }
}

const fn fixed(name: &'static str, bits: u16) -> Param {
    Param {
        kind: ParamKind::Register,
        bits,
        slot: Slot::None,
        filter: Filter::Exact(name),
    }
}

const fn lit(value: u64) -> Param {
    Param {
        kind: ParamKind::UnsignedImmediate,
        bits: 8,
        slot: Slot::None,
        filter: Filter::Literal(value),
    }
}

const fn rel(bits: u16) -> Param {
    Param {
        kind: ParamKind::RelativeAddress,
        bits,
        slot: Slot::CodeOffset,
        filter: Filter::Any,
    }
}

const fn mem(bits: u16) -> Param {
    Param {
        kind: ParamKind::Memory,
        bits,
        slot: Slot::ModRMRm,
        filter: Filter::Any,
    }
}

const fn moffs(bits: u16) -> Param {
    Param {
        kind: ParamKind::MemoryOffset,
        bits,
        slot: Slot::Displacement,
        filter: Filter::Any,
    }
}

const fn far(bits: u16) -> Param {
    Param {
        kind: ParamKind::FarPointer,
        bits,
        slot: Slot::Immediate,
        filter: Filter::Any,
    }
}

const fn stidx() -> Param {
    Param {
        kind: ParamKind::StackIndex,
        bits: 0,
        slot: Slot::StackIndex,
        filter: Filter::Any,
    }
}

const fn sdst(bits: u16) -> Param {
    Param {
        kind: ParamKind::StringDst,
        bits,
        slot: Slot::None,
        filter: Filter::Any,
    }
}

const fn ssrc(bits: u16) -> Param {
    Param {
        kind: ParamKind::StringSrc,
        bits,
        slot: Slot::None,
        filter: Filter::Any,
    }
}

const fn ex(text: &'static str, code: &'static [u8]) -> Option<Example> {
    Some(Example {
        text,
        mode: Mode::Bits64,
        code,
    })
}

const fn ex_in(mode: Mode, text: &'static str, code: &'static [u8]) -> Option<Example> {
    Some(Example { text, mode, code })
}

const BASE: Form = Form {
    uid: "",
    mnemonic: "",
    params: &[],
    prefix_opcodes: &[],
    mandatory_prefixes: &[],
    opcodes: &[],
    modrm_reg: None,
    modrm: false,
    rex: false,
    rex_w: false,
    rex_r: false,
    vex: None,
    evex: None,
    modes: ModeSet::ALL,
    operand_bits: 0,
    data_bits: 0,
    no_rep: false,
    no_vex: false,
    implied_imm: &[],
    example: None,
};

/// Every instruction form, sorted by mnemonic.
pub static FORMS: &[Form] = &[
    Form {
        uid: "add_al_imm8",
        mnemonic: "add",
        params: &[fixed("al", 8), simm(8)],
        opcodes: &[0x04],
        data_bits: 8,
        example: ex("(add al 7)", &[0x04, 0x07]),
        ..BASE
    },
    Form {
        uid: "add_ax_imm16",
        mnemonic: "add",
        params: &[fixed("ax", 16), simm(16)],
        opcodes: &[0x05],
        operand_bits: 16,
        data_bits: 16,
        example: ex("(add ax 256)", &[0x66, 0x05, 0x00, 0x01]),
        ..BASE
    },
    Form {
        uid: "add_eax_imm32",
        mnemonic: "add",
        params: &[fixed("eax", 32), simm(32)],
        opcodes: &[0x05],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(add eax 2)", &[0x05, 0x02, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "add_rax_imm32",
        mnemonic: "add",
        params: &[fixed("rax", 64), simm(32)],
        opcodes: &[0x05],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(add rax 2)", &[0x48, 0x05, 0x02, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "add_rm8_imm8",
        mnemonic: "add",
        params: &[reg(RegClass::Gp8, 8, Slot::ModRMRm), simm(8)],
        opcodes: &[0x80],
        modrm_reg: Some(0),
        data_bits: 8,
        example: ex("(add cl 7)", &[0x80, 0xc1, 0x07]),
        ..BASE
    },
    Form {
        uid: "add_rm16_imm8",
        mnemonic: "add",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(0),
        operand_bits: 16,
        data_bits: 16,
        example: ex("(add cx 7)", &[0x66, 0x83, 0xc1, 0x07]),
        ..BASE
    },
    Form {
        uid: "add_rm16_imm16",
        mnemonic: "add",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm), simm(16)],
        opcodes: &[0x81],
        modrm_reg: Some(0),
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "add_rm32_imm8",
        mnemonic: "add",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(0),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(add ecx 7)", &[0x83, 0xc1, 0x07]),
        ..BASE
    },
    Form {
        uid: "add_rm32_imm32",
        mnemonic: "add",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), simm(32)],
        opcodes: &[0x81],
        modrm_reg: Some(0),
        operand_bits: 32,
        data_bits: 32,
        example: ex(
            "(add ecx 256)",
            &[0x81, 0xc1, 0x00, 0x01, 0x00, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "add_rm64_imm8",
        mnemonic: "add",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(0),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(add rcx 7)", &[0x48, 0x83, 0xc1, 0x07]),
        ..BASE
    },
    Form {
        uid: "add_rm64_imm32",
        mnemonic: "add",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(32)],
        opcodes: &[0x81],
        modrm_reg: Some(0),
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "add_rm8_r8",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
        ],
        opcodes: &[0x00],
        data_bits: 8,
        example: ex("(add cl dl)", &[0x00, 0xd1]),
        ..BASE
    },
    Form {
        uid: "add_rm16_r16",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
        ],
        opcodes: &[0x01],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "add_rm32_r32",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x01],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(add ecx edx)", &[0x01, 0xd1]),
        ..BASE
    },
    Form {
        uid: "add_rm64_r64",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x01],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(add rcx rdx)", &[0x48, 0x01, 0xd1]),
        ..BASE
    },
    Form {
        uid: "add_r8_rm8",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x02],
        data_bits: 8,
        example: ex("(add cl dl)", &[0x02, 0xca]),
        ..BASE
    },
    Form {
        uid: "add_r16_rm16",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x03],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "add_r32_rm32",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
        ],
        opcodes: &[0x03],
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "add_r64_rm64",
        mnemonic: "add",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
        ],
        opcodes: &[0x03],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "add_m32_r32",
        mnemonic: "add",
        params: &[mem(32), reg(RegClass::Gp32, 32, Slot::ModRMReg)],
        opcodes: &[0x01],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(add (rcx) edx)", &[0x01, 0x11]),
        ..BASE
    },
    Form {
        uid: "add_r32_m32",
        mnemonic: "add",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMReg), mem(32)],
        opcodes: &[0x03],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(add edx (rcx))", &[0x03, 0x11]),
        ..BASE
    },
    Form {
        uid: "add_m64_r64",
        mnemonic: "add",
        params: &[mem(64), reg(RegClass::Gp64, 64, Slot::ModRMReg)],
        opcodes: &[0x01],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(add (rcx) rdx)", &[0x48, 0x01, 0x11]),
        ..BASE
    },
    Form {
        uid: "add_r64_m64",
        mnemonic: "add",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMReg), mem(64)],
        opcodes: &[0x03],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(add rdx (rcx 8))", &[0x48, 0x03, 0x51, 0x08]),
        ..BASE
    },
    Form {
        uid: "and_rm32_r32",
        mnemonic: "and",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x21],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(and ecx edx)", &[0x21, 0xd1]),
        ..BASE
    },
    Form {
        uid: "and_rm64_r64",
        mnemonic: "and",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x21],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(and rcx rdx)", &[0x48, 0x21, 0xd1]),
        ..BASE
    },
    Form {
        uid: "call_rel32",
        mnemonic: "call",
        params: &[rel(32)],
        opcodes: &[0xe8],
        modes: ModeSet::M32PLUS,
        example: ex("(call -5)", &[0xe8, 0xfb, 0xff, 0xff, 0xff]),
        ..BASE
    },
    Form {
        uid: "call_rm64",
        mnemonic: "call",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm)],
        opcodes: &[0xff],
        modrm_reg: Some(2),
        modes: ModeSet::M64,
        example: ex("(call rcx)", &[0xff, 0xd1]),
        ..BASE
    },
    Form {
        uid: "cdq",
        mnemonic: "cdq",
        params: &[],
        opcodes: &[0x99],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(cdq)", &[0x99]),
        ..BASE
    },
    Form {
        uid: "cmp_al_imm8",
        mnemonic: "cmp",
        params: &[fixed("al", 8), simm(8)],
        opcodes: &[0x3c],
        data_bits: 8,
        example: ex("(cmp al 7)", &[0x3c, 0x07]),
        ..BASE
    },
    Form {
        uid: "cmp_rm32_imm8",
        mnemonic: "cmp",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(7),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(cmp ecx 7)", &[0x83, 0xf9, 0x07]),
        ..BASE
    },
    Form {
        uid: "cmp_rm64_imm8",
        mnemonic: "cmp",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(7),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(cmp rcx 7)", &[0x48, 0x83, 0xf9, 0x07]),
        ..BASE
    },
    Form {
        uid: "cmp_rm32_r32",
        mnemonic: "cmp",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x39],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(cmp ecx edx)", &[0x39, 0xd1]),
        ..BASE
    },
    Form {
        uid: "cmp_rm64_r64",
        mnemonic: "cmp",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x39],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(cmp rcx rdx)", &[0x48, 0x39, 0xd1]),
        ..BASE
    },
    Form {
        uid: "cmp_r64_rm64",
        mnemonic: "cmp",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
        ],
        opcodes: &[0x3b],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "cqo",
        mnemonic: "cqo",
        params: &[],
        opcodes: &[0x99],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(cqo)", &[0x48, 0x99]),
        ..BASE
    },
    Form {
        uid: "dec_rm32",
        mnemonic: "dec",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm)],
        opcodes: &[0xff],
        modrm_reg: Some(1),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(dec ecx)", &[0xff, 0xc9]),
        ..BASE
    },
    Form {
        uid: "div_rm32",
        mnemonic: "div",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(6),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(div ecx)", &[0xf7, 0xf1]),
        ..BASE
    },
    Form {
        uid: "div_rm64",
        mnemonic: "div",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(6),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(div rcx)", &[0x48, 0xf7, 0xf1]),
        ..BASE
    },
    Form {
        uid: "fld_st",
        mnemonic: "fld",
        params: &[stidx()],
        opcodes: &[0xd9, 0xc0],
        no_rep: true,
        example: ex("(fld st3)", &[0xd9, 0xc3]),
        ..BASE
    },
    Form {
        uid: "fxch_st",
        mnemonic: "fxch",
        params: &[stidx()],
        opcodes: &[0xd9, 0xc8],
        no_rep: true,
        example: ex("(fxch st1)", &[0xd9, 0xc9]),
        ..BASE
    },
    Form {
        uid: "hlt",
        mnemonic: "hlt",
        params: &[],
        opcodes: &[0xf4],
        example: ex("(hlt)", &[0xf4]),
        ..BASE
    },
    Form {
        uid: "idiv_rm32",
        mnemonic: "idiv",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(7),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(idiv ecx)", &[0xf7, 0xf9]),
        ..BASE
    },
    Form {
        uid: "idiv_rm64",
        mnemonic: "idiv",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(7),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(idiv rcx)", &[0x48, 0xf7, 0xf9]),
        ..BASE
    },
    Form {
        uid: "imul_r16_rm16",
        mnemonic: "imul",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xaf],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "imul_r32_rm32",
        mnemonic: "imul",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xaf],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(imul ecx edx)", &[0x0f, 0xaf, 0xca]),
        ..BASE
    },
    Form {
        uid: "imul_r64_rm64",
        mnemonic: "imul",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xaf],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(imul rcx rdx)", &[0x48, 0x0f, 0xaf, 0xca]),
        ..BASE
    },
    Form {
        uid: "inc_rm32",
        mnemonic: "inc",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm)],
        opcodes: &[0xff],
        modrm_reg: Some(0),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(inc ecx)", &[0xff, 0xc1]),
        ..BASE
    },
    Form {
        uid: "int_imm8",
        mnemonic: "int",
        params: &[uimm(8)],
        opcodes: &[0xcd],
        example: ex("(int 128)", &[0xcd, 0x80]),
        ..BASE
    },
    Form {
        uid: "int3",
        mnemonic: "int3",
        params: &[],
        opcodes: &[0xcc],
        example: ex("(int3)", &[0xcc]),
        ..BASE
    },
    Form {
        uid: "ja_rel8",
        mnemonic: "ja",
        params: &[rel(8)],
        opcodes: &[0x77],
        ..BASE
    },
    Form {
        uid: "ja_rel32",
        mnemonic: "ja",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x87],
        modes: ModeSet::M32PLUS,
        ..BASE
    },
    Form {
        uid: "jb_rel8",
        mnemonic: "jb",
        params: &[rel(8)],
        opcodes: &[0x72],
        ..BASE
    },
    Form {
        uid: "jb_rel32",
        mnemonic: "jb",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x82],
        modes: ModeSet::M32PLUS,
        ..BASE
    },
    Form {
        uid: "je_rel8",
        mnemonic: "je",
        params: &[rel(8)],
        opcodes: &[0x74],
        example: ex("(je -4)", &[0x74, 0xfc]),
        ..BASE
    },
    Form {
        uid: "je_rel32",
        mnemonic: "je",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x84],
        modes: ModeSet::M32PLUS,
        example: ex("(je 6)", &[0x0f, 0x84, 0x06, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "jg_rel8",
        mnemonic: "jg",
        params: &[rel(8)],
        opcodes: &[0x7f],
        ..BASE
    },
    Form {
        uid: "jg_rel32",
        mnemonic: "jg",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x8f],
        modes: ModeSet::M32PLUS,
        ..BASE
    },
    Form {
        uid: "jl_rel8",
        mnemonic: "jl",
        params: &[rel(8)],
        opcodes: &[0x7c],
        ..BASE
    },
    Form {
        uid: "jl_rel32",
        mnemonic: "jl",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x8c],
        modes: ModeSet::M32PLUS,
        ..BASE
    },
    Form {
        uid: "jmp_rel8",
        mnemonic: "jmp",
        params: &[rel(8)],
        opcodes: &[0xeb],
        example: ex("(jmp -8)", &[0xeb, 0xf8]),
        ..BASE
    },
    Form {
        uid: "jmp_rel32",
        mnemonic: "jmp",
        params: &[rel(32)],
        opcodes: &[0xe9],
        modes: ModeSet::M32PLUS,
        example: ex("(jmp 2)", &[0xe9, 0x02, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "jmp_rm64",
        mnemonic: "jmp",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm)],
        opcodes: &[0xff],
        modrm_reg: Some(4),
        modes: ModeSet::M64,
        example: ex("(jmp rcx)", &[0xff, 0xe1]),
        ..BASE
    },
    Form {
        uid: "jmp_far16",
        mnemonic: "jmp",
        params: &[far(16)],
        opcodes: &[0xea],
        modes: ModeSet::M16,
        operand_bits: 16,
        no_rep: true,
        example: ex_in(
            Mode::Bits16,
            "(jmp (16 256))",
            &[0xea, 0x00, 0x01, 0x10, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "jmp_far32",
        mnemonic: "jmp",
        params: &[far(32)],
        opcodes: &[0xea],
        modes: ModeSet::M32,
        operand_bits: 32,
        no_rep: true,
        example: ex_in(
            Mode::Bits32,
            "(jmp (16 4096))",
            &[0xea, 0x00, 0x10, 0x00, 0x00, 0x10, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "jne_rel8",
        mnemonic: "jne",
        params: &[rel(8)],
        opcodes: &[0x75],
        example: ex("(jne -4)", &[0x75, 0xfc]),
        ..BASE
    },
    Form {
        uid: "jne_rel32",
        mnemonic: "jne",
        params: &[rel(32)],
        opcodes: &[0x0f, 0x85],
        modes: ModeSet::M32PLUS,
        ..BASE
    },
    Form {
        uid: "lea_r16_m",
        mnemonic: "lea",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMReg), mem(16)],
        opcodes: &[0x8d],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "lea_r32_m",
        mnemonic: "lea",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMReg), mem(32)],
        opcodes: &[0x8d],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(lea ecx (rax 4))", &[0x8d, 0x48, 0x04]),
        ..BASE
    },
    Form {
        uid: "lea_r64_m",
        mnemonic: "lea",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMReg), mem(64)],
        opcodes: &[0x8d],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(lea rcx (rax rdx))", &[0x48, 0x8d, 0x0c, 0x10]),
        ..BASE
    },
    Form {
        uid: "mov_r8_imm8",
        mnemonic: "mov",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 8,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp8),
            },
            uimm(8),
        ],
        opcodes: &[0xb0],
        data_bits: 8,
        example: ex("(mov cl 1)", &[0xb1, 0x01]),
        ..BASE
    },
    Form {
        uid: "mov_r16_imm16",
        mnemonic: "mov",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 16,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp16),
            },
            uimm(16),
        ],
        opcodes: &[0xb8],
        operand_bits: 16,
        data_bits: 16,
        example: ex("(mov cx 258)", &[0x66, 0xb9, 0x02, 0x01]),
        ..BASE
    },
    Form {
        uid: "mov_r32_imm32",
        mnemonic: "mov",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 32,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp32),
            },
            uimm(32),
        ],
        opcodes: &[0xb8],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(mov ecx 13)", &[0xb9, 0x0d, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "mov_r64_imm64",
        mnemonic: "mov",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 64,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp64),
            },
            uimm(64),
        ],
        opcodes: &[0xb8],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex(
            "(mov rcx 1234605616436508552)",
            &[0x48, 0xb9, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11],
        ),
        ..BASE
    },
    Form {
        uid: "mov_rm8_imm8",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp8, 8, Slot::ModRMRm), uimm(8)],
        opcodes: &[0xc6],
        modrm_reg: Some(0),
        data_bits: 8,
        example: ex("(mov cl 1)", &[0xc6, 0xc1, 0x01]),
        ..BASE
    },
    Form {
        uid: "mov_rm16_imm16",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm), uimm(16)],
        opcodes: &[0xc7],
        modrm_reg: Some(0),
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "mov_rm32_imm32",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), uimm(32)],
        opcodes: &[0xc7],
        modrm_reg: Some(0),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(mov ecx 13)", &[0xc7, 0xc1, 0x0d, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "mov_rm64_imm32",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(32)],
        opcodes: &[0xc7],
        modrm_reg: Some(0),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(mov rcx 13)", &[0x48, 0xc7, 0xc1, 0x0d, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "mov_m32_imm32",
        mnemonic: "mov",
        params: &[mem(32), uimm(32)],
        opcodes: &[0xc7],
        modrm_reg: Some(0),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(mov (rcx) 13)", &[0xc7, 0x01, 0x0d, 0x00, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "mov_m64_imm32",
        mnemonic: "mov",
        params: &[mem(64), simm(32)],
        opcodes: &[0xc7],
        modrm_reg: Some(0),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex(
            "(mov (rcx) 13)",
            &[0x48, 0xc7, 0x01, 0x0d, 0x00, 0x00, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "mov_rm8_r8",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
        ],
        opcodes: &[0x88],
        data_bits: 8,
        example: ex("(mov cl dl)", &[0x88, 0xd1]),
        ..BASE
    },
    Form {
        uid: "mov_rm16_r16",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
        ],
        opcodes: &[0x89],
        operand_bits: 16,
        data_bits: 16,
        example: ex_in(Mode::Bits16, "(mov cx dx)", &[0x89, 0xd1]),
        ..BASE
    },
    Form {
        uid: "mov_rm32_r32",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x89],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(mov ecx edx)", &[0x89, 0xd1]),
        ..BASE
    },
    Form {
        uid: "mov_rm64_r64",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x89],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(mov rcx rdx)", &[0x48, 0x89, 0xd1]),
        ..BASE
    },
    Form {
        uid: "mov_r8_rm8",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x8a],
        data_bits: 8,
        example: ex("(mov cl dl)", &[0x8a, 0xca]),
        ..BASE
    },
    Form {
        uid: "mov_r16_rm16",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x8b],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "mov_r32_rm32",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
        ],
        opcodes: &[0x8b],
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "mov_r64_rm64",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
        ],
        opcodes: &[0x8b],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(mov rcx rdx)", &[0x48, 0x8b, 0xca]),
        ..BASE
    },
    Form {
        uid: "mov_m8_r8",
        mnemonic: "mov",
        params: &[mem(8), reg(RegClass::Gp8, 8, Slot::ModRMReg)],
        opcodes: &[0x88],
        data_bits: 8,
        example: ex("(mov (rcx) dl)", &[0x88, 0x11]),
        ..BASE
    },
    Form {
        uid: "mov_m16_r16",
        mnemonic: "mov",
        params: &[mem(16), reg(RegClass::Gp16, 16, Slot::ModRMReg)],
        opcodes: &[0x89],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "mov_m32_r32",
        mnemonic: "mov",
        params: &[mem(32), reg(RegClass::Gp32, 32, Slot::ModRMReg)],
        opcodes: &[0x89],
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "mov_m64_r64",
        mnemonic: "mov",
        params: &[mem(64), reg(RegClass::Gp64, 64, Slot::ModRMReg)],
        opcodes: &[0x89],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(mov (rsp 8) rcx)", &[0x48, 0x89, 0x4c, 0x24, 0x08]),
        ..BASE
    },
    Form {
        uid: "mov_r8_m8",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp8, 8, Slot::ModRMReg), mem(8)],
        opcodes: &[0x8a],
        data_bits: 8,
        ..BASE
    },
    Form {
        uid: "mov_r16_m16",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMReg), mem(16)],
        opcodes: &[0x8b],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "mov_r32_m32",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMReg), mem(32)],
        opcodes: &[0x8b],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(mov ecx (rbp))", &[0x8b, 0x4d, 0x00]),
        ..BASE
    },
    Form {
        uid: "mov_r64_m64",
        mnemonic: "mov",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMReg), mem(64)],
        opcodes: &[0x8b],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(mov rcx (rsp 8))", &[0x48, 0x8b, 0x4c, 0x24, 0x08]),
        ..BASE
    },
    Form {
        uid: "mov_sreg_rm16",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Sreg, 16, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x8e],
        example: ex("(mov fs cx)", &[0x8e, 0xe1]),
        ..BASE
    },
    Form {
        uid: "mov_rm16_sreg",
        mnemonic: "mov",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
            reg(RegClass::Sreg, 16, Slot::ModRMReg),
        ],
        opcodes: &[0x8c],
        example: ex("(mov cx fs)", &[0x8c, 0xe1]),
        ..BASE
    },
    Form {
        uid: "mov_al_moffs64",
        mnemonic: "mov",
        params: &[fixed("al", 8), moffs(64)],
        opcodes: &[0xa0],
        modes: ModeSet::M64,
        data_bits: 8,
        example: ex(
            "(mov al (287454020))",
            &[0xa0, 0x44, 0x33, 0x22, 0x11, 0x00, 0x00, 0x00, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "mov_moffs64_al",
        mnemonic: "mov",
        params: &[moffs(64), fixed("al", 8)],
        opcodes: &[0xa2],
        modes: ModeSet::M64,
        data_bits: 8,
        example: ex(
            "(mov (287454020) al)",
            &[0xa2, 0x44, 0x33, 0x22, 0x11, 0x00, 0x00, 0x00, 0x00],
        ),
        ..BASE
    },
    Form {
        uid: "mov_eax_moffs64",
        mnemonic: "mov",
        params: &[fixed("eax", 32), moffs(64)],
        opcodes: &[0xa1],
        modes: ModeSet::M64,
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "mov_moffs64_eax",
        mnemonic: "mov",
        params: &[moffs(64), fixed("eax", 32)],
        opcodes: &[0xa3],
        modes: ModeSet::M64,
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "movsb",
        mnemonic: "movsb",
        params: &[sdst(8), ssrc(8)],
        opcodes: &[0xa4],
        data_bits: 8,
        example: ex("(movsb (rdi) (rsi))", &[0xa4]),
        ..BASE
    },
    Form {
        uid: "movsx_r32_rm8",
        mnemonic: "movsx",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xbe],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(movsx ecx dl)", &[0x0f, 0xbe, 0xca]),
        ..BASE
    },
    Form {
        uid: "movsx_r32_rm16",
        mnemonic: "movsx",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xbf],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(movsx ecx dx)", &[0x0f, 0xbf, 0xca]),
        ..BASE
    },
    Form {
        uid: "movsx_r64_rm8",
        mnemonic: "movsx",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xbe],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(movsx rcx dl)", &[0x48, 0x0f, 0xbe, 0xca]),
        ..BASE
    },
    Form {
        uid: "movsx_r64_rm16",
        mnemonic: "movsx",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xbf],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "movsxd_r64_rm32",
        mnemonic: "movsxd",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
        ],
        opcodes: &[0x63],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(movsxd rcx edx)", &[0x48, 0x63, 0xca]),
        ..BASE
    },
    Form {
        uid: "movzx_r32_rm8",
        mnemonic: "movzx",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xb6],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(movzx ecx dl)", &[0x0f, 0xb6, 0xca]),
        ..BASE
    },
    Form {
        uid: "movzx_r32_rm16",
        mnemonic: "movzx",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xb7],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(movzx ecx dx)", &[0x0f, 0xb7, 0xca]),
        ..BASE
    },
    Form {
        uid: "movzx_r64_rm8",
        mnemonic: "movzx",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xb6],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "movzx_r64_rm16",
        mnemonic: "movzx",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x0f, 0xb7],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "neg_rm8",
        mnemonic: "neg",
        params: &[reg(RegClass::Gp8, 8, Slot::ModRMRm)],
        opcodes: &[0xf6],
        modrm_reg: Some(3),
        data_bits: 8,
        example: ex("(neg cl)", &[0xf6, 0xd9]),
        ..BASE
    },
    Form {
        uid: "neg_rm16",
        mnemonic: "neg",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(3),
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "neg_rm32",
        mnemonic: "neg",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(3),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(neg ecx)", &[0xf7, 0xd9]),
        ..BASE
    },
    Form {
        uid: "neg_rm64",
        mnemonic: "neg",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm)],
        opcodes: &[0xf7],
        modrm_reg: Some(3),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(neg rcx)", &[0x48, 0xf7, 0xd9]),
        ..BASE
    },
    Form {
        uid: "nop",
        mnemonic: "nop",
        params: &[],
        opcodes: &[0x90],
        example: ex("(nop)", &[0x90]),
        ..BASE
    },
    Form {
        uid: "or_rm32_r32",
        mnemonic: "or",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x09],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(or ecx edx)", &[0x09, 0xd1]),
        ..BASE
    },
    Form {
        uid: "or_rm64_r64",
        mnemonic: "or",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x09],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(or rcx rdx)", &[0x48, 0x09, 0xd1]),
        ..BASE
    },
    Form {
        uid: "pop_r16",
        mnemonic: "pop",
        params: &[Param {
            kind: ParamKind::Register,
            bits: 16,
            slot: Slot::Modifier,
            filter: Filter::Reg(RegClass::Gp16),
        }],
        opcodes: &[0x58],
        operand_bits: 16,
        data_bits: 16,
        example: ex("(pop cx)", &[0x66, 0x59]),
        ..BASE
    },
    Form {
        uid: "pop_r64",
        mnemonic: "pop",
        params: &[Param {
            kind: ParamKind::Register,
            bits: 64,
            slot: Slot::Modifier,
            filter: Filter::Reg(RegClass::Gp64),
        }],
        opcodes: &[0x58],
        modes: ModeSet::M64,
        example: ex("(pop rcx)", &[0x59]),
        ..BASE
    },
    Form {
        uid: "push_imm8",
        mnemonic: "push",
        params: &[simm(8)],
        opcodes: &[0x6a],
        example: ex("(push 7)", &[0x6a, 0x07]),
        ..BASE
    },
    Form {
        uid: "push_imm32",
        mnemonic: "push",
        params: &[simm(32)],
        opcodes: &[0x68],
        example: ex("(push 256)", &[0x68, 0x00, 0x01, 0x00, 0x00]),
        ..BASE
    },
    Form {
        uid: "push_r16",
        mnemonic: "push",
        params: &[Param {
            kind: ParamKind::Register,
            bits: 16,
            slot: Slot::Modifier,
            filter: Filter::Reg(RegClass::Gp16),
        }],
        opcodes: &[0x50],
        operand_bits: 16,
        data_bits: 16,
        example: ex("(push cx)", &[0x66, 0x51]),
        ..BASE
    },
    Form {
        uid: "push_r64",
        mnemonic: "push",
        params: &[Param {
            kind: ParamKind::Register,
            bits: 64,
            slot: Slot::Modifier,
            filter: Filter::Reg(RegClass::Gp64),
        }],
        opcodes: &[0x50],
        modes: ModeSet::M64,
        example: ex("(push rcx)", &[0x51]),
        ..BASE
    },
    Form {
        uid: "ret",
        mnemonic: "ret",
        params: &[],
        opcodes: &[0xc3],
        example: ex("(ret)", &[0xc3]),
        ..BASE
    },
    Form {
        uid: "ret_imm16",
        mnemonic: "ret",
        params: &[uimm(16)],
        opcodes: &[0xc2],
        example: ex("(ret 16)", &[0xc2, 0x10, 0x00]),
        ..BASE
    },
    Form {
        uid: "sar_rm32_imm8",
        mnemonic: "sar",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), uimm(8)],
        opcodes: &[0xc1],
        modrm_reg: Some(7),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(sar ecx 2)", &[0xc1, 0xf9, 0x02]),
        ..BASE
    },
    Form {
        uid: "shl_rm32_1",
        mnemonic: "shl",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), lit(1)],
        opcodes: &[0xd1],
        modrm_reg: Some(4),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(shl ecx 1)", &[0xd1, 0xe1]),
        ..BASE
    },
    Form {
        uid: "shl_rm32_imm8",
        mnemonic: "shl",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), uimm(8)],
        opcodes: &[0xc1],
        modrm_reg: Some(4),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(shl ecx 2)", &[0xc1, 0xe1, 0x02]),
        ..BASE
    },
    Form {
        uid: "shr_rm32_imm8",
        mnemonic: "shr",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), uimm(8)],
        opcodes: &[0xc1],
        modrm_reg: Some(5),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(shr ecx 2)", &[0xc1, 0xe9, 0x02]),
        ..BASE
    },
    Form {
        uid: "stosb",
        mnemonic: "stosb",
        params: &[sdst(8)],
        opcodes: &[0xaa],
        data_bits: 8,
        example: ex("(stosb (rdi))", &[0xaa]),
        ..BASE
    },
    Form {
        uid: "sub_al_imm8",
        mnemonic: "sub",
        params: &[fixed("al", 8), simm(8)],
        opcodes: &[0x2c],
        data_bits: 8,
        example: ex("(sub al 7)", &[0x2c, 0x07]),
        ..BASE
    },
    Form {
        uid: "sub_ax_imm16",
        mnemonic: "sub",
        params: &[fixed("ax", 16), simm(16)],
        opcodes: &[0x2d],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "sub_eax_imm32",
        mnemonic: "sub",
        params: &[fixed("eax", 32), simm(32)],
        opcodes: &[0x2d],
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "sub_rax_imm32",
        mnemonic: "sub",
        params: &[fixed("rax", 64), simm(32)],
        opcodes: &[0x2d],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "sub_rm8_imm8",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp8, 8, Slot::ModRMRm), simm(8)],
        opcodes: &[0x80],
        modrm_reg: Some(5),
        data_bits: 8,
        example: ex("(sub cl 7)", &[0x80, 0xe9, 0x07]),
        ..BASE
    },
    Form {
        uid: "sub_rm16_imm8",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(5),
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "sub_rm16_imm16",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp16, 16, Slot::ModRMRm), simm(16)],
        opcodes: &[0x81],
        modrm_reg: Some(5),
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "sub_rm32_imm8",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(5),
        operand_bits: 32,
        data_bits: 32,
        example: ex("(sub ecx 7)", &[0x83, 0xe9, 0x07]),
        ..BASE
    },
    Form {
        uid: "sub_rm32_imm32",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp32, 32, Slot::ModRMRm), simm(32)],
        opcodes: &[0x81],
        modrm_reg: Some(5),
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "sub_rm64_imm8",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(8)],
        opcodes: &[0x83],
        modrm_reg: Some(5),
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(sub rcx 7)", &[0x48, 0x83, 0xe9, 0x07]),
        ..BASE
    },
    Form {
        uid: "sub_rm64_imm32",
        mnemonic: "sub",
        params: &[reg(RegClass::Gp64, 64, Slot::ModRMRm), simm(32)],
        opcodes: &[0x81],
        modrm_reg: Some(5),
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "sub_rm8_r8",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
        ],
        opcodes: &[0x28],
        data_bits: 8,
        example: ex("(sub cl dl)", &[0x28, 0xd1]),
        ..BASE
    },
    Form {
        uid: "sub_rm16_r16",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
        ],
        opcodes: &[0x29],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "sub_rm32_r32",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x29],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(sub ecx edx)", &[0x29, 0xd1]),
        ..BASE
    },
    Form {
        uid: "sub_rm64_r64",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x29],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(sub rcx rdx)", &[0x48, 0x29, 0xd1]),
        ..BASE
    },
    Form {
        uid: "sub_r8_rm8",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
        ],
        opcodes: &[0x2a],
        data_bits: 8,
        ..BASE
    },
    Form {
        uid: "sub_r16_rm16",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp16, 16, Slot::ModRMReg),
            reg(RegClass::Gp16, 16, Slot::ModRMRm),
        ],
        opcodes: &[0x2b],
        operand_bits: 16,
        data_bits: 16,
        ..BASE
    },
    Form {
        uid: "sub_r32_rm32",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
        ],
        opcodes: &[0x2b],
        operand_bits: 32,
        data_bits: 32,
        ..BASE
    },
    Form {
        uid: "sub_r64_rm64",
        mnemonic: "sub",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
        ],
        opcodes: &[0x2b],
        modes: ModeSet::M64,
        data_bits: 64,
        ..BASE
    },
    Form {
        uid: "syscall",
        mnemonic: "syscall",
        params: &[],
        opcodes: &[0x0f, 0x05],
        modes: ModeSet::M64,
        example: ex("(syscall)", &[0x0f, 0x05]),
        ..BASE
    },
    Form {
        uid: "test_rm8_r8",
        mnemonic: "test",
        params: &[
            reg(RegClass::Gp8, 8, Slot::ModRMRm),
            reg(RegClass::Gp8, 8, Slot::ModRMReg),
        ],
        opcodes: &[0x84],
        data_bits: 8,
        example: ex("(test cl dl)", &[0x84, 0xd1]),
        ..BASE
    },
    Form {
        uid: "test_rm32_r32",
        mnemonic: "test",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x85],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(test ecx edx)", &[0x85, 0xd1]),
        ..BASE
    },
    Form {
        uid: "vaddps_xmm",
        mnemonic: "vaddps",
        params: &[
            reg(RegClass::Xmm, 128, Slot::ModRMReg),
            reg(RegClass::Xmm, 128, Slot::VexVVVV),
            reg(RegClass::Xmm, 128, Slot::ModRMRm),
        ],
        opcodes: &[0x58],
        vex: Some(VexInfo {
            l: false,
            pp: 0,
            m_mmmm: 1,
            w: Some(false),
        }),
        modes: ModeSet::M32PLUS,
        no_rep: true,
        example: ex("(vaddps xmm1 xmm2 xmm3)", &[0xc4, 0xe1, 0x68, 0x58, 0xcb]),
        ..BASE
    },
    Form {
        uid: "vaddps_xmm_m128",
        mnemonic: "vaddps",
        params: &[
            reg(RegClass::Xmm, 128, Slot::ModRMReg),
            reg(RegClass::Xmm, 128, Slot::VexVVVV),
            mem(128),
        ],
        opcodes: &[0x58],
        vex: Some(VexInfo {
            l: false,
            pp: 0,
            m_mmmm: 1,
            w: Some(false),
        }),
        modes: ModeSet::M32PLUS,
        no_rep: true,
        example: ex(
            "(vaddps xmm1 xmm2 (rax))",
            &[0xc4, 0xe1, 0x68, 0x58, 0x08],
        ),
        ..BASE
    },
    Form {
        uid: "vaddps_ymm",
        mnemonic: "vaddps",
        params: &[
            reg(RegClass::Ymm, 256, Slot::ModRMReg),
            reg(RegClass::Ymm, 256, Slot::VexVVVV),
            reg(RegClass::Ymm, 256, Slot::ModRMRm),
        ],
        opcodes: &[0x58],
        vex: Some(VexInfo {
            l: true,
            pp: 0,
            m_mmmm: 1,
            w: Some(false),
        }),
        modes: ModeSet::M32PLUS,
        no_rep: true,
        example: ex("(vaddps ymm1 ymm2 ymm3)", &[0xc4, 0xe1, 0x6c, 0x58, 0xcb]),
        ..BASE
    },
    Form {
        uid: "vaddps_zmm",
        mnemonic: "vaddps",
        params: &[
            reg(RegClass::Zmm, 512, Slot::ModRMReg),
            reg(RegClass::Zmm, 512, Slot::VexVVVV),
            reg(RegClass::Zmm, 512, Slot::ModRMRm),
        ],
        opcodes: &[0x58],
        evex: Some(EvexInfo {
            lp: true,
            l: false,
            pp: 0,
            mm: 1,
            w: Some(false),
            disp8: 64,
            disp8_bcst: 4,
        }),
        modes: ModeSet::M64,
        no_rep: true,
        example: ex(
            "(vaddps zmm1 zmm2 zmm3)",
            &[0x62, 0xf1, 0x6c, 0x48, 0x58, 0xcb],
        ),
        ..BASE
    },
    Form {
        uid: "vaddps_zmm_m512",
        mnemonic: "vaddps",
        params: &[
            reg(RegClass::Zmm, 512, Slot::ModRMReg),
            reg(RegClass::Zmm, 512, Slot::VexVVVV),
            mem(512),
        ],
        opcodes: &[0x58],
        evex: Some(EvexInfo {
            lp: true,
            l: false,
            pp: 0,
            mm: 1,
            w: Some(false),
            disp8: 64,
            disp8_bcst: 4,
        }),
        modes: ModeSet::M64,
        no_rep: true,
        example: ex(
            "(vaddps zmm1 zmm2 (rax 256))",
            &[0x62, 0xf1, 0x6c, 0x48, 0x58, 0x48, 0x04],
        ),
        ..BASE
    },
    Form {
        uid: "vblendvps_xmm",
        mnemonic: "vblendvps",
        params: &[
            reg(RegClass::Xmm, 128, Slot::ModRMReg),
            reg(RegClass::Xmm, 128, Slot::VexVVVV),
            reg(RegClass::Xmm, 128, Slot::ModRMRm),
            reg(RegClass::Xmm, 128, Slot::VexIs4),
        ],
        opcodes: &[0x4a],
        vex: Some(VexInfo {
            l: false,
            pp: 1,
            m_mmmm: 3,
            w: Some(false),
        }),
        modes: ModeSet::M32PLUS,
        no_rep: true,
        no_vex: true,
        example: ex(
            "(vblendvps xmm1 xmm2 xmm3 xmm4)",
            &[0xc4, 0xe3, 0x69, 0x4a, 0xcb, 0x40],
        ),
        ..BASE
    },
    Form {
        uid: "xchg_r16_ax",
        mnemonic: "xchg",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 16,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp16),
            },
            fixed("ax", 16),
        ],
        opcodes: &[0x90],
        operand_bits: 16,
        data_bits: 16,
        example: ex("(xchg cx ax)", &[0x66, 0x91]),
        ..BASE
    },
    Form {
        uid: "xchg_r32_eax",
        mnemonic: "xchg",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 32,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp32),
            },
            fixed("eax", 32),
        ],
        opcodes: &[0x90],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(xchg ecx eax)", &[0x91]),
        ..BASE
    },
    Form {
        uid: "xchg_r64_rax",
        mnemonic: "xchg",
        params: &[
            Param {
                kind: ParamKind::Register,
                bits: 64,
                slot: Slot::Modifier,
                filter: Filter::Reg(RegClass::Gp64),
            },
            fixed("rax", 64),
        ],
        opcodes: &[0x90],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(xchg rax rax)", &[0x48, 0x90]),
        ..BASE
    },
    Form {
        uid: "xchg_rm32_r32",
        mnemonic: "xchg",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x87],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(xchg ecx edx)", &[0x87, 0xd1]),
        ..BASE
    },
    Form {
        uid: "xchg_rm64_r64",
        mnemonic: "xchg",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x87],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(xchg rcx rdx)", &[0x48, 0x87, 0xd1]),
        ..BASE
    },
    Form {
        uid: "xor_rm32_r32",
        mnemonic: "xor",
        params: &[
            reg(RegClass::Gp32, 32, Slot::ModRMRm),
            reg(RegClass::Gp32, 32, Slot::ModRMReg),
        ],
        opcodes: &[0x31],
        operand_bits: 32,
        data_bits: 32,
        example: ex("(xor ecx ecx)", &[0x31, 0xc9]),
        ..BASE
    },
    Form {
        uid: "xor_rm64_r64",
        mnemonic: "xor",
        params: &[
            reg(RegClass::Gp64, 64, Slot::ModRMRm),
            reg(RegClass::Gp64, 64, Slot::ModRMReg),
        ],
        opcodes: &[0x31],
        modes: ModeSet::M64,
        data_bits: 64,
        example: ex("(xor rcx rcx)", &[0x48, 0x31, 0xc9]),
        ..BASE
    },
];
