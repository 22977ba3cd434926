//! Lowering allocated values to machine instructions.
//!
//! Each allocated step becomes zero or more concrete x86 instructions:
//! constant materialisations become immediate moves, copies become
//! register or stack moves, calls become `CALL rel32` with a relocation,
//! and a `RET` closes the function. Form selection is shared with the
//! assembler, so the lowerer always emits the same encoding the assembler
//! would pick for the equivalent source text.

use num_bigint::BigInt;
use ruse_asm::{Insn, Memory, Mode, Operand, Reg, RelocKind, Relocation};
use ruse_types::{Constant, IntType, Span};

use crate::alloc::AllocValue;
use crate::asm::select_insn;
use crate::error::LowerError;
use crate::location::Location;
use crate::ssa::{Extra, Function, Op};

/// Lowers the allocated steps of `f` into instruction values, replacing
/// the entry block's contents.
pub fn lower(f: &mut Function, steps: Vec<AllocValue>) -> Result<(), LowerError> {
    let mut lowerer = Lowerer {
        mode: f.emit_mode(),
        insns: Vec::new(),
        relocs: Vec::new(),
    };
    for step in &steps {
        lowerer.step(f, step)?;
    }
    let span = f.block(f.entry).span.clone();
    lowerer.emit("ret", vec![], &span)?;

    // Instruction lengths are known; rewrite every relocation to point at
    // its patched field and the byte after its instruction.
    let mut offsets = Vec::with_capacity(lowerer.insns.len());
    let mut total = 0usize;
    for (insn, _) in &lowerer.insns {
        offsets.push(total);
        total += usize::from(insn.len);
    }
    f.relocations = lowerer
        .relocs
        .into_iter()
        .map(|(index, mut reloc)| {
            let end = offsets[index] + usize::from(lowerer.insns[index].0.len);
            reloc.offset = end - usize::from(reloc.bits / 8);
            reloc.address = end;
            reloc
        })
        .collect();

    let values = lowerer
        .insns
        .into_iter()
        .map(|(insn, span)| {
            let form = insn.form;
            (Op::Asm(form), Some(Extra::Insn(insn)), span)
        })
        .collect();
    f.replace_entry_values(values);
    Ok(())
}

struct Lowerer {
    mode: Mode,
    insns: Vec<(Insn, Span)>,
    relocs: Vec<(usize, Relocation)>,
}

impl Lowerer {
    fn emit(
        &mut self,
        mnemonic: &str,
        args: Vec<Operand>,
        span: &Span,
    ) -> Result<(), LowerError> {
        for arg in &args {
            if let Operand::Reloc { name, kind } = arg {
                let bits = if *kind == RelocKind::RelativeAddress {
                    32
                } else {
                    64
                };
                self.relocs.push((
                    self.insns.len(),
                    Relocation::new(span.clone(), name.clone(), *kind, bits),
                ));
            }
        }
        let insn =
            select_insn(self.mode, mnemonic, args, span).map_err(|e| LowerError::NoInstruction {
                span: span.clone(),
                what: format!("{mnemonic}: {e}"),
            })?;
        tracing::trace!(form = insn.form.uid, "lowered");
        self.insns.push((insn, span.clone()));
        Ok(())
    }

    fn step(&mut self, f: &Function, step: &AllocValue) -> Result<(), LowerError> {
        match &step.op {
            Op::Copy => self.copy(step),
            Op::Add(_) | Op::Sub(_) => self.add_sub(step),
            Op::Mul(_) => self.mul(step),
            Op::Div(int) => self.div(*int, step),
            Op::Negate(_) => self.negate(step),
            Op::Cast(from, to) => self.cast(*from, *to, step),
            Op::StringLen => self.string_len(step),
            Op::FunctionCall => self.call(f, step),
            // Results were moved into place by the allocator; drops are
            // bookkeeping only.
            Op::MakeResult | Op::Drop => Ok(()),
            op => Err(LowerError::Unsupported {
                span: step.span.clone(),
                op: op.to_string(),
            }),
        }
    }

    fn copy(&mut self, step: &AllocValue) -> Result<(), LowerError> {
        if let Some((_, data)) = &step.alloc.data {
            let data = data.clone();
            return self.materialize(step, &data);
        }
        let src = step.alloc.src.as_ref().cloned().unwrap_or_default();
        for (dst, src) in step.alloc.dst.iter().zip(&src) {
            self.move_loc(dst, src, &step.span)?;
        }
        Ok(())
    }

    fn move_loc(
        &mut self,
        dst: &Location,
        src: &Location,
        span: &Span,
    ) -> Result<(), LowerError> {
        if dst.same_place(src) {
            return Ok(());
        }
        let args = match (dst, src) {
            (Location::Register(d), Location::Register(s)) => {
                vec![Operand::Reg(*d), Operand::Reg(*s)]
            }
            (Location::Register(d), Location::Stack { base, offset }) => {
                vec![
                    Operand::Reg(*d),
                    Operand::Mem(Memory::base_disp(base, *offset)),
                ]
            }
            (Location::Stack { base, offset }, Location::Register(s)) => {
                vec![
                    Operand::Mem(Memory::base_disp(base, *offset)),
                    Operand::Reg(*s),
                ]
            }
            (Location::Stack { .. }, Location::Stack { .. }) => {
                return Err(LowerError::Unsupported {
                    span: span.clone(),
                    op: "memory to memory move".into(),
                })
            }
        };
        self.emit("mov", args, span)
    }

    // Materialises a constant into its destination locations.
    fn materialize(
        &mut self,
        step: &AllocValue,
        data: &Constant,
    ) -> Result<(), LowerError> {
        match data {
            Constant::Int(value) => {
                let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
                self.mov_imm(dst, value, &step.span)
            }
            Constant::String(s) => {
                // A string is a pointer and a length; the pointer is a
                // relocation against the string constant's symbol.
                let ptr = reg_dst(&step.alloc.dst, 0, &step.span)?;
                let len = reg_dst(&step.alloc.dst, 1, &step.span)?;
                self.emit(
                    "mov",
                    vec![
                        Operand::Reg(ptr),
                        Operand::Reloc {
                            name: format!(".{s}"),
                            kind: RelocKind::FullAddress,
                        },
                    ],
                    &step.span,
                )?;
                self.mov_imm(len, &BigInt::from(s.len()), &step.span)
            }
            Constant::Bool(b) => {
                let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
                self.mov_imm(dst, &BigInt::from(u8::from(*b)), &step.span)
            }
        }
    }

    fn mov_imm(
        &mut self,
        dst: &'static Reg,
        value: &BigInt,
        span: &Span,
    ) -> Result<(), LowerError> {
        let v = i128::try_from(value).map_err(|_| LowerError::Unsupported {
            span: span.clone(),
            op: format!("constant {value}"),
        })?;
        // A 64-bit register with a value that fits 32 unsigned bits takes
        // the 32-bit form, which clears the upper half.
        if dst.bits == 64 && (0..=i128::from(u32::MAX)).contains(&v) {
            let dst32 = Reg::gp(dst.num, 32).unwrap_or(dst);
            return self.emit("mov", vec![Operand::Reg(dst32), Operand::Imm(v)], span);
        }
        self.emit("mov", vec![Operand::Reg(dst), Operand::Imm(v)], span)
    }

    fn rhs_operand(&self, step: &AllocValue, span: &Span) -> Result<Operand, LowerError> {
        if let Some((_, Constant::Int(value))) = &step.alloc.data {
            let v = i128::try_from(value).map_err(|_| LowerError::Unsupported {
                span: span.clone(),
                op: format!("constant {value}"),
            })?;
            return Ok(Operand::Imm(v));
        }
        match step.alloc.src.as_deref() {
            Some([Location::Register(reg), ..]) => Ok(Operand::Reg(reg)),
            Some([Location::Stack { base, offset }, ..]) => {
                Ok(Operand::Mem(Memory::base_disp(base, *offset)))
            }
            _ => Err(LowerError::Unsupported {
                span: span.clone(),
                op: "operand without a location".into(),
            }),
        }
    }

    fn add_sub(&mut self, step: &AllocValue) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        let rhs = self.rhs_operand(step, &step.span)?;
        let mnemonic = match step.op {
            Op::Add(_) => "add",
            _ => "sub",
        };
        self.emit(mnemonic, vec![Operand::Reg(dst), rhs], &step.span)
    }

    fn mul(&mut self, step: &AllocValue) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        let src = match self.rhs_operand(step, &step.span)? {
            Operand::Reg(reg) => reg,
            _ => {
                return Err(LowerError::Unsupported {
                    span: step.span.clone(),
                    op: "multiply by a non-register".into(),
                })
            }
        };
        // There is no 8-bit two-operand multiply; work in 32 bits, the
        // truncated result is the same.
        let (dst, src) = if dst.bits < 16 {
            (widen(dst, 32), widen(src, 32))
        } else {
            (dst, src)
        };
        self.emit(
            "imul",
            vec![Operand::Reg(dst), Operand::Reg(src)],
            &step.span,
        )
    }

    fn div(&mut self, int: IntType, step: &AllocValue) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        let src = match self.rhs_operand(step, &step.span)? {
            Operand::Reg(reg) => reg,
            _ => {
                return Err(LowerError::Unsupported {
                    span: step.span.clone(),
                    op: "divide by a non-register".into(),
                })
            }
        };
        let span = &step.span;
        match (dst.bits, int.signed()) {
            (64, true) => {
                self.emit("cqo", vec![], span)?;
                self.emit("idiv", vec![Operand::Reg(src)], span)
            }
            (64, false) => {
                self.zero_edx(span)?;
                self.emit("div", vec![Operand::Reg(src)], span)
            }
            (bits, signed) => {
                // Narrow divisions widen to 32 bits first.
                let src32 = widen(src, 32);
                if bits < 32 {
                    let wide = if signed { "movsx" } else { "movzx" };
                    let dst32 = widen(dst, 32);
                    self.emit(wide, vec![Operand::Reg(dst32), Operand::Reg(dst)], span)?;
                    self.emit(wide, vec![Operand::Reg(src32), Operand::Reg(src)], span)?;
                }
                if signed {
                    self.emit("cdq", vec![], span)?;
                    self.emit("idiv", vec![Operand::Reg(src32)], span)
                } else {
                    self.zero_edx(span)?;
                    self.emit("div", vec![Operand::Reg(src32)], span)
                }
            }
        }
    }

    fn zero_edx(&mut self, span: &Span) -> Result<(), LowerError> {
        let edx = Reg::by_name("edx").expect("register table is complete");
        self.emit("xor", vec![Operand::Reg(edx), Operand::Reg(edx)], span)
    }

    fn negate(&mut self, step: &AllocValue) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        self.emit("neg", vec![Operand::Reg(dst)], &step.span)
    }

    fn cast(
        &mut self,
        from: IntType,
        to: IntType,
        step: &AllocValue,
    ) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        // A constant that survived to lowering is materialised directly.
        if let Some((_, Constant::Int(v))) = &step.alloc.data {
            let v = v.clone();
            return self.mov_imm(dst, &v, &step.span);
        }
        let src = match step.alloc.src.as_deref() {
            Some([Location::Register(reg), ..]) => *reg,
            _ => {
                return Err(LowerError::Unsupported {
                    span: step.span.clone(),
                    op: "cast of a non-register".into(),
                })
            }
        };
        let span = &step.span;
        if to.bits() <= from.bits() {
            // Narrowing reinterprets the low bits.
            let src_narrow = widen(src, to.bits());
            if src_narrow.num == dst.num {
                return Ok(());
            }
            return self.emit(
                "mov",
                vec![Operand::Reg(dst), Operand::Reg(src_narrow)],
                span,
            );
        }
        match (from.bits(), from.signed()) {
            (32, true) => self.emit(
                "movsxd",
                vec![Operand::Reg(dst), Operand::Reg(src)],
                span,
            ),
            (32, false) => {
                // A 32-bit move zero-extends to 64 bits.
                let dst32 = widen(dst, 32);
                self.emit("mov", vec![Operand::Reg(dst32), Operand::Reg(src)], span)
            }
            (_, true) => self.emit("movsx", vec![Operand::Reg(dst), Operand::Reg(src)], span),
            (_, false) => {
                // Zero extension to 32 bits clears the rest of a 64-bit
                // register too.
                let dst_z = if to.bits() == 64 { widen(dst, 32) } else { dst };
                self.emit("movzx", vec![Operand::Reg(dst_z), Operand::Reg(src)], span)
            }
        }
    }

    fn string_len(&mut self, step: &AllocValue) -> Result<(), LowerError> {
        let dst = reg_dst(&step.alloc.dst, 0, &step.span)?;
        let src = match step.alloc.src.as_deref() {
            Some([_, Location::Register(len)]) => *len,
            _ => {
                return Err(LowerError::Unsupported {
                    span: step.span.clone(),
                    op: "string length of a non-string".into(),
                })
            }
        };
        if src.num == dst.num {
            return Ok(());
        }
        self.emit(
            "mov",
            vec![Operand::Reg(dst), Operand::Reg(src)],
            &step.span,
        )
    }

    fn call(&mut self, f: &Function, step: &AllocValue) -> Result<(), LowerError> {
        let callee = match &f.value(step.source).extra {
            Some(Extra::Callee(callee)) => callee.clone(),
            _ => {
                return Err(LowerError::Unsupported {
                    span: step.span.clone(),
                    op: "call without a callee".into(),
                })
            }
        };
        self.emit(
            "call",
            vec![Operand::Reloc {
                name: callee.symbol(),
                kind: RelocKind::RelativeAddress,
            }],
            &step.span,
        )
    }
}

fn reg_dst(
    dst: &[Location],
    index: usize,
    span: &Span,
) -> Result<&'static Reg, LowerError> {
    match dst.get(index) {
        Some(Location::Register(reg)) => Ok(reg),
        _ => Err(LowerError::Unsupported {
            span: span.clone(),
            op: "destination is not a register".into(),
        }),
    }
}

fn widen(reg: &'static Reg, bits: u16) -> &'static Reg {
    Reg::gp(reg.num, bits).unwrap_or(reg)
}
