//! The S-expression assembler.
//!
//! An `asm-func` body is a list of labels (`'name`) and instruction forms
//! (`(prefix* mnemonic operand*)`). Each instruction is matched against
//! every candidate form of its mnemonic; matching candidates are encoded
//! and the shortest wins. Labels are resolved over three phases: distances
//! are measured from the end of the referencing instruction, 32-bit jumps
//! are shrunk to 8-bit variants where the distance allows, and distances
//! are recomputed once. Shrinking only ever decreases distances, so a
//! single recomputation reaches the fixed point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ruse_asm::table::{self, Filter, Form, ParamKind};
use ruse_asm::{
    CodeBuffer, Family, Insn, Memory, Mode, Operand, Reg, RelocKind, Relocation,
};
use ruse_types::{Constant, Expr, List, Signature, Span, SymbolTable};

use crate::error::AsmError;
use crate::ssa::{Extra, Function, Op};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrefixGroup {
    LockRep,
    Branch,
    OperandSize,
    AddressSize,
}

// Legacy prefixes accepted in instruction position, with their group.
fn prefix_byte(name: &str) -> Option<(u8, PrefixGroup, bool)> {
    Some(match name {
        "lock" => (0xf0, PrefixGroup::LockRep, false),
        "rep" | "repz" | "repe" => (0xf3, PrefixGroup::LockRep, true),
        "repnz" | "repne" => (0xf2, PrefixGroup::LockRep, true),
        "taken" => (0x3e, PrefixGroup::Branch, false),
        "not-taken" => (0x2e, PrefixGroup::Branch, false),
        "osize" => (0x66, PrefixGroup::OperandSize, false),
        "asize" => (0x67, PrefixGroup::AddressSize, false),
        _ => return None,
    })
}

// Per-instruction state gathered from quoted annotations.
#[derive(Debug, Default, Clone)]
struct Annotations {
    want_match: Option<String>,
    mask: u8,
    zero: bool,
    broadcast: bool,
    size_bits: Option<u16>,
}

impl Annotations {
    fn evex_features(&self) -> bool {
        self.mask != 0 || self.zero || self.broadcast
    }
}

struct LabelRef {
    insn: usize,
    arg: usize,
    label: String,
    span: Span,
}

struct PendingReloc {
    insn: usize,
    name: String,
    kind: RelocKind,
    bits: u8,
    span: Span,
}

/// Assembles one `asm-func` body into a function of instruction values.
pub fn assemble_function(
    symbols: &SymbolTable,
    name: &str,
    body: &[Expr],
    span: Span,
) -> Result<Function, AsmError> {
    let mut mode = Mode::Bits64;
    let mut mode_seen = false;

    // Validation pass: no label may be defined twice, and the mode
    // annotation may appear once.
    let mut seen = HashSet::new();
    for expr in body {
        if let Some(label) = expr.as_label() {
            if !seen.insert(label.name.clone()) {
                return Err(AsmError::DuplicateLabel {
                    span: label.span.clone(),
                    name: label.name.clone(),
                });
            }
        }
        if let Some(ann) = expr.as_annotation() {
            if ann_name(ann) == Some("mode") {
                if mode_seen {
                    return Err(AsmError::BadAnnotation {
                        span: ann.span.clone(),
                    });
                }
                mode_seen = true;
                mode = parse_mode(ann)?;
            }
        }
    }

    // Main pass: labels record the index of the next instruction;
    // instruction lists are matched, selected and measured.
    let mut instructions: Vec<Insn> = Vec::new();
    let mut spans: Vec<Span> = Vec::new();
    let mut labels: HashMap<String, (usize, Span)> = HashMap::new();
    let mut relocs: Vec<PendingReloc> = Vec::new();
    let mut buf = CodeBuffer::new();

    for expr in body {
        if let Some(ann) = expr.as_annotation() {
            match ann_name(ann) {
                Some("mode") => continue,
                _ => {
                    return Err(AsmError::BadAnnotation {
                        span: ann.span.clone(),
                    })
                }
            }
        }
        if let Some(label) = expr.as_label() {
            labels.insert(
                label.name.clone(),
                (instructions.len(), label.span.clone()),
            );
            continue;
        }
        let list = expr.as_list().ok_or_else(|| AsmError::BadInstruction {
            span: expr.span().clone(),
        })?;
        let insn = parse_instruction(symbols, mode, list, &mut buf)?;
        for (kind, name, bits) in insn_relocs(&insn) {
            relocs.push(PendingReloc {
                insn: instructions.len(),
                name,
                kind,
                bits,
                span: list.span.clone(),
            });
        }
        instructions.push(insn);
        spans.push(list.span.clone());
    }

    // Collect label references and reject unknown or unused labels.
    let mut refs: Vec<LabelRef> = Vec::new();
    for (i, insn) in instructions.iter().enumerate() {
        for (a, arg) in insn.args.iter().enumerate() {
            if let Operand::Label(label) = arg {
                if !labels.contains_key(label) {
                    return Err(AsmError::UnknownLabel {
                        span: spans[i].clone(),
                        name: label.clone(),
                    });
                }
                refs.push(LabelRef {
                    insn: i,
                    arg: a,
                    label: label.clone(),
                    span: spans[i].clone(),
                });
            }
        }
    }
    let referenced: HashSet<&String> = refs.iter().map(|r| &r.label).collect();
    for (label, (_, label_span)) in &labels {
        if !referenced.contains(label) {
            return Err(AsmError::UnreferencedLabel {
                span: label_span.clone(),
                name: label.clone(),
            });
        }
    }

    // Phase 3: distances from the end of each referencing instruction.
    link_labels(&mut instructions, &refs, &labels)?;

    // Phase 4: shrink to a narrower relative variant where one exists and
    // the distance fits.
    for r in &refs {
        let insn = &instructions[r.insn];
        let bits = insn.form.params[r.arg].bits;
        let distance = match &insn.args[r.arg] {
            Operand::Rel(d) => *d,
            _ => continue,
        };
        if bits <= 8 {
            continue;
        }
        for narrow in table::by_mnemonic(insn.form.mnemonic) {
            if !narrow.modes.supports(mode) || narrow.arity() != insn.form.arity() {
                continue;
            }
            let param = &narrow.params[r.arg];
            if param.kind != ParamKind::RelativeAddress || param.bits >= bits {
                continue;
            }
            let limit = 1i64 << (param.bits - 1);
            if distance >= -limit && distance < limit {
                let insn = &mut instructions[r.insn];
                insn.form = narrow;
                insn.measure(&mut buf, mode).map_err(|source| {
                    AsmError::Encode {
                        span: r.span.clone(),
                        source,
                    }
                })?;
                break;
            }
        }
    }

    // Phase 5: recompute distances with the final lengths. Shrinking only
    // decreases distances, so one pass suffices.
    link_labels(&mut instructions, &refs, &labels)?;

    // Relocation resolution: the offset points at the patched field, the
    // address at the first byte after the instruction.
    let offsets = byte_offsets(&instructions);
    let mut f = Function::new(
        symbols.path(),
        name,
        Arc::new(Signature::new(name, Vec::new(), None)),
    );
    f.mode = Some(mode);
    for r in relocs {
        let end = offsets[r.insn] + usize::from(instructions[r.insn].len);
        f.relocations.push(Relocation {
            span: r.span,
            name: r.name,
            kind: r.kind,
            bits: r.bits,
            offset: end - usize::from(r.bits / 8),
            address: end,
        });
    }

    let entry = f.entry;
    f.blocks[entry.0 as usize].span = span;
    for (insn, span) in instructions.into_iter().zip(spans) {
        let form = insn.form;
        f.new_value_extra(entry, span, Op::Asm(form), None, Extra::Insn(insn), &[]);
    }
    Ok(f)
}

fn ann_name(ann: &List) -> Option<&str> {
    ann.head()?.as_ident().map(|i| i.name.as_str())
}

fn parse_mode(ann: &List) -> Result<Mode, AsmError> {
    let bits = ann
        .tail()
        .first()
        .and_then(Expr::as_number)
        .and_then(|n| u64::try_from(&n.value).ok());
    bits.and_then(Mode::from_bits)
        .ok_or_else(|| AsmError::BadAnnotation {
            span: ann.span.clone(),
        })
}

// The relocations an instruction's operands imply.
fn insn_relocs(insn: &Insn) -> Vec<(RelocKind, String, u8)> {
    insn.form
        .params
        .iter()
        .zip(&insn.args)
        .filter_map(|(param, arg)| match arg {
            Operand::Reloc { name, kind } => Some((*kind, name.clone(), param.bits as u8)),
            _ => None,
        })
        .collect()
}

fn byte_offsets(instructions: &[Insn]) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(instructions.len() + 1);
    let mut total = 0usize;
    for insn in instructions {
        offsets.push(total);
        total += usize::from(insn.len);
    }
    offsets.push(total);
    offsets
}

// Phase 3/5: store each label reference's distance, measured from the end
// of the jumping instruction to the first byte of the label's next
// instruction.
fn link_labels(
    instructions: &mut [Insn],
    refs: &[LabelRef],
    labels: &HashMap<String, (usize, Span)>,
) -> Result<(), AsmError> {
    let offsets = byte_offsets(instructions);
    for r in refs {
        let (target, _) = &labels[&r.label];
        let end = offsets[r.insn] + usize::from(instructions[r.insn].len);
        let distance = offsets[*target] as i64 - end as i64;
        if i32::try_from(distance).is_err() {
            return Err(AsmError::JumpOutOfRange {
                span: r.span.clone(),
                distance,
            });
        }
        instructions[r.insn].args[r.arg] = Operand::Rel(distance);
    }
    Ok(())
}

fn parse_instruction(
    symbols: &SymbolTable,
    mode: Mode,
    list: &List,
    buf: &mut CodeBuffer,
) -> Result<Insn, AsmError> {
    // Quoted list elements are annotations on the instruction.
    let mut ann = Annotations::default();
    let mut elems: Vec<&Expr> = Vec::with_capacity(list.elements.len());
    for e in &list.elements {
        match e.as_annotation() {
            Some(a) => parse_insn_annotation(a, &mut ann)?,
            None => elems.push(e),
        }
    }

    // Leading identifiers are prefixes until the first non-prefix, which
    // is the mnemonic. `rex.w` reads as a qualified identifier.
    let mut prefixes: Vec<u8> = Vec::new();
    let mut groups: Vec<PrefixGroup> = Vec::new();
    let mut has_rep = false;
    let mut rex_w = false;
    let mut rest = &elems[..];
    let mnemonic = loop {
        match rest.first() {
            Some(Expr::Qualified(q)) if q.package == "rex" && q.name == "w" => {
                rex_w = true;
                rest = &rest[1..];
            }
            Some(Expr::Ident(ident)) => {
                if let Some((byte, group, rep)) = prefix_byte(&ident.name) {
                    if groups.contains(&group) {
                        return Err(AsmError::PrefixConflict {
                            span: ident.span.clone(),
                            prefix: ident.name.clone(),
                        });
                    }
                    groups.push(group);
                    prefixes.push(byte);
                    has_rep |= rep;
                    rest = &rest[1..];
                    continue;
                }
                break ident;
            }
            _ => {
                return Err(AsmError::BadInstruction {
                    span: list.span.clone(),
                })
            }
        }
    };
    let operands = &rest[1..];

    let candidates = table::by_mnemonic(&mnemonic.name);
    if candidates.is_empty() {
        return Err(AsmError::UnknownMnemonic {
            span: mnemonic.span.clone(),
            name: mnemonic.name.clone(),
        });
    }

    let mut best: Option<Insn> = None;
    for form in candidates {
        if !form.modes.supports(mode) || form.arity() != operands.len() {
            continue;
        }
        if let Some(uid) = &ann.want_match {
            if form.uid != *uid {
                continue;
            }
        }
        if ann.evex_features() && form.evex.is_none() {
            continue;
        }
        let Some(args) = match_operands(symbols, mode, form, operands, &ann)? else {
            continue;
        };
        let mut insn = Insn {
            form,
            args,
            prefixes: prefixes.clone(),
            rex_w,
            mask: ann.mask,
            zero: ann.zero,
            broadcast: ann.broadcast,
            len: 0,
        };
        if insn.measure(buf, mode).is_err() {
            continue;
        }
        if best.as_ref().map_or(true, |b| prefer(&insn, b)) {
            best = Some(insn);
        }
    }

    let chosen = best.ok_or_else(|| match &ann.want_match {
        Some(uid) => AsmError::MatchAnnotationFailed {
            span: list.span.clone(),
            uid: uid.clone(),
        },
        None => AsmError::NoMatch {
            span: list.span.clone(),
            mnemonic: mnemonic.name.clone(),
        },
    })?;
    if has_rep && chosen.form.no_rep {
        return Err(AsmError::RepNotAllowed {
            span: list.span.clone(),
            mnemonic: mnemonic.name.clone(),
        });
    }
    tracing::trace!(form = chosen.form.uid, len = chosen.len, "selected");
    Ok(chosen)
}

fn parse_insn_annotation(ann: &List, out: &mut Annotations) -> Result<(), AsmError> {
    let bad = || AsmError::BadAnnotation {
        span: ann.span.clone(),
    };
    match ann_name(ann).ok_or_else(bad)? {
        "match" => {
            let uid = ann
                .tail()
                .first()
                .and_then(|e| e.as_ident())
                .ok_or_else(bad)?;
            out.want_match = Some(uid.name.clone());
        }
        "mask" => {
            let reg = ann
                .tail()
                .first()
                .and_then(|e| e.as_ident())
                .ok_or_else(bad)?;
            let mask = reg
                .name
                .strip_prefix('k')
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|&n| (1..=7).contains(&n))
                .ok_or_else(bad)?;
            out.mask = mask;
        }
        "zero" => out.zero = parse_bool(ann).ok_or_else(bad)?,
        "broadcast" => out.broadcast = parse_bool(ann).ok_or_else(bad)?,
        "bits" => {
            let bits = ann_number(ann).ok_or_else(bad)?;
            out.size_bits = Some(bits as u16);
        }
        "bytes" => {
            let bytes = ann_number(ann).ok_or_else(bad)?;
            out.size_bits = Some((bytes * 8) as u16);
        }
        _ => return Err(bad()),
    }
    Ok(())
}

fn parse_bool(ann: &List) -> Option<bool> {
    match ann.tail().first()?.as_ident()?.name.as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn ann_number(ann: &List) -> Option<u64> {
    ann.tail()
        .first()
        .and_then(Expr::as_number)
        .and_then(|n| u64::try_from(&n.value).ok())
}

// Ordering for form selection: shortest encoding, then smaller data size,
// then VEX over EVEX, then UID order.
fn prefer(a: &Insn, b: &Insn) -> bool {
    let key = |i: &Insn| {
        (
            i.len,
            i.form.data_bits,
            u8::from(i.form.evex.is_some()),
            i.form.uid,
        )
    };
    key(a) < key(b)
}

/// Selects the best form for already-resolved operands; the lowerer's
/// entry point into form selection, sharing the assembler's ordering.
pub(crate) fn select_insn(
    mode: Mode,
    mnemonic: &str,
    args: Vec<Operand>,
    span: &Span,
) -> Result<Insn, AsmError> {
    let candidates = table::by_mnemonic(mnemonic);
    if candidates.is_empty() {
        return Err(AsmError::UnknownMnemonic {
            span: span.clone(),
            name: mnemonic.to_string(),
        });
    }
    let mut buf = CodeBuffer::new();
    let mut best: Option<Insn> = None;
    for form in candidates {
        if !form.modes.supports(mode) || form.arity() != args.len() {
            continue;
        }
        if !values_match(mode, form, &args) {
            continue;
        }
        let mut insn = Insn::with_args(form, args.clone());
        if insn.measure(&mut buf, mode).is_err() {
            continue;
        }
        if best.as_ref().map_or(true, |b| prefer(&insn, b)) {
            best = Some(insn);
        }
    }
    best.ok_or_else(|| AsmError::NoMatch {
        span: span.clone(),
        mnemonic: mnemonic.to_string(),
    })
}

// Whether resolved operand values fit a form's parameters.
fn values_match(mode: Mode, form: &Form, args: &[Operand]) -> bool {
    form.params.iter().zip(args).all(|(param, arg)| {
        match (param.kind, arg) {
            (ParamKind::Register, Operand::Reg(reg)) => register_ok(form, param, reg),
            (ParamKind::SignedImmediate, Operand::Imm(v))
            | (ParamKind::UnsignedImmediate, Operand::Imm(v)) => match param.filter {
                Filter::Literal(l) => *v == i128::from(l),
                _ => imm_fits(param.kind, param.bits, *v),
            },
            (
                ParamKind::SignedImmediate | ParamKind::UnsignedImmediate,
                Operand::Reloc { kind, .. },
            ) => *kind == RelocKind::FullAddress && param.bits >= mode.bits(),
            (ParamKind::Memory, Operand::Mem(_)) => true,
            (ParamKind::RelativeAddress, Operand::Rel(d)) => {
                let limit = 1i64 << (param.bits - 1);
                *d >= -limit && *d < limit
            }
            (ParamKind::RelativeAddress, Operand::Label(_)) => param.bits == 32,
            (ParamKind::RelativeAddress, Operand::Reloc { kind, .. }) => {
                *kind == RelocKind::RelativeAddress && param.bits == 32
            }
            (ParamKind::StackIndex, Operand::StackIndex(_)) => true,
            (ParamKind::FarPointer, Operand::Far { .. }) => true,
            (ParamKind::MemoryOffset, Operand::Moffset { .. }) => true,
            (ParamKind::StringDst, Operand::StringDst(_)) => true,
            (ParamKind::StringSrc, Operand::StringSrc(_)) => true,
            _ => false,
        }
    })
}

fn register_ok(form: &Form, param: &table::Param, reg: &'static Reg) -> bool {
    let filter_ok = match param.filter {
        Filter::Any => false,
        Filter::Reg(class) => class.matches(reg),
        Filter::Exact(name) => reg.is_named(name),
        Filter::Literal(_) => false,
    };
    // EVEX-only registers conflict with non-EVEX encodings.
    filter_ok && !(reg.evex_bit() && form.evex.is_none())
}

fn imm_fits(kind: ParamKind, bits: u16, value: i128) -> bool {
    let half = 1i128 << (bits - 1);
    let full = 1i128 << bits;
    match kind {
        ParamKind::SignedImmediate => value >= -half && value < half,
        _ => value >= -half && value < full,
    }
}

// Matches AST operands against a form's parameters, producing resolved
// operand values. `Ok(None)` is a mismatch; `Err` is a hard error that
// aborts the whole instruction.
fn match_operands(
    symbols: &SymbolTable,
    mode: Mode,
    form: &'static Form,
    operands: &[&Expr],
    ann: &Annotations,
) -> Result<Option<Vec<Operand>>, AsmError> {
    let mut args = Vec::with_capacity(operands.len());
    for (param, expr) in form.params.iter().zip(operands) {
        match match_operand(symbols, mode, form, param, expr, ann)? {
            Some(arg) => args.push(arg),
            None => return Ok(None),
        }
    }
    Ok(Some(args))
}

fn match_operand(
    symbols: &SymbolTable,
    mode: Mode,
    form: &'static Form,
    param: &table::Param,
    expr: &Expr,
    ann: &Annotations,
) -> Result<Option<Operand>, AsmError> {
    match param.kind {
        ParamKind::Register => {
            let Some(ident) = expr.as_ident() else {
                return Ok(None);
            };
            let Some(reg) = Reg::by_name(&ident.name) else {
                return Ok(None);
            };
            if !register_matches_filter(param, reg) {
                return Ok(None);
            }
            if !reg.usable_in(mode) {
                return Err(AsmError::RegisterMode {
                    span: ident.span.clone(),
                    name: reg.name,
                    mode,
                });
            }
            if reg.evex_bit() && form.evex.is_none() {
                return Ok(None);
            }
            Ok(Some(Operand::Reg(reg)))
        }
        ParamKind::SignedImmediate | ParamKind::UnsignedImmediate => {
            if let Filter::Literal(l) = param.filter {
                return Ok(match expr.as_number() {
                    Some(n) if n.value == l.into() => Some(Operand::Imm(i128::from(l))),
                    _ => None,
                });
            }
            if let Some(n) = expr.as_number() {
                let Ok(value) = i128::try_from(&n.value) else {
                    return Ok(None);
                };
                return Ok(imm_fits(param.kind, param.bits, value).then_some(Operand::Imm(value)));
            }
            if let Some(list) = expr.as_list() {
                return constant_reference(symbols, mode, param, list);
            }
            Ok(None)
        }
        ParamKind::StackIndex => {
            let Some(ident) = expr.as_ident() else {
                return Ok(None);
            };
            if ident.name == "st" {
                return Ok(Some(Operand::StackIndex(0)));
            }
            let index = ident
                .name
                .strip_prefix("st")
                .and_then(|n| n.parse::<u8>().ok())
                .filter(|&n| n < 8);
            Ok(index.map(Operand::StackIndex))
        }
        ParamKind::RelativeAddress => {
            if let Some(n) = expr.as_number() {
                let Ok(value) = i64::try_from(&n.value) else {
                    return Ok(None);
                };
                let limit = 1i64 << (param.bits - 1);
                return Ok((value >= -limit && value < limit).then_some(Operand::Rel(value)));
            }
            // Labels are only accepted by 32-bit relative fields; the
            // shrink pass may narrow the form later.
            if let Some(label) = expr.as_label() {
                if param.bits == 32 {
                    return Ok(Some(Operand::Label(label.name.clone())));
                }
            }
            Ok(None)
        }
        ParamKind::FarPointer => {
            let Some(list) = expr.as_list() else {
                return Ok(None);
            };
            let numbers: Vec<_> = list.elements.iter().filter_map(Expr::as_number).collect();
            if numbers.len() != list.elements.len() || numbers.len() != 2 {
                return Ok(None);
            }
            let segment = u16::try_from(&numbers[0].value)
                .map_err(|_| AsmError::InvalidFarPointer {
                    span: list.span.clone(),
                })?;
            let offset = u64::try_from(&numbers[1].value)
                .ok()
                .filter(|&o| param.bits >= 64 || o < 1 << param.bits)
                .ok_or_else(|| AsmError::InvalidFarPointer {
                    span: list.span.clone(),
                })?;
            Ok(Some(Operand::Far {
                segment,
                offset: offset as u32,
            }))
        }
        ParamKind::Memory => {
            if let Some(bits) = ann.size_bits {
                if bits != param.bits {
                    return Ok(None);
                }
            }
            let Some(list) = expr.as_list() else {
                return Ok(None);
            };
            Ok(parse_memory(list)?.map(Operand::Mem))
        }
        ParamKind::MemoryOffset => {
            let Some(list) = expr.as_list() else {
                return Ok(None);
            };
            let mut elems = &list.elements[..];
            let segment = leading_segment(&mut elems);
            match elems {
                [one] => match one.as_number() {
                    Some(n) => Ok(u64::try_from(&n.value)
                        .ok()
                        .map(|address| Operand::Moffset { segment, address })),
                    None => Ok(None),
                },
                _ => Ok(None),
            }
        }
        ParamKind::StringDst => string_operand(mode, expr, &["di", "edi", "rdi"], "es")
            .map(|r| r.map(Operand::StringDst)),
        ParamKind::StringSrc => string_operand(mode, expr, &["si", "esi", "rsi"], "ds")
            .map(|r| r.map(Operand::StringSrc)),
    }
}

fn register_matches_filter(param: &table::Param, reg: &'static Reg) -> bool {
    match param.filter {
        Filter::Any => false,
        Filter::Reg(class) => class.matches(reg),
        Filter::Exact(name) => reg.is_named(name),
        Filter::Literal(_) => false,
    }
}

// `(len NAME)`, `(string-pointer NAME)` and `(func NAME)` embed
// compile-time constants and relocations in immediate slots.
fn constant_reference(
    symbols: &SymbolTable,
    mode: Mode,
    param: &table::Param,
    list: &List,
) -> Result<Option<Operand>, AsmError> {
    let (head, name) = match (list.head().and_then(Expr::as_ident), list.tail()) {
        (Some(head), [Expr::Ident(name)]) => (head, name),
        _ => return Ok(None),
    };
    let unknown = || AsmError::UnknownSymbol {
        span: name.span.clone(),
        name: name.name.clone(),
    };
    match head.name.as_str() {
        "len" => {
            let (_, value) = symbols.constant(&name.name).ok_or_else(unknown)?;
            let Constant::String(s) = value else {
                return Err(unknown());
            };
            let len = s.len() as i128;
            Ok(imm_fits(param.kind, param.bits, len).then_some(Operand::Imm(len)))
        }
        "string-pointer" => {
            symbols.constant(&name.name).ok_or_else(unknown)?;
            // Full addresses need a pointer-sized field.
            if param.bits < mode.bits() {
                return Ok(None);
            }
            Ok(Some(Operand::Reloc {
                name: symbols.symbol_name(&name.name),
                kind: RelocKind::FullAddress,
            }))
        }
        "func" => {
            symbols.function(&name.name).ok_or_else(unknown)?;
            if param.bits < mode.bits() {
                return Ok(None);
            }
            Ok(Some(Operand::Reloc {
                name: symbols.symbol_name(&name.name),
                kind: RelocKind::FullAddress,
            }))
        }
        _ => Ok(None),
    }
}

fn leading_segment(elems: &mut &[Expr]) -> Option<&'static Reg> {
    let ident = elems.first()?.as_ident()?;
    let reg = Reg::by_name(&ident.name)?;
    if reg.family == Family::Segment {
        *elems = &elems[1..];
        return Some(reg);
    }
    None
}

fn string_operand(
    mode: Mode,
    expr: &Expr,
    names: &[&str],
    segment: &str,
) -> Result<Option<&'static Reg>, AsmError> {
    let Some(list) = expr.as_list() else {
        return Ok(None);
    };
    let mut elems = &list.elements[..];
    if let Some(seg) = leading_segment(&mut elems) {
        if seg.name != segment {
            return Ok(None);
        }
    }
    let [reg_expr] = elems else { return Ok(None) };
    let Some(ident) = reg_expr.as_ident() else {
        return Ok(None);
    };
    if !names.contains(&ident.name.as_str()) {
        return Ok(None);
    }
    let reg = Reg::by_name(&ident.name).expect("string registers exist");
    if mode == Mode::Bits64 && reg.bits == 16 {
        return Ok(None);
    }
    Ok(Some(reg))
}

// Parses one of the nine memory addressing patterns, optionally preceded
// by a segment register.
fn parse_memory(list: &List) -> Result<Option<Memory>, AsmError> {
    let mut elems = &list.elements[..];
    let segment = leading_segment(&mut elems);

    // (seg (+ ...)) wraps the pattern in an inner list.
    if let [Expr::List(inner)] = elems {
        if matches!(
            inner.head().and_then(Expr::as_ident).map(|i| i.name.as_str()),
            Some("+") | Some("*")
        ) {
            elems = &inner.elements[..];
        }
    }

    match elems {
        [Expr::Ident(head), rest @ ..] if head.name == "+" => {
            parse_memory_parts(segment, rest)
        }
        [Expr::Ident(head), rest @ ..] if head.name == "*" => {
            let Some((index, scale)) = parse_scaled(rest)? else {
                return Ok(None);
            };
            Ok(Some(Memory {
                segment,
                base: None,
                index: Some(index),
                scale,
                displacement: 0,
                have_displacement: false,
            }))
        }
        [Expr::Number(n)] => {
            let Ok(disp) = i64::try_from(&n.value) else {
                return Ok(None);
            };
            Ok(Some(Memory {
                segment,
                ..Memory::disp(disp)
            }))
        }
        // Flattened (base ...) forms without the leading `+`.
        [Expr::Ident(_), ..] => parse_memory_parts(segment, elems),
        _ => Ok(None),
    }
}

fn parse_memory_parts(
    segment: Option<&'static Reg>,
    parts: &[Expr],
) -> Result<Option<Memory>, AsmError> {
    let mut base: Option<&'static Reg> = None;
    let mut index: Option<&'static Reg> = None;
    let mut scale = 0u8;
    let mut displacement = 0i64;
    let mut have_displacement = false;

    for part in parts {
        match part {
            Expr::Ident(ident) => {
                let Some(reg) = Reg::by_name(&ident.name) else {
                    return Ok(None);
                };
                if reg.family != Family::GeneralPurpose {
                    return Ok(None);
                }
                if base.is_none() {
                    base = Some(reg);
                } else if index.is_none() && scale == 0 {
                    index = Some(reg);
                } else {
                    return Ok(None);
                }
            }
            Expr::List(inner)
                if inner.head().and_then(Expr::as_ident).map(|i| i.name.as_str())
                    == Some("*") =>
            {
                if index.is_some() {
                    return Ok(None);
                }
                let Some((reg, s)) = parse_scaled(inner.tail())? else {
                    return Ok(None);
                };
                index = Some(reg);
                scale = s;
            }
            Expr::Number(n) => {
                if have_displacement {
                    return Ok(None);
                }
                let Ok(d) = i64::try_from(&n.value) else {
                    return Ok(None);
                };
                displacement = d;
                have_displacement = true;
            }
            _ => return Ok(None),
        }
    }

    // A 16-bit base and index pair maps onto the legacy paired register.
    if let (Some(b), Some(i)) = (base, index) {
        if b.bits == 16 && i.bits == 16 && scale == 0 {
            if let Some(pair) = Reg::by_name(&format!("{}+{}", b.name, i.name)) {
                base = Some(pair);
                index = None;
            }
        }
    }

    Ok(Some(Memory {
        segment,
        base,
        index,
        scale,
        displacement,
        have_displacement,
    }))
}

fn parse_scaled(parts: &[Expr]) -> Result<Option<(&'static Reg, u8)>, AsmError> {
    match parts {
        [Expr::Ident(ident), Expr::Number(n)] => {
            let Some(reg) = Reg::by_name(&ident.name) else {
                return Ok(None);
            };
            let scale = i64::try_from(&n.value).unwrap_or(-1);
            if !matches!(scale, 1 | 2 | 4 | 8) {
                return Err(AsmError::InvalidScale {
                    span: n.span.clone(),
                    scale,
                });
            }
            Ok(Some((reg, scale as u8)))
        }
        _ => Ok(None),
    }
}
