//! Linear-scan register allocation.
//!
//! The allocator walks a function's entry block once, tracking the last
//! use of every value. Parameters are accepted in the locations the
//! calling convention pre-assigned, constants are materialised on first
//! demand, and values crossing a call are moved out of the callee's
//! scratch registers ("dodging") in preference to spilling. The output is
//! a parallel list of SSA-shaped records carrying an [`Alloc`] payload,
//! consumed by the lowerer.

use core::fmt;
use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use ruse_asm::{Family, Reg, REGISTERS};
use ruse_types::{Constant, Span, Type};

use crate::error::AllocError;
use crate::location::Location;
use crate::ssa::{Extra, Function, Op, Value, ValueId};

/// A location assignment produced by the allocator.
///
/// Exactly one of `src` and `data` is set on record kinds that read an
/// operand: `src` names the operand's existing locations, `data` an
/// immediate constant to materialise.
#[derive(Debug, Clone, PartialEq)]
pub struct Alloc {
    /// Destination locations.
    pub dst: Vec<Location>,
    /// Source locations, for moves between places.
    pub src: Option<Vec<Location>>,
    /// Immediate constant, for materialisations.
    pub data: Option<(Type, Constant)>,
}

impl fmt::Display for Alloc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, loc) in self.dst.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{loc}")?;
        }
        write!(f, "]")?;
        if let Some(src) = &self.src {
            write!(f, " <- [")?;
            for (i, loc) in src.iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{loc}")?;
            }
            write!(f, "]")?;
        }
        if let Some((_, data)) = &self.data {
            write!(f, " <- {data}")?;
        }
        Ok(())
    }
}

/// One allocated step: an SSA-shaped record the lowerer turns into zero or
/// more machine instructions.
#[derive(Debug, Clone)]
pub struct AllocValue {
    /// The SSA value this step realises.
    pub source: ValueId,
    /// The step's operation: `Copy`, `Drop`, the original arithmetic op,
    /// `FunctionCall` or `MakeResult`.
    pub op: Op,
    /// The step's result type.
    pub ty: Option<Type>,
    /// Source region.
    pub span: Span,
    /// The location assignment.
    pub alloc: Alloc,
}

/// Allocates locations for every value of `f`'s entry block.
pub fn allocate(f: &Function) -> Result<Vec<AllocValue>, AllocError> {
    let mut allocator = Allocator::new(f);
    allocator.run()?;
    Ok(allocator.into_steps())
}

/// The linear-scan allocator.
pub struct Allocator<'f> {
    f: &'f Function,
    working: Vec<&'static Reg>,
    occupants: HashMap<u8, ValueId>,
    stack: Vec<(Location, ValueId)>,
    locations: HashMap<ValueId, Vec<Location>>,
    constants: HashMap<ValueId, (Type, Constant)>,
    last_use: HashMap<ValueId, usize>,
    dead: HashSet<ValueId>,
    steps: Vec<AllocValue>,
}

impl<'f> Allocator<'f> {
    /// A new allocator over `f`.
    pub fn new(f: &'f Function) -> Self {
        // Working registers are sorted scratch-first so that short-lived
        // values avoid callee-saved registers; relative order within each
        // group follows the register file.
        let abi = &f.abi;
        let working: Vec<&'static Reg> = abi
            .scratch
            .iter()
            .copied()
            .chain(REGISTERS.iter().filter(|reg| {
                reg.family == Family::GeneralPurpose
                    && reg.bits == 64
                    && reg.num != abi.stack_pointer.num
            }))
            .unique_by(|reg| reg.num)
            .collect();
        Allocator {
            f,
            working,
            occupants: HashMap::new(),
            stack: Vec::new(),
            locations: HashMap::new(),
            constants: HashMap::new(),
            last_use: HashMap::new(),
            dead: HashSet::new(),
            steps: Vec::new(),
        }
    }

    /// The allocated steps.
    pub fn into_steps(self) -> Vec<AllocValue> {
        self.steps
    }

    /// Renders every working register and stack slot with its occupant or
    /// `[free]`.
    pub fn debug(&self) -> String {
        use fmt::Write;
        let mut out = String::new();
        for reg in &self.working {
            match self.occupants.get(&reg.num) {
                Some(v) => {
                    let _ = writeln!(out, "{reg}: {v}");
                }
                None => {
                    let _ = writeln!(out, "{reg}: [free]");
                }
            }
        }
        for (loc, v) in &self.stack {
            let _ = writeln!(out, "{loc}: {v}");
        }
        out
    }

    /// Runs the scan.
    pub fn run(&mut self) -> Result<(), AllocError> {
        let entry = self.f.block(self.f.entry);
        self.eliminate_dead(&entry.values);
        self.index_last_uses(&entry.values);

        for (idx, &vid) in entry.values.iter().enumerate() {
            if self.dead.contains(&vid) {
                continue;
            }
            let v = self.f.value(vid).clone();
            tracing::trace!(value = %vid, op = %v.op, "allocating");
            match v.op {
                Op::MakeMemoryState => {}
                Op::Parameter => self.place_parameter(vid, &v),
                op if op.is_constant() => {
                    if let Some(Extra::Constant(ty, c)) = &v.extra {
                        self.constants.insert(vid, (ty.clone(), c.clone()));
                    }
                }
                Op::Copy => self.copy(idx, vid, &v)?,
                Op::Add(_) | Op::Sub(_) | Op::Mul(_) => self.binary(vid, &v)?,
                Op::Div(_) => self.divide(vid, &v)?,
                Op::Negate(_) | Op::Cast(..) | Op::StringLen => self.unary(vid, &v)?,
                Op::FunctionCall => self.call(vid, &v)?,
                Op::MakeResult => self.make_result(vid, &v)?,
                op => {
                    return Err(AllocError::Unsupported {
                        span: v.span.clone(),
                        op: op.to_string(),
                    })
                }
            }
            self.process_deaths(idx, vid);
        }
        Ok(())
    }

    // Dead-code elimination: parameters and copies nobody uses are
    // ignored, recursively releasing their operands. Use counts are
    // tracked locally; the IR itself is left untouched.
    fn eliminate_dead(&mut self, values: &[ValueId]) {
        let mut uses: HashMap<ValueId, u32> =
            values.iter().map(|&v| (v, self.f.value(v).uses)).collect();
        for &vid in values.iter().rev() {
            let v = self.f.value(vid);
            if !matches!(v.op, Op::Parameter | Op::Copy) {
                continue;
            }
            if uses.get(&vid).copied().unwrap_or(0) == 0 {
                self.dead.insert(vid);
                for arg in &v.args {
                    if let Some(n) = uses.get_mut(arg) {
                        *n = n.saturating_sub(1);
                    }
                }
            }
        }
    }

    fn index_last_uses(&mut self, values: &[ValueId]) {
        for (idx, &vid) in values.iter().enumerate() {
            if self.dead.contains(&vid) {
                continue;
            }
            self.last_use.entry(vid).or_insert(idx);
            for arg in &self.f.value(vid).args {
                self.last_use.insert(*arg, idx);
            }
        }
    }

    fn push(&mut self, source: ValueId, op: Op, ty: Option<Type>, span: &Span, alloc: Alloc) {
        self.steps.push(AllocValue {
            source,
            op,
            ty,
            span: span.clone(),
            alloc,
        });
    }

    fn claim(&mut self, loc: &Location, vid: ValueId, span: &Span) {
        match loc {
            Location::Register(reg) => {
                if let Some(prev) = self.occupants.insert(reg.num, vid) {
                    // Two live values in one location is a compiler bug,
                    // not a user error.
                    panic!("{span}: register {reg} already holds {prev}");
                }
            }
            Location::Stack { .. } => self.stack.push((*loc, vid)),
        }
    }

    fn release(&mut self, loc: &Location, vid: ValueId) {
        match loc {
            Location::Register(reg) => {
                if self.occupants.get(&reg.num) == Some(&vid) {
                    self.occupants.remove(&reg.num);
                }
            }
            Location::Stack { .. } => {
                self.stack.retain(|(l, v)| !(l.same_place(loc) && *v == vid));
            }
        }
    }

    fn free_reg(&self, exclude: &[u8]) -> Option<&'static Reg> {
        self.working
            .iter()
            .copied()
            .find(|r| !self.occupants.contains_key(&r.num) && !exclude.contains(&r.num))
    }

    // Allocates fresh register locations for a value of type `ty`.
    fn alloc_for(
        &mut self,
        vid: ValueId,
        ty: &Type,
        span: &Span,
    ) -> Result<Vec<Location>, AllocError> {
        let mut locs = Vec::new();
        for bits in chunk_bits(ty) {
            let reg = self
                .free_reg(&[])
                .ok_or(AllocError::SpillRequired { span: span.clone() })?;
            let sized = Reg::gp(reg.num, bits).unwrap_or(reg);
            let loc = Location::Register(sized);
            self.claim(&loc, vid, span);
            locs.push(loc);
        }
        self.locations.insert(vid, locs.clone());
        Ok(locs)
    }

    fn operand_locations(&self, arg: ValueId, span: &Span) -> Vec<Location> {
        match self.locations.get(&arg) {
            Some(locs) => locs.clone(),
            None => panic!("{span}: operand {arg} has no location"),
        }
    }

    // Emits a copy of `src` (value or constant) into `dst`.
    fn push_move(&mut self, vid: ValueId, v: &Value, dst: Vec<Location>, src: ValueId) {
        if let Some(data) = self.constants.get(&src).cloned() {
            self.push(
                vid,
                Op::Copy,
                v.ty.clone(),
                &v.span,
                Alloc {
                    dst,
                    src: None,
                    data: Some(data),
                },
            );
            return;
        }
        let src_locs = self.operand_locations(src, &v.span);
        if same_places(&src_locs, &dst) {
            return;
        }
        self.push(
            vid,
            Op::Copy,
            v.ty.clone(),
            &v.span,
            Alloc {
                dst,
                src: Some(src_locs),
                data: None,
            },
        );
    }

    fn place_parameter(&mut self, vid: ValueId, v: &Value) {
        let index = match &v.extra {
            Some(Extra::Int(i)) => *i as usize,
            _ => panic!("{}: parameter without an index", v.span),
        };
        let locs = self.f.param_locations[index].clone();
        for loc in &locs {
            self.claim(loc, vid, &v.span);
        }
        self.locations.insert(vid, locs);
    }

    fn copy(&mut self, idx: usize, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        let src = v.args[0];
        if let Some(data) = self.constants.get(&src).cloned() {
            let ty = v.ty.clone().unwrap_or(Type::Int);
            let dst = self.alloc_for(vid, &ty, &v.span)?;
            self.push(
                vid,
                Op::Copy,
                v.ty.clone(),
                &v.span,
                Alloc {
                    dst,
                    src: None,
                    data: Some(data),
                },
            );
            return Ok(());
        }
        if self.last_use.get(&src) == Some(&idx) {
            // The operand dies here; rename its locations in place
            // instead of emitting a copy.
            let locs = self.locations.remove(&src).unwrap_or_default();
            for loc in &locs {
                match loc {
                    Location::Register(reg) => {
                        self.occupants.insert(reg.num, vid);
                    }
                    Location::Stack { .. } => {
                        for entry in &mut self.stack {
                            if entry.0.same_place(loc) {
                                entry.1 = vid;
                            }
                        }
                    }
                }
            }
            self.locations.insert(vid, locs);
            return Ok(());
        }
        let ty = v.ty.clone().unwrap_or(Type::Int);
        let dst = self.alloc_for(vid, &ty, &v.span)?;
        self.push_move(vid, v, dst, src);
        Ok(())
    }

    fn binary(&mut self, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        let (lhs, rhs) = (v.args[0], v.args[1]);
        let ty = v.ty.clone().unwrap_or(Type::Int);
        let dst = self.alloc_for(vid, &ty, &v.span)?;
        self.push_move(vid, v, dst.clone(), lhs);
        match v.op {
            Op::Mul(_) => {
                // The multiply instruction takes a register operand.
                let (src, temp) = self.ensure_register(vid, v, rhs, &ty)?;
                self.push(
                    vid,
                    v.op,
                    v.ty.clone(),
                    &v.span,
                    Alloc {
                        dst,
                        src: Some(src),
                        data: None,
                    },
                );
                if let Some(num) = temp {
                    self.occupants.remove(&num);
                }
            }
            _ => {
                let alloc = match self.constants.get(&rhs).cloned() {
                    Some(data) => Alloc {
                        dst,
                        src: None,
                        data: Some(data),
                    },
                    None => Alloc {
                        dst,
                        src: Some(self.operand_locations(rhs, &v.span)),
                        data: None,
                    },
                };
                self.push(vid, v.op, v.ty.clone(), &v.span, alloc);
            }
        }
        Ok(())
    }

    // Division pins its operands: the dividend lives in rAX with rDX
    // clobbered by the sign extension, so both are dodged first.
    fn divide(&mut self, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        let (lhs, rhs) = (v.args[0], v.args[1]);
        let ty = v.ty.clone().unwrap_or(Type::Int);
        self.dodge(&[0, 2], &v.span, |_| true)?;
        let bits = chunk_bits(&ty)[0];
        let rax = Reg::gp(0, bits).expect("rax has every width");
        let dst = vec![Location::Register(rax)];
        self.claim(&dst[0], vid, &v.span);
        self.occupants.insert(2, vid); // rdx is clobbered
        self.locations.insert(vid, dst.clone());
        self.push_move(vid, v, dst.clone(), lhs);
        let (src, temp) = self.ensure_register(vid, v, rhs, &ty)?;
        self.push(
            vid,
            v.op,
            v.ty.clone(),
            &v.span,
            Alloc {
                dst,
                src: Some(src),
                data: None,
            },
        );
        if let Some(num) = temp {
            self.occupants.remove(&num);
        }
        if self.occupants.get(&2) == Some(&vid) {
            self.occupants.remove(&2);
        }
        Ok(())
    }

    fn unary(&mut self, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        let src = v.args[0];
        let ty = v.ty.clone().unwrap_or(Type::Int);
        let dst = self.alloc_for(vid, &ty, &v.span)?;
        match v.op {
            Op::Negate(_) => {
                // Negate works in place on the destination.
                self.push_move(vid, v, dst.clone(), src);
                self.push(
                    vid,
                    v.op,
                    v.ty.clone(),
                    &v.span,
                    Alloc {
                        dst,
                        src: None,
                        data: None,
                    },
                );
            }
            _ => {
                let alloc = match self.constants.get(&src).cloned() {
                    Some(data) => Alloc {
                        dst,
                        src: None,
                        data: Some(data),
                    },
                    None => Alloc {
                        dst,
                        src: Some(self.operand_locations(src, &v.span)),
                        data: None,
                    },
                };
                self.push(vid, v.op, v.ty.clone(), &v.span, alloc);
            }
        }
        Ok(())
    }

    // Makes sure `arg` sits in a register, materialising constants into a
    // scratch register. Returns the source locations and the number of
    // any temporary register to release.
    fn ensure_register(
        &mut self,
        vid: ValueId,
        v: &Value,
        arg: ValueId,
        ty: &Type,
    ) -> Result<(Vec<Location>, Option<u8>), AllocError> {
        if let Some(data) = self.constants.get(&arg).cloned() {
            let bits = chunk_bits(ty)[0];
            let reg = self
                .free_reg(&[])
                .ok_or(AllocError::SpillRequired { span: v.span.clone() })?;
            let sized = Reg::gp(reg.num, bits).unwrap_or(reg);
            let loc = Location::Register(sized);
            self.occupants.insert(reg.num, vid);
            self.push(
                vid,
                Op::Copy,
                Some(ty.clone()),
                &v.span,
                Alloc {
                    dst: vec![loc],
                    src: None,
                    data: Some(data),
                },
            );
            return Ok((vec![loc], Some(reg.num)));
        }
        Ok((self.operand_locations(arg, &v.span), None))
    }

    // Moves every live value out of the registers in `nums` into a free
    // register accepted by `keep`. Falls back to a spill error; stack
    // spilling is a placeholder.
    fn dodge<F>(&mut self, nums: &[u8], span: &Span, keep: F) -> Result<(), AllocError>
    where
        F: Fn(&'static Reg) -> bool,
    {
        for &num in nums {
            let Some(&resident) = self.occupants.get(&num) else {
                continue;
            };
            let target = self
                .working
                .iter()
                .copied()
                .find(|r| {
                    !self.occupants.contains_key(&r.num)
                        && !nums.contains(&r.num)
                        && keep(r)
                })
                .ok_or(AllocError::SpillRequired { span: span.clone() })?;
            tracing::trace!(value = %resident, from = num, to = %target, "dodging");
            let mut locs = self.locations.remove(&resident).unwrap_or_default();
            for loc in &mut locs {
                let Location::Register(reg) = loc else { continue };
                if reg.num != num {
                    continue;
                }
                let sized = Reg::gp(target.num, reg.bits).unwrap_or(target);
                let new_loc = Location::Register(sized);
                self.push(
                    resident,
                    Op::Copy,
                    None,
                    span,
                    Alloc {
                        dst: vec![new_loc],
                        src: Some(vec![*loc]),
                        data: None,
                    },
                );
                self.occupants.remove(&num);
                self.occupants.insert(target.num, resident);
                *loc = new_loc;
            }
            self.locations.insert(resident, locs);
        }
        Ok(())
    }

    fn call(&mut self, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        let callee = match &v.extra {
            Some(Extra::Callee(callee)) => callee.clone(),
            _ => panic!("{}: call without a callee", v.span),
        };
        // Move live values out of the callee's scratch registers.
        let scratch: Vec<u8> = callee.abi.scratch.iter().map(|r| r.num).collect();
        let abi = callee.abi.clone();
        self.dodge(&scratch, &v.span, move |r| !abi.is_scratch(r))?;

        // Place the arguments; the final operand is the memory token.
        let param_locs = callee
            .abi
            .parameters(&callee.sig)
            .map_err(|e| AllocError::Unsupported {
                span: v.span.clone(),
                op: e.to_string(),
            })?;
        let args = &v.args[..v.args.len().saturating_sub(1)];
        for (&arg, locs) in args.iter().zip(param_locs) {
            self.push_move(vid, v, locs, arg);
        }

        let result = match &callee.sig.result {
            Some(ty) => callee
                .abi
                .result_locations(ty)
                .map_err(|e| AllocError::Unsupported {
                    span: v.span.clone(),
                    op: e.to_string(),
                })?,
            None => Vec::new(),
        };
        self.push(
            vid,
            Op::FunctionCall,
            v.ty.clone(),
            &v.span,
            Alloc {
                dst: result.clone(),
                src: None,
                data: None,
            },
        );
        if !result.is_empty() {
            for loc in &result {
                self.claim(loc, vid, &v.span);
            }
            self.locations.insert(vid, result);
        }
        Ok(())
    }

    fn make_result(&mut self, vid: ValueId, v: &Value) -> Result<(), AllocError> {
        if v.args.len() == 2 {
            let payload = v.args[0];
            let dst = self.f.result_locations.clone();
            // Evict anything else still sitting in the result locations.
            for loc in &dst {
                if let Location::Register(reg) = loc {
                    if let Some(&resident) = self.occupants.get(&reg.num) {
                        if resident != payload {
                            self.occupants.remove(&reg.num);
                            self.locations.remove(&resident);
                        }
                    }
                }
            }
            self.push_move(vid, v, dst, payload);
        }
        self.push(
            vid,
            Op::MakeResult,
            v.ty.clone(),
            &v.span,
            Alloc {
                dst: self.f.result_locations.clone(),
                src: None,
                data: None,
            },
        );
        Ok(())
    }

    fn process_deaths(&mut self, idx: usize, _current: ValueId) {
        let dying: Vec<ValueId> = self
            .last_use
            .iter()
            .filter(|&(_, &at)| at == idx)
            .map(|(&v, _)| v)
            .collect();
        for vid in dying {
            let Some(locs) = self.locations.remove(&vid) else {
                continue;
            };
            for loc in &locs {
                self.release(loc, vid);
            }
            let span = self.f.value(vid).span.clone();
            self.push(
                vid,
                Op::Drop,
                None,
                &span,
                Alloc {
                    dst: locs,
                    src: None,
                    data: None,
                },
            );
        }
    }
}

// The width in bits of each register-sized component of `ty`.
fn chunk_bits(ty: &Type) -> Vec<u16> {
    match ty {
        Type::String | Type::UntypedString => vec![64, 64],
        ty => vec![(ty.size() * 8).min(64) as u16],
    }
}

fn same_places(a: &[Location], b: &[Location]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_place(y))
}
