//! The SSA intermediate representation.
//!
//! A function owns an arena of values; blocks hold ordered value IDs.
//! Construction is strictly additive: creating a value increments the use
//! count of each operand, and setting a block's control value does the
//! same. The textual rendering produced by [`Function::display`] is part
//! of the crate's contract and is exercised by tests.

use core::fmt;
use std::io;
use std::sync::Arc;

use ruse_asm::table::Form;
use ruse_asm::{CodeBuffer, Insn, Mode, Relocation};
use ruse_types::{Constant, IntType, Signature, Span, Type};

use crate::abi::Abi;
use crate::alloc::Alloc;
use crate::location::Location;

/// Stable identity of a value within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stable identity of a block within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub u32);

/// How a block ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Falls through; no terminator yet.
    Normal,
    /// Returns from the function through its control value.
    Return,
}

/// An SSA operation.
///
/// Virtual opcodes never reach the encoder; the lowerer rewrites them into
/// `Asm` values. The `Display` rendering gives each family its flat name,
/// `AddInt8` or `CastInt8ToInt64`, and physical opcodes print their form's
/// UID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    /// The initial memory-state token.
    MakeMemoryState,
    /// Gathers the result value and memory state at a return.
    MakeResult,
    /// A formal parameter; the integer extra is its index.
    Parameter,
    /// A value copy.
    Copy,
    /// Frees a dead value's locations; emitted by the allocator.
    Drop,
    /// A signed integer constant.
    ConstantInt,
    /// An unsigned integer constant.
    ConstantUint,
    /// A string constant.
    ConstantString,
    /// An integer constant that kept its untyped form.
    ConstantUntypedInt,
    /// A call to a user function; the extra names the callee.
    FunctionCall,
    /// Integer addition.
    Add(IntType),
    /// Integer subtraction.
    Sub(IntType),
    /// Integer multiplication.
    Mul(IntType),
    /// Integer division.
    Div(IntType),
    /// Integer negation.
    Negate(IntType),
    /// String concatenation.
    AddString,
    /// String length.
    StringLen,
    /// An integer conversion.
    Cast(IntType, IntType),
    /// A concrete x86 instruction.
    Asm(&'static Form),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::MakeMemoryState => write!(f, "MakeMemoryState"),
            Op::MakeResult => write!(f, "MakeResult"),
            Op::Parameter => write!(f, "Parameter"),
            Op::Copy => write!(f, "Copy"),
            Op::Drop => write!(f, "Drop"),
            Op::ConstantInt => write!(f, "ConstantInt"),
            Op::ConstantUint => write!(f, "ConstantUint"),
            Op::ConstantString => write!(f, "ConstantString"),
            Op::ConstantUntypedInt => write!(f, "ConstantUntypedInt"),
            Op::FunctionCall => write!(f, "FunctionCall"),
            Op::Add(ty) => write!(f, "Add{ty}"),
            Op::Sub(ty) => write!(f, "Sub{ty}"),
            Op::Mul(ty) => write!(f, "Mul{ty}"),
            Op::Div(ty) => write!(f, "Div{ty}"),
            Op::Negate(ty) => write!(f, "Negate{ty}"),
            Op::AddString => write!(f, "AddString"),
            Op::StringLen => write!(f, "StringLen"),
            Op::Cast(from, to) => write!(f, "Cast{from}To{to}"),
            Op::Asm(form) => write!(f, "{}", form.uid),
        }
    }
}

impl Op {
    /// Whether this is one of the constant opcodes.
    pub fn is_constant(&self) -> bool {
        matches!(
            self,
            Op::ConstantInt | Op::ConstantUint | Op::ConstantString | Op::ConstantUntypedInt
        )
    }
}

/// A called function, carried as the extra of a `FunctionCall`.
#[derive(Debug, Clone)]
pub struct Callee {
    /// Package import path.
    pub path: String,
    /// Function name within the package.
    pub name: String,
    /// The callee's signature.
    pub sig: Arc<Signature>,
    /// The callee's calling convention.
    pub abi: Arc<Abi>,
}

impl Callee {
    /// The linker-visible symbol, `<pkg-path>.<name>`.
    pub fn symbol(&self) -> String {
        format!("{}.{}", self.path, self.name)
    }
}

/// Additional payload attached to a value.
#[derive(Debug, Clone)]
pub enum Extra {
    /// A plain integer, e.g. a parameter index.
    Int(i64),
    /// A plain string.
    Str(String),
    /// A typed constant value.
    Constant(Type, Constant),
    /// A result type on `MakeResult`.
    Type(Type),
    /// The callee of a `FunctionCall`.
    Callee(Arc<Callee>),
    /// A concrete instruction record.
    Insn(Insn),
    /// A relocation owned by this value.
    Reloc(Relocation),
    /// A location assignment from the register allocator.
    Alloc(Alloc),
}

impl fmt::Display for Extra {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extra::Int(i) => write!(f, "{i}"),
            Extra::Str(s) => write!(f, "{s}"),
            Extra::Constant(_, c) => write!(f, "{c}"),
            Extra::Type(ty) => write!(f, "{ty}"),
            Extra::Callee(callee) => write!(f, "{}", callee.symbol()),
            Extra::Insn(insn) => write!(f, "{}", insn.form.uid),
            Extra::Reloc(reloc) => write!(f, "{}", reloc.name),
            Extra::Alloc(alloc) => write!(f, "{alloc}"),
        }
    }
}

/// One SSA value.
#[derive(Debug, Clone)]
pub struct Value {
    /// Stable identity.
    pub id: ValueId,
    /// Operation.
    pub op: Op,
    /// Result type, if the value produces one.
    pub ty: Option<Type>,
    /// Operand values, in order.
    pub args: Vec<ValueId>,
    /// Additional payload.
    pub extra: Option<Extra>,
    /// Source region.
    pub span: Span,
    /// The block holding this value.
    pub block: BlockId,
    /// How many operands and control pointers reference this value.
    pub uses: u32,
    /// Source-level name, if the value is bound to one.
    pub name: Option<String>,
}

/// One basic block.
#[derive(Debug, Clone)]
pub struct Block {
    /// Stable identity.
    pub id: BlockId,
    /// How the block ends.
    pub kind: BlockKind,
    /// Values in emission order.
    pub values: Vec<ValueId>,
    /// The control value, for `Return` blocks.
    pub control: Option<ValueId>,
    /// Source region.
    pub span: Span,
    /// Predecessor blocks. Unused while only straight-line bodies are
    /// compiled, but kept so control flow can be added without reshaping
    /// the IR.
    pub preds: Vec<BlockId>,
    /// Successor blocks.
    pub succs: Vec<BlockId>,
}

/// A function under compilation.
#[derive(Debug, Clone)]
pub struct Function {
    /// Package import path.
    pub path: String,
    /// Function name.
    pub name: String,
    /// Signature.
    pub sig: Arc<Signature>,
    /// The entry block.
    pub entry: BlockId,
    /// All blocks.
    pub blocks: Vec<Block>,
    values: Vec<Value>,
    /// Locations of each parameter, one list per parameter.
    pub param_locations: Vec<Vec<Location>>,
    /// Locations of the result.
    pub result_locations: Vec<Location>,
    /// CPU mode, for assembly functions.
    pub mode: Option<Mode>,
    /// Relocations referencing other symbols.
    pub relocations: Vec<Relocation>,
    /// Section override.
    pub section: Option<String>,
    /// The calling convention the function follows.
    pub abi: Arc<Abi>,
}

impl Function {
    /// A new function with an empty entry block.
    pub fn new(path: impl Into<String>, name: impl Into<String>, sig: Arc<Signature>) -> Self {
        let mut f = Function {
            path: path.into(),
            name: name.into(),
            sig,
            entry: BlockId(0),
            blocks: Vec::new(),
            values: Vec::new(),
            param_locations: Vec::new(),
            result_locations: Vec::new(),
            mode: None,
            relocations: Vec::new(),
            section: None,
            abi: Abi::system_v(),
        };
        f.entry = f.new_block(Span::synthetic(), BlockKind::Normal);
        f
    }

    /// The linker-visible symbol, `<pkg-path>.<name>`.
    pub fn symbol(&self) -> String {
        format!("{}.{}", self.path, self.name)
    }

    /// Appends a new block.
    pub fn new_block(&mut self, span: Span, kind: BlockKind) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(Block {
            id,
            kind,
            values: Vec::new(),
            control: None,
            span,
            preds: Vec::new(),
            succs: Vec::new(),
        });
        id
    }

    /// Appends a value to `block`, bumping each operand's use count.
    pub fn new_value(
        &mut self,
        block: BlockId,
        span: Span,
        op: Op,
        ty: Option<Type>,
        args: &[ValueId],
    ) -> ValueId {
        let id = ValueId(self.values.len() as u32);
        for &arg in args {
            self.values[arg.0 as usize].uses += 1;
        }
        self.values.push(Value {
            id,
            op,
            ty,
            args: args.to_vec(),
            extra: None,
            span,
            block,
            uses: 0,
            name: None,
        });
        self.blocks[block.0 as usize].values.push(id);
        id
    }

    /// Appends a value with an integer extra.
    pub fn new_value_int(
        &mut self,
        block: BlockId,
        span: Span,
        op: Op,
        ty: Option<Type>,
        extra: i64,
        args: &[ValueId],
    ) -> ValueId {
        let id = self.new_value(block, span, op, ty, args);
        self.values[id.0 as usize].extra = Some(Extra::Int(extra));
        id
    }

    /// Appends a value with an arbitrary extra.
    pub fn new_value_extra(
        &mut self,
        block: BlockId,
        span: Span,
        op: Op,
        ty: Option<Type>,
        extra: Extra,
        args: &[ValueId],
    ) -> ValueId {
        let id = self.new_value(block, span, op, ty, args);
        self.values[id.0 as usize].extra = Some(extra);
        id
    }

    /// Sets `block`'s control value, bumping its use count.
    pub fn set_control(&mut self, block: BlockId, value: ValueId) {
        self.values[value.0 as usize].uses += 1;
        self.blocks[block.0 as usize].control = Some(value);
    }

    /// The value with the given ID.
    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.0 as usize]
    }

    /// Mutable access to the value with the given ID.
    pub fn value_mut(&mut self, id: ValueId) -> &mut Value {
        &mut self.values[id.0 as usize]
    }

    /// The block with the given ID.
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0 as usize]
    }

    /// The number of values in the arena.
    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    /// Replaces the entry block's values wholesale; used by the lowerer
    /// once virtual values have been rewritten into instructions.
    pub fn replace_entry_values(&mut self, values: Vec<(Op, Option<Extra>, Span)>) {
        let entry = self.entry;
        self.blocks[entry.0 as usize].values.clear();
        self.blocks[entry.0 as usize].control = None;
        for (op, extra, span) in values {
            let id = self.new_value(entry, span, op, None, &[]);
            self.values[id.0 as usize].extra = extra;
        }
    }

    /// The CPU mode machine code is emitted for.
    pub fn emit_mode(&self) -> Mode {
        self.mode.unwrap_or(Mode::Bits64)
    }

    /// Encodes every instruction value in the entry block to `out`.
    pub fn encode_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        let mode = self.emit_mode();
        let mut buf = CodeBuffer::new();
        for &vid in &self.block(self.entry).values {
            if let Some(Extra::Insn(insn)) = &self.value(vid).extra {
                insn.encode_into(&mut buf, mode)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
                buf.encode_to(out)?;
            }
        }
        Ok(())
    }

    /// The function's machine code as a vector.
    pub fn code(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_to(&mut out).expect("writing to a Vec");
        out
    }

    /// The textual rendering of the IR, one value per line followed by
    /// each block's terminator.
    pub fn display(&self) -> String {
        use fmt::Write;
        let mut out = String::new();
        for block in &self.blocks {
            for &vid in &block.values {
                let v = self.value(vid);
                let _ = write!(out, "{} := ({}", v.id, v.op);
                for arg in &v.args {
                    let _ = write!(out, " {arg}");
                }
                if let Some(extra) = &v.extra {
                    let _ = write!(out, " (extra {extra})");
                }
                let _ = write!(out, ")");
                if let Some(ty) = &v.ty {
                    let _ = write!(out, " {ty}");
                }
                if let Some(name) = &v.name {
                    let _ = write!(out, " ({name})");
                }
                let _ = writeln!(out);
            }
            match (block.kind, block.control) {
                (BlockKind::Return, Some(control)) => {
                    let _ = writeln!(out, "(Return {control})");
                }
                (BlockKind::Return, None) => {
                    let _ = writeln!(out, "(Return)");
                }
                (BlockKind::Normal, _) => {
                    let _ = writeln!(out, "(Normal)");
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_sig() -> Arc<Signature> {
        Arc::new(Signature::new("f", Vec::new(), None))
    }

    #[test]
    fn value_creation_bumps_use_counts() {
        let mut f = Function::new("test", "f", empty_sig());
        let entry = f.entry;
        let span = Span::synthetic();
        let a = f.new_value(entry, span.clone(), Op::MakeMemoryState, None, &[]);
        let b = f.new_value(entry, span.clone(), Op::Copy, None, &[a]);
        assert_eq!(f.value(a).uses, 1);
        assert_eq!(f.value(b).uses, 0);
        f.set_control(entry, b);
        assert_eq!(f.value(b).uses, 1);
    }

    #[test]
    fn display_is_stable() {
        let mut f = Function::new("test", "f", empty_sig());
        let entry = f.entry;
        let span = Span::synthetic();
        let mem = f.new_value(entry, span.clone(), Op::MakeMemoryState, None, &[]);
        let p = f.new_value_int(
            entry,
            span.clone(),
            Op::Parameter,
            Some(Type::Int8),
            0,
            &[],
        );
        f.value_mut(p).name = Some("x".into());
        let r = f.new_value_extra(
            entry,
            span,
            Op::MakeResult,
            Some(Type::Int8),
            Extra::Type(Type::Int8),
            &[p, mem],
        );
        f.blocks[entry.0 as usize].kind = BlockKind::Return;
        f.set_control(entry, r);
        assert_eq!(
            f.display(),
            "v0 := (MakeMemoryState)\n\
             v1 := (Parameter (extra 0)) int8 (x)\n\
             v2 := (MakeResult v1 v0 (extra int8)) int8\n\
             (Return v2)\n"
        );
    }

    #[test]
    fn op_names() {
        assert_eq!(Op::Add(IntType::Int8).to_string(), "AddInt8");
        assert_eq!(
            Op::Cast(IntType::Int8, IntType::Uint64).to_string(),
            "CastInt8ToUint64"
        );
        assert_eq!(Op::Negate(IntType::Int32).to_string(), "NegateInt32");
    }
}
