//! AST to SSA compilation.
//!
//! The compiler walks a type-checked function body, emitting constants,
//! parameter reads, casts, arithmetic, calls, `let` bindings, `len` and the
//! final return. Side-effecting operations are ordered by threading a
//! memory-state token: the entry block starts with `MakeMemoryState`, and
//! every call consumes the current token and becomes the next one.

use std::collections::HashMap;
use std::sync::Arc;

use num_bigint::BigInt;
use ruse_types::{Constant, Expr, Ident, List, Signature, Span, SymbolTable, Type};

use crate::abi::Abi;
use crate::error::CompileError;
use crate::ssa::{BlockKind, Callee, Extra, Function, Op, ValueId};

/// Compiles one `func` body into SSA form.
pub fn compile_function(
    symbols: &SymbolTable,
    abi: Arc<Abi>,
    sig: Arc<Signature>,
    body: &[Expr],
    span: Span,
) -> Result<Function, CompileError> {
    let mut f = Function::new(symbols.path(), sig.name.clone(), sig.clone());
    f.abi = abi.clone();
    let entry = f.entry;

    let memory = f.new_value(entry, span.clone(), Op::MakeMemoryState, None, &[]);
    let mut named = HashMap::new();
    for (index, (name, ty)) in sig.params.iter().enumerate() {
        let v = f.new_value_int(
            entry,
            span.clone(),
            Op::Parameter,
            Some(ty.clone()),
            index as i64,
            &[],
        );
        f.value_mut(v).name = Some(name.clone());
        named.insert(name.clone(), v);
    }

    f.param_locations = abi.parameters(&sig).map_err(|source| CompileError::Abi {
        span: span.clone(),
        source,
    })?;
    if let Some(result) = &sig.result {
        f.result_locations = abi
            .result_locations(result)
            .map_err(|source| CompileError::Abi {
                span: span.clone(),
                source,
            })?;
    }

    let mut compiler = Compiler {
        symbols,
        abi,
        f,
        named,
        last_memory: memory,
    };

    match sig.result.clone() {
        Some(result) => {
            let (last, rest) = body
                .split_last()
                .ok_or(CompileError::UnsupportedExpr { span: span.clone() })?;
            for expr in rest {
                compiler.expr(expr, None)?;
            }
            let value = compiler.expr(last, Some(&result))?;
            let ret = compiler.f.new_value_extra(
                entry,
                last.span().clone(),
                Op::MakeResult,
                Some(result.clone()),
                Extra::Type(result),
                &[value, compiler.last_memory],
            );
            compiler.f.blocks[entry.0 as usize].kind = BlockKind::Return;
            compiler.f.set_control(entry, ret);
        }
        None => {
            for expr in body {
                compiler.expr(expr, None)?;
            }
            let memory = compiler.last_memory;
            let ret = compiler
                .f
                .new_value(entry, span, Op::MakeResult, None, &[memory]);
            compiler.f.blocks[entry.0 as usize].kind = BlockKind::Return;
            compiler.f.set_control(entry, ret);
        }
    }
    Ok(compiler.f)
}

struct Compiler<'a> {
    symbols: &'a SymbolTable,
    abi: Arc<Abi>,
    f: Function,
    named: HashMap<String, ValueId>,
    last_memory: ValueId,
}

impl Compiler<'_> {
    fn entry(&self) -> crate::ssa::BlockId {
        self.f.entry
    }

    fn expr(&mut self, expr: &Expr, hint: Option<&Type>) -> Result<ValueId, CompileError> {
        match expr {
            Expr::Number(n) => self.constant_int(&n.value, hint, &n.span),
            Expr::Str(s) => {
                let entry = self.entry();
                Ok(self.f.new_value_extra(
                    entry,
                    s.span.clone(),
                    Op::ConstantString,
                    Some(Type::String),
                    Extra::Constant(Type::String, Constant::String(s.value.clone())),
                    &[],
                ))
            }
            Expr::Ident(ident) => {
                if let Some(&v) = self.named.get(&ident.name) {
                    return Ok(v);
                }
                if let Some((ty, value)) = self.symbols.constant(&ident.name) {
                    let (ty, value) = (ty.clone(), value.clone());
                    return self.constant_value(ty, value, hint, &ident.span);
                }
                Err(CompileError::UnknownIdentifier {
                    span: ident.span.clone(),
                    name: ident.name.clone(),
                })
            }
            Expr::List(list) => self.form(list, hint),
            Expr::Qualified(q) => Err(CompileError::UnknownIdentifier {
                span: q.span.clone(),
                name: format!("{}.{}", q.package, q.name),
            }),
            Expr::Quote(span, _) => Err(CompileError::UnsupportedExpr { span: span.clone() }),
        }
    }

    fn form(&mut self, list: &List, hint: Option<&Type>) -> Result<ValueId, CompileError> {
        let head = match list.head() {
            Some(Expr::Ident(ident)) => ident,
            _ => {
                return Err(CompileError::UnsupportedExpr {
                    span: list.span.clone(),
                })
            }
        };
        match head.name.as_str() {
            "let" => self.let_form(list),
            "len" => self.len_form(list),
            "+" | "-" | "*" | "/" => self.arith_form(list, head, hint),
            // Nested definitions are handled at package level.
            "func" | "asm-func" => Ok(self.last_memory),
            name => {
                if let Some(target) = Type::by_name(name) {
                    return self.cast_form(list, target);
                }
                if let Some(sig) = self.symbols.function(name) {
                    let sig = sig.clone();
                    return self.call_form(list, head, sig);
                }
                Err(CompileError::UnknownFunction {
                    span: head.span.clone(),
                    name: head.name.clone(),
                })
            }
        }
    }

    fn let_form(&mut self, list: &List) -> Result<ValueId, CompileError> {
        let (target, value) = match list.tail() {
            [target, value] => (target, value),
            _ => {
                return Err(CompileError::WrongArity {
                    span: list.span.clone(),
                    form: "let",
                    expected: "two",
                })
            }
        };
        let target = match target {
            Expr::Ident(ident) => ident,
            other => {
                return Err(CompileError::InvalidLetTarget {
                    span: other.span().clone(),
                })
            }
        };
        let value = self.expr(value, None)?;
        if target.name == "_" {
            // The binding is discarded, but the value is still compiled.
            return Ok(value);
        }
        let ty = self.f.value(value).ty.clone();
        let entry = self.entry();
        let copy = self
            .f
            .new_value(entry, list.span.clone(), Op::Copy, ty, &[value]);
        self.f.value_mut(copy).name = Some(target.name.clone());
        self.named.insert(target.name.clone(), copy);
        Ok(copy)
    }

    fn len_form(&mut self, list: &List) -> Result<ValueId, CompileError> {
        let operand = match list.tail() {
            [operand] => operand,
            _ => {
                return Err(CompileError::WrongArity {
                    span: list.span.clone(),
                    form: "len",
                    expected: "one",
                })
            }
        };
        if let Some(Constant::String(s)) = self.expr_constant(operand) {
            // A compile-time string has a compile-time length.
            return self.constant_int(
                &BigInt::from(s.len()),
                Some(&Type::Int),
                &list.span,
            );
        }
        let value = self.expr(operand, Some(&Type::String))?;
        let entry = self.entry();
        Ok(self.f.new_value(
            entry,
            list.span.clone(),
            Op::StringLen,
            Some(Type::Int),
            &[value],
        ))
    }

    fn arith_form(
        &mut self,
        list: &List,
        head: &Ident,
        hint: Option<&Type>,
    ) -> Result<ValueId, CompileError> {
        let args = list.tail();
        if args.is_empty() {
            return Err(CompileError::WrongArity {
                span: list.span.clone(),
                form: "arithmetic",
                expected: "at least one",
            });
        }

        let ty = self.operand_type(args, hint);
        if ty == Type::String {
            if head.name != "+" {
                return Err(CompileError::BadOperandType {
                    span: list.span.clone(),
                    form: head.name.clone(),
                    ty,
                });
            }
            return self.string_concat(list, args);
        }
        let int = ty
            .int_type()
            .ok_or_else(|| CompileError::BadOperandType {
                span: list.span.clone(),
                form: head.name.clone(),
                ty: ty.clone(),
            })?;

        if head.name == "-" && args.len() == 1 {
            let value = self.expr(&args[0], Some(&ty))?;
            if let Some(c) = self.value_constant(value) {
                let folded = -c;
                return self.constant_int(&folded, Some(&ty), &list.span);
            }
            let entry = self.entry();
            return Ok(self.f.new_value(
                entry,
                list.span.clone(),
                Op::Negate(int),
                Some(ty),
                &[value],
            ));
        }

        let op = |int| match head.name.as_str() {
            "+" => Op::Add(int),
            "-" => Op::Sub(int),
            "*" => Op::Mul(int),
            _ => Op::Div(int),
        };

        let mut acc = self.expr(&args[0], Some(&ty))?;
        for arg in &args[1..] {
            let rhs = self.expr(arg, Some(&ty))?;
            if let (Some(a), Some(b)) = (self.value_constant(acc), self.value_constant(rhs)) {
                let folded = match head.name.as_str() {
                    "+" => a + b,
                    "-" => a - b,
                    "*" => a * b,
                    _ => {
                        if b == BigInt::from(0) {
                            return Err(CompileError::DivisionByZero {
                                span: arg.span().clone(),
                            });
                        }
                        a / b
                    }
                };
                acc = self.constant_int(&folded, Some(&ty), &list.span)?;
                continue;
            }
            let entry = self.entry();
            acc = self.f.new_value(
                entry,
                list.span.clone(),
                op(int),
                Some(ty.clone()),
                &[acc, rhs],
            );
        }
        Ok(acc)
    }

    fn string_concat(&mut self, list: &List, args: &[Expr]) -> Result<ValueId, CompileError> {
        let mut acc = self.expr(&args[0], Some(&Type::String))?;
        for arg in &args[1..] {
            let rhs = self.expr(arg, Some(&Type::String))?;
            let folded = match (self.value_string(acc), self.value_string(rhs)) {
                (Some(a), Some(b)) => Some(format!("{a}{b}")),
                _ => None,
            };
            let entry = self.entry();
            acc = match folded {
                Some(s) => self.f.new_value_extra(
                    entry,
                    list.span.clone(),
                    Op::ConstantString,
                    Some(Type::String),
                    Extra::Constant(Type::String, Constant::String(s.into())),
                    &[],
                ),
                None => self.f.new_value(
                    entry,
                    list.span.clone(),
                    Op::AddString,
                    Some(Type::String),
                    &[acc, rhs],
                ),
            };
        }
        Ok(acc)
    }

    fn cast_form(&mut self, list: &List, target: Type) -> Result<ValueId, CompileError> {
        let operand = match list.tail() {
            [operand] => operand,
            _ => {
                return Err(CompileError::WrongArity {
                    span: list.span.clone(),
                    form: "cast",
                    expected: "one",
                })
            }
        };
        let value = self.expr(operand, Some(&target))?;
        let from = self
            .f
            .value(value)
            .ty
            .clone()
            .unwrap_or(Type::UntypedInt);
        if from == target {
            return Ok(value);
        }
        let to_int = target
            .int_type()
            .ok_or_else(|| CompileError::BadOperandType {
                span: list.span.clone(),
                form: target.to_string(),
                ty: target.clone(),
            })?;
        // Constants convert at compile time, with a range check.
        if let Some(c) = self.value_constant(value) {
            return self.constant_int(&c, Some(&target), &list.span);
        }
        let from_int = from
            .int_type()
            .ok_or_else(|| CompileError::BadOperandType {
                span: operand.span().clone(),
                form: target.to_string(),
                ty: from.clone(),
            })?;
        let entry = self.entry();
        let op = if from_int == to_int {
            // Identity conversion, e.g. int64 to int in 64-bit mode.
            Op::Copy
        } else {
            Op::Cast(from_int, to_int)
        };
        Ok(self
            .f
            .new_value(entry, list.span.clone(), op, Some(target), &[value]))
    }

    fn call_form(
        &mut self,
        list: &List,
        head: &Ident,
        sig: Arc<Signature>,
    ) -> Result<ValueId, CompileError> {
        let args = list.tail();
        if args.len() != sig.params.len() {
            return Err(CompileError::WrongArgumentCount {
                span: list.span.clone(),
                name: head.name.clone(),
                expected: sig.params.len(),
                got: args.len(),
            });
        }
        let mut compiled = Vec::with_capacity(args.len() + 1);
        for (arg, (_, ty)) in args.iter().zip(&sig.params) {
            let ty = ty.clone();
            compiled.push(self.expr(arg, Some(&ty))?);
        }
        compiled.push(self.last_memory);
        let callee = Callee {
            path: self.symbols.path().to_string(),
            name: head.name.clone(),
            sig: sig.clone(),
            abi: self.abi.clone(),
        };
        let entry = self.entry();
        let call = self.f.new_value_extra(
            entry,
            list.span.clone(),
            Op::FunctionCall,
            sig.result.clone(),
            Extra::Callee(Arc::new(callee)),
            &compiled,
        );
        self.last_memory = call;
        Ok(call)
    }

    fn constant_int(
        &mut self,
        value: &BigInt,
        hint: Option<&Type>,
        span: &Span,
    ) -> Result<ValueId, CompileError> {
        let entry = self.entry();
        match hint.and_then(|ty| ty.int_type().map(|it| (ty.clone(), it))) {
            Some((ty, int)) => {
                let (min, max) = int.range();
                let v128: Option<i128> = value.try_into().ok();
                match v128 {
                    Some(v) if v >= min && v <= max => {}
                    _ => {
                        return Err(CompileError::ConstantOverflow {
                            span: span.clone(),
                            ty,
                        })
                    }
                }
                let op = if int.signed() {
                    Op::ConstantInt
                } else {
                    Op::ConstantUint
                };
                Ok(self.f.new_value_extra(
                    entry,
                    span.clone(),
                    op,
                    Some(ty.clone()),
                    Extra::Constant(ty, Constant::Int(value.clone())),
                    &[],
                ))
            }
            None => Ok(self.f.new_value_extra(
                entry,
                span.clone(),
                Op::ConstantUntypedInt,
                Some(Type::UntypedInt),
                Extra::Constant(Type::UntypedInt, Constant::Int(value.clone())),
                &[],
            )),
        }
    }

    fn constant_value(
        &mut self,
        ty: Type,
        value: Constant,
        hint: Option<&Type>,
        span: &Span,
    ) -> Result<ValueId, CompileError> {
        match value {
            Constant::Int(i) => {
                let target = match &ty {
                    Type::UntypedInt => hint.cloned(),
                    ty => Some(ty.clone()),
                };
                self.constant_int(&i, target.as_ref(), span)
            }
            Constant::String(s) => {
                let entry = self.entry();
                Ok(self.f.new_value_extra(
                    entry,
                    span.clone(),
                    Op::ConstantString,
                    Some(Type::String),
                    Extra::Constant(Type::String, Constant::String(s)),
                    &[],
                ))
            }
            Constant::Bool(_) => Err(CompileError::UnsupportedExpr { span: span.clone() }),
        }
    }

    // The integer constant held by an already-compiled value, if any.
    fn value_constant(&self, id: ValueId) -> Option<BigInt> {
        let v = self.f.value(id);
        if !v.op.is_constant() {
            return None;
        }
        match &v.extra {
            Some(Extra::Constant(_, Constant::Int(i))) => Some(i.clone()),
            _ => None,
        }
    }

    fn value_string(&self, id: ValueId) -> Option<String> {
        let v = self.f.value(id);
        match &v.extra {
            Some(Extra::Constant(_, Constant::String(s))) if v.op.is_constant() => {
                Some(s.to_string())
            }
            _ => None,
        }
    }

    // The constant behind an expression, before compiling it; used by
    // `len` to fold compile-time strings.
    fn expr_constant(&self, expr: &Expr) -> Option<Constant> {
        match expr {
            Expr::Str(s) => Some(Constant::String(s.value.clone())),
            Expr::Number(n) => Some(Constant::Int(n.value.clone())),
            Expr::Ident(ident) => {
                if self.named.contains_key(&ident.name) {
                    return None;
                }
                self.symbols
                    .constant(&ident.name)
                    .map(|(_, value)| value.clone())
            }
            _ => None,
        }
    }

    // The concrete operand type of an arithmetic form: the hint when it is
    // concrete, else the first operand with an inferable type, else the
    // word-sized integer.
    fn operand_type(&self, args: &[Expr], hint: Option<&Type>) -> Type {
        if let Some(ty) = hint {
            if ty.int_type().is_some() || *ty == Type::String {
                return ty.clone();
            }
        }
        for arg in args {
            if let Some(ty) = self.infer(arg) {
                return ty;
            }
        }
        Type::Int
    }

    fn infer(&self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Str(_) => Some(Type::String),
            Expr::Ident(ident) => {
                if let Some(&v) = self.named.get(&ident.name) {
                    let ty = self.f.value(v).ty.clone()?;
                    return (ty != Type::UntypedInt).then_some(ty);
                }
                match self.symbols.constant(&ident.name) {
                    Some((ty, _)) if *ty != Type::UntypedInt => Some(ty.clone()),
                    _ => None,
                }
            }
            Expr::List(list) => {
                let head = list.head()?.as_ident()?;
                if let Some(ty) = Type::by_name(&head.name) {
                    return Some(ty);
                }
                match head.name.as_str() {
                    "len" => Some(Type::Int),
                    "+" | "-" | "*" | "/" => {
                        list.tail().iter().find_map(|arg| self.infer(arg))
                    }
                    name => self
                        .symbols
                        .function(name)
                        .and_then(|sig| sig.result.clone()),
                }
            }
            _ => None,
        }
    }
}
