//! Compiler pipeline tests: typed AST in, SSA out, machine code after
//! allocation and lowering.

use std::sync::Arc;

use ruse_asm::RelocKind;
use ruse_compiler::{
    allocate, compile_function, compile_package, lower, Abi, Allocator, BlockKind, Error, Extra,
    Function, Op, Package,
};
use ruse_types::{reader, Expr, IntType, Signature, Span, SymbolTable, Type};

fn compile(src: &str) -> Package {
    try_compile(src).unwrap_or_else(|e| panic!("compiling {src}: {e}"))
}

fn try_compile(src: &str) -> Result<Package, Error> {
    let exprs = reader::read("test.ruse", src).expect("test source parses");
    compile_package("test", &[exprs], Abi::system_v())
}

// Compiles a single `func` definition to SSA without allocation.
fn compile_ssa(src: &str) -> Function {
    let exprs = reader::read("test.ruse", src).expect("test source parses");
    let list = exprs[0].as_list().expect("a definition");
    let header = list.elements[1].as_list().expect("a signature");
    let name = header.head().unwrap().as_ident().unwrap().name.clone();
    let mut params = Vec::new();
    let mut result = None;
    for element in header.tail() {
        match element {
            Expr::List(p) => {
                let pname = p.elements[0].as_ident().unwrap().name.clone();
                let ptype =
                    Type::by_name(&p.elements[1].as_ident().unwrap().name).unwrap();
                params.push((pname, ptype));
            }
            Expr::Ident(r) => result = Type::by_name(&r.name),
            _ => panic!("bad signature"),
        }
    }
    let sig = Arc::new(Signature::new(name, params, result));
    let symbols = SymbolTable::new("test");
    compile_function(
        &symbols,
        Abi::system_v(),
        sig,
        &list.elements[2..],
        Span::synthetic(),
    )
    .expect("compiles")
}

#[test]
fn ssa_shape() {
    let f = compile_ssa("(func (add1 (x int8) int8) (+ x 1))");
    let entry = f.block(f.entry);

    // The entry block begins with exactly one memory state token.
    let first = f.value(entry.values[0]);
    assert_eq!(first.op, Op::MakeMemoryState);
    assert!(entry.values[1..]
        .iter()
        .all(|&v| f.value(v).op != Op::MakeMemoryState));

    // Parameters carry their zero-based index.
    let param = f.value(entry.values[1]);
    assert_eq!(param.op, Op::Parameter);
    assert!(matches!(param.extra, Some(Extra::Int(0))));

    // A return block ends in the MakeResult its control references.
    assert_eq!(entry.kind, BlockKind::Return);
    let last = *entry.values.last().unwrap();
    assert_eq!(f.value(last).op, Op::MakeResult);
    assert_eq!(entry.control, Some(last));
    assert!(f.value(last).uses >= 1);
}

#[test]
fn ssa_printer() {
    let f = compile_ssa("(func (add1 (x int8) int8) (+ x 1))");
    assert_eq!(
        f.display(),
        "v0 := (MakeMemoryState)\n\
         v1 := (Parameter (extra 0)) int8 (x)\n\
         v2 := (ConstantInt (extra 1)) int8\n\
         v3 := (AddInt8 v1 v2) int8\n\
         v4 := (MakeResult v3 v0 (extra int8)) int8\n\
         (Return v4)\n"
    );
}

#[test]
fn operands_precede_consumers() {
    let f = compile_ssa(
        "(func (math (x int64) (y int64) int64) (+ (* x 2) (- y 1)))",
    );
    let entry = f.block(f.entry);
    for (idx, &vid) in entry.values.iter().enumerate() {
        for &arg in &f.value(vid).args {
            let pos = entry
                .values
                .iter()
                .position(|&v| v == arg)
                .expect("operand is in the block");
            assert!(pos < idx, "operand {arg} does not precede {vid}");
        }
    }
}

#[test]
fn add1_end_to_end() {
    let mut package = compile("(func (add1 (x int8) int8) (+ x 1))");
    let compiled = package.functions.remove(0).code();

    // The System V ABI maps x to dil, so the function reduces to
    // mov al, dil; add al, 1; ret.
    let mut asm = compile("(asm-func add1 (mov al dil) (add al 1) (ret))");
    assert_eq!(compiled, asm.functions.remove(0).code());
    assert_eq!(compiled, vec![0x40, 0x8a, 0xc7, 0x04, 0x01, 0xc3]);
}

#[test]
fn constant_results_materialise_with_short_moves() {
    let mut package = compile("(func (answer int64) 42)");
    let f = package.functions.remove(0);
    // The 32-bit immediate form clears the upper half of rax.
    assert_eq!(f.code(), vec![0xb8, 0x2a, 0x00, 0x00, 0x00, 0xc3]);
}

#[test]
fn wide_constants_use_the_64_bit_form() {
    let mut package = compile("(func (wide int64) 0x1122334455667788)");
    let f = package.functions.remove(0);
    assert_eq!(
        f.code(),
        vec![0x48, 0xb8, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0xc3]
    );
}

#[test]
fn constant_folding() {
    let f = compile_ssa("(func (five int32) (+ 2 3))");
    let rendered = f.display();
    assert!(rendered.contains("(ConstantInt (extra 5)) int32"));
    assert!(!rendered.contains("AddInt32"));
}

#[test]
fn constant_folding_rejects_overflow() {
    let err = try_compile("(func (big int8) (+ 100 100))").expect_err("200 overflows int8");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::ConstantOverflow { .. })
    ));
}

#[test]
fn division_by_constant_zero_is_an_error() {
    let err = try_compile("(func (bad int64) (/ 1 0))").expect_err("division by zero");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::DivisionByZero { .. })
    ));
}

#[test]
fn len_of_constant_string_folds() {
    let f = compile_ssa("(func (l int) (len \"hello\"))");
    assert!(f.display().contains("(ConstantInt (extra 5)) int"));
}

#[test]
fn widening_casts_sign_extend() {
    let mut package = compile("(func (widen (x int8) int64) (int64 x))");
    let f = package.functions.remove(0);
    // movsx rax, dil; ret.
    assert_eq!(f.code(), vec![0x48, 0x0f, 0xbe, 0xc7, 0xc3]);
}

#[test]
fn unsigned_widening_zero_extends() {
    let mut package = compile("(func (widen (x uint8) uint64) (uint64 x))");
    let f = package.functions.remove(0);
    // movzx eax, dil zero-extends through the full register.
    assert_eq!(f.code(), vec![0x40, 0x0f, 0xb6, 0xc7, 0xc3]);
}

#[test]
fn uint32_to_uint64_is_a_plain_move()
{
    let mut package = compile("(func (widen (x uint32) uint64) (uint64 x))");
    let f = package.functions.remove(0);
    // mov eax, edi zero-extends.
    assert_eq!(f.code(), vec![0x8b, 0xc7, 0xc3]);
}

#[test]
fn signed_division_uses_cqo_and_idiv() {
    let mut package = compile("(func (d (a int64) (b int64) int64) (/ a b))");
    let f = package.functions.remove(0);
    // mov rax, rdi; cqo; idiv rsi; ret.
    assert_eq!(
        f.code(),
        vec![0x48, 0x8b, 0xc7, 0x48, 0x99, 0x48, 0xf7, 0xfe, 0xc3]
    );
}

#[test]
fn unsigned_division_zeroes_rdx() {
    let mut package = compile("(func (d (a uint64) (b uint64) uint64) (/ a b))");
    let f = package.functions.remove(0);
    // mov rax, rdi; xor edx, edx; div rsi; ret.
    assert_eq!(
        f.code(),
        vec![0x48, 0x8b, 0xc7, 0x31, 0xd2, 0x48, 0xf7, 0xf6, 0xc3]
    );
}

#[test]
fn calls_dodge_live_values_and_relocate() {
    let mut package = compile(
        "(func (f int64) 42)\n\
         (func (g (x int64) int64) (let y (f)) (+ x y))",
    );
    let g = package.functions.remove(1);
    // x dodges from rdi (callee scratch) into rbx before the call; the
    // call result doubles as the memory token, pinning rax until the
    // return gathers it.
    assert_eq!(
        g.code(),
        vec![
            0x48, 0x8b, 0xdf, // mov rbx, rdi
            0xe8, 0x44, 0x33, 0x22, 0x11, // call f (placeholder)
            0x48, 0x8b, 0xf8, // mov rdi, rax
            0x48, 0x8b, 0xf3, // mov rsi, rbx
            0x48, 0x03, 0xf7, // add rsi, rdi
            0x48, 0x8b, 0xc6, // mov rax, rsi
            0xc3,
        ]
    );
    assert_eq!(g.relocations.len(), 1);
    let reloc = &g.relocations[0];
    assert_eq!(reloc.name, "test.f");
    assert_eq!(reloc.kind, RelocKind::RelativeAddress);
    assert_eq!(reloc.bits, 32);
    assert_eq!(reloc.offset, 4);
    assert_eq!(reloc.address, 8);
}

#[test]
fn string_results_split_into_pointer_and_length() {
    let mut package = compile(
        "(let hw \"Hello!\")\n(func (s string) hw)",
    );
    let f = package.functions.remove(0);
    assert_eq!(
        f.code(),
        vec![
            0x48, 0xb8, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, // mov rax, .Hello!
            0xba, 0x06, 0x00, 0x00, 0x00, // mov edx, 6
            0xc3,
        ]
    );
    assert_eq!(f.relocations.len(), 1);
    assert_eq!(f.relocations[0].name, ".Hello!");
    assert_eq!(f.relocations[0].kind, RelocKind::FullAddress);
    assert_eq!(f.relocations[0].offset, 2);
    assert_eq!(f.relocations[0].address, 10);
}

#[test]
fn string_parameters_occupy_two_slots() {
    let mut package = compile("(func (l (s string) int) (len s))");
    let f = package.functions.remove(0);
    // The length half of the string lives in rsi; mov rax, rsi; ret.
    assert_eq!(f.code(), vec![0x48, 0x8b, 0xc6, 0xc3]);
}

#[test]
fn dead_parameters_and_copies_are_eliminated() {
    let mut package = compile(
        "(func (u (x int64) (y int64) int64) (let unused x) y)",
    );
    let f = package.functions.remove(0);
    // Neither x nor the dead copy generates code.
    assert_eq!(f.code(), vec![0x48, 0x8b, 0xc6, 0xc3]);
}

#[test]
fn discarded_let_still_compiles_its_value() {
    let mut package = compile(
        "(func (f int64) 42)\n\
         (func (g int64) (let _ (f)) 7)",
    );
    let g = package.functions.remove(1);
    // The call happens even though its result is discarded.
    assert_eq!(
        g.code(),
        vec![
            0xe8, 0x44, 0x33, 0x22, 0x11, // call f
            0xb8, 0x07, 0x00, 0x00, 0x00, // mov eax, 7
            0xc3,
        ]
    );
}

#[test]
fn negation() {
    let mut package = compile("(func (n (x int32) int32) (- x))");
    let f = package.functions.remove(0);
    // mov eax, edi; neg eax; ret.
    assert_eq!(f.code(), vec![0x8b, 0xc7, 0xf7, 0xd8, 0xc3]);
}

#[test]
fn multiplication_uses_imul() {
    let mut package = compile("(func (m (a int64) (b int64) int64) (* a b))");
    let f = package.functions.remove(0);
    // mov rax, rdi; imul rax, rsi; ret.
    assert_eq!(
        f.code(),
        vec![0x48, 0x8b, 0xc7, 0x48, 0x0f, 0xaf, 0xc6, 0xc3]
    );
}

#[test]
fn allocator_runs_out_of_registers() {
    // Fifteen working registers; sixteen simultaneously live values
    // cannot be placed without spilling, which is not implemented.
    let mut src = String::from("(func (big int64)");
    for i in 0..16 {
        src.push_str(&format!(" (let v{i} {})", i + 1));
    }
    src.push_str(" (+ v0 v1 v2 v3 v4 v5 v6 v7 v8 v9 v10 v11 v12 v13 v14 v15))");
    let err = try_compile(&src).expect_err("needs a spill");
    assert!(matches!(
        err,
        Error::Alloc(ruse_compiler::AllocError::SpillRequired { .. })
    ));
}

#[test]
fn allocator_debug_rendering() {
    let f = compile_ssa("(func (add1 (x int8) int8) (+ x 1))");
    let mut allocator = Allocator::new(&f);
    allocator.run().expect("allocates");
    let debug = allocator.debug();
    let lines: Vec<&str> = debug.lines().collect();
    // Scratch registers come first; everything is freed by the end.
    assert_eq!(lines[0], "rax: [free]");
    assert_eq!(lines[1], "rdi: [free]");
    assert!(lines.iter().all(|l| l.ends_with("[free]")));
    assert_eq!(lines.len(), 15);
}

#[test]
fn allocation_steps_pair_sources_and_destinations() {
    let f = compile_ssa("(func (add1 (x int8) int8) (+ x 1))");
    let steps = allocate(&f).expect("allocates");
    for step in &steps {
        if step.op == Op::Copy {
            assert!(
                step.alloc.src.is_some() ^ step.alloc.data.is_some(),
                "exactly one of src and data is set on a copy"
            );
        }
    }
    // x dies after the add and its register is dropped.
    assert!(steps.iter().any(|s| s.op == Op::Drop));
}

#[test]
fn lowering_replaces_entry_values_with_instructions() {
    let mut f = compile_ssa("(func (add1 (x int8) int8) (+ x 1))");
    let steps = allocate(&f).expect("allocates");
    lower(&mut f, steps).expect("lowers");
    let entry = f.block(f.entry);
    assert!(!entry.values.is_empty());
    for &vid in &entry.values {
        assert!(matches!(f.value(vid).op, Op::Asm(_)));
        assert!(matches!(f.value(vid).extra, Some(Extra::Insn(_))));
    }
    // The IR printer now renders instruction UIDs.
    assert!(f.display().contains("mov_r8_rm8"));
    assert!(f.display().ends_with("(Return)\n"));
}

#[test]
fn unknown_identifiers_are_reported_with_spans() {
    let err = try_compile("(func (f int64) nope)").expect_err("unknown identifier");
    let message = err.to_string();
    assert!(message.contains("unknown identifier nope"), "{message}");
    assert!(message.starts_with("test.ruse:1:"), "{message}");
}

#[test]
fn unknown_functions_are_reported() {
    let err = try_compile("(func (f int64) (missing 1))").expect_err("unknown function");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::UnknownFunction { .. })
    ));
}

#[test]
fn wrong_argument_counts_are_reported() {
    let err = try_compile(
        "(func (f (x int64) int64) x)\n(func (g int64) (f 1 2))",
    )
    .expect_err("f takes one argument");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::WrongArgumentCount {
            expected: 1,
            got: 2,
            ..
        })
    ));
}

#[test]
fn malformed_abis_are_rejected_up_front() {
    let exprs = reader::read("test.ruse", "(func (f int64) 42)").unwrap();

    let mut aliased = (*Abi::system_v()).clone();
    aliased.params.push(aliased.params[0]);
    let err = compile_package("test", &[exprs.clone()], Arc::new(aliased))
        .expect_err("two parameters share a register");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::Abi { .. })
    ));

    let mut doubled = (*Abi::system_v()).clone();
    doubled.scratch.push(doubled.scratch[0]);
    let err = compile_package("test", &[exprs], Arc::new(doubled))
        .expect_err("the scratch set is not distinct");
    assert!(matches!(
        err,
        Error::Compile(ruse_compiler::CompileError::Abi { .. })
    ));
}

#[test]
fn int_types_cover_the_lattice() {
    // Every sized integer type resolves to a concrete representation.
    use strum::IntoEnumIterator;
    for int in IntType::iter() {
        assert_eq!(int.ty().int_type(), Some(int));
    }
}
