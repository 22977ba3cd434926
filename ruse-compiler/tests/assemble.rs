//! End-to-end assembler tests: source text in, machine code out.

use ruse_asm::table;
use ruse_asm::RelocKind;
use ruse_compiler::{compile_package, Abi, Error, Function, Package};
use ruse_types::reader;

fn compile(src: &str) -> Package {
    try_compile(src).unwrap_or_else(|e| panic!("compiling {src}: {e}"))
}

fn try_compile(src: &str) -> Result<Package, Error> {
    let exprs = reader::read("test.ruse", src).expect("test source parses");
    compile_package("test", &[exprs], Abi::system_v())
}

fn assemble(src: &str) -> Function {
    let mut package = compile(src);
    assert!(!package.functions.is_empty(), "no functions in {src}");
    package.functions.remove(0)
}

#[test]
fn straight_line_instructions() {
    let f = assemble("(asm-func test (mov cl 1) (xchg rax rax) (syscall))");
    assert_eq!(f.code(), vec![0xb1, 0x01, 0x48, 0x90, 0x0f, 0x05]);
    assert!(f.relocations.is_empty());
}

#[test]
fn backward_jumps_shrink_to_rel8() {
    let f = assemble(
        "(asm-func test 'bar (mov cl 1) 'foo (xchg rax rax) (je 'foo) (jmp 'bar))",
    );
    assert_eq!(
        f.code(),
        vec![0xb1, 0x01, 0x48, 0x90, 0x74, 0xfc, 0xeb, 0xf8]
    );
}

#[test]
fn forward_jumps_shrink_to_rel8() {
    let f = assemble(
        "(asm-func test (je 'foo) (jmp 'bar) (mov cl 1) 'bar (xchg rax rax) 'foo)",
    );
    assert_eq!(
        f.code(),
        vec![0x74, 0x06, 0xeb, 0x02, 0xb1, 0x01, 0x48, 0x90]
    );
}

#[test]
fn len_references_embed_constant_lengths() {
    let f = assemble(
        "(let hw \"Hello, world!\")\n(asm-func test (mov ecx (len hw)))",
    );
    assert_eq!(f.code(), vec![0xb9, 0x0d, 0x00, 0x00, 0x00]);
    assert!(f.relocations.is_empty());
}

#[test]
fn string_pointers_become_full_address_relocations() {
    let f = assemble(
        "(let hw \"Hello, world!\")\n\
         (asm-func test (nop) (mov rcx (string-pointer hw)) (nop))",
    );
    assert_eq!(
        f.code(),
        vec![0x90, 0x48, 0xb9, 0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11, 0x90]
    );
    assert_eq!(f.relocations.len(), 1);
    let reloc = &f.relocations[0];
    assert_eq!(reloc.name, "test.hw");
    assert_eq!(reloc.kind, RelocKind::FullAddress);
    assert_eq!(reloc.bits, 64);
    assert_eq!(reloc.offset, 3);
    assert_eq!(reloc.address, 11);
}

#[test]
fn func_references_relocate_too() {
    let mut package = compile(
        "(asm-func target (ret))\n\
         (asm-func test (mov rcx (func target)))",
    );
    let f = package.functions.remove(1);
    assert_eq!(f.relocations.len(), 1);
    assert_eq!(f.relocations[0].name, "test.target");
    assert_eq!(f.relocations[0].kind, RelocKind::FullAddress);
}

// Every catalogue entry with a canonical example round-trips: assembling
// the canonical text under a forced `match` annotation reproduces the
// generated machine code.
#[test]
fn round_trip_every_table_example() {
    for form in table::FORMS {
        let Some(example) = form.example else { continue };
        let inner = example
            .text
            .strip_prefix('(')
            .and_then(|t| t.strip_suffix(')'))
            .expect("examples are lists");
        let src = format!(
            "(asm-func test '(mode {}) ({} '(match {})))",
            example.mode.bits(),
            inner,
            form.uid,
        );
        let f = assemble(&src);
        assert_eq!(f.code(), example.code, "round trip of {}", form.uid);
    }
}

#[test]
fn re_encoding_is_a_fixed_point() {
    let src = "(asm-func test (je 'foo) (jmp 'bar) (mov cl 1) 'bar (xchg rax rax) 'foo)";
    let f = assemble(src);
    let first = f.code();
    // Encoding the final instruction stream again must not change it.
    assert_eq!(f.code(), first);
    // Nor does assembling the same source from scratch.
    assert_eq!(assemble(src).code(), first);
}

#[test]
fn shortest_form_wins() {
    // The shift-by-one form beats the immediate form by a byte.
    assert_eq!(assemble("(asm-func test (shl ecx 1))").code(), vec![0xd1, 0xe1]);
    assert_eq!(
        assemble("(asm-func test (shl ecx 2))").code(),
        vec![0xc1, 0xe1, 0x02]
    );
}

#[test]
fn match_annotations_force_a_form() {
    let f = assemble("(asm-func test (mov cl 1 '(match mov_rm8_imm8)))");
    assert_eq!(f.code(), vec![0xc6, 0xc1, 0x01]);

    let err = try_compile("(asm-func test (mov cl 1 '(match mov_r32_imm32)))")
        .expect_err("operands do not fit the forced form");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::MatchAnnotationFailed { .. })
    ));
}

#[test]
fn prefixes_assemble_in_numeric_order() {
    let f = assemble("(asm-func test (lock add (fs rcx) rdx))");
    assert_eq!(f.code(), vec![0x64, 0xf0, 0x48, 0x01, 0x11]);
}

#[test]
fn rep_prefixes() {
    let f = assemble("(asm-func test (rep movsb (rdi) (rsi)))");
    assert_eq!(f.code(), vec![0xf3, 0xa4]);

    let err = try_compile("(asm-func test (rep vaddps xmm1 xmm2 xmm3))")
        .expect_err("vaddps rejects rep prefixes");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::RepNotAllowed { .. })
    ));
}

#[test]
fn conflicting_prefixes_are_rejected() {
    let err = try_compile("(asm-func test (rep lock movsb (rdi) (rsi)))")
        .expect_err("rep and lock share a group");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::PrefixConflict { .. })
    ));
}

#[test]
fn rex_w_prefix_parses() {
    let f = assemble("(asm-func test (rex.w nop))");
    assert_eq!(f.code(), vec![0x48, 0x90]);
}

#[test]
fn evex_annotations() {
    let f = assemble("(asm-func test (vaddps zmm1 zmm2 zmm3 '(mask k5) '(zero true)))");
    assert_eq!(f.code(), vec![0x62, 0xf1, 0x6c, 0xcd, 0x58, 0xcb]);

    let f = assemble("(asm-func test (vaddps zmm1 zmm2 (rax 16) '(broadcast true)))");
    assert_eq!(f.code(), vec![0x62, 0xf1, 0x6c, 0x58, 0x58, 0x48, 0x04]);
}

#[test]
fn memory_size_hints_filter_forms() {
    let f = assemble("(asm-func test (mov (rcx) 13 '(bits 64)))");
    assert_eq!(f.code(), vec![0x48, 0xc7, 0x01, 0x0d, 0x00, 0x00, 0x00]);

    let f = assemble("(asm-func test (mov (rcx) 13 '(bits 32)))");
    assert_eq!(f.code(), vec![0xc7, 0x01, 0x0d, 0x00, 0x00, 0x00]);
}

#[test]
fn sixteen_bit_mode_addressing() {
    let f = assemble("(asm-func test '(mode 16) (mov ax (+ bx si)))");
    assert_eq!(f.code(), vec![0x8b, 0x00]);

    let f = assemble("(asm-func test '(mode 16) (mov ax (+ bp 18)))");
    assert_eq!(f.code(), vec![0x8b, 0x46, 0x12]);
}

#[test]
fn scaled_index_addressing() {
    let f = assemble("(asm-func test (mov rcx (+ rax (* rdx 8) 64)))");
    // SIB with scale ×8, index rdx, base rax, disp8 64.
    assert_eq!(f.code(), vec![0x48, 0x8b, 0x4c, 0xd0, 0x40]);
}

#[test]
fn segment_addressing() {
    let f = assemble("(asm-func test (mov rcx (gs rax)))");
    assert_eq!(f.code(), vec![0x65, 0x48, 0x8b, 0x08]);
}

#[test]
fn far_pointers() {
    let f = assemble("(asm-func test '(mode 32) (jmp (16 4096)))");
    assert_eq!(
        f.code(),
        vec![0xea, 0x00, 0x10, 0x00, 0x00, 0x10, 0x00]
    );
}

#[test]
fn duplicate_labels_are_rejected() {
    let err = try_compile("(asm-func test 'a (nop) 'a (jmp 'a))").expect_err("duplicate label");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::DuplicateLabel { .. })
    ));
}

#[test]
fn unknown_labels_are_rejected() {
    let err = try_compile("(asm-func test (jmp 'nowhere))").expect_err("unknown label");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::UnknownLabel { .. })
    ));
}

#[test]
fn unreferenced_labels_are_rejected() {
    let err = try_compile("(asm-func test 'a (nop))").expect_err("unreferenced label");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::UnreferencedLabel { .. })
    ));
}

#[test]
fn unknown_mnemonics_are_rejected() {
    let err = try_compile("(asm-func test (frobnicate rax))").expect_err("unknown mnemonic");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::UnknownMnemonic { .. })
    ));
}

#[test]
fn mode_restricted_registers_are_hard_errors() {
    let err = try_compile("(asm-func test '(mode 32) (mov r8d 1))")
        .expect_err("r8d needs long mode");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::RegisterMode { .. })
    ));
}

#[test]
fn invalid_scales_are_rejected() {
    let err = try_compile("(asm-func test (mov rcx (+ rax (* rdx 3))))")
        .expect_err("scale 3 is not encodable");
    assert!(matches!(
        err,
        Error::Asm(ruse_compiler::AsmError::InvalidScale { scale: 3, .. })
    ));
}

#[test]
fn x87_stack_indices() {
    let f = assemble("(asm-func test (fld st3) (fxch st1) (fld st))");
    assert_eq!(f.code(), vec![0xd9, 0xc3, 0xd9, 0xc9, 0xd9, 0xc0]);
}

#[test]
fn errors_quote_positions() {
    let err = try_compile("(asm-func test\n  (frobnicate rax))").expect_err("unknown mnemonic");
    let message = err.to_string();
    assert!(
        message.starts_with("test.ruse:2:"),
        "error should quote file and line: {message}"
    );
}

#[test]
fn base_address_is_main_only() {
    let exprs = reader::read("test.ruse", "'(base-address 4096) (asm-func test (ret))").unwrap();
    let package = compile_package("main", &[exprs.clone()], Abi::system_v()).unwrap();
    assert_eq!(package.base_address, Some(4096));

    let err = compile_package("lib", &[exprs], Abi::system_v())
        .expect_err("base-address outside main");
    assert!(matches!(err, Error::Package { .. }));
}

#[test]
fn arch_filters_skip_definitions() {
    let package = compile(
        "'(arch riscv64)\n(asm-func other (ret))\n(asm-func test (nop) (ret))",
    );
    assert_eq!(package.functions.len(), 1);
    assert_eq!(package.functions[0].name, "test");
}

#[test]
fn sections_attach_to_functions_and_constants() {
    let package = compile(
        "'(section \".hot\")\n(asm-func test (ret))\n\
         '(section \".data\")\n(let greeting \"hi\")",
    );
    assert_eq!(package.functions[0].section.as_deref(), Some(".hot"));
    assert_eq!(package.constants[0].section.as_deref(), Some(".data"));
}
