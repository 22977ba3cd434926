//! The package-level driver.
//!
//! A package is a set of parsed files. The driver collects annotations and
//! constant definitions, applies architecture filters, and routes `func`
//! definitions through the compile/allocate/lower pipeline and `asm-func`
//! definitions through the assembler.

use std::sync::Arc;

use ruse_types::{Constant, Expr, Ident, List, Signature, Span, Symbol, SymbolTable, Type};

use crate::abi::Abi;
use crate::alloc::allocate;
use crate::asm::assemble_function;
use crate::compile::compile_function;
use crate::error::{CompileError, Error};
use crate::lower::lower;
use crate::ssa::Function;

/// The architecture this back end targets; definitions filtered to other
/// architectures are skipped.
pub const ARCH: &str = "x86-64";

/// A compiled package.
#[derive(Debug)]
pub struct Package {
    /// Package name, the last element of the import path.
    pub name: String,
    /// Package import path.
    pub path: String,
    /// The package's symbol table.
    pub symbols: SymbolTable,
    /// Package-level constants, in definition order.
    pub constants: Vec<PackageConstant>,
    /// Compiled and assembled functions, in definition order.
    pub functions: Vec<Function>,
    /// The `base-address` annotation, entry package only.
    pub base_address: Option<u64>,
}

/// One package-level constant.
#[derive(Debug, Clone)]
pub struct PackageConstant {
    /// Constant name.
    pub name: String,
    /// Resolved type.
    pub ty: Type,
    /// Resolved value.
    pub value: Constant,
    /// Section override from a `section` annotation.
    pub section: Option<String>,
}

/// Compiles every definition of a package.
///
/// The calling convention is supplied externally; it is validated once
/// here before any definition is compiled against it.
pub fn compile_package(
    path: &str,
    files: &[Vec<Expr>],
    abi: Arc<Abi>,
) -> Result<Package, Error> {
    abi.validate()
        .map_err(|source| CompileError::Abi {
            span: Span::synthetic(),
            source,
        })?;
    let name = path.rsplit('/').next().unwrap_or(path).to_string();
    let mut package = Package {
        name,
        path: path.to_string(),
        symbols: SymbolTable::new(path),
        constants: Vec::new(),
        functions: Vec::new(),
        base_address: None,
    };

    // First pass: collect constants and signatures so definition order
    // does not matter to call sites or `len` references.
    for file in files {
        let mut annotations = Annotations::default();
        for expr in file {
            if let Some(ann) = expr.as_annotation() {
                annotations.add(path, &mut package, ann)?;
                continue;
            }
            let def = Definition::parse(expr)?;
            if annotations.skipped() {
                annotations = Annotations::default();
                continue;
            }
            match &def {
                Definition::Constant { name, ty, value, .. } => {
                    package.symbols.define(
                        name.name.clone(),
                        Symbol::Constant {
                            ty: ty.clone(),
                            value: value.clone(),
                            section: annotations.section.clone(),
                        },
                    );
                    package.constants.push(PackageConstant {
                        name: name.name.clone(),
                        ty: ty.clone(),
                        value: value.clone(),
                        section: annotations.section.clone(),
                    });
                }
                Definition::Func { sig, .. } | Definition::AsmFunc { sig, .. } => {
                    package
                        .symbols
                        .define(sig.name.clone(), Symbol::Function { sig: sig.clone() });
                }
            }
            annotations = Annotations::default();
        }
    }

    // Second pass: compile bodies.
    for file in files {
        let mut annotations = Annotations::default();
        for expr in file {
            if let Some(ann) = expr.as_annotation() {
                annotations.note(ann);
                continue;
            }
            let def = Definition::parse(expr)?;
            let skipped = annotations.skipped();
            let section = annotations.section.clone();
            annotations = Annotations::default();
            if skipped {
                continue;
            }
            match def {
                Definition::Constant { .. } => {}
                Definition::Func { sig, body, span } => {
                    let mut f =
                        compile_function(&package.symbols, abi.clone(), sig, body, span)?;
                    let steps = allocate(&f)?;
                    lower(&mut f, steps)?;
                    f.section = section;
                    package.functions.push(f);
                }
                Definition::AsmFunc { sig, body, span } => {
                    let mut f =
                        assemble_function(&package.symbols, &sig.name, body, span)?;
                    f.section = section;
                    package.functions.push(f);
                }
            }
        }
    }
    Ok(package)
}

// Annotations preceding a definition.
#[derive(Default)]
struct Annotations {
    arch: Option<String>,
    section: Option<String>,
}

impl Annotations {
    // Records an annotation during the signature pass, handling the
    // package-wide `base-address`.
    fn add(&mut self, path: &str, package: &mut Package, ann: &List) -> Result<(), Error> {
        let name = ann.head().and_then(Expr::as_ident).map(|i| i.name.as_str());
        if name == Some("base-address") {
            let value = ann
                .tail()
                .first()
                .and_then(Expr::as_number)
                .and_then(|n| u64::try_from(&n.value).ok())
                .ok_or_else(|| bad(ann.span.clone(), "invalid base-address"))?;
            if path != "main" {
                return Err(bad(
                    ann.span.clone(),
                    "base-address is only valid in the main package",
                ));
            }
            package.base_address = Some(value);
            return Ok(());
        }
        self.note(ann);
        Ok(())
    }

    // Records an annotation without package-level checks.
    fn note(&mut self, ann: &List) {
        let Some(name) = ann.head().and_then(Expr::as_ident) else {
            return;
        };
        match name.name.as_str() {
            "arch" => {
                self.arch = ann
                    .tail()
                    .first()
                    .and_then(Expr::as_ident)
                    .map(|i| i.name.clone());
            }
            "section" => {
                self.section = ann.tail().first().and_then(|e| match e {
                    Expr::Str(s) => Some(s.value.to_string()),
                    Expr::Ident(i) => Some(i.name.clone()),
                    _ => None,
                });
            }
            _ => {}
        }
    }

    fn skipped(&self) -> bool {
        matches!(&self.arch, Some(arch) if arch != ARCH)
    }
}

enum Definition<'a> {
    Constant {
        name: &'a Ident,
        ty: Type,
        value: Constant,
    },
    Func {
        sig: Arc<Signature>,
        body: &'a [Expr],
        span: Span,
    },
    AsmFunc {
        sig: Arc<Signature>,
        body: &'a [Expr],
        span: Span,
    },
}

fn bad(span: Span, message: &str) -> Error {
    Error::Package {
        span,
        message: message.to_string(),
    }
}

impl<'a> Definition<'a> {
    fn parse(expr: &'a Expr) -> Result<Self, Error> {
        let list = expr
            .as_list()
            .ok_or_else(|| bad(expr.span().clone(), "expected a definition"))?;
        let head = list
            .head()
            .and_then(Expr::as_ident)
            .ok_or_else(|| bad(list.span.clone(), "expected a definition"))?;
        match head.name.as_str() {
            "let" => Self::parse_constant(list),
            "func" => Self::parse_func(list),
            "asm-func" => Self::parse_asm_func(list),
            other => Err(bad(
                head.span.clone(),
                &format!("unknown definition {other}"),
            )),
        }
    }

    fn parse_constant(list: &'a List) -> Result<Self, Error> {
        let [target, value] = list.tail() else {
            return Err(bad(list.span.clone(), "let takes a name and a value"));
        };
        let name = target
            .as_ident()
            .ok_or_else(|| bad(target.span().clone(), "invalid let target"))?;
        let (ty, value) = match value {
            Expr::Number(n) => (Type::UntypedInt, Constant::Int(n.value.clone())),
            Expr::Str(s) => (Type::String, Constant::String(s.value.clone())),
            other => {
                return Err(bad(
                    other.span().clone(),
                    "package constants must be literals",
                ))
            }
        };
        Ok(Definition::Constant { name, ty, value })
    }

    fn parse_func(list: &'a List) -> Result<Self, Error> {
        let header = list
            .tail()
            .first()
            .and_then(Expr::as_list)
            .ok_or_else(|| bad(list.span.clone(), "func needs a signature"))?;
        let name = header
            .head()
            .and_then(Expr::as_ident)
            .ok_or_else(|| bad(header.span.clone(), "func needs a name"))?;
        let mut params = Vec::new();
        let mut result = None;
        for element in header.tail() {
            match element {
                Expr::List(param) => {
                    let (pname, ptype) = match &param.elements[..] {
                        [Expr::Ident(pname), Expr::Ident(ptype)] => (pname, ptype),
                        _ => {
                            return Err(bad(
                                param.span.clone(),
                                "parameters are (name type) pairs",
                            ))
                        }
                    };
                    let ty = Type::by_name(&ptype.name).ok_or_else(|| {
                        bad(ptype.span.clone(), &format!("unknown type {}", ptype.name))
                    })?;
                    params.push((pname.name.clone(), ty));
                }
                Expr::Ident(rtype) => {
                    if result.is_some() {
                        return Err(bad(rtype.span.clone(), "multiple result types"));
                    }
                    result = Some(Type::by_name(&rtype.name).ok_or_else(|| {
                        bad(rtype.span.clone(), &format!("unknown type {}", rtype.name))
                    })?);
                }
                other => return Err(bad(other.span().clone(), "invalid signature element")),
            }
        }
        Ok(Definition::Func {
            sig: Arc::new(Signature::new(name.name.clone(), params, result)),
            body: &list.elements[2..],
            span: list.span.clone(),
        })
    }

    fn parse_asm_func(list: &'a List) -> Result<Self, Error> {
        let name = match list.tail().first() {
            Some(Expr::Ident(name)) => name.name.clone(),
            Some(Expr::List(header)) => header
                .head()
                .and_then(Expr::as_ident)
                .ok_or_else(|| bad(header.span.clone(), "asm-func needs a name"))?
                .name
                .clone(),
            _ => return Err(bad(list.span.clone(), "asm-func needs a name")),
        };
        Ok(Definition::AsmFunc {
            sig: Arc::new(Signature::new(name, Vec::new(), None)),
            body: &list.elements[2..],
            span: list.span.clone(),
        })
    }
}
