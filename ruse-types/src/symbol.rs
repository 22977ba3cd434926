use std::collections::HashMap;
use std::sync::Arc;

use crate::constant::Constant;
use crate::types::{Signature, Type};

/// A package-level definition visible to the back end.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    /// A constant with its resolved type and value.
    Constant {
        /// Resolved type.
        ty: Type,
        /// Resolved value.
        value: Constant,
        /// Section override from a `section` annotation.
        section: Option<String>,
    },
    /// A function or assembly function.
    Function {
        /// The function's signature.
        sig: Arc<Signature>,
    },
}

/// The symbol table for one package, as produced by the type checker.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    path: String,
    entries: HashMap<String, Symbol>,
}

impl SymbolTable {
    /// An empty table for the package at `path`.
    pub fn new(path: impl Into<String>) -> Self {
        SymbolTable {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    /// The package import path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The linker-visible name for `name`, `<pkg-path>.<name>`.
    pub fn symbol_name(&self, name: &str) -> String {
        format!("{}.{}", self.path, name)
    }

    /// Records a definition, replacing any previous one of the same name.
    ///
    /// Duplicate detection is the type checker's job; the back end accepts
    /// whatever it is handed.
    pub fn define(&mut self, name: impl Into<String>, symbol: Symbol) {
        self.entries.insert(name.into(), symbol);
    }

    /// Looks up a definition by unqualified name.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.entries.get(name)
    }

    /// Looks up a constant definition by unqualified name.
    pub fn constant(&self, name: &str) -> Option<(&Type, &Constant)> {
        match self.entries.get(name) {
            Some(Symbol::Constant { ty, value, .. }) => Some((ty, value)),
            _ => None,
        }
    }

    /// Looks up a function signature by unqualified name.
    pub fn function(&self, name: &str) -> Option<&Arc<Signature>> {
        match self.entries.get(name) {
            Some(Symbol::Function { sig }) => Some(sig),
            _ => None,
        }
    }

    /// Iterates over all definitions in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc as StdArc;

    #[test]
    fn symbol_names_are_path_qualified() {
        let table = SymbolTable::new("kernel/syscalls");
        assert_eq!(table.symbol_name("handler"), "kernel/syscalls.handler");
    }

    #[test]
    fn constants_resolve() {
        let mut table = SymbolTable::new("test");
        table.define(
            "hw",
            Symbol::Constant {
                ty: Type::String,
                value: Constant::String(StdArc::from("Hello, world!")),
                section: None,
            },
        );
        let (ty, value) = table.constant("hw").unwrap();
        assert_eq!(*ty, Type::String);
        assert_eq!(value.as_str(), Some("Hello, world!"));
        assert!(table.function("hw").is_none());
    }
}
