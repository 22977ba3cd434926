use std::sync::Arc;

use num_bigint::BigInt;

use crate::position::Span;

/// Stable identity of a syntax node within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// A plain identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    /// Node identity.
    pub id: NodeId,
    /// Source region.
    pub span: Span,
    /// Identifier text.
    pub name: String,
}

/// A package-qualified identifier, `package.name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qualified {
    /// Node identity.
    pub id: NodeId,
    /// Source region.
    pub span: Span,
    /// Qualifier before the dot.
    pub package: String,
    /// Name after the dot.
    pub name: String,
}

/// An integer literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLit {
    /// Node identity.
    pub id: NodeId,
    /// Source region.
    pub span: Span,
    /// The literal value, arbitrary precision.
    pub value: BigInt,
}

/// A string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    /// Node identity.
    pub id: NodeId,
    /// Source region.
    pub span: Span,
    /// The literal value with escapes resolved.
    pub value: Arc<str>,
}

/// A parenthesised list of expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct List {
    /// Node identity.
    pub id: NodeId,
    /// Source region, brackets included.
    pub span: Span,
    /// The list elements.
    pub elements: Vec<Expr>,
}

impl List {
    /// The first element, if the list is non-empty.
    pub fn head(&self) -> Option<&Expr> {
        self.elements.first()
    }

    /// The elements after the first.
    pub fn tail(&self) -> &[Expr] {
        self.elements.get(1..).unwrap_or(&[])
    }
}

/// An S-expression, as produced by the external parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `name`
    Ident(Ident),
    /// `package.name`
    Qualified(Qualified),
    /// `123`, `0x7f`
    Number(NumberLit),
    /// `"text"`
    Str(StringLit),
    /// `(a b c)`
    List(List),
    /// `'expr`; labels and annotations.
    Quote(Span, Box<Expr>),
}

impl Expr {
    /// Source region of this expression.
    pub fn span(&self) -> &Span {
        match self {
            Expr::Ident(x) => &x.span,
            Expr::Qualified(x) => &x.span,
            Expr::Number(x) => &x.span,
            Expr::Str(x) => &x.span,
            Expr::List(x) => &x.span,
            Expr::Quote(span, _) => span,
        }
    }

    /// This expression as an identifier.
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(x) => Some(x),
            _ => None,
        }
    }

    /// This expression as a list.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Expr::List(x) => Some(x),
            _ => None,
        }
    }

    /// This expression as an integer literal.
    pub fn as_number(&self) -> Option<&NumberLit> {
        match self {
            Expr::Number(x) => Some(x),
            _ => None,
        }
    }

    /// This expression as a string literal.
    pub fn as_str(&self) -> Option<&StringLit> {
        match self {
            Expr::Str(x) => Some(x),
            _ => None,
        }
    }

    /// The quoted expression, if this is a quote.
    pub fn as_quote(&self) -> Option<&Expr> {
        match self {
            Expr::Quote(_, inner) => Some(inner),
            _ => None,
        }
    }

    /// A quoted list, `'(mode 64)`; the shape annotations take.
    pub fn as_annotation(&self) -> Option<&List> {
        self.as_quote().and_then(Expr::as_list)
    }

    /// A quoted identifier, `'label`; the shape labels take.
    pub fn as_label(&self) -> Option<&Ident> {
        self.as_quote().and_then(Expr::as_ident)
    }
}
