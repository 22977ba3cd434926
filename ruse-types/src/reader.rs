//! A minimal S-expression reader.
//!
//! The production front end has its own lexer and parser; this reader exists
//! so test suites can state their inputs as source text. It understands just
//! enough of the surface syntax: lists, quotes, identifiers (qualified
//! included), decimal and hexadecimal integers, and escaped strings.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::ast::{Expr, Ident, List, NodeId, NumberLit, Qualified, StringLit};
use crate::position::Span;

/// A syntax error produced by the reader.
#[derive(Debug, thiserror::Error)]
#[error("{span}: {message}")]
pub struct ReadError {
    /// Where the error was noticed.
    pub span: Span,
    /// What went wrong.
    pub message: String,
}

/// Reads every top-level expression in `source`.
pub fn read(file: &str, source: &str) -> Result<Vec<Expr>, ReadError> {
    let mut reader = Reader {
        file: Arc::from(file),
        source: source.as_bytes(),
        offset: 0,
        line: 1,
        column: 1,
        next_id: 0,
    };
    let mut exprs = Vec::new();
    loop {
        reader.skip_space();
        if reader.at_end() {
            return Ok(exprs);
        }
        exprs.push(reader.expr()?);
    }
}

struct Reader<'a> {
    file: Arc<str>,
    source: &'a [u8],
    offset: usize,
    line: u32,
    column: u32,
    next_id: u32,
}

impl Reader<'_> {
    fn at_end(&self) -> bool {
        self.offset >= self.source.len()
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.offset += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_space(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.bump();
                }
                b';' => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    fn id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn span_from(&self, offset: usize, line: u32, column: u32) -> Span {
        Span::new(self.file.clone(), offset, self.offset, line, column)
    }

    fn error(&self, span: Span, message: impl Into<String>) -> ReadError {
        ReadError {
            span,
            message: message.into(),
        }
    }

    fn expr(&mut self) -> Result<Expr, ReadError> {
        let (offset, line, column) = (self.offset, self.line, self.column);
        match self.peek() {
            None => Err(self.error(
                self.span_from(offset, line, column),
                "unexpected end of input",
            )),
            Some(b'(') => self.list(),
            Some(b'\'') => {
                self.bump();
                self.skip_space();
                let inner = self.expr()?;
                let span = self.span_from(offset, line, column);
                Ok(Expr::Quote(span, Box::new(inner)))
            }
            Some(b'"') => self.string(),
            Some(b')') => Err(self.error(self.span_from(offset, line, column), "unexpected `)`")),
            Some(b) if b.is_ascii_digit() => self.number(false),
            Some(b'-') if matches!(self.source.get(self.offset + 1), Some(d) if d.is_ascii_digit()) => {
                self.bump();
                self.number(true)
            }
            Some(_) => self.ident(),
        }
    }

    fn list(&mut self) -> Result<Expr, ReadError> {
        let (offset, line, column) = (self.offset, self.line, self.column);
        self.bump(); // (
        let mut elements = Vec::new();
        loop {
            self.skip_space();
            match self.peek() {
                None => {
                    return Err(
                        self.error(self.span_from(offset, line, column), "unterminated list")
                    )
                }
                Some(b')') => {
                    self.bump();
                    let span = self.span_from(offset, line, column);
                    return Ok(Expr::List(List {
                        id: self.id(),
                        span,
                        elements,
                    }));
                }
                Some(_) => elements.push(self.expr()?),
            }
        }
    }

    fn number(&mut self, negative: bool) -> Result<Expr, ReadError> {
        let (offset, line, column) = (self.offset, self.line, self.column);
        let start = self.offset;
        let hex = self.peek() == Some(b'0')
            && matches!(self.source.get(self.offset + 1), Some(&b'x') | Some(&b'X'));
        if hex {
            self.bump();
            self.bump();
        }
        let digits_start = self.offset;
        while let Some(b) = self.peek() {
            if b.is_ascii_hexdigit() || b == b'_' {
                self.bump();
            } else {
                break;
            }
        }
        let text: String = core::str::from_utf8(&self.source[digits_start..self.offset])
            .expect("digits are ASCII")
            .chars()
            .filter(|&c| c != '_')
            .collect();
        let radix = if hex { 16 } else { 10 };
        let span = self.span_from(if negative { start - 1 } else { offset }, line, column);
        let magnitude = BigInt::parse_bytes(text.as_bytes(), radix)
            .ok_or_else(|| self.error(span.clone(), format!("invalid number `{text}`")))?;
        let value = if negative { -magnitude } else { magnitude };
        Ok(Expr::Number(NumberLit {
            id: self.id(),
            span,
            value,
        }))
    }

    fn string(&mut self) -> Result<Expr, ReadError> {
        let (offset, line, column) = (self.offset, self.line, self.column);
        self.bump(); // "
        let mut value = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(
                        self.error(self.span_from(offset, line, column), "unterminated string")
                    )
                }
                Some(b'"') => {
                    let span = self.span_from(offset, line, column);
                    return Ok(Expr::Str(StringLit {
                        id: self.id(),
                        span,
                        value: Arc::from(value),
                    }));
                }
                Some(b'\\') => match self.bump() {
                    Some(b'n') => value.push('\n'),
                    Some(b't') => value.push('\t'),
                    Some(b'"') => value.push('"'),
                    Some(b'\\') => value.push('\\'),
                    other => {
                        return Err(self.error(
                            self.span_from(offset, line, column),
                            format!("invalid escape `\\{}`", other.map(char::from).unwrap_or(' ')),
                        ))
                    }
                },
                Some(b) => value.push(char::from(b)),
            }
        }
    }

    fn ident(&mut self) -> Result<Expr, ReadError> {
        let (offset, line, column) = (self.offset, self.line, self.column);
        let start = self.offset;
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b'(' | b')' | b'\'' | b'"' | b';' => break,
                _ => {
                    self.bump();
                }
            }
        }
        let text = core::str::from_utf8(&self.source[start..self.offset])
            .map_err(|_| {
                self.error(
                    self.span_from(offset, line, column),
                    "identifier is not valid UTF-8",
                )
            })?
            .to_string();
        let span = self.span_from(offset, line, column);
        if let Some(dot) = text.find('.') {
            let (package, name) = text.split_at(dot);
            return Ok(Expr::Qualified(Qualified {
                id: self.id(),
                span,
                package: package.to_string(),
                name: name[1..].to_string(),
            }));
        }
        Ok(Expr::Ident(Ident {
            id: self.id(),
            span,
            name: text,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_nested_lists() {
        let exprs = read("t.ruse", "(mov cl 1) (xchg rax rax)").unwrap();
        assert_eq!(exprs.len(), 2);
        let list = exprs[0].as_list().unwrap();
        assert_eq!(list.elements.len(), 3);
        assert_eq!(list.head().unwrap().as_ident().unwrap().name, "mov");
        assert_eq!(
            list.elements[2].as_number().unwrap().value,
            BigInt::from(1)
        );
    }

    #[test]
    fn reads_quotes_and_labels() {
        let exprs = read("t.ruse", "'foo '(mode 64)").unwrap();
        assert_eq!(exprs[0].as_label().unwrap().name, "foo");
        let ann = exprs[1].as_annotation().unwrap();
        assert_eq!(ann.head().unwrap().as_ident().unwrap().name, "mode");
    }

    #[test]
    fn reads_numbers() {
        let exprs = read("t.ruse", "0x7f -12 1_000").unwrap();
        assert_eq!(exprs[0].as_number().unwrap().value, BigInt::from(0x7f));
        assert_eq!(exprs[1].as_number().unwrap().value, BigInt::from(-12));
        assert_eq!(exprs[2].as_number().unwrap().value, BigInt::from(1000));
    }

    #[test]
    fn reads_qualified_identifiers() {
        let exprs = read("t.ruse", "strings.length rex.w").unwrap();
        let q = match &exprs[0] {
            Expr::Qualified(q) => q,
            other => panic!("expected qualified identifier, got {other:?}"),
        };
        assert_eq!(q.package, "strings");
        assert_eq!(q.name, "length");
        assert!(matches!(&exprs[1], Expr::Qualified(q) if q.package == "rex" && q.name == "w"));
    }

    #[test]
    fn reads_strings_with_escapes() {
        let exprs = read("t.ruse", r#""Hello, world!" "a\"b""#).unwrap();
        assert_eq!(&*exprs[0].as_str().unwrap().value, "Hello, world!");
        assert_eq!(&*exprs[1].as_str().unwrap().value, "a\"b");
    }

    #[test]
    fn positions_track_lines() {
        let exprs = read("t.ruse", "(nop)\n  (ret)").unwrap();
        let span = exprs[1].span();
        assert_eq!(span.line, 2);
        assert_eq!(span.column, 3);
    }

    #[test]
    fn comments_are_skipped() {
        let exprs = read("t.ruse", "; header\n(nop) ; trailing\n").unwrap();
        assert_eq!(exprs.len(), 1);
    }
}
