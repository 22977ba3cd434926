use ruse_types::Span;

/// How a relocation's final value is computed by the linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum RelocKind {
    /// The symbol's absolute address.
    FullAddress,
    /// The symbol's address relative to the byte after the referencing
    /// instruction.
    RelativeAddress,
}

/// A symbolic reference left in emitted code for the linker to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    /// Source region of the referencing operand.
    pub span: Span,
    /// The referenced symbol, `<pkg-path>.<name>`.
    pub name: String,
    /// How the final value is computed.
    pub kind: RelocKind,
    /// Width of the patched field in bits.
    pub bits: u8,
    /// Byte offset of the patched field within the function.
    ///
    /// Until instruction lengths are known this temporarily holds the
    /// instruction index; the assembler and lowerer rewrite it.
    pub offset: usize,
    /// Byte offset of the first byte after the referencing instruction.
    pub address: usize,
}

impl Relocation {
    /// A relocation for `name`, with offsets still to be resolved.
    pub fn new(span: Span, name: impl Into<String>, kind: RelocKind, bits: u8) -> Self {
        Relocation {
            span,
            name: name.into(),
            kind,
            bits,
            offset: 0,
            address: 0,
        }
    }
}
