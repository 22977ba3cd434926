use crate::buffer::CodeBuffer;
use crate::encode::{encode, EncodeError};
use crate::mode::Mode;
use crate::operand::Operand;
use crate::table::Form;

/// One concrete instruction: a chosen form plus its resolved operands and
/// prefix state.
#[derive(Debug, Clone, PartialEq)]
pub struct Insn {
    /// The instruction form being encoded.
    pub form: &'static Form,
    /// Resolved operands, one per form parameter.
    pub args: Vec<Operand>,
    /// Legacy prefixes requested in the assembly source.
    pub prefixes: Vec<u8>,
    /// Whether a `rex.w` prefix was requested explicitly.
    pub rex_w: bool,
    /// EVEX mask register, `0` for none.
    pub mask: u8,
    /// EVEX zeroing.
    pub zero: bool,
    /// EVEX broadcast.
    pub broadcast: bool,
    /// Encoded length in bytes, set by a preliminary encode.
    pub len: u8,
}

impl Insn {
    /// An instruction of `form` with no operands resolved yet.
    pub fn new(form: &'static Form) -> Self {
        Insn {
            form,
            args: Vec::new(),
            prefixes: Vec::new(),
            rex_w: false,
            mask: 0,
            zero: false,
            broadcast: false,
            len: 0,
        }
    }

    /// An instruction of `form` with the given operands.
    pub fn with_args(form: &'static Form, args: Vec<Operand>) -> Self {
        Insn {
            args,
            ..Insn::new(form)
        }
    }

    /// Encodes into `buf`, which is reset first.
    pub fn encode_into(&self, buf: &mut CodeBuffer, mode: Mode) -> Result<(), EncodeError> {
        encode(buf, mode, self)
    }

    /// Encodes into `buf` and records the resulting length.
    pub fn measure(&mut self, buf: &mut CodeBuffer, mode: Mode) -> Result<usize, EncodeError> {
        encode(buf, mode, self)?;
        let len = buf.len();
        self.len = len as u8;
        Ok(len)
    }
}
