//! Calling-convention descriptors.
//!
//! An ABI lists where parameters and results live and which registers a
//! callee may clobber. The descriptor is data, normally provided by a
//! constant declaration in the source tree; the back end only reads it.

use std::sync::Arc;

use ruse_asm::Reg;
use ruse_types::{Signature, Type};

use crate::location::Location;

/// A calling convention.
#[derive(Debug, Clone, PartialEq)]
pub struct Abi {
    /// Registers that carry parameters, in order.
    pub params: Vec<&'static Reg>,
    /// Registers that carry results, in order.
    pub result: Vec<&'static Reg>,
    /// Registers the callee may clobber.
    pub scratch: Vec<&'static Reg>,
    /// Registers the convention never uses.
    pub unused: Vec<&'static Reg>,
    /// The stack pointer register.
    pub stack_pointer: &'static Reg,
    /// Whether the stack grows downwards.
    pub inverted_stack: bool,
}

/// An invalid ABI description.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AbiError {
    /// The same register appears twice in the parameter list.
    #[error("parameter register {0} is not distinct")]
    DuplicateParameter(&'static str),
    /// The stack pointer carries a parameter.
    #[error("the stack pointer {0} cannot carry a parameter")]
    StackPointerParameter(&'static str),
    /// A result does not fit the convention's result registers.
    #[error("result of type {0} does not fit the result registers")]
    ResultTooLarge(Type),
    /// The same register appears twice in the scratch set.
    #[error("scratch register {0} is not distinct")]
    DuplicateScratch(&'static str),
    /// The stack pointer is listed as scratch.
    #[error("the stack pointer {0} cannot be a scratch register")]
    StackPointerScratch(&'static str),
}

fn gp64(name: &str) -> &'static Reg {
    Reg::by_name(name).expect("register table is complete")
}

impl Abi {
    /// The System V AMD64 calling convention, the default for compiled
    /// functions.
    pub fn system_v() -> Arc<Abi> {
        Arc::new(Abi {
            params: ["rdi", "rsi", "rdx", "rcx", "r8", "r9"]
                .iter()
                .map(|n| gp64(n))
                .collect(),
            result: vec![gp64("rax"), gp64("rdx")],
            scratch: ["rax", "rdi", "rsi", "rdx", "rcx", "r8", "r9", "r10", "r11"]
                .iter()
                .map(|n| gp64(n))
                .collect(),
            unused: Vec::new(),
            stack_pointer: gp64("rsp"),
            inverted_stack: true,
        })
    }

    /// Checks the structural invariants of the description.
    ///
    /// Parameter registers must be distinct and must not include the
    /// stack pointer; the scratch set must be distinct and disjoint from
    /// the stack pointer too, or the allocator would dodge values into a
    /// register a call is about to clobber.
    pub fn validate(&self) -> Result<(), AbiError> {
        for (i, a) in self.params.iter().enumerate() {
            if a.num == self.stack_pointer.num {
                return Err(AbiError::StackPointerParameter(a.name));
            }
            for b in &self.params[i + 1..] {
                if a.num == b.num {
                    return Err(AbiError::DuplicateParameter(a.name));
                }
            }
        }
        for (i, a) in self.scratch.iter().enumerate() {
            if a.num == self.stack_pointer.num {
                return Err(AbiError::StackPointerScratch(a.name));
            }
            for b in &self.scratch[i + 1..] {
                if a.num == b.num {
                    return Err(AbiError::DuplicateScratch(a.name));
                }
            }
        }
        Ok(())
    }

    /// Whether `reg` is clobbered by a call under this convention.
    pub fn is_scratch(&self, reg: &'static Reg) -> bool {
        self.scratch.iter().any(|s| s.num == reg.num)
    }

    /// The locations each parameter of `sig` occupies.
    ///
    /// A parameter consumes one register per word-sized chunk of its type;
    /// a string takes two consecutive slots. Once the register list is
    /// exhausted, parameters continue on the stack above the return
    /// address.
    pub fn parameters(&self, sig: &Signature) -> Result<Vec<Vec<Location>>, AbiError> {
        let mut next = 0usize;
        let mut stack_offset = 8i64;
        let mut out = Vec::with_capacity(sig.params.len());
        for (_, ty) in &sig.params {
            let mut locs = Vec::new();
            for chunk in chunk_bits(ty) {
                if let Some(reg) = self.params.get(next) {
                    next += 1;
                    locs.push(Location::Register(sized(reg, chunk)));
                } else {
                    locs.push(Location::Stack {
                        base: self.stack_pointer,
                        offset: stack_offset,
                    });
                    stack_offset += 8;
                }
            }
            out.push(locs);
        }
        Ok(out)
    }

    /// The locations a result of type `ty` occupies.
    pub fn result_locations(&self, ty: &Type) -> Result<Vec<Location>, AbiError> {
        let chunks = chunk_bits(ty);
        if chunks.len() > self.result.len() {
            return Err(AbiError::ResultTooLarge(ty.clone()));
        }
        Ok(chunks
            .iter()
            .zip(&self.result)
            .map(|(&bits, reg)| Location::Register(sized(reg, bits)))
            .collect())
    }
}

// The width in bits of each register-sized component of `ty`.
fn chunk_bits(ty: &Type) -> Vec<u16> {
    match ty {
        Type::String | Type::UntypedString => vec![64, 64],
        ty => {
            let bits = (ty.size() * 8).min(64) as u16;
            vec![bits]
        }
    }
}

// The sub-register of `reg` with the given width.
fn sized(reg: &'static Reg, bits: u16) -> &'static Reg {
    Reg::gp(reg.num, bits).unwrap_or(reg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sig(params: Vec<Type>, result: Option<Type>) -> Signature {
        Signature::new(
            "f",
            params
                .into_iter()
                .enumerate()
                .map(|(i, ty)| (format!("p{i}"), ty))
                .collect(),
            result,
        )
    }

    #[test]
    fn default_abi_is_valid() {
        Abi::system_v().validate().unwrap();
    }

    #[test]
    fn parameters_use_sized_subregisters() {
        let abi = Abi::system_v();
        let locs = abi
            .parameters(&sig(vec![Type::Int8, Type::Int64], None))
            .unwrap();
        assert_eq!(locs[0], vec![Location::Register(gp64("dil"))]);
        assert_eq!(locs[1], vec![Location::Register(gp64("rsi"))]);
    }

    #[test]
    fn strings_occupy_two_slots() {
        let abi = Abi::system_v();
        let locs = abi
            .parameters(&sig(vec![Type::String, Type::Int32], None))
            .unwrap();
        assert_eq!(
            locs[0],
            vec![
                Location::Register(gp64("rdi")),
                Location::Register(gp64("rsi")),
            ]
        );
        assert_eq!(locs[1], vec![Location::Register(gp64("edx"))]);
    }

    #[test]
    fn excess_parameters_spill_to_the_stack() {
        let abi = Abi::system_v();
        let locs = abi
            .parameters(&sig(vec![Type::Int64; 8], None))
            .unwrap();
        assert_eq!(
            locs[6],
            vec![Location::Stack {
                base: gp64("rsp"),
                offset: 8,
            }]
        );
        assert_eq!(
            locs[7],
            vec![Location::Stack {
                base: gp64("rsp"),
                offset: 16,
            }]
        );
    }

    #[test]
    fn result_locations() {
        let abi = Abi::system_v();
        assert_eq!(
            abi.result_locations(&Type::Int8).unwrap(),
            vec![Location::Register(gp64("al"))]
        );
        assert_eq!(
            abi.result_locations(&Type::String).unwrap(),
            vec![
                Location::Register(gp64("rax")),
                Location::Register(gp64("rdx")),
            ]
        );
    }

    #[test]
    fn rejects_stack_pointer_parameters() {
        let mut abi = (*Abi::system_v()).clone();
        abi.params.push(gp64("rsp"));
        assert_eq!(
            abi.validate(),
            Err(AbiError::StackPointerParameter("rsp"))
        );
    }

    #[test]
    fn rejects_duplicate_parameters() {
        let mut abi = (*Abi::system_v()).clone();
        abi.params.push(gp64("rdi"));
        assert_eq!(abi.validate(), Err(AbiError::DuplicateParameter("rdi")));
    }

    #[test]
    fn rejects_duplicate_scratch_registers() {
        let mut abi = (*Abi::system_v()).clone();
        abi.scratch.push(gp64("r11"));
        assert_eq!(abi.validate(), Err(AbiError::DuplicateScratch("r11")));
    }

    #[test]
    fn rejects_the_stack_pointer_as_scratch() {
        let mut abi = (*Abi::system_v()).clone();
        abi.scratch.push(gp64("rsp"));
        assert_eq!(abi.validate(), Err(AbiError::StackPointerScratch("rsp")));
    }
}
