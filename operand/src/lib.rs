//! Operand compiler for instruction-set descriptions.
//!
//! Turns a declarative description of one instruction operand into the
//! C++ fragments that register its register index, declare its local
//! variable, read it before execution and write it back afterwards.
//!
//! The lifecycle has two phases. An [`Operand`] is created per use of a
//! shared [`OperandDesc`] and resolves its type immediately; once the
//! instruction's register indices are allocated it is consumed by
//! [`Operand::finalize`], which yields a [`FinalizedOperand`].

pub mod codegen;
pub mod config;
pub mod context;
pub mod desc;
pub mod error;
pub mod flags;
pub mod operand;

pub use config::{IsaConfig, OperandEntry, OperandTable};
pub use context::IsaContext;
pub use desc::{
    DescBuilder, ElemDef, ElemSpec, OperandDesc, OperandOverrides, RegSpec,
    StorageKind,
};
pub use error::{OperandError, Result};
pub use flags::{canonicalize, FlagSet, FlagSpec, FlagTriple};
pub use operand::{
    ActiveElem, FinalizedOperand, IndexRef, Operand, RegIndexAlloc, Role,
};
