//! Code generators, one per storage kind.
//!
//! Each generator is a pure function of the operand, its role,
//! predication and index reference, so fragments can be produced and
//! checked without assembling a whole instruction.

mod ctrl;
mod mem;
mod reg;
mod vec;

pub use ctrl::ControlReg;
pub use mem::{Mem, PcState};
pub use reg::RegVal;
pub use vec::{VectorCodegen, VEC_PRED_REG, VEC_REG};

use crate::desc::StorageKind;
use crate::error::{OperandError, Result};
use crate::operand::{IndexRef, Operand, RegIndexAlloc, Role};

/// The four-fragment contract every storage kind implements.
pub trait OperandCodegen: Sync {
    /// Reject operands this kind cannot compile. Runs when the operand
    /// is created.
    fn check(&self, _op: &Operand) -> Result<()> {
        Ok(())
    }

    /// Read and write code addresses a register slot.
    fn needs_index(&self) -> bool {
        true
    }

    fn constructor(
        &self,
        op: &Operand,
        alloc: &RegIndexAlloc,
    ) -> Result<String>;

    fn decl(&self, op: &Operand) -> Result<String>;

    fn read(
        &self,
        op: &Operand,
        pred_read: bool,
        idx: Option<IndexRef>,
    ) -> Result<String>;

    /// Bindings a destination needs ahead of the source read.
    fn read_writable(
        &self,
        _op: &Operand,
        _pred_write: bool,
        _idx: Option<IndexRef>,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn write(
        &self,
        op: &Operand,
        pred_write: bool,
        idx: Option<IndexRef>,
    ) -> Result<String>;
}

pub fn for_kind(kind: StorageKind) -> &'static dyn OperandCodegen {
    match kind {
        StorageKind::IntReg
        | StorageKind::FloatReg
        | StorageKind::CcReg
        | StorageKind::VecElem => &RegVal,
        StorageKind::VecReg => &VEC_REG,
        StorageKind::VecPredReg => &VEC_PRED_REG,
        StorageKind::ControlReg => &ControlReg,
        StorageKind::Mem => &Mem,
        StorageKind::PcState => &PcState,
    }
}

// ── Shared helpers ─────────────────────────────────────────────

fn require_idx(
    op: &Operand,
    idx: Option<IndexRef>,
    role: Role,
) -> Result<IndexRef> {
    idx.ok_or_else(|| OperandError::FinalizeOrderingViolation {
        operand: op.full_name().to_string(),
        role: role.name(),
    })
}

/// Substitute `{key}` placeholders in an override template.
fn expand(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (key, val)| {
        acc.replace(&format!("{{{key}}}"), val)
    })
}

fn guard(pred: &str, body: &str) -> String {
    format!("\n\tif ({pred}) {{{body}\n\t}}")
}

/// Source/destination index registration for the instruction
/// constructor. `typed` also bumps the per-class destination count;
/// `guarded` wraps each role in its predicate.
fn register(
    op: &Operand,
    alloc: &RegIndexAlloc,
    typed: bool,
    guarded: bool,
) -> String {
    let mut c_src = String::new();
    let mut c_dest = String::new();

    if op.is_src() {
        let id = op.reg_id(Role::Src);
        c_src = match alloc.src_idx.filter(|_| !alloc.pred_read) {
            Some(i) => {
                format!("\n\tsetSrcRegIdx({i}, {id});\n\t_numSrcRegs++;")
            }
            None => format!("\n\tsetSrcRegIdx(_numSrcRegs++, {id});"),
        };
        if let (true, Some(pred)) = (guarded, op.desc().read_predicate()) {
            c_src = guard(pred, &c_src);
        }
    }

    if op.is_dest() {
        let id = op.reg_id(Role::Dest);
        c_dest = match alloc.dest_idx.filter(|_| !alloc.pred_write) {
            Some(i) => {
                format!("\n\tsetDestRegIdx({i}, {id});\n\t_numDestRegs++;")
            }
            None => format!("\n\tsetDestRegIdx(_numDestRegs++, {id});"),
        };
        if let (true, Some(class)) = (typed, op.desc().kind().reg_class()) {
            c_dest.push_str(&format!("\n\t_numTypedDestRegs[{class}]++;"));
        }
        if let (true, Some(pred)) = (guarded, op.desc().write_predicate()) {
            c_dest = guard(pred, &c_dest);
        }
    }

    c_src + &c_dest
}
