//! Vector and predicate-vector registers.
//!
//! Both are accessed through containers. A source read snapshots the
//! register into `tmp_s<i>`; a destination gets a writable reference
//! `tmp_d<i>` bound ahead of the read, and all mutation happens through
//! that reference. The write step only traces the final value.
//!
//! Under predication the slot is a runtime counter, and the staging
//! names become `tmp_s_<name>` and `tmp_d_<name>`.

use super::{register, require_idx, OperandCodegen};
use crate::error::{OperandError, Result};
use crate::operand::{ActiveElem, IndexRef, Operand, RegIndexAlloc, Role};

pub struct VectorCodegen {
    container: &'static str,
    /// Supports element-typed views and named elements.
    elements: bool,
}

pub static VEC_REG: VectorCodegen = VectorCodegen {
    container: "VecRegContainer",
    elements: true,
};

pub static VEC_PRED_REG: VectorCodegen = VectorCodegen {
    container: "VecPredRegContainer",
    elements: false,
};

/// Index expression and C++ type of an active element.
fn elem_info<'o>(
    op: &'o Operand,
    elem: &ActiveElem,
) -> Result<(&'o str, &'o str)> {
    let def = op.desc().elem(&elem.name)?;
    let ext = elem.ext.as_deref().unwrap_or(&def.ext);
    Ok((def.index.as_str(), op.ctx().ctype(ext)?))
}

/// Name of a staging container. Runtime counters change on every use,
/// so predicated operands are named after the operand instead.
fn staging(prefix: &str, op: &Operand, idx: IndexRef) -> String {
    match idx {
        IndexRef::Static(i) => format!("{prefix}{i}"),
        IndexRef::Runtime(_) => format!("{prefix}_{}", op.base_name()),
    }
}

impl VectorCodegen {
    fn active_elems<'o>(&self, op: &'o Operand) -> Result<&'o [ActiveElem]> {
        let elems = op.active_elems();
        if !self.elements && !elems.is_empty() {
            return Err(OperandError::elems(
                op.full_name(),
                "predicate registers have no elements",
            ));
        }
        Ok(elems)
    }

    /// One typed view per requested extension.
    fn views(&self, op: &Operand, tmp: &str, name: &str) -> Result<String> {
        let mut exts = Vec::new();
        if self.elements {
            exts.extend(op.elem_ext());
        }
        exts.extend(op.ext());
        let mut out = String::new();
        for ext in exts {
            let ctype = op.ctx().ctype(ext)?;
            out.push_str(&format!("\t\tauto {name} = {tmp}.as<{ctype}>();\n"));
        }
        Ok(out)
    }
}

impl OperandCodegen for VectorCodegen {
    fn constructor(
        &self,
        op: &Operand,
        alloc: &RegIndexAlloc,
    ) -> Result<String> {
        Ok(register(op, alloc, true, true))
    }

    /// Only pure sources declare element variables; destinations bind
    /// them by reference in the writable read.
    fn decl(&self, op: &Operand) -> Result<String> {
        if !self.elements || !op.is_src() || op.is_dest() {
            return Ok(String::new());
        }
        let name = op.base_name();
        let mut c_decl = format!("\t/* Vars for {name} */");
        for elem in self.active_elems(op)? {
            let (_, ctype) = elem_info(op, elem)?;
            c_decl.push_str(&format!("\n\t{ctype} {} = 0;", elem.name));
        }
        c_decl.push_str(&format!("\n\t/* End vars for {name} */\n"));
        Ok(c_decl)
    }

    fn read(
        &self,
        op: &Operand,
        _pred_read: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        let idx = require_idx(op, idx, Role::Src)?;
        let container = op.ctx().qualify(self.container);
        let name = if op.is_dest() {
            format!("{}_merger", op.base_name())
        } else {
            op.base_name().to_string()
        };
        let tmp = staging("tmp_s", op, idx);
        let mut c_read = format!(
            "\t\t{container} {tmp};\n\
             \t\txc->getRegOperand(this, {idx}, &{tmp});\n"
        );
        c_read.push_str(&self.views(op, &tmp, &name)?);
        // Elements slice the `{name}` view bound above. Without any
        // extension there is no view and the assembler binds `{name}`.
        for elem in self.active_elems(op)? {
            let (index, _) = elem_info(op, elem)?;
            c_read.push_str(&format!("\t\t{} = {name}[{index}];\n", elem.name));
        }
        Ok(c_read)
    }

    fn read_writable(
        &self,
        op: &Operand,
        _pred_write: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        let idx = require_idx(op, idx, Role::Dest)?;
        let container = op.ctx().qualify(self.container);
        let name = op.base_name();
        let tmp = staging("tmp_d", op, idx);
        let mut c_readw = format!(
            "\t\tauto &{tmp} =\n\
             \t\t    *({container} *)\n\
             \t\t    xc->getWritableRegOperand(this, {idx});\n"
        );
        c_readw.push_str(&self.views(op, &tmp, name)?);
        for elem in self.active_elems(op)? {
            let (index, ctype) = elem_info(op, elem)?;
            c_readw.push_str(&format!(
                "\t\t{ctype}& {} = {name}[{index}];\n",
                elem.name
            ));
        }
        Ok(c_readw)
    }

    fn write(
        &self,
        op: &Operand,
        _pred_write: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        let idx = require_idx(op, idx, Role::Dest)?;
        let tmp = staging("tmp_d", op, idx);
        Ok(format!(
            "\n\t\tif (traceData) {{\n\
             \t\t\ttraceData->setData({tmp});\n\
             \t\t}}\n"
        ))
    }
}
