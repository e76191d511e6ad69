//! Control/status registers.

use super::{expand, register, require_idx, OperandCodegen};
use crate::error::{OperandError, Result};
use crate::operand::{IndexRef, Operand, RegIndexAlloc, Role};

pub struct ControlReg;

fn int_only(op: &Operand, ctype: &str) -> Result<()> {
    if matches!(ctype, "float" | "double") {
        return Err(OperandError::InvalidControlRegisterType {
            operand: op.full_name().to_string(),
            ctype: ctype.to_string(),
        });
    }
    Ok(())
}

impl OperandCodegen for ControlReg {
    fn check(&self, op: &Operand) -> Result<()> {
        match op.ctype() {
            Ok(ctype) => int_only(op, ctype),
            // Without a type there is nothing to reject yet.
            Err(_) => Ok(()),
        }
    }

    fn constructor(
        &self,
        op: &Operand,
        alloc: &RegIndexAlloc,
    ) -> Result<String> {
        Ok(register(op, alloc, false, false))
    }

    fn decl(&self, op: &Operand) -> Result<String> {
        Ok(format!("{} {} = 0;\n", op.ctype()?, op.base_name()))
    }

    fn read(
        &self,
        op: &Operand,
        _pred_read: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        int_only(op, op.ctype()?)?;
        let idx = require_idx(op, idx, Role::Src)?.to_string();
        let val = match &op.desc().overrides().read {
            Some(t) => {
                expand(t, &[("idx", idx.as_str()), ("name", op.base_name())])
            }
            None => format!("xc->readMiscRegOperand(this, {idx})"),
        };
        Ok(format!("{} = {val};\n", op.base_name()))
    }

    fn write(
        &self,
        op: &Operand,
        _pred_write: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        int_only(op, op.ctype()?)?;
        let idx = require_idx(op, idx, Role::Dest)?.to_string();
        let name = op.base_name();
        let store = match &op.desc().overrides().write {
            Some(t) => expand(
                t,
                &[("idx", idx.as_str()), ("name", name), ("val", name)],
            ),
            None => format!("xc->setMiscRegOperand(this, {idx}, {name});"),
        };
        Ok(format!(
            "{store}\nif (traceData) {{ traceData->setData({name}); }}"
        ))
    }
}
