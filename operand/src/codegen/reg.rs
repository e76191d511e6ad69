//! Scalar registers accessed as raw bit patterns.

use super::{expand, register, require_idx, OperandCodegen};
use crate::error::Result;
use crate::operand::{IndexRef, Operand, RegIndexAlloc, Role};

/// Integer, floating-point, condition-code and vector-element registers.
pub struct RegVal;

impl OperandCodegen for RegVal {
    fn constructor(
        &self,
        op: &Operand,
        alloc: &RegIndexAlloc,
    ) -> Result<String> {
        Ok(register(op, alloc, true, true))
    }

    fn decl(&self, op: &Operand) -> Result<String> {
        Ok(format!("{} {} = 0;\n", op.ctype()?, op.base_name()))
    }

    fn read(
        &self,
        op: &Operand,
        pred_read: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        let idx = require_idx(op, idx, Role::Src)?.to_string();
        let mut val = match &op.desc().overrides().read {
            Some(t) => {
                expand(t, &[("idx", idx.as_str()), ("name", op.base_name())])
            }
            None => format!("xc->getRegOperand(this, {idx})"),
        };
        match op.ctype()? {
            "float" => val = format!("bitsToFloat32({val})"),
            "double" => val = format!("bitsToFloat64({val})"),
            _ => {}
        }
        if let (true, Some(pred)) = (pred_read, op.desc().read_predicate()) {
            val = format!("({pred}) ? {val} : 0");
        }
        Ok(format!("{} = {val};\n", op.base_name()))
    }

    fn write(
        &self,
        op: &Operand,
        pred_write: bool,
        idx: Option<IndexRef>,
    ) -> Result<String> {
        let idx = require_idx(op, idx, Role::Dest)?.to_string();
        let name = op.base_name();
        let val = match op.ctype()? {
            "float" => format!("floatToBits32({name})"),
            "double" => format!("floatToBits64({name})"),
            _ => name.to_string(),
        };
        let wcond = match (pred_write, op.desc().write_predicate()) {
            (true, Some(pred)) => format!("if ({pred})"),
            _ => String::new(),
        };
        let store = match &op.desc().overrides().write {
            Some(t) => expand(
                t,
                &[("idx", idx.as_str()), ("name", name), ("val", "final_val")],
            ),
            None => format!("xc->setRegOperand(this, {idx}, final_val);"),
        };
        Ok(format!(
            "\n\t{wcond}\n\t{{\n\
             \t\tRegVal final_val = {val};\n\
             \t\t{store}\n\
             \t\tif (traceData)\n\
             \t\t\ttraceData->setData(final_val);\n\
             \t}}"
        ))
    }
}
