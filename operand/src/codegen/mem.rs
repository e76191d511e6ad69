//! Memory and PC-state operands. Neither occupies a register slot.

use super::OperandCodegen;
use crate::error::Result;
use crate::operand::{IndexRef, Operand, RegIndexAlloc};

/// Memory data. Only the variable is declared; the access itself is
/// emitted by the instruction assembler.
pub struct Mem;

impl OperandCodegen for Mem {
    fn needs_index(&self) -> bool {
        false
    }

    fn constructor(
        &self,
        _op: &Operand,
        _alloc: &RegIndexAlloc,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn decl(&self, op: &Operand) -> Result<String> {
        Ok(format!("{} {} = {{}};\n", op.ctype()?, op.base_name()))
    }

    fn read(
        &self,
        _: &Operand,
        _: bool,
        _: Option<IndexRef>,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn write(
        &self,
        _: &Operand,
        _: bool,
        _: Option<IndexRef>,
    ) -> Result<String> {
        Ok(String::new())
    }
}

/// The whole PC state, or one component of it when the register spec
/// names an accessor. Components go through `__parserAutoPCState`,
/// which the assembler commits after all components are applied.
pub struct PcState;

impl OperandCodegen for PcState {
    fn needs_index(&self) -> bool {
        false
    }

    fn constructor(
        &self,
        _op: &Operand,
        _alloc: &RegIndexAlloc,
    ) -> Result<String> {
        Ok(String::new())
    }

    fn decl(&self, op: &Operand) -> Result<String> {
        let ctype = if op.is_pc_part() {
            op.ctype()?.to_string()
        } else {
            op.ctx().qualify("PCState")
        };
        Ok(format!("{ctype} {} = 0;\n", op.base_name()))
    }

    fn read(
        &self,
        op: &Operand,
        _: bool,
        _: Option<IndexRef>,
    ) -> Result<String> {
        let name = op.base_name();
        if op.is_pc_part() {
            let part = op.desc().reg_spec();
            Ok(format!("{name} = __parserAutoPCState.{part}();\n"))
        } else {
            let pc = op.ctx().qualify("PCState");
            Ok(format!("{name} = xc->pcState().as<{pc}>();\n"))
        }
    }

    fn write(
        &self,
        op: &Operand,
        _: bool,
        _: Option<IndexRef>,
    ) -> Result<String> {
        let name = op.base_name();
        if op.is_pc_part() {
            let part = op.desc().reg_spec();
            Ok(format!("__parserAutoPCState.{part}({name});\n"))
        } else {
            Ok(format!("xc->pcState({name});\n"))
        }
    }
}
