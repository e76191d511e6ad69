//! Operand instances and the finalize phase.

use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::codegen::OperandCodegen;
use crate::context::IsaContext;
use crate::desc::OperandDesc;
use crate::error::{OperandError, Result};

// ── Register index facts ───────────────────────────────────────

/// Register-index allocation facts for one operand, produced by the
/// instruction-wide allocator before finalize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegIndexAlloc {
    /// Source registers of this instruction are numbered at runtime.
    pub pred_read: bool,
    /// Destination registers of this instruction are numbered at runtime.
    pub pred_write: bool,
    pub src_idx: Option<u32>,
    pub dest_idx: Option<u32>,
}

impl RegIndexAlloc {
    /// Unpredicated instruction with statically allocated indices.
    pub fn fixed(src_idx: Option<u32>, dest_idx: Option<u32>) -> Self {
        Self {
            pred_read: false,
            pred_write: false,
            src_idx,
            dest_idx,
        }
    }

    /// Predicated instruction; indices come from runtime counters.
    pub fn predicated(pred_read: bool, pred_write: bool) -> Self {
        Self {
            pred_read,
            pred_write,
            src_idx: None,
            dest_idx: None,
        }
    }

    pub fn with_src(mut self, idx: u32) -> Self {
        self.src_idx = Some(idx);
        self
    }

    pub fn with_dest(mut self, idx: u32) -> Self {
        self.dest_idx = Some(idx);
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Src,
    Dest,
}

impl Role {
    fn counter(self) -> &'static str {
        match self {
            Role::Src => "_sourceIndex++",
            Role::Dest => "_destIndex++",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Src => "source",
            Role::Dest => "destination",
        }
    }
}

/// How generated code names the operand's slot in the source or
/// destination register array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexRef {
    Static(u32),
    /// Post-incremented runtime counter.
    Runtime(&'static str),
}

impl fmt::Display for IndexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexRef::Static(idx) => write!(f, "{idx}"),
            IndexRef::Runtime(counter) => f.write_str(counter),
        }
    }
}

// ── Operand instance ───────────────────────────────────────────

/// A vector element referenced by the instruction body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveElem {
    pub name: String,
    /// Overrides the element's default extension.
    pub ext: Option<String>,
}

impl ActiveElem {
    pub fn new(name: impl Into<String>, ext: Option<&str>) -> Self {
        Self {
            name: name.into(),
            ext: ext.map(str::to_string),
        }
    }
}

/// One use of an operand in a concrete instruction.
#[derive(Clone, Debug)]
pub struct Operand<'a> {
    ctx: &'a IsaContext,
    desc: Arc<OperandDesc>,
    full_name: String,
    ext: Option<String>,
    is_src: bool,
    is_dest: bool,
    eff_ext: Option<String>,
    ctype: Option<String>,
    elem_ext: Option<String>,
    active_elems: Vec<ActiveElem>,
}

impl<'a> Operand<'a> {
    /// Bind `desc` to one use. `ext` is the extension written at the use
    /// site, if any; otherwise the descriptor's default applies.
    pub fn new(
        ctx: &'a IsaContext,
        desc: &Arc<OperandDesc>,
        full_name: impl Into<String>,
        ext: Option<&str>,
        is_src: bool,
        is_dest: bool,
    ) -> Result<Self> {
        let ext = ext.map(str::to_string);
        let eff_ext =
            ext.clone().or_else(|| desc.dflt_ext().map(str::to_string));
        let ctype = match &eff_ext {
            Some(e) => Some(ctx.ctype(e)?.to_string()),
            None => None,
        };
        let op = Self {
            ctx,
            desc: Arc::clone(desc),
            full_name: full_name.into(),
            ext,
            is_src,
            is_dest,
            eff_ext,
            ctype,
            elem_ext: None,
            active_elems: Vec::new(),
        };
        op.codegen().check(&op)?;
        Ok(op)
    }

    /// Element-level extension detected in the instruction body.
    pub fn set_elem_ext(&mut self, ext: Option<&str>) -> Result<()> {
        if let Some(e) = ext {
            self.ctx.ctype(e)?;
        }
        self.elem_ext = ext.map(str::to_string);
        Ok(())
    }

    pub fn set_active_elems(&mut self, elems: Vec<ActiveElem>) {
        self.active_elems = elems;
    }

    pub fn ctx(&self) -> &IsaContext {
        self.ctx
    }

    pub fn desc(&self) -> &OperandDesc {
        &self.desc
    }

    /// Identifier used in generated code.
    pub fn base_name(&self) -> &str {
        self.desc.name()
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Extension given at the use site.
    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    pub fn eff_ext(&self) -> Option<&str> {
        self.eff_ext.as_deref()
    }

    pub fn elem_ext(&self) -> Option<&str> {
        self.elem_ext.as_deref()
    }

    pub fn active_elems(&self) -> &[ActiveElem] {
        &self.active_elems
    }

    pub fn is_src(&self) -> bool {
        self.is_src
    }

    pub fn is_dest(&self) -> bool {
        self.is_dest
    }

    pub fn is_reg(&self) -> bool {
        self.desc.kind().is_reg()
    }

    pub fn is_mem(&self) -> bool {
        self.desc.kind().is_mem()
    }

    pub fn is_pc_state(&self) -> bool {
        self.desc.kind().is_pc_state()
    }

    pub fn is_control_reg(&self) -> bool {
        self.desc.kind().is_control_reg()
    }

    /// A single component of the PC state rather than the whole state.
    pub fn is_pc_part(&self) -> bool {
        self.is_pc_state() && !self.desc.reg_spec().is_empty()
    }

    pub fn has_read_pred(&self) -> bool {
        self.desc.read_predicate().is_some()
    }

    pub fn has_write_pred(&self) -> bool {
        self.desc.write_predicate().is_some()
    }

    pub fn sort_pri(&self) -> Option<i32> {
        self.desc.sort_pri()
    }

    /// Resolved C++ type of the operand.
    pub fn ctype(&self) -> Result<&str> {
        self.ctype.as_deref().ok_or_else(|| {
            OperandError::UnresolvedOperandType(self.full_name.clone())
        })
    }

    /// `RegId(...)` expression naming the register for `role`.
    pub fn reg_id(&self, role: Role) -> String {
        let overrides = self.desc.overrides();
        let custom = match role {
            Role::Src => overrides.src_reg_id.as_ref(),
            Role::Dest => overrides.dest_reg_id.as_ref(),
        };
        match (custom, self.desc.kind().reg_class()) {
            (Some(id), _) => id.clone(),
            (None, Some(class)) => {
                format!("RegId({class}, {})", self.desc.reg_spec())
            }
            (None, None) => String::new(),
        }
    }

    fn codegen(&self) -> &'static dyn OperandCodegen {
        crate::codegen::for_kind(self.desc.kind())
    }

    fn index_ref(
        &self,
        gen: &dyn OperandCodegen,
        role: Role,
        alloc: &RegIndexAlloc,
    ) -> Result<Option<IndexRef>> {
        let (predicated, idx) = match role {
            Role::Src => (alloc.pred_read, alloc.src_idx),
            Role::Dest => (alloc.pred_write, alloc.dest_idx),
        };
        if predicated {
            return Ok(Some(IndexRef::Runtime(role.counter())));
        }
        match idx {
            Some(i) => Ok(Some(IndexRef::Static(i))),
            None if gen.needs_index() => {
                Err(OperandError::FinalizeOrderingViolation {
                    operand: self.full_name.clone(),
                    role: role.name(),
                })
            }
            None => Ok(None),
        }
    }

    /// Generate all code fragments. Call once the instruction's register
    /// indices have been allocated.
    pub fn finalize(
        self,
        alloc: &RegIndexAlloc,
    ) -> Result<FinalizedOperand<'a>> {
        let gen = self.codegen();
        let flags = self.desc.flags().resolve(self.is_src, self.is_dest);
        let constructor = gen.constructor(&self, alloc)?;
        let decl = if self.is_reg() && !self.is_src && !self.is_dest {
            String::new()
        } else {
            gen.decl(&self)?
        };

        let mut src_read = String::new();
        let mut src_decl = String::new();
        if self.is_src {
            let idx = self.index_ref(gen, Role::Src, alloc)?;
            src_read = gen.read(&self, alloc.pred_read, idx)?;
            src_decl = decl.clone();
        }

        let mut dest_write = String::new();
        let mut dest_decl = String::new();
        if self.is_dest {
            let idx = self.index_ref(gen, Role::Dest, alloc)?;
            // Writable bindings must precede the read-only snapshot.
            let writable = gen.read_writable(&self, alloc.pred_write, idx)?;
            src_read.insert_str(0, &writable);
            dest_write = gen.write(&self, alloc.pred_write, idx)?;
            dest_decl = decl.clone();
        }

        let roles = match (self.is_src, self.is_dest) {
            (true, true) => "src+dest",
            (true, false) => "src",
            (false, true) => "dest",
            (false, false) => "unused",
        };
        debug!("finalized {} ({roles}) flags {:?}", self.full_name, flags);
        Ok(FinalizedOperand {
            operand: self,
            flags,
            constructor,
            decl,
            src_read,
            dest_write,
            src_decl,
            dest_decl,
        })
    }
}

// ── Finalized operand ──────────────────────────────────────────

/// An operand with all code fragments generated.
#[derive(Clone, Debug)]
pub struct FinalizedOperand<'a> {
    operand: Operand<'a>,
    /// Flags for this use: unconditional, then source, then destination.
    pub flags: Vec<String>,
    /// Index registration, for the instruction constructor.
    pub constructor: String,
    pub decl: String,
    /// Empty unless the operand is a source (or a vector destination).
    pub src_read: String,
    /// Empty unless the operand is a destination.
    pub dest_write: String,
    pub src_decl: String,
    pub dest_decl: String,
}

impl<'a> FinalizedOperand<'a> {
    pub fn operand(&self) -> &Operand<'a> {
        &self.operand
    }
}
