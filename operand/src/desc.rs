//! Operand descriptors: the static, shared half of an operand.

use std::collections::BTreeMap;
use std::fmt;

use log::trace;
use serde::Deserialize;

use crate::error::{OperandError, Result};
use crate::flags::{canonicalize, is_ident, FlagSpec, FlagTriple};

// ── Storage kinds ──────────────────────────────────────────────

/// Where an operand lives. Selects the code generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    IntReg,
    FloatReg,
    CcReg,
    VecElem,
    VecReg,
    VecPredReg,
    /// Control/status (misc) register.
    ControlReg,
    Mem,
    PcState,
}

impl StorageKind {
    /// Register class named in `RegId(...)`, `None` for non-registers.
    pub fn reg_class(self) -> Option<&'static str> {
        match self {
            StorageKind::IntReg => Some("IntRegClass"),
            StorageKind::FloatReg => Some("FloatRegClass"),
            StorageKind::CcReg => Some("CCRegClass"),
            StorageKind::VecElem => Some("VecElemClass"),
            StorageKind::VecReg => Some("VecRegClass"),
            StorageKind::VecPredReg => Some("VecPredRegClass"),
            StorageKind::ControlReg => Some("MiscRegClass"),
            StorageKind::Mem | StorageKind::PcState => None,
        }
    }

    pub fn is_reg(self) -> bool {
        self.reg_class().is_some()
    }

    pub fn is_mem(self) -> bool {
        self == StorageKind::Mem
    }

    pub fn is_pc_state(self) -> bool {
        self == StorageKind::PcState
    }

    pub fn is_control_reg(self) -> bool {
        self == StorageKind::ControlReg
    }

    /// Whole-register vector kinds, accessed through containers.
    pub fn is_vector(self) -> bool {
        matches!(self, StorageKind::VecReg | StorageKind::VecPredReg)
    }

    /// Kinds whose raw read/write may be replaced by an override.
    fn has_value_hooks(self) -> bool {
        matches!(
            self,
            StorageKind::IntReg
                | StorageKind::FloatReg
                | StorageKind::CcReg
                | StorageKind::VecElem
                | StorageKind::ControlReg
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            StorageKind::IntReg => "int_reg",
            StorageKind::FloatReg => "float_reg",
            StorageKind::CcReg => "cc_reg",
            StorageKind::VecElem => "vec_elem",
            StorageKind::VecReg => "vec_reg",
            StorageKind::VecPredReg => "vec_pred_reg",
            StorageKind::ControlReg => "control_reg",
            StorageKind::Mem => "mem",
            StorageKind::PcState => "pc_state",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Register and element specs ─────────────────────────────────

/// A named vector element: index expression and default extension.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ElemDef {
    pub index: String,
    pub ext: String,
}

impl ElemDef {
    pub fn new(index: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            ext: ext.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ElemSpec {
    /// Named element accessor.
    Accessor(String),
    /// Element name -> definition.
    Elems(BTreeMap<String, ElemDef>),
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RegSpec {
    Plain(String),
    WithElems(String, ElemSpec),
}

impl From<&str> for RegSpec {
    fn from(spec: &str) -> Self {
        RegSpec::Plain(spec.to_string())
    }
}

impl From<String> for RegSpec {
    fn from(spec: String) -> Self {
        RegSpec::Plain(spec)
    }
}

fn validate_elems(
    name: &str,
    kind: StorageKind,
    spec: &ElemSpec,
) -> Result<()> {
    match spec {
        ElemSpec::Accessor(acc) => {
            if !matches!(kind, StorageKind::VecReg | StorageKind::VecElem) {
                return Err(OperandError::elems(
                    name,
                    format!("{kind} operands take no element accessor"),
                ));
            }
            if !is_ident(acc) {
                return Err(OperandError::elems(
                    name,
                    format!("`{acc}` is not an accessor name"),
                ));
            }
        }
        ElemSpec::Elems(elems) => {
            if kind != StorageKind::VecReg {
                return Err(OperandError::elems(
                    name,
                    format!("{kind} operands have no named elements"),
                ));
            }
            for (elem, def) in elems {
                if !is_ident(elem) {
                    return Err(OperandError::elems(
                        name,
                        format!("`{elem}` is not an element name"),
                    ));
                }
                if def.index.trim().is_empty() || def.ext.trim().is_empty() {
                    return Err(OperandError::elems(
                        name,
                        format!("element `{elem}` needs an index and an ext"),
                    ));
                }
            }
        }
    }
    Ok(())
}

// ── Overrides ──────────────────────────────────────────────────

/// Per-descriptor replacements for parts of the generated code.
///
/// `read` replaces the raw register fetch expression and may use
/// `{idx}` and `{name}`. `write` replaces the store statement and may
/// use `{idx}`, `{name}` and `{val}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OperandOverrides {
    pub src_reg_id: Option<String>,
    pub dest_reg_id: Option<String>,
    pub read: Option<String>,
    pub write: Option<String>,
}

impl OperandOverrides {
    fn validate(&self, kind: StorageKind) -> Result<()> {
        let unsupported =
            |hook| OperandError::UnsupportedOverride { kind, hook };
        if !kind.is_reg() {
            if self.src_reg_id.is_some() {
                return Err(unsupported("src_reg_id"));
            }
            if self.dest_reg_id.is_some() {
                return Err(unsupported("dest_reg_id"));
            }
        }
        if !kind.has_value_hooks() {
            if self.read.is_some() {
                return Err(unsupported("read"));
            }
            if self.write.is_some() {
                return Err(unsupported("write"));
            }
        }
        Ok(())
    }
}

// ── Descriptor ─────────────────────────────────────────────────

/// Immutable description of one operand of an instruction template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperandDesc {
    name: String,
    kind: StorageKind,
    dflt_ext: Option<String>,
    reg_spec: String,
    elem_spec: Option<ElemSpec>,
    flags: FlagTriple,
    sort_pri: Option<i32>,
    read_predicate: Option<String>,
    write_predicate: Option<String>,
    overrides: OperandOverrides,
}

impl OperandDesc {
    /// Start describing operand `name` (the identifier used in
    /// generated code).
    pub fn builder(
        name: impl Into<String>,
        kind: StorageKind,
        reg_spec: impl Into<RegSpec>,
    ) -> DescBuilder {
        DescBuilder {
            name: name.into(),
            kind,
            reg_spec: reg_spec.into(),
            dflt_ext: None,
            flags: FlagSpec::None,
            sort_pri: None,
            read_predicate: None,
            write_predicate: None,
            overrides: OperandOverrides::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StorageKind {
        self.kind
    }

    pub fn dflt_ext(&self) -> Option<&str> {
        self.dflt_ext.as_deref()
    }

    pub fn reg_spec(&self) -> &str {
        &self.reg_spec
    }

    pub fn elem_spec(&self) -> Option<&ElemSpec> {
        self.elem_spec.as_ref()
    }

    /// Named element definition, for vector operands with an element map.
    pub fn elem(&self, elem: &str) -> Result<&ElemDef> {
        match &self.elem_spec {
            Some(ElemSpec::Elems(elems)) => elems.get(elem).ok_or_else(|| {
                OperandError::elems(&self.name, format!("no element `{elem}`"))
            }),
            _ => Err(OperandError::elems(
                &self.name,
                format!("element `{elem}` used but no elements are defined"),
            )),
        }
    }

    pub fn flags(&self) -> &FlagTriple {
        &self.flags
    }

    pub fn sort_pri(&self) -> Option<i32> {
        self.sort_pri
    }

    pub fn read_predicate(&self) -> Option<&str> {
        self.read_predicate.as_deref()
    }

    pub fn write_predicate(&self) -> Option<&str> {
        self.write_predicate.as_deref()
    }

    pub fn overrides(&self) -> &OperandOverrides {
        &self.overrides
    }
}

/// Builder for [`OperandDesc`]; all checks run in [`DescBuilder::build`].
#[derive(Clone, Debug)]
pub struct DescBuilder {
    name: String,
    kind: StorageKind,
    reg_spec: RegSpec,
    dflt_ext: Option<String>,
    flags: FlagSpec,
    sort_pri: Option<i32>,
    read_predicate: Option<String>,
    write_predicate: Option<String>,
    overrides: OperandOverrides,
}

impl DescBuilder {
    /// Default extension, used when an operand reference has none.
    pub fn ext(mut self, ext: impl Into<String>) -> Self {
        self.dflt_ext = Some(ext.into());
        self
    }

    pub fn flags(mut self, flags: impl Into<FlagSpec>) -> Self {
        self.flags = flags.into();
        self
    }

    pub fn sort_pri(mut self, pri: i32) -> Self {
        self.sort_pri = Some(pri);
        self
    }

    pub fn read_predicate(mut self, pred: impl Into<String>) -> Self {
        self.read_predicate = Some(pred.into());
        self
    }

    pub fn write_predicate(mut self, pred: impl Into<String>) -> Self {
        self.write_predicate = Some(pred.into());
        self
    }

    pub fn overrides(mut self, overrides: OperandOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn build(self) -> Result<OperandDesc> {
        let flags = canonicalize(&self.flags)?;
        let (reg_spec, elem_spec) = match self.reg_spec {
            RegSpec::Plain(spec) => (spec, None),
            RegSpec::WithElems(spec, elems) => {
                validate_elems(&self.name, self.kind, &elems)?;
                (spec, Some(elems))
            }
        };
        self.overrides.validate(self.kind)?;
        trace!(
            "operand {}: kind {}, spec {:?}, flags {:?}",
            self.name,
            self.kind,
            reg_spec,
            flags
        );
        Ok(OperandDesc {
            name: self.name,
            kind: self.kind,
            dflt_ext: self.dflt_ext,
            reg_spec,
            elem_spec,
            flags,
            sort_pri: self.sort_pri,
            read_predicate: self.read_predicate,
            write_predicate: self.write_predicate,
            overrides: self.overrides,
        })
    }
}
