//! Operand tables written in TOML.
//!
//! ```toml
//! namespace = "ArmISA"
//!
//! [types]
//! vu = "uint32_t"
//!
//! [operands.Rc]
//! kind = "int_reg"
//! ext = "uq"
//! spec = "RC"
//! flags = "(IsInteger, [], IsCondWrite)"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use log::info;
use serde::Deserialize;

use crate::context::IsaContext;
use crate::desc::{OperandDesc, OperandOverrides, RegSpec, StorageKind};
use crate::error::{OperandError, Result};
use crate::flags::FlagSpec;

/// Descriptors by operand name.
pub type OperandTable = BTreeMap<String, Arc<OperandDesc>>;

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperandEntry {
    pub kind: StorageKind,
    #[serde(default)]
    pub ext: Option<String>,
    pub spec: RegSpec,
    #[serde(default)]
    pub flags: FlagSpec,
    #[serde(default)]
    pub sort_pri: Option<i32>,
    #[serde(default)]
    pub read_predicate: Option<String>,
    #[serde(default)]
    pub write_predicate: Option<String>,
    #[serde(default)]
    pub overrides: OperandOverrides,
}

impl OperandEntry {
    pub fn to_desc(&self, name: &str) -> Result<OperandDesc> {
        let mut b = OperandDesc::builder(name, self.kind, self.spec.clone())
            .flags(self.flags.clone())
            .overrides(self.overrides.clone());
        if let Some(ext) = &self.ext {
            b = b.ext(ext.clone());
        }
        if let Some(pri) = self.sort_pri {
            b = b.sort_pri(pri);
        }
        if let Some(pred) = &self.read_predicate {
            b = b.read_predicate(pred.clone());
        }
        if let Some(pred) = &self.write_predicate {
            b = b.write_predicate(pred.clone());
        }
        b.build()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsaConfig {
    pub namespace: String,
    /// Start from the standard extension table.
    #[serde(default = "default_true")]
    pub default_types: bool,
    #[serde(default)]
    pub types: BTreeMap<String, String>,
    #[serde(default)]
    pub operands: BTreeMap<String, OperandEntry>,
}

impl IsaConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| {
            OperandError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;
        Self::from_toml_str(&text)
    }

    /// Build the shared context and every descriptor.
    pub fn build(&self) -> Result<(IsaContext, OperandTable)> {
        let mut ctx = if self.default_types {
            IsaContext::with_default_types(self.namespace.clone())
        } else {
            IsaContext::new(self.namespace.clone())
        };
        for (ext, ctype) in &self.types {
            ctx.add_type(ext.clone(), ctype.clone());
        }
        let mut table = OperandTable::new();
        for (name, entry) in &self.operands {
            table.insert(name.clone(), Arc::new(entry.to_desc(name)?));
        }
        info!(
            "loaded {} operands, {} types for {}",
            table.len(),
            ctx.operand_types().len(),
            ctx.namespace
        );
        Ok((ctx, table))
    }
}
