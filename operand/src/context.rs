use std::collections::BTreeMap;

use crate::error::{OperandError, Result};

/// Standard operand extensions and the C++ types they select.
pub const DEFAULT_OPERAND_TYPES: &[(&str, &str)] = &[
    ("sb", "int8_t"),
    ("ub", "uint8_t"),
    ("sh", "int16_t"),
    ("uh", "uint16_t"),
    ("sw", "int32_t"),
    ("uw", "uint32_t"),
    ("sd", "int64_t"),
    ("ud", "uint64_t"),
    ("sq", "int64_t"),
    ("uq", "uint64_t"),
    ("tud", "std::array<uint64_t, 2>"),
    ("sf", "float"),
    ("df", "double"),
];

/// Read-only state shared by every operand compiled for one ISA.
#[derive(Clone, Debug, Default)]
pub struct IsaContext {
    /// C++ namespace used to qualify container and PC-state types.
    pub namespace: String,
    operand_types: BTreeMap<String, String>,
}

impl IsaContext {
    /// Context with an empty extension table.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            operand_types: BTreeMap::new(),
        }
    }

    /// Context preloaded with [`DEFAULT_OPERAND_TYPES`].
    pub fn with_default_types(namespace: impl Into<String>) -> Self {
        let mut ctx = Self::new(namespace);
        for (ext, ctype) in DEFAULT_OPERAND_TYPES {
            ctx.add_type(*ext, *ctype);
        }
        ctx
    }

    /// Add or replace an extension.
    pub fn add_type(
        &mut self,
        ext: impl Into<String>,
        ctype: impl Into<String>,
    ) {
        self.operand_types.insert(ext.into(), ctype.into());
    }

    pub fn ctype(&self, ext: &str) -> Result<&str> {
        self.operand_types
            .get(ext)
            .map(String::as_str)
            .ok_or_else(|| OperandError::UnknownExtension(ext.to_string()))
    }

    pub fn operand_types(&self) -> &BTreeMap<String, String> {
        &self.operand_types
    }

    /// `<namespace>::<name>`
    pub fn qualify(&self, name: &str) -> String {
        format!("{}::{name}", self.namespace)
    }
}
