use thiserror::Error;

use crate::desc::StorageKind;

/// Errors raised while building descriptors or compiling operands.
///
/// All of them abort compilation of the enclosing instruction; there is
/// no partial result.
#[derive(Debug, Error)]
pub enum OperandError {
    #[error("malformed flag spec `{spec}`: {reason}")]
    MalformedFlagSpec { spec: String, reason: String },

    #[error("invalid element spec for `{operand}`: {reason}")]
    InvalidElementSpec { operand: String, reason: String },

    #[error("operand `{0}` has no extension but needs a concrete type")]
    UnresolvedOperandType(String),

    #[error("unknown operand extension `{0}`")]
    UnknownExtension(String),

    #[error("control register `{operand}` cannot be accessed as `{ctype}`")]
    InvalidControlRegisterType { operand: String, ctype: String },

    #[error("operand `{operand}` finalized without a {role} register index")]
    FinalizeOrderingViolation { operand: String, role: &'static str },

    #[error("`{hook}` override is not supported by {kind} operands")]
    UnsupportedOverride { kind: StorageKind, hook: &'static str },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, OperandError>;

impl OperandError {
    pub(crate) fn flags(spec: &str, reason: impl Into<String>) -> Self {
        OperandError::MalformedFlagSpec {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn elems(operand: &str, reason: impl Into<String>) -> Self {
        OperandError::InvalidElementSpec {
            operand: operand.to_string(),
            reason: reason.into(),
        }
    }
}
