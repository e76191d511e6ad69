//! Operand flag specs and their canonical triple form.
//!
//! A flag spec may be written as nothing, a single flag, a flat list,
//! or an explicit `(always, on-source, on-dest)` triple whose members
//! are each a single flag or a list. Whatever the shape, it is turned
//! into one [`FlagTriple`] when the descriptor is built.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{OperandError, Result};

// ── Input shapes ───────────────────────────────────────────────

/// One member of an explicit flag triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagSet {
    One(String),
    List(Vec<String>),
}

impl FlagSet {
    fn to_vec(&self) -> Vec<String> {
        match self {
            FlagSet::One(f) => vec![f.clone()],
            FlagSet::List(fs) => fs.clone(),
        }
    }
}

/// Flag spec as accepted from an operand definition.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum FlagSpec {
    #[default]
    None,
    /// A single unconditional flag.
    One(String),
    /// Unconditional flags.
    List(Vec<String>),
    /// Explicit triple; must have exactly three members.
    Tuple(Vec<FlagSet>),
}

impl From<&str> for FlagSpec {
    fn from(flag: &str) -> Self {
        FlagSpec::One(flag.to_string())
    }
}

impl From<Vec<&str>> for FlagSpec {
    fn from(flags: Vec<&str>) -> Self {
        FlagSpec::List(flags.into_iter().map(str::to_string).collect())
    }
}

// ── Canonical form ─────────────────────────────────────────────

/// Flags implied always, when used as a source, and when used as a
/// destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlagTriple {
    pub uncond: Vec<String>,
    pub src: Vec<String>,
    pub dest: Vec<String>,
}

impl FlagTriple {
    /// Flatten for one operand role. Order is unconditional, source,
    /// destination; duplicates are kept.
    pub fn resolve(&self, is_src: bool, is_dest: bool) -> Vec<String> {
        let mut flags = self.uncond.clone();
        if is_src {
            flags.extend(self.src.iter().cloned());
        }
        if is_dest {
            flags.extend(self.dest.iter().cloned());
        }
        flags
    }

    pub fn is_empty(&self) -> bool {
        self.uncond.is_empty() && self.src.is_empty() && self.dest.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = &String> {
        self.uncond.iter().chain(&self.src).chain(&self.dest)
    }
}

/// Convert any accepted flag shape into a [`FlagTriple`].
pub fn canonicalize(spec: &FlagSpec) -> Result<FlagTriple> {
    let triple = match spec {
        // Empty shapes count as absent.
        FlagSpec::None => FlagTriple::default(),
        FlagSpec::One(f) if f.is_empty() => FlagTriple::default(),
        FlagSpec::Tuple(sets) if sets.is_empty() => FlagTriple::default(),
        FlagSpec::One(f) => FlagTriple {
            uncond: vec![f.clone()],
            ..FlagTriple::default()
        },
        FlagSpec::List(fs) => FlagTriple {
            uncond: fs.clone(),
            ..FlagTriple::default()
        },
        FlagSpec::Tuple(sets) => match sets.as_slice() {
            [u, s, d] => FlagTriple {
                uncond: u.to_vec(),
                src: s.to_vec(),
                dest: d.to_vec(),
            },
            _ => {
                return Err(OperandError::flags(
                    &spec.to_string(),
                    format!("expected 3 members, found {}", sets.len()),
                ))
            }
        },
    };
    if let Some(bad) = triple.iter().find(|f| !is_ident(f)) {
        return Err(OperandError::flags(
            &spec.to_string(),
            format!("`{bad}` is not a flag name"),
        ));
    }
    Ok(triple)
}

pub(crate) fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

// ── Text form ──────────────────────────────────────────────────

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagSet::One(flag) => f.write_str(flag),
            FlagSet::List(flags) => write!(f, "[{}]", flags.join(", ")),
        }
    }
}

impl fmt::Display for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagSpec::None => f.write_str("None"),
            FlagSpec::One(flag) => f.write_str(flag),
            FlagSpec::List(flags) => write!(f, "[{}]", flags.join(", ")),
            FlagSpec::Tuple(sets) => {
                let parts: Vec<String> =
                    sets.iter().map(|s| s.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Split on commas outside of `[...]`.
fn split_top(inner: &str) -> std::result::Result<Vec<&str>, String> {
    let mut items = Vec::new();
    let mut depth = 0u32;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced `]`".to_string())?;
            }
            '(' | ')' => return Err("nested tuple".to_string()),
            ',' if depth == 0 => {
                items.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err("unbalanced `[`".to_string());
    }
    let last = inner[start..].trim();
    if !last.is_empty() || !items.is_empty() {
        items.push(last);
    }
    if items.iter().any(|s| s.is_empty()) {
        return Err("empty member".to_string());
    }
    Ok(items)
}

fn parse_list(spec: &str, text: &str) -> Result<Vec<String>> {
    let inner = text
        .strip_prefix('[')
        .and_then(|t| t.strip_suffix(']'))
        .ok_or_else(|| OperandError::flags(spec, "unterminated list"))?;
    if inner.contains(['[', ']', '(', ')']) {
        return Err(OperandError::flags(spec, "nested list"));
    }
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|f| match f.trim() {
            "" => Err(OperandError::flags(spec, "empty list entry")),
            f => Ok(f.to_string()),
        })
        .collect()
}

impl FromStr for FlagSpec {
    type Err = OperandError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        let parsed = if text.is_empty() || text == "None" {
            FlagSpec::None
        } else if let Some(inner) =
            text.strip_prefix('(').and_then(|t| t.strip_suffix(')'))
        {
            let items =
                split_top(inner).map_err(|r| OperandError::flags(s, r))?;
            let sets = items
                .into_iter()
                .map(|item| {
                    if item.starts_with('[') {
                        parse_list(s, item).map(FlagSet::List)
                    } else {
                        Ok(FlagSet::One(item.to_string()))
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            FlagSpec::Tuple(sets)
        } else if text.starts_with('[') {
            FlagSpec::List(parse_list(s, text)?)
        } else {
            FlagSpec::One(text.to_string())
        };
        // Shape errors surface here rather than at descriptor build.
        canonicalize(&parsed)?;
        Ok(parsed)
    }
}

impl TryFrom<String> for FlagSpec {
    type Error = OperandError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}
