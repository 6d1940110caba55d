//! Symbolic pin and wire references and their resolution.
//!
//! A reference is whatever the author wrote to point at a pin or wire: a
//! number, a label, a color, or a range such as `3-7`. Ranges are expanded
//! when the input is read; resolution then maps each single reference onto a
//! canonical position, failing on ambiguity, conflicts or misses.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// A single pin or wire reference as written by the author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Scalar", into = "String")]
pub struct Reference(String);

/// Scalar forms accepted for references in input documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Text(String),
}

impl From<Scalar> for Reference {
    fn from(s: Scalar) -> Self {
        match s {
            Scalar::Int(i) => Reference(i.to_string()),
            Scalar::Text(t) => Reference(t),
        }
    }
}

impl From<Reference> for String {
    fn from(r: Reference) -> Self {
        r.0
    }
}

impl Reference {
    pub fn new(s: impl Into<String>) -> Self {
        Reference(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Reference {
    fn from(s: &str) -> Self {
        Reference(s.to_string())
    }
}

impl From<String> for Reference {
    fn from(s: String) -> Self {
        Reference(s)
    }
}

impl From<usize> for Reference {
    fn from(n: usize) -> Self {
        Reference(n.to_string())
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Widest range that is expanded. Anything wider cannot name existing pins
/// or wires and is kept as a single reference that fails to resolve.
pub const MAX_RANGE_LEN: u64 = 10_000;

/// Expand an inclusive integer range `A-B` (ascending or descending).
///
/// Returns `None` when `text` is not a range of two non-negative integers, in
/// which case it is an ordinary reference (e.g. `GND-A`). Ranges spanning more
/// than [`MAX_RANGE_LEN`] values are also left unexpanded.
pub fn expand_range(text: &str) -> Option<Vec<Reference>> {
    let (a, b) = text.split_once('-')?;
    let a: u64 = a.trim().parse().ok()?;
    let b: u64 = b.trim().parse().ok()?;
    if a.abs_diff(b) >= MAX_RANGE_LEN {
        return None;
    }
    let values: Vec<u64> = if a <= b {
        (a..=b).collect()
    } else {
        (b..=a).rev().collect()
    };
    Some(values.into_iter().map(|v| Reference(v.to_string())).collect())
}

/// The pins (or wires) selected by one item of a connection set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinSelection {
    Single(Reference),
    Many(Vec<Reference>),
    /// A range written as one string, e.g. `"3-7"`, kept with its source text.
    LabeledRange { text: String, refs: Vec<Reference> },
}

impl PinSelection {
    /// Classify a single scalar: a range string becomes `LabeledRange`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        match expand_range(&text) {
            Some(refs) => PinSelection::LabeledRange { text, refs },
            None => PinSelection::Single(Reference(text)),
        }
    }

    /// Build from a list, expanding range strings inside it in place.
    pub fn from_list(items: impl IntoIterator<Item = Reference>) -> Self {
        let refs = items
            .into_iter()
            .flat_map(|r| expand_range(r.as_str()).unwrap_or_else(|| vec![r]))
            .collect();
        PinSelection::Many(refs)
    }

    pub fn references(&self) -> &[Reference] {
        match self {
            PinSelection::Single(r) => std::slice::from_ref(r),
            PinSelection::Many(refs) | PinSelection::LabeledRange { refs, .. } => refs,
        }
    }

    pub fn len(&self) -> usize {
        self.references().len()
    }

    pub fn is_empty(&self) -> bool {
        self.references().is_empty()
    }
}

/// One list of names a reference may match, e.g. pin numbers or wire labels.
pub(crate) struct Lookup<'a> {
    pub name: &'static str,
    pub entries: Vec<Option<&'a str>>,
}

impl<'a> Lookup<'a> {
    pub fn new(name: &'static str, entries: impl IntoIterator<Item = Option<&'a str>>) -> Self {
        Lookup {
            name,
            entries: entries.into_iter().collect(),
        }
    }
}

/// Resolve `reference` against a component's lookup lists, returning the
/// 0-based position it denotes.
///
/// The first list holds the canonical identifiers. A reference found more
/// than once in any list is ambiguous; found in two lists at different
/// positions it is conflicting; found in two lists at the same position it is
/// accepted.
pub(crate) fn resolve(
    designator: &str,
    reference: &Reference,
    kind: &'static str,
    lookups: &[Lookup<'_>],
) -> Result<usize> {
    let mut hit: Option<(&'static str, usize)> = None;
    for lookup in lookups {
        let mut positions = lookup
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| **entry == Some(reference.as_str()))
            .map(|(i, _)| i);
        let Some(position) = positions.next() else {
            continue;
        };
        if positions.next().is_some() {
            return Err(HarnessError::AmbiguousReference {
                designator: designator.to_string(),
                reference: reference.to_string(),
                kind,
            });
        }
        match hit {
            None => hit = Some((lookup.name, position)),
            Some((first, previous)) if previous != position => {
                return Err(HarnessError::ConflictingReference {
                    designator: designator.to_string(),
                    reference: reference.to_string(),
                    first,
                    second: lookup.name,
                    kind,
                });
            }
            Some(_) => {}
        }
    }
    hit.map(|(_, position)| position)
        .ok_or_else(|| HarnessError::ReferenceNotFound {
            designator: designator.to_string(),
            reference: reference.to_string(),
        })
}
