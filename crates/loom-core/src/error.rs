//! Errors raised while building a harness, its BOM or its diagram.
//!
//! Every error is fatal at the point it is detected. Nothing in this crate
//! retries or skips a failed connection; the caller decides whether to abort a
//! single harness or a whole batch.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

/// Broad classification of a [`HarnessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input shape: wrong counts, unknown designators, reused wires.
    Structural,
    /// A pin or wire reference that is ambiguous, conflicting or missing.
    Reference,
    /// A component or option that cannot be realised as configured.
    Configuration,
    /// Internal invariant violation.
    Consistency,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    #[error("{designator}: pin '{pin}' is defined more than once")]
    DuplicatePin { designator: String, pin: String },

    #[error("{designator}: {field} has {actual} entries, expected {expected}")]
    LengthMismatch {
        designator: String,
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{designator}: cannot determine {what}")]
    UndeterminedCount {
        designator: String,
        what: &'static str,
    },

    #[error("unknown designator '{0}'")]
    UnknownDesignator(String),

    #[error("designator '{0}' is defined more than once")]
    DuplicateDesignator(String),

    #[error("connection set {index}: items reference different numbers of connections ({counts})")]
    CardinalityMismatch { index: usize, counts: String },

    #[error("connection set {index}: {message}")]
    InvalidConnectionSet { index: usize, message: String },

    #[error("{designator}:{wire} is already used by another connection")]
    WireAlreadyConnected { designator: String, wire: String },

    #[error("{designator}: list-valued '{field}' is only allowed for bundles")]
    BundleOnlyField {
        designator: String,
        field: &'static str,
    },

    #[error("{designator}:{reference} is used for more than one {kind}")]
    AmbiguousReference {
        designator: String,
        reference: String,
        kind: &'static str,
    },

    #[error("{designator}:{reference} is defined both in {first} and {second}, for different {kind}s")]
    ConflictingReference {
        designator: String,
        reference: String,
        first: &'static str,
        second: &'static str,
        kind: &'static str,
    },

    #[error("{designator}:{reference} not found")]
    ReferenceNotFound {
        designator: String,
        reference: String,
    },

    #[error("{designator}: loop {first}-{second} needs an explicit side, pins are connected on both sides")]
    UnresolvableLoopSide {
        designator: String,
        first: String,
        second: String,
    },

    #[error(
        "{}unknown color '{color}'",
        .designator.as_deref().map(|d| format!("{d}: ")).unwrap_or_default()
    )]
    UnknownColor {
        designator: Option<String>,
        color: String,
    },

    #[error("unknown color code '{0}'")]
    UnknownColorCode(String),

    #[error("unknown color mode '{0}'")]
    UnknownColorMode(String),

    #[error("{designator}: simple connectors must have exactly one pin, got {count}")]
    SimpleConnectorPins { designator: String, count: usize },

    #[error("{designator}: invalid gauge '{gauge}'")]
    InvalidGauge { designator: String, gauge: String },

    #[error("invalid arrow '{0}'")]
    InvalidArrow(String),

    #[error("{designator}: qty_multiplier '{multiplier}' does not apply to {kind}s")]
    InvalidQtyMultiplier {
        designator: String,
        multiplier: String,
        kind: &'static str,
    },

    #[error("{designator}: {message}")]
    InvalidConfig { designator: String, message: String },

    #[error("harness '{0}' has unresolved loops, call finalize() first")]
    NotFinalized(String),

    #[error("BOM inconsistency: {0}")]
    BomInconsistency(String),
}

impl HarnessError {
    pub fn kind(&self) -> ErrorKind {
        use HarnessError::*;
        match self {
            DuplicatePin { .. }
            | LengthMismatch { .. }
            | UndeterminedCount { .. }
            | UnknownDesignator(_)
            | DuplicateDesignator(_)
            | CardinalityMismatch { .. }
            | InvalidConnectionSet { .. }
            | WireAlreadyConnected { .. }
            | BundleOnlyField { .. } => ErrorKind::Structural,
            AmbiguousReference { .. }
            | ConflictingReference { .. }
            | ReferenceNotFound { .. } => ErrorKind::Reference,
            UnresolvableLoopSide { .. }
            | UnknownColor { .. }
            | UnknownColorCode(_)
            | UnknownColorMode(_)
            | SimpleConnectorPins { .. }
            | InvalidGauge { .. }
            | InvalidArrow(_)
            | InvalidQtyMultiplier { .. }
            | InvalidConfig { .. } => ErrorKind::Configuration,
            NotFinalized(_) | BomInconsistency(_) => ErrorKind::Consistency,
        }
    }
}
