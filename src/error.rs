//! Error types shared across the crate.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::{EntityKind, RecordId};
use crate::session::Role;

/// A single violated constraint on a draft field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Field path, e.g. `name` or `items[1].quantity`.
    pub field: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors surfaced by collection operations.
///
/// Every variant is recoverable: the presentation layer renders it inline and
/// the collection is left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionError {
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: RecordId },

    #[error("invalid value '{value}' for {kind} field '{field}': {reason}")]
    InvalidTransition {
        kind: EntityKind,
        field: String,
        value: String,
        reason: String,
    },

    #[error("{operation} requires the admin role (current role: {role})")]
    Permission { operation: String, role: Role },

    #[error("another {kind} change is still in flight")]
    Busy { kind: EntityKind },

    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A batch stopped part way. `applied` lists the records already committed.
    #[error("{kind} batch stopped after {} committed change(s): {source}", .applied.len())]
    Interrupted {
        kind: EntityKind,
        applied: Vec<RecordId>,
        source: Box<CollectionError>,
    },
}

impl CollectionError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, reason)])
    }

    /// Violated fields, when this is a validation failure.
    pub fn violations(&self) -> Option<&[FieldViolation]> {
        match self {
            Self::Validation(violations) => Some(violations),
            _ => None,
        }
    }

    /// Whether re-invoking the same operation may succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Busy { .. } | Self::Backend(BackendError::Unavailable(_)) => true,
            Self::Interrupted { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Records a batch committed before failing, if this is an interrupted batch.
    pub fn applied(&self) -> &[RecordId] {
        match self {
            Self::Interrupted { applied, .. } => applied,
            _ => &[],
        }
    }
}

/// Failures reported by a [`RecordBackend`](crate::collection::RecordBackend).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend rejected command: {0}")]
    Rejected(String),
}

/// Configuration loading and resolution errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("failed to read settings file {}: {reason}", .path.display())]
    Io { path: PathBuf, reason: String },

    #[error("failed to parse settings: {0}")]
    Parse(String),
}

/// Errors loading the bundled seed data.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SeedError {
    #[error("invalid seed data: {0}")]
    Invalid(String),

    #[error("duplicate {kind} id '{id}' in seed data")]
    DuplicateId { kind: EntityKind, id: RecordId },
}
