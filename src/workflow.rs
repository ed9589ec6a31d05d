//! Status workflow policy.
//!
//! Under [`WorkflowPolicy::Permissive`] every status is reachable from every
//! other. [`WorkflowPolicy::Strict`] restricts invoice, prospect and task
//! statuses to the moves listed in the tables below.

use std::fmt;

use crate::domain::EntityKind;
use crate::error::CollectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowPolicy {
    #[default]
    Permissive,
    Strict,
}

type TransitionTable = &'static [(&'static str, &'static [&'static str])];

const INVOICE_STATUS: TransitionTable = &[
    ("draft", &["sent"]),
    ("sent", &["paid", "overdue"]),
    ("overdue", &["paid", "sent"]),
    ("paid", &[]),
];

const PROSPECT_STATUS: TransitionTable = &[
    ("new", &["contacted", "lost"]),
    ("contacted", &["qualified", "lost"]),
    ("qualified", &["proposal", "lost"]),
    ("proposal", &["negotiation", "lost"]),
    ("negotiation", &["proposal", "lost"]),
    ("lost", &["new"]),
];

const TASK_STATUS: TransitionTable = &[
    ("pending", &["in-progress", "completed"]),
    ("in-progress", &["pending", "completed"]),
    ("completed", &["in-progress"]),
];

fn strict_table(kind: EntityKind, field: &str) -> Option<TransitionTable> {
    if field != "status" {
        return None;
    }
    match kind {
        EntityKind::Invoice => Some(INVOICE_STATUS),
        EntityKind::Prospect => Some(PROSPECT_STATUS),
        EntityKind::Task => Some(TASK_STATUS),
        EntityKind::Client | EntityKind::TeamMember | EntityKind::InviteCode => None,
    }
}

impl WorkflowPolicy {
    /// Case-insensitive parse of `permissive` / `strict`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(Self::Permissive),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }

    /// Targets reachable from `from` under this policy, or `None` when the
    /// field is unrestricted.
    pub fn allowed_targets(
        self,
        kind: EntityKind,
        field: &str,
        from: &str,
    ) -> Option<&'static [&'static str]> {
        if self == Self::Permissive {
            return None;
        }
        let table = strict_table(kind, field)?;
        Some(
            table
                .iter()
                .find(|(state, _)| *state == from)
                .map(|(_, targets)| *targets)
                .unwrap_or(&[]),
        )
    }

    /// Where a new record must start, or `None` when any value is accepted.
    /// Strict tables start at their first state.
    pub fn initial_state(self, kind: EntityKind, field: &str) -> Option<&'static str> {
        if self == Self::Permissive {
            return None;
        }
        strict_table(kind, field)?.first().map(|(state, _)| *state)
    }

    /// Check the value `field` has on a record being created.
    pub fn check_initial(
        self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<(), CollectionError> {
        match self.initial_state(kind, field) {
            Some(initial) if initial != value => Err(CollectionError::InvalidTransition {
                kind,
                field: field.to_string(),
                value: value.to_string(),
                reason: format!("strict workflow starts new records at {initial}"),
            }),
            _ => Ok(()),
        }
    }

    /// Check a move of `field` from `from` to `to`.
    pub fn check(
        self,
        kind: EntityKind,
        field: &str,
        from: &str,
        to: &str,
    ) -> Result<(), CollectionError> {
        if from == to {
            return Ok(());
        }
        match self.allowed_targets(kind, field, from) {
            None => Ok(()),
            Some(targets) if targets.contains(&to) => Ok(()),
            Some(_) => Err(CollectionError::InvalidTransition {
                kind,
                field: field.to_string(),
                value: to.to_string(),
                reason: format!("strict workflow does not allow {from} -> {to}"),
            }),
        }
    }
}

impl fmt::Display for WorkflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
