//! Record types and the schema trait the collection manager is generic over.

mod client;
mod invite;
mod invoice;
mod line_items;
mod prospect;
mod task;
mod team;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::DeskConfig;
use crate::error::{CollectionError, FieldViolation};
use crate::session::Role;

pub use client::{Client, ClientDraft, ClientStatus};
pub use invite::{InviteCode, InviteDraft, InviteStatus};
pub use invoice::{Invoice, InvoiceDraft, InvoiceStatus};
pub use line_items::{LineItem, LineItems};
pub use prospect::{Prospect, ProspectDraft, ProspectStatus};
pub use task::{Task, TaskDraft, TaskPriority, TaskStatus};
pub use team::{MemberDraft, MemberStatus, TeamMember};

/// Opaque record identifier, assigned at creation and never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Client,
    Prospect,
    Task,
    Invoice,
    TeamMember,
    InviteCode,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Prospect => "prospect",
            Self::Task => "task",
            Self::Invoice => "invoice",
            Self::TeamMember => "team_member",
            Self::InviteCode => "invite_code",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutations a manager performs; used for permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update,
    Delete,
    Transition,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Transition => "transition",
        }
    }
}

/// What an entity may look at when building defaults or stamping a new record.
pub struct RecordContext<'a, E> {
    pub today: NaiveDate,
    pub config: &'a DeskConfig,
    pub existing: &'a [E],
}

/// Schema of one record kind.
pub trait Entity: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    /// Editable working copy.
    type Draft: Clone + fmt::Debug + Send + Sync;

    const KIND: EntityKind;

    fn id(&self) -> &RecordId;

    /// Text fields matched by `list`.
    fn search_fields(&self) -> Vec<&str>;

    fn default_draft(ctx: &RecordContext<'_, Self>) -> Self::Draft;

    /// Copy of every editable field.
    fn to_draft(&self) -> Self::Draft;

    /// Every violated constraint, in field order.
    fn validate(draft: &Self::Draft) -> Vec<FieldViolation>;

    /// Build a new record, stamping creation-only fields.
    fn from_draft(id: RecordId, draft: &Self::Draft, ctx: &RecordContext<'_, Self>) -> Self;

    /// Editable fields from `draft`, everything else from `self`.
    fn merge_draft(&self, draft: &Self::Draft) -> Self;

    /// Single-field update restricted to an enumerated domain.
    fn transition(&self, field: &str, value: &str) -> Result<Self, CollectionError>;

    /// Current wire value of a transitionable field.
    fn field_value(&self, _field: &str) -> Option<&'static str> {
        None
    }

    fn requires_admin(_op: Operation) -> bool {
        false
    }
}

/// Closed set of wire labels.
pub trait Choice: Copy + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == value)
    }
}

macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $($(#[$vmeta])* #[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_value(value: &str) -> Option<Self> {
                match value {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl $crate::domain::Choice for $name {
            const ALL: &'static [Self] = $name::ALL;

            fn label(self) -> &'static str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
pub(crate) use labeled_enum;

impl Choice for Role {
    const ALL: &'static [Self] = Role::ALL;

    fn label(self) -> &'static str {
        self.as_str()
    }
}

/// Parse `value` into one of `T`'s labels or reject it.
pub(crate) fn parse_choice<T: Choice>(
    kind: EntityKind,
    field: &str,
    value: &str,
) -> Result<T, CollectionError> {
    T::from_label(value).ok_or_else(|| CollectionError::InvalidTransition {
        kind,
        field: field.to_string(),
        value: value.to_string(),
        reason: format!(
            "expected one of: {}",
            T::ALL.iter().map(|c| c.label()).collect::<Vec<_>>().join(", ")
        ),
    })
}

pub(crate) fn not_transitionable(kind: EntityKind, field: &str, value: &str) -> CollectionError {
    CollectionError::InvalidTransition {
        kind,
        field: field.to_string(),
        value: value.to_string(),
        reason: "field is not transitionable".to_string(),
    }
}

pub(crate) fn require_text(violations: &mut Vec<FieldViolation>, field: &str, value: &str) {
    if value.trim().is_empty() {
        violations.push(FieldViolation::new(field, "is required"));
    }
}

pub(crate) fn require_email(violations: &mut Vec<FieldViolation>, field: &str, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        violations.push(FieldViolation::new(field, "is required"));
    } else if !value.contains('@') {
        violations.push(FieldViolation::new(field, "must be an email address"));
    }
}

/// `None` for blank input.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Client link of an edited record.
///
/// A draft that picked a different client keeps its pick. A draft that still
/// carries the stored link keeps it only while the client name is unchanged;
/// a renamed or blank client name drops the link.
pub(crate) fn relink_client(
    stored: (Option<&RecordId>, Option<&str>),
    draft: (Option<&RecordId>, Option<&str>),
) -> Option<RecordId> {
    let (stored_id, stored_name) = stored;
    let (draft_id, draft_name) = draft;
    if draft_name.is_none() {
        return None;
    }
    if draft_id != stored_id || draft_name == stored_name {
        draft_id.cloned()
    } else {
        None
    }
}

/// Source of fresh record identifiers.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> RecordId;
}

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> RecordId {
        RecordId(uuid::Uuid::new_v4().to_string())
    }
}

/// Counting identifiers, `"1"`, `"2"`, ...
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> RecordId {
        RecordId(self.next.fetch_add(1, Ordering::Relaxed).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_choice_lists_allowed_values() {
        let err = parse_choice::<Role>(EntityKind::TeamMember, "role", "owner").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 'owner' for team_member field 'role': expected one of: admin, user"
        );
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::starting_at(4);
        assert_eq!(ids.next_id(), RecordId::from("4"));
        assert_eq!(ids.next_id(), RecordId::from("5"));
    }

    #[test]
    fn uuid_ids_are_distinct() {
        let ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn email_check_reports_shape() {
        let mut violations = Vec::new();
        require_email(&mut violations, "email", "  ");
        require_email(&mut violations, "email", "nobody");
        require_email(&mut violations, "email", "a@b.co");
        assert_eq!(
            violations,
            vec![
                FieldViolation::new("email", "is required"),
                FieldViolation::new("email", "must be an email address"),
            ]
        );
    }
}
