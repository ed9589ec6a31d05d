use serde::Serialize;

use crate::domain::{Entity, EntityKind, RecordId};

/// One mutation, as handed to a [`RecordBackend`](super::RecordBackend).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command<E> {
    CreateRecord {
        record: E,
    },
    UpdateRecord {
        record: E,
    },
    DeleteRecord {
        id: RecordId,
    },
    Transition {
        id: RecordId,
        field: String,
        value: String,
        record: E,
    },
}

impl<E: Entity> Command<E> {
    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRecord { .. } => "create_record",
            Self::UpdateRecord { .. } => "update_record",
            Self::DeleteRecord { .. } => "delete_record",
            Self::Transition { .. } => "transition",
        }
    }

    pub fn record_id(&self) -> &RecordId {
        match self {
            Self::CreateRecord { record }
            | Self::UpdateRecord { record }
            | Self::Transition { record, .. } => record.id(),
            Self::DeleteRecord { id } => id,
        }
    }

    /// The collection after this command, leaving `records` untouched.
    pub fn apply(&self, records: &[E]) -> Vec<E> {
        match self {
            Self::CreateRecord { record } => {
                let mut next = Vec::with_capacity(records.len() + 1);
                next.extend_from_slice(records);
                next.push(record.clone());
                next
            }
            Self::UpdateRecord { record } | Self::Transition { record, .. } => records
                .iter()
                .map(|existing| {
                    if existing.id() == record.id() {
                        record.clone()
                    } else {
                        existing.clone()
                    }
                })
                .collect(),
            Self::DeleteRecord { id } => records
                .iter()
                .filter(|existing| existing.id() != id)
                .cloned()
                .collect(),
        }
    }
}
