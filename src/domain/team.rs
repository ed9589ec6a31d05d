use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Entity, EntityKind, Operation, RecordContext, RecordId, labeled_enum, not_transitionable,
    parse_choice, require_email, require_text,
};
use crate::error::{CollectionError, FieldViolation};
use crate::session::Role;

labeled_enum! {
    #[derive(Default)]
    pub enum MemberStatus {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: MemberStatus,
    pub joined_at: NaiveDate,
    pub last_active: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemberDraft {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: MemberStatus,
}

impl Entity for TeamMember {
    type Draft = MemberDraft;

    const KIND: EntityKind = EntityKind::TeamMember;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.email.as_str()]
    }

    fn default_draft(_ctx: &RecordContext<'_, Self>) -> MemberDraft {
        MemberDraft::default()
    }

    fn to_draft(&self) -> MemberDraft {
        MemberDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            status: self.status,
        }
    }

    fn validate(draft: &MemberDraft) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        require_text(&mut violations, "name", &draft.name);
        require_email(&mut violations, "email", &draft.email);
        violations
    }

    fn from_draft(id: RecordId, draft: &MemberDraft, ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            role: draft.role,
            status: draft.status,
            joined_at: ctx.today,
            last_active: ctx.today,
        }
    }

    fn merge_draft(&self, draft: &MemberDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            role: draft.role,
            status: draft.status,
            ..self.clone()
        }
    }

    fn transition(&self, field: &str, value: &str) -> Result<Self, CollectionError> {
        match field {
            "role" => Ok(Self {
                role: parse_choice(Self::KIND, field, value)?,
                ..self.clone()
            }),
            "status" => Ok(Self {
                status: parse_choice(Self::KIND, field, value)?,
                ..self.clone()
            }),
            _ => Err(not_transitionable(Self::KIND, field, value)),
        }
    }

    fn field_value(&self, field: &str) -> Option<&'static str> {
        match field {
            "role" => Some(self.role.as_str()),
            "status" => Some(self.status.as_str()),
            _ => None,
        }
    }

    fn requires_admin(_op: Operation) -> bool {
        true
    }
}
