use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    Entity, EntityKind, RecordContext, RecordId, labeled_enum, not_transitionable, parse_choice,
    require_email, require_text,
};
use crate::error::{CollectionError, FieldViolation};

labeled_enum! {
    #[derive(Default)]
    pub enum ProspectStatus {
        #[default]
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Proposal => "proposal",
        Negotiation => "negotiation",
        Lost => "lost",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub status: ProspectStatus,
    #[serde(default)]
    pub source: String,
    pub estimated_value: Decimal,
    pub last_contact: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

impl Prospect {
    /// Still in the pipeline.
    pub fn is_open(&self) -> bool {
        self.status != ProspectStatus::Lost
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProspectDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: ProspectStatus,
    pub source: String,
    pub estimated_value: Decimal,
    pub notes: String,
}

impl Entity for Prospect {
    type Draft = ProspectDraft;

    const KIND: EntityKind = EntityKind::Prospect;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.company.as_str(), self.email.as_str()]
    }

    fn default_draft(_ctx: &RecordContext<'_, Self>) -> ProspectDraft {
        ProspectDraft::default()
    }

    fn to_draft(&self) -> ProspectDraft {
        ProspectDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            status: self.status,
            source: self.source.clone(),
            estimated_value: self.estimated_value,
            notes: self.notes.clone(),
        }
    }

    fn validate(draft: &ProspectDraft) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        require_text(&mut violations, "name", &draft.name);
        require_email(&mut violations, "email", &draft.email);
        if draft.estimated_value < Decimal::ZERO {
            violations.push(FieldViolation::new("estimated_value", "must be at least 0"));
        }
        violations
    }

    fn from_draft(id: RecordId, draft: &ProspectDraft, ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            company: draft.company.trim().to_string(),
            status: draft.status,
            source: draft.source.trim().to_string(),
            estimated_value: draft.estimated_value,
            last_contact: ctx.today,
            notes: draft.notes.clone(),
        }
    }

    fn merge_draft(&self, draft: &ProspectDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            company: draft.company.trim().to_string(),
            status: draft.status,
            source: draft.source.trim().to_string(),
            estimated_value: draft.estimated_value,
            notes: draft.notes.clone(),
            ..self.clone()
        }
    }

    fn transition(&self, field: &str, value: &str) -> Result<Self, CollectionError> {
        match field {
            "status" => Ok(Self {
                status: parse_choice(Self::KIND, field, value)?,
                ..self.clone()
            }),
            _ => Err(not_transitionable(Self::KIND, field, value)),
        }
    }

    fn field_value(&self, field: &str) -> Option<&'static str> {
        (field == "status").then(|| self.status.as_str())
    }
}
