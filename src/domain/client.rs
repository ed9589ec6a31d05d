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
    pub enum ClientStatus {
        #[default]
        Active => "active",
        Inactive => "inactive",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    pub status: ClientStatus,
    pub total_revenue: Decimal,
    pub last_contact: NaiveDate,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub status: ClientStatus,
    pub notes: String,
}

impl Client {
    /// How the client is shown on tasks and invoices: the company, or the
    /// contact name for individuals.
    pub fn display_name(&self) -> &str {
        if self.company.trim().is_empty() {
            &self.name
        } else {
            &self.company
        }
    }
}

impl Entity for Client {
    type Draft = ClientDraft;

    const KIND: EntityKind = EntityKind::Client;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.company.as_str(), self.email.as_str()]
    }

    fn default_draft(_ctx: &RecordContext<'_, Self>) -> ClientDraft {
        ClientDraft::default()
    }

    fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
            status: self.status,
            notes: self.notes.clone(),
        }
    }

    fn validate(draft: &ClientDraft) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        require_text(&mut violations, "name", &draft.name);
        require_email(&mut violations, "email", &draft.email);
        violations
    }

    fn from_draft(id: RecordId, draft: &ClientDraft, ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            company: draft.company.trim().to_string(),
            status: draft.status,
            total_revenue: Decimal::ZERO,
            last_contact: ctx.today,
            notes: draft.notes.clone(),
        }
    }

    fn merge_draft(&self, draft: &ClientDraft) -> Self {
        Self {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            company: draft.company.trim().to_string(),
            status: draft.status,
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
