use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{
    Entity, EntityKind, Operation, RecordContext, RecordId, labeled_enum, not_transitionable,
    parse_choice,
};
use crate::error::{CollectionError, FieldViolation};
use crate::session::Role;

labeled_enum! {
    #[derive(Default)]
    pub enum InviteStatus {
        #[default]
        Active => "active",
        Used => "used",
        Expired => "expired",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteCode {
    pub id: RecordId,
    pub code: String,
    pub role: Role,
    pub status: InviteStatus,
    pub created_at: NaiveDate,
    pub expires_at: NaiveDate,
    #[serde(default)]
    pub used_by: Option<String>,
}

impl InviteCode {
    /// Active but past its expiry date.
    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        self.status == InviteStatus::Active && self.expires_at < today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InviteDraft {
    pub role: Role,
}

/// `{ORG}-{ROLE}-{YEAR}-{NNN}`, numbered after the existing invites and
/// bumped past any code already taken.
fn generate_code(role: Role, ctx: &RecordContext<'_, InviteCode>) -> String {
    let prefix = format!(
        "{}-{}-{}",
        ctx.config.organization_code,
        role.as_str().to_ascii_uppercase(),
        ctx.today.year()
    );
    let mut sequence = ctx.existing.len() + 1;
    loop {
        let code = format!("{prefix}-{sequence:03}");
        if !ctx.existing.iter().any(|invite| invite.code == code) {
            return code;
        }
        sequence += 1;
    }
}

impl Entity for InviteCode {
    type Draft = InviteDraft;

    const KIND: EntityKind = EntityKind::InviteCode;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.code.as_str()];
        if let Some(used_by) = &self.used_by {
            fields.push(used_by);
        }
        fields
    }

    fn default_draft(_ctx: &RecordContext<'_, Self>) -> InviteDraft {
        InviteDraft::default()
    }

    fn to_draft(&self) -> InviteDraft {
        InviteDraft { role: self.role }
    }

    fn validate(_draft: &InviteDraft) -> Vec<FieldViolation> {
        Vec::new()
    }

    fn from_draft(id: RecordId, draft: &InviteDraft, ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            code: generate_code(draft.role, ctx),
            role: draft.role,
            status: InviteStatus::Active,
            created_at: ctx.today,
            expires_at: ctx.today + Duration::days(ctx.config.invite_validity_days),
            used_by: None,
        }
    }

    fn merge_draft(&self, draft: &InviteDraft) -> Self {
        Self {
            role: draft.role,
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

    fn requires_admin(_op: Operation) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::config::DeskConfig;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invite(id: &str, code: &str) -> InviteCode {
        InviteCode {
            id: RecordId::from(id),
            code: code.to_string(),
            role: Role::User,
            status: InviteStatus::Active,
            created_at: date(2023, 6, 10),
            expires_at: date(2023, 7, 10),
            used_by: None,
        }
    }

    #[test]
    fn code_uses_org_role_year_and_next_sequence() {
        let config = DeskConfig::default();
        let existing = vec![
            invite("1", "ACME-USER-2023-001"),
            invite("2", "ACME-ADMIN-2023-001"),
        ];
        let ctx = RecordContext {
            today: date(2023, 6, 14),
            config: &config,
            existing: &existing,
        };
        let created = InviteCode::from_draft(
            RecordId::from("3"),
            &InviteDraft { role: Role::Admin },
            &ctx,
        );
        assert_eq!(created.code, "ACME-ADMIN-2023-003");
        assert_eq!(created.expires_at, date(2023, 7, 14));
        assert_eq!(created.status, InviteStatus::Active);
    }

    #[test]
    fn sequence_skips_codes_already_taken() {
        let config = DeskConfig::default();
        let existing = vec![invite("9", "ACME-USER-2023-002")];
        let ctx = RecordContext {
            today: date(2023, 1, 1),
            config: &config,
            existing: &existing,
        };
        let created = InviteCode::from_draft(RecordId::from("10"), &InviteDraft::default(), &ctx);
        assert_eq!(created.code, "ACME-USER-2023-003");
    }

    #[test]
    fn lapsed_means_active_and_past_expiry() {
        let mut code = invite("1", "ACME-USER-2023-001");
        assert!(!code.is_lapsed(date(2023, 7, 10)));
        assert!(code.is_lapsed(date(2023, 7, 11)));
        code.status = InviteStatus::Used;
        assert!(!code.is_lapsed(date(2023, 7, 11)));
    }
}
