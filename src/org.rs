//! Organization administration: profile, team and invite codes.
//!
//! Every mutation here is admin-only.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::collection::CollectionManager;
use crate::config::DeskConfig;
use crate::domain::{InviteCode, InviteDraft, InviteStatus, RecordId, TeamMember};
use crate::error::{CollectionError, FieldViolation};
use crate::session::{Role, SessionContext};

pub const DEFAULT_DESCRIPTION: &str = "A modern CRM solution for growing businesses";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub name: String,
    pub description: String,
}

impl OrganizationProfile {
    /// Profile named after the session's organization.
    pub fn for_session(session: &SessionContext) -> Self {
        Self {
            name: session.organization_name.clone(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Organization {
    session: Arc<SessionContext>,
    profile: Mutex<OrganizationProfile>,
    team: CollectionManager<TeamMember>,
    invites: CollectionManager<InviteCode>,
}

impl Organization {
    pub fn new(
        session: Arc<SessionContext>,
        config: Arc<DeskConfig>,
        team: Vec<TeamMember>,
        invites: Vec<InviteCode>,
    ) -> Self {
        Self::from_managers(
            Arc::clone(&session),
            CollectionManager::new(Arc::clone(&session), Arc::clone(&config), team),
            CollectionManager::new(session, config, invites),
        )
    }

    /// Assemble from pre-configured managers (custom clock, backend, ids).
    pub fn from_managers(
        session: Arc<SessionContext>,
        team: CollectionManager<TeamMember>,
        invites: CollectionManager<InviteCode>,
    ) -> Self {
        let profile = OrganizationProfile::for_session(&session);
        Self {
            session,
            profile: Mutex::new(profile),
            team,
            invites,
        }
    }

    pub fn team(&self) -> &CollectionManager<TeamMember> {
        &self.team
    }

    pub fn invites(&self) -> &CollectionManager<InviteCode> {
        &self.invites
    }

    pub fn profile(&self) -> OrganizationProfile {
        self.profile
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn update_profile(
        &self,
        profile: OrganizationProfile,
    ) -> Result<OrganizationProfile, CollectionError> {
        self.session.require_admin("update organization profile")?;
        if profile.name.trim().is_empty() {
            return Err(CollectionError::Validation(vec![FieldViolation::new(
                "name",
                "is required",
            )]));
        }

        let profile = OrganizationProfile {
            name: profile.name.trim().to_string(),
            description: profile.description,
        };
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = profile.clone();
        tracing::info!(organization_id = %self.session.organization_id, "organization profile updated");
        Ok(profile)
    }

    pub async fn change_member_role(
        &self,
        id: &RecordId,
        role: Role,
    ) -> Result<TeamMember, CollectionError> {
        self.team.transition(id, "role", role.as_str()).await
    }

    pub async fn remove_member(&self, id: &RecordId) -> Result<(), CollectionError> {
        self.team.remove(id).await
    }

    pub async fn generate_invite(&self, role: Role) -> Result<InviteCode, CollectionError> {
        self.invites.save(&InviteDraft { role }, None).await
    }

    pub async fn delete_invite(&self, id: &RecordId) -> Result<(), CollectionError> {
        self.invites.remove(id).await
    }

    /// Mark active invites past their expiry as expired. Returns those changed,
    /// or [`CollectionError::Interrupted`] if the batch stops part way.
    pub async fn expire_invites(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<InviteCode>, CollectionError> {
        self.session.require_admin("expire invite codes")?;
        let lapsed: Vec<RecordId> = self
            .invites
            .snapshot()
            .iter()
            .filter(|invite| invite.is_lapsed(today))
            .map(|invite| invite.id.clone())
            .collect();

        self.invites
            .transition_each(&lapsed, "status", InviteStatus::Expired.as_str())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org(role: Role) -> Organization {
        Organization::new(
            Arc::new(SessionContext::new("1", role, "org-1", "Acme Inc")),
            Arc::new(DeskConfig::default()),
            Vec::new(),
            Vec::new(),
        )
    }

    #[test]
    fn profile_defaults_to_session_org_name() {
        let profile = org(Role::Admin).profile();
        assert_eq!(profile.name, "Acme Inc");
        assert_eq!(profile.description, DEFAULT_DESCRIPTION);
    }

    #[test]
    fn profile_update_needs_admin_and_a_name() {
        let user_org = org(Role::User);
        let err = user_org
            .update_profile(OrganizationProfile {
                name: "Globex".to_string(),
                description: String::new(),
            })
            .unwrap_err();
        assert!(matches!(err, CollectionError::Permission { .. }));
        assert_eq!(user_org.profile().name, "Acme Inc");

        let admin_org = org(Role::Admin);
        assert!(
            admin_org
                .update_profile(OrganizationProfile {
                    name: "  ".to_string(),
                    description: String::new(),
                })
                .is_err()
        );
        let updated = admin_org
            .update_profile(OrganizationProfile {
                name: " Globex ".to_string(),
                description: "Widgets".to_string(),
            })
            .unwrap();
        assert_eq!(updated.name, "Globex");
        assert_eq!(admin_org.profile(), updated);
    }

    #[tokio::test]
    async fn invites_need_admin() {
        let err = org(Role::User).generate_invite(Role::User).await.unwrap_err();
        assert_eq!(
            err,
            CollectionError::Permission {
                operation: "create invite_code".to_string(),
                role: Role::User,
            }
        );
    }
}
