//! Team and invite-code administration through `Organization`.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use bizdesk::clock::FixedClock;
use bizdesk::collection::{CollectionManager, RecordBackend};
use bizdesk::config::DeskConfig;
use bizdesk::domain::{InviteCode, InviteStatus, RecordId, SequentialIds};
use bizdesk::error::CollectionError;
use bizdesk::org::Organization;
use bizdesk::seed::seed_data;
use bizdesk::session::Role;

use common::{FailAfter, date, session, today};

fn organization(role: Role, config: DeskConfig) -> Organization {
    organization_with(role, config, None)
}

fn organization_with(
    role: Role,
    config: DeskConfig,
    invite_backend: Option<Arc<dyn RecordBackend<InviteCode>>>,
) -> Organization {
    let seed = seed_data().unwrap();
    let session = session(role);
    let config = Arc::new(config);
    let clock = Arc::new(FixedClock(today()));
    let team = CollectionManager::new(Arc::clone(&session), Arc::clone(&config), seed.team.clone())
        .with_clock(clock.clone())
        .with_id_generator(Arc::new(SequentialIds::starting_at(10)));
    let mut invites = CollectionManager::new(Arc::clone(&session), config, seed.invites.clone())
        .with_clock(clock)
        .with_id_generator(Arc::new(SequentialIds::starting_at(10)));
    if let Some(backend) = invite_backend {
        invites = invites.with_backend(backend);
    }
    Organization::from_managers(session, team, invites)
}

#[tokio::test]
async fn generated_invite_codes_follow_the_sequence() {
    let org = organization(Role::Admin, DeskConfig::default());

    let first = org.generate_invite(Role::User).await.unwrap();
    assert_eq!(first.code, "ACME-USER-2023-004");
    assert_eq!(first.status, InviteStatus::Active);
    assert_eq!(first.created_at, today());
    assert_eq!(first.expires_at, date(2023, 7, 15));

    let second = org.generate_invite(Role::Admin).await.unwrap();
    assert_eq!(second.code, "ACME-ADMIN-2023-005");
    assert_eq!(org.invites().len(), 5);
}

#[tokio::test]
async fn org_code_and_validity_come_from_config() {
    let config = DeskConfig {
        organization_code: "GLOBEX".to_string(),
        invite_validity_days: 7,
        ..DeskConfig::default()
    };
    let org = organization(Role::Admin, config);
    let invite = org.generate_invite(Role::User).await.unwrap();
    assert_eq!(invite.code, "GLOBEX-USER-2023-004");
    assert_eq!(invite.expires_at, date(2023, 6, 22));
}

#[tokio::test]
async fn sequence_restarts_from_remaining_count() {
    let org = organization(Role::Admin, DeskConfig::default());
    org.delete_invite(&RecordId::from("3")).await.unwrap();
    assert_eq!(org.invites().len(), 2);

    // Two codes remain, so numbering resumes at 003.
    let next = org.generate_invite(Role::User).await.unwrap();
    assert_eq!(next.code, "ACME-USER-2023-003");
}

#[tokio::test]
async fn expire_invites_marks_lapsed_active_codes() {
    let org = organization(Role::Admin, DeskConfig::default());

    assert!(org.expire_invites(date(2023, 7, 10)).await.unwrap().is_empty());

    let expired = org.expire_invites(date(2023, 7, 11)).await.unwrap();
    let codes: Vec<_> = expired.iter().map(|i| i.code.as_str()).collect();
    assert_eq!(codes, vec!["ACME-USER-2023-001"]);

    let statuses: Vec<_> = org.invites().list("").iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![InviteStatus::Expired, InviteStatus::Used, InviteStatus::Expired]
    );
}

#[tokio::test]
async fn expire_invites_reports_codes_expired_before_a_failure() {
    let org = organization_with(
        Role::Admin,
        DeskConfig::default(),
        Some(Arc::new(FailAfter::new(2))),
    );
    let fresh = org.generate_invite(Role::User).await.unwrap();

    let err = org.expire_invites(date(2023, 7, 16)).await.unwrap_err();
    assert!(matches!(err, CollectionError::Interrupted { .. }));
    assert_eq!(err.applied().len(), 1);
    assert_ne!(err.applied()[0], fresh.id);

    let expired = org.invites().get(&err.applied()[0]).unwrap();
    assert_eq!(expired.status, InviteStatus::Expired);
    assert_eq!(org.invites().get(&fresh.id).unwrap().status, InviteStatus::Active);
}

#[tokio::test]
async fn member_admin_requires_admin_role() {
    let user_org = organization(Role::User, DeskConfig::default());
    let id = RecordId::from("3");

    for err in [
        user_org.change_member_role(&id, Role::Admin).await.unwrap_err(),
        user_org.remove_member(&id).await.unwrap_err(),
        user_org.delete_invite(&RecordId::from("1")).await.unwrap_err(),
        user_org.expire_invites(today()).await.unwrap_err(),
    ] {
        assert!(matches!(err, CollectionError::Permission { role: Role::User, .. }));
    }
    assert_eq!(user_org.team().len(), 3);
    assert_eq!(user_org.invites().len(), 3);

    let admin_org = organization(Role::Admin, DeskConfig::default());
    let promoted = admin_org.change_member_role(&id, Role::Admin).await.unwrap();
    assert_eq!(promoted.role, Role::Admin);
    admin_org.remove_member(&id).await.unwrap();
    assert_eq!(admin_org.team().len(), 2);
    assert!(admin_org.team().begin_edit(&id).is_err());
}

#[tokio::test]
async fn search_covers_code_and_redeemer() {
    let org = organization(Role::Admin, DeskConfig::default());
    let hits: Vec<_> = org
        .invites()
        .list("jane@")
        .into_iter()
        .map(|i| i.code)
        .collect();
    assert_eq!(hits, vec!["ACME-ADMIN-2023-001".to_string()]);
    assert_eq!(org.invites().list("acme-user").len(), 2);
}
