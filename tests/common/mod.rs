//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Notify;

use bizdesk::clock::FixedClock;
use bizdesk::collection::{Command, CollectionManager, RecordBackend};
use bizdesk::config::DeskConfig;
use bizdesk::domain::{Entity, SequentialIds};
use bizdesk::error::BackendError;
use bizdesk::seed::seed_data;
use bizdesk::session::{Role, SessionContext};

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn session(role: Role) -> Arc<SessionContext> {
    let user_id = match role {
        Role::Admin => "1",
        Role::User => "2",
    };
    Arc::new(SessionContext::new(user_id, role, "org-1", "Acme Inc"))
}

/// Manager over `seed` with a fixed clock and ids counting up from 100.
pub fn manager<E: Entity>(role: Role, config: DeskConfig, seed: Vec<E>) -> CollectionManager<E> {
    CollectionManager::new(session(role), Arc::new(config), seed)
        .with_clock(Arc::new(FixedClock(today())))
        .with_id_generator(Arc::new(SequentialIds::starting_at(100)))
}

pub fn seeded<E: Entity>(role: Role, pick: impl FnOnce(&bizdesk::seed::SeedData) -> Vec<E>) -> CollectionManager<E> {
    let seed = seed_data().expect("bundled seed data");
    manager(role, DeskConfig::default(), pick(seed))
}

/// Backend that parks every command until released.
#[derive(Default)]
pub struct GatedBackend {
    pub entered: Notify,
    pub release: Notify,
}

#[async_trait]
impl<E: Entity> RecordBackend<E> for GatedBackend {
    async fn execute(&self, _command: &Command<E>) -> Result<(), BackendError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

/// Backend that is always down.
pub struct OfflineBackend;

#[async_trait]
impl<E: Entity> RecordBackend<E> for OfflineBackend {
    async fn execute(&self, _command: &Command<E>) -> Result<(), BackendError> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }
}

/// Backend that acknowledges the first `n` commands, then goes down.
pub struct FailAfter {
    remaining: AtomicUsize,
}

impl FailAfter {
    pub fn new(n: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(n),
        }
    }
}

#[async_trait]
impl<E: Entity> RecordBackend<E> for FailAfter {
    async fn execute(&self, _command: &Command<E>) -> Result<(), BackendError> {
        self.remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .map(|_| ())
            .map_err(|_| BackendError::Unavailable("connection reset".to_string()))
    }
}
