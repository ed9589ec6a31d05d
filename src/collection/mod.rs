//! Generic collection manager.
//!
//! A [`CollectionManager`] owns the ordered records of one entity kind. Reads
//! work on the current snapshot and never wait on the backend. Mutations are
//! validated, sent to the [`RecordBackend`] as a [`Command`], and only then
//! swapped in as a new snapshot. One mutation may be in flight at a time.

mod backend;
mod command;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::NaiveDate;

pub use backend::{LocalBackend, RecordBackend};
pub use command::Command;

use crate::clock::{Clock, SystemClock};
use crate::config::DeskConfig;
use crate::domain::{
    Entity, EntityKind, IdGenerator, Operation, RecordContext, RecordId, UuidIds,
};
use crate::error::CollectionError;
use crate::session::SessionContext;

const MAX_ID_ATTEMPTS: usize = 16;

/// Releases the in-flight flag when dropped, including on cancellation.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool, kind: EntityKind) -> Result<Self, CollectionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CollectionError::Busy { kind })?;
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct CollectionManager<E: Entity> {
    records: Mutex<Arc<Vec<E>>>,
    session: Arc<SessionContext>,
    config: Arc<DeskConfig>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    backend: Arc<dyn RecordBackend<E>>,
    in_flight: AtomicBool,
}

impl<E: Entity> std::fmt::Debug for CollectionManager<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionManager")
            .field("kind", &E::KIND)
            .field("len", &self.len())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl<E: Entity> CollectionManager<E> {
    /// Manager over `seed`, backed by a [`LocalBackend`] with the configured latency.
    pub fn new(session: Arc<SessionContext>, config: Arc<DeskConfig>, seed: Vec<E>) -> Self {
        let backend = Arc::new(LocalBackend::new(config.backend_latency));
        Self {
            records: Mutex::new(Arc::new(seed)),
            session,
            config,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidIds),
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_backend(mut self, backend: Arc<dyn RecordBackend<E>>) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn lock_records(&self) -> MutexGuard<'_, Arc<Vec<E>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The committed records as of now. Later mutations do not affect it.
    pub fn snapshot(&self) -> Arc<Vec<E>> {
        Arc::clone(&self.lock_records())
    }

    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &RecordId) -> Option<E> {
        self.snapshot().iter().find(|r| r.id() == id).cloned()
    }

    /// Records whose searchable fields contain `term`, case-insensitively,
    /// in collection order. The empty term returns everything; any other term,
    /// whitespace included, is matched as given.
    pub fn list(&self, term: &str) -> Vec<E> {
        let records = self.snapshot();
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return records.as_ref().clone();
        }
        records
            .iter()
            .filter(|record| {
                record
                    .search_fields()
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect()
    }

    /// Whether a mutation is pending.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn begin_create(&self) -> E::Draft {
        let records = self.snapshot();
        E::default_draft(&RecordContext {
            today: self.clock.today(),
            config: &self.config,
            existing: &records,
        })
    }

    pub fn begin_edit(&self, id: &RecordId) -> Result<E::Draft, CollectionError> {
        self.get(id)
            .map(|record| record.to_draft())
            .ok_or_else(|| not_found::<E>(id))
    }

    /// Create (no `existing`) or update the record `existing` from `draft`.
    pub async fn save(
        &self,
        draft: &E::Draft,
        existing: Option<&RecordId>,
    ) -> Result<E, CollectionError> {
        let op = if existing.is_some() {
            Operation::Update
        } else {
            Operation::Create
        };
        self.authorize(op)?;

        let violations = E::validate(draft);
        if !violations.is_empty() {
            tracing::debug!(
                kind = %E::KIND,
                violations = violations.len(),
                "rejected draft"
            );
            return Err(CollectionError::Validation(violations));
        }

        let _guard = InFlight::acquire(&self.in_flight, E::KIND)?;
        let records = self.snapshot();

        let record = match existing {
            Some(id) => {
                let current = records
                    .iter()
                    .find(|r| r.id() == id)
                    .ok_or_else(|| not_found::<E>(id))?;
                let updated = current.merge_draft(draft);
                self.check_workflow(current, &updated, "status")?;
                updated
            }
            None => {
                let id = self.fresh_id(&records);
                let ctx = RecordContext {
                    today: self.clock.today(),
                    config: &self.config,
                    existing: &records,
                };
                let created = E::from_draft(id, draft, &ctx);
                if let Some(status) = created.field_value("status") {
                    self.config.workflow.check_initial(E::KIND, "status", status)?;
                }
                created
            }
        };

        let command = match existing {
            Some(_) => Command::UpdateRecord {
                record: record.clone(),
            },
            None => Command::CreateRecord {
                record: record.clone(),
            },
        };
        self.commit(&command).await?;
        Ok(record)
    }

    /// Delete by id. Deleting an absent id succeeds without touching anything.
    pub async fn remove(&self, id: &RecordId) -> Result<(), CollectionError> {
        self.authorize(Operation::Delete)?;
        let _guard = InFlight::acquire(&self.in_flight, E::KIND)?;

        if !self.snapshot().iter().any(|r| r.id() == id) {
            tracing::debug!(kind = %E::KIND, id = %id, "delete of absent record ignored");
            return Ok(());
        }

        self.commit(&Command::DeleteRecord { id: id.clone() }).await
    }

    /// Set one enumerated field of record `id` to `value`.
    pub async fn transition(
        &self,
        id: &RecordId,
        field: &str,
        value: &str,
    ) -> Result<E, CollectionError> {
        self.authorize(Operation::Transition)?;
        let _guard = InFlight::acquire(&self.in_flight, E::KIND)?;

        let current = self.get(id).ok_or_else(|| not_found::<E>(id))?;
        let updated = current.transition(field, value)?;
        self.check_workflow(&current, &updated, field)?;

        let command = Command::Transition {
            id: id.clone(),
            field: field.to_string(),
            value: value.to_string(),
            record: updated.clone(),
        };
        self.commit(&command).await?;
        Ok(updated)
    }

    /// Apply the same transition to each of `ids` in turn, stopping at the
    /// first failure.
    ///
    /// When earlier records were already committed the error is
    /// [`CollectionError::Interrupted`], naming them; otherwise the failure is
    /// returned as is and nothing changed.
    pub async fn transition_each(
        &self,
        ids: &[RecordId],
        field: &str,
        value: &str,
    ) -> Result<Vec<E>, CollectionError> {
        let mut applied = Vec::with_capacity(ids.len());
        for id in ids {
            match self.transition(id, field, value).await {
                Ok(record) => applied.push(record),
                Err(e) if applied.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        kind = %E::KIND,
                        id = %id,
                        committed = applied.len(),
                        error = %e,
                        "batch transition interrupted"
                    );
                    return Err(CollectionError::Interrupted {
                        kind: E::KIND,
                        applied: applied.iter().map(|r: &E| r.id().clone()).collect(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(applied)
    }

    fn authorize(&self, op: Operation) -> Result<(), CollectionError> {
        if E::requires_admin(op) {
            self.session
                .require_admin(&format!("{} {}", op.as_str(), E::KIND))?;
        }
        Ok(())
    }

    fn check_workflow(&self, current: &E, updated: &E, field: &str) -> Result<(), CollectionError> {
        match (current.field_value(field), updated.field_value(field)) {
            (Some(from), Some(to)) => self.config.workflow.check(E::KIND, field, from, to),
            _ => Ok(()),
        }
    }

    fn fresh_id(&self, records: &[E]) -> RecordId {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if !records.iter().any(|r| r.id() == &id) {
                return id;
            }
            tracing::debug!(kind = %E::KIND, id = %id, "generated id collides, retrying");
        }
        tracing::warn!(
            kind = %E::KIND,
            attempts = MAX_ID_ATTEMPTS,
            "id generator keeps colliding, falling back to uuid"
        );
        UuidIds.next_id()
    }

    /// Send `command` to the backend and, once acknowledged, swap in the new
    /// snapshot.
    async fn commit(&self, command: &Command<E>) -> Result<(), CollectionError> {
        if let Err(e) = self.backend.execute(command).await {
            tracing::warn!(
                kind = %command.kind(),
                id = %command.record_id(),
                command = command.name(),
                error = %e,
                "backend rejected mutation"
            );
            return Err(e.into());
        }

        {
            let mut records = self.lock_records();
            let next = command.apply(&records);
            *records = Arc::new(next);
        }

        tracing::info!(
            kind = %command.kind(),
            id = %command.record_id(),
            command = command.name(),
            "committed"
        );
        Ok(())
    }
}

fn not_found<E: Entity>(id: &RecordId) -> CollectionError {
    CollectionError::NotFound {
        kind: E::KIND,
        id: id.clone(),
    }
}
