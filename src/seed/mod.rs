//! Bundled demo records.

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::domain::{Client, Entity, InviteCode, Invoice, Prospect, Task, TeamMember};
use crate::error::SeedError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub clients: Vec<Client>,
    pub prospects: Vec<Prospect>,
    pub tasks: Vec<Task>,
    pub invoices: Vec<Invoice>,
    pub team: Vec<TeamMember>,
    pub invites: Vec<InviteCode>,
}

static SEED: LazyLock<Result<SeedData, SeedError>> =
    LazyLock::new(|| SeedData::from_toml_str(include_str!("seed_data.toml")));

fn ensure_unique_ids<E: Entity>(records: &[E]) -> Result<(), SeedError> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id()) {
            tracing::warn!(kind = %E::KIND, id = %record.id(), "duplicate id in seed data");
            return Err(SeedError::DuplicateId {
                kind: E::KIND,
                id: record.id().clone(),
            });
        }
    }
    Ok(())
}

impl SeedData {
    pub fn from_toml_str(raw: &str) -> Result<Self, SeedError> {
        let data: SeedData = toml::from_str(raw).map_err(|e| SeedError::Invalid(e.to_string()))?;
        ensure_unique_ids(&data.clients)?;
        ensure_unique_ids(&data.prospects)?;
        ensure_unique_ids(&data.tasks)?;
        ensure_unique_ids(&data.invoices)?;
        ensure_unique_ids(&data.team)?;
        ensure_unique_ids(&data.invites)?;
        Ok(data)
    }
}

/// The bundled records, parsed once.
pub fn seed_data() -> Result<&'static SeedData, SeedError> {
    match &*SEED {
        Ok(data) => Ok(data),
        Err(err) => Err(err.clone()),
    }
}
