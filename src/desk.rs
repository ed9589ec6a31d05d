use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::collection::CollectionManager;
use crate::config::DeskConfig;
use crate::dashboard::DashboardMetrics;
use crate::domain::{Client, Invoice, Prospect, RecordId, Task};
use crate::error::{CollectionError, SeedError};
use crate::format;
use crate::org::Organization;
use crate::pipeline;
use crate::seed::{SeedData, seed_data};
use crate::session::SessionContext;

/// One manager per page, all sharing a session and configuration.
#[derive(Debug)]
pub struct Desk {
    pub session: Arc<SessionContext>,
    pub config: Arc<DeskConfig>,
    pub clients: CollectionManager<Client>,
    pub prospects: CollectionManager<Prospect>,
    pub tasks: CollectionManager<Task>,
    pub invoices: CollectionManager<Invoice>,
    pub organization: Organization,
}

impl Desk {
    pub fn from_seed(session: Arc<SessionContext>, config: Arc<DeskConfig>, seed: SeedData) -> Self {
        Self {
            clients: CollectionManager::new(Arc::clone(&session), Arc::clone(&config), seed.clients),
            prospects: CollectionManager::new(
                Arc::clone(&session),
                Arc::clone(&config),
                seed.prospects,
            ),
            tasks: CollectionManager::new(Arc::clone(&session), Arc::clone(&config), seed.tasks),
            invoices: CollectionManager::new(
                Arc::clone(&session),
                Arc::clone(&config),
                seed.invoices,
            ),
            organization: Organization::new(
                Arc::clone(&session),
                Arc::clone(&config),
                seed.team,
                seed.invites,
            ),
            session,
            config,
        }
    }

    /// Every page populated from the bundled demo records.
    pub fn seeded(session: Arc<SessionContext>, config: Arc<DeskConfig>) -> Result<Self, SeedError> {
        let seed = seed_data()?.clone();
        tracing::debug!(
            organization_id = %session.organization_id,
            "building desk from bundled seed data"
        );
        Ok(Self::from_seed(session, config, seed))
    }

    pub fn empty(session: Arc<SessionContext>, config: Arc<DeskConfig>) -> Self {
        Self::from_seed(session, config, SeedData::default())
    }

    pub fn dashboard(&self) -> DashboardMetrics {
        DashboardMetrics::compute(
            &self.clients.snapshot(),
            &self.prospects.snapshot(),
            &self.tasks.snapshot(),
            &self.invoices.snapshot(),
        )
    }

    pub fn upcoming_tasks(&self, today: NaiveDate, horizon_days: i64) -> Vec<Task> {
        crate::dashboard::upcoming_tasks(&self.tasks.snapshot(), today, horizon_days)
    }

    pub fn upcoming_invoices(&self, today: NaiveDate, horizon_days: i64) -> Vec<Invoice> {
        crate::dashboard::upcoming_invoices(&self.invoices.snapshot(), today, horizon_days)
    }

    /// `amount` in the desk's currency.
    pub fn format_money(&self, amount: Decimal) -> String {
        format::format_money(amount, &self.config)
    }

    pub async fn convert_prospect(&self, id: &RecordId) -> Result<Client, CollectionError> {
        pipeline::convert_to_client(&self.prospects, &self.clients, id).await
    }
}
