//! Derived figures for the overview page.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Client, ClientStatus, Invoice, InvoiceStatus, Prospect, Task};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DashboardMetrics {
    pub client_count: usize,
    pub active_clients: usize,
    pub prospect_count: usize,
    /// Estimated value of prospects not marked lost.
    pub pipeline_value: Decimal,
    pub open_tasks: usize,
    pub invoice_count: usize,
    /// Totals of sent and overdue invoices.
    pub outstanding: Decimal,
    pub paid: Decimal,
}

impl DashboardMetrics {
    pub fn compute(
        clients: &[Client],
        prospects: &[Prospect],
        tasks: &[Task],
        invoices: &[Invoice],
    ) -> Self {
        Self {
            client_count: clients.len(),
            active_clients: clients
                .iter()
                .filter(|c| c.status == ClientStatus::Active)
                .count(),
            prospect_count: prospects.len(),
            pipeline_value: prospects
                .iter()
                .filter(|p| p.is_open())
                .map(|p| p.estimated_value)
                .sum(),
            open_tasks: tasks.iter().filter(|t| t.is_open()).count(),
            invoice_count: invoices.len(),
            outstanding: invoices
                .iter()
                .filter(|i| i.status.is_outstanding())
                .map(Invoice::amount)
                .sum(),
            paid: invoices
                .iter()
                .filter(|i| i.status == InvoiceStatus::Paid)
                .map(Invoice::amount)
                .sum(),
        }
    }
}

/// Open tasks due on or before `today + horizon_days`, overdue ones included,
/// soonest first.
pub fn upcoming_tasks(tasks: &[Task], today: NaiveDate, horizon_days: i64) -> Vec<Task> {
    let horizon = today + Duration::days(horizon_days);
    let mut upcoming: Vec<Task> = tasks
        .iter()
        .filter(|t| t.is_open() && t.due_date <= horizon)
        .cloned()
        .collect();
    upcoming.sort_by_key(|t| t.due_date);
    upcoming
}

/// Sent or overdue invoices due on or before `today + horizon_days`, soonest first.
pub fn upcoming_invoices(invoices: &[Invoice], today: NaiveDate, horizon_days: i64) -> Vec<Invoice> {
    let horizon = today + Duration::days(horizon_days);
    let mut upcoming: Vec<Invoice> = invoices
        .iter()
        .filter(|i| i.status.is_outstanding() && i.due_date <= horizon)
        .cloned()
        .collect();
    upcoming.sort_by_key(|i| i.due_date);
    upcoming
}
