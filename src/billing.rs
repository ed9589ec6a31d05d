//! Invoice arithmetic and invoice status actions.
//!
//! Totals are exact `Decimal` sums recomputed on every call. Rounding happens
//! only in [`InvoiceTotals::rounded`] and the formatting helpers.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::collection::CollectionManager;
use crate::domain::{Invoice, InvoiceStatus, LineItem, RecordId};
use crate::error::CollectionError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

pub fn line_amount(item: &LineItem) -> Decimal {
    item.quantity * item.unit_price
}

pub fn line_tax(item: &LineItem) -> Decimal {
    line_amount(item) * item.tax_rate / HUNDRED
}

pub fn subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(line_amount).sum()
}

pub fn tax(items: &[LineItem]) -> Decimal {
    items.iter().map(line_tax).sum()
}

pub fn total(items: &[LineItem]) -> Decimal {
    subtotal(items) + tax(items)
}

/// Half-up to cents, for display.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    pub fn compute(items: &[LineItem]) -> Self {
        let subtotal = subtotal(items);
        let tax = tax(items);
        Self {
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }

    /// Each figure rounded independently for presentation.
    pub fn rounded(&self) -> Self {
        Self {
            subtotal: round_currency(self.subtotal),
            tax: round_currency(self.tax),
            total: round_currency(self.total),
        }
    }
}

impl CollectionManager<Invoice> {
    /// Move an invoice to `sent`.
    pub async fn send_invoice(&self, id: &RecordId) -> Result<Invoice, CollectionError> {
        self.transition(id, "status", InvoiceStatus::Sent.as_str())
            .await
    }

    pub async fn mark_paid(&self, id: &RecordId) -> Result<Invoice, CollectionError> {
        self.transition(id, "status", InvoiceStatus::Paid.as_str())
            .await
    }

    /// Flag every sent invoice whose due date is before `today` as overdue.
    /// Returns the invoices that changed. A failure part way yields
    /// [`CollectionError::Interrupted`] listing those already flagged.
    pub async fn flag_overdue(&self, today: NaiveDate) -> Result<Vec<Invoice>, CollectionError> {
        let due: Vec<RecordId> = self
            .snapshot()
            .iter()
            .filter(|invoice| invoice.status == InvoiceStatus::Sent && invoice.is_past_due(today))
            .map(|invoice| invoice.id.clone())
            .collect();

        let flagged = self
            .transition_each(&due, "status", InvoiceStatus::Overdue.as_str())
            .await?;
        if !flagged.is_empty() {
            tracing::info!(count = flagged.len(), %today, "flagged overdue invoices");
        }
        Ok(flagged)
    }
}
