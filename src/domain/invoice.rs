use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    Client, Entity, EntityKind, LineItems, RecordContext, RecordId, labeled_enum, non_blank,
    not_transitionable, parse_choice, relink_client, require_text,
};
use crate::billing::InvoiceTotals;
use crate::error::{CollectionError, FieldViolation};

labeled_enum! {
    #[derive(Default)]
    pub enum InvoiceStatus {
        #[default]
        Draft => "draft",
        Sent => "sent",
        Paid => "paid",
        Overdue => "overdue",
    }
}

impl InvoiceStatus {
    /// Issued to the client and not yet settled.
    pub fn is_outstanding(self) -> bool {
        matches!(self, Self::Sent | Self::Overdue)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    pub invoice_number: String,
    #[serde(default)]
    pub client_id: Option<RecordId>,
    pub client_name: String,
    #[serde(default)]
    pub client_email: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub line_items: LineItems,
    #[serde(default)]
    pub notes: String,
}

impl Invoice {
    pub fn totals(&self) -> InvoiceTotals {
        self.line_items.totals()
    }

    /// Grand total, unrounded.
    pub fn amount(&self) -> Decimal {
        self.totals().total
    }

    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status.is_outstanding() && self.due_date < today
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub invoice_number: String,
    /// Billed client, if picked from the client list. See [`InvoiceDraft::bill_to`].
    pub client_id: Option<RecordId>,
    pub client_name: String,
    pub client_email: String,
    pub status: InvoiceStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub line_items: LineItems,
    pub notes: String,
}

impl InvoiceDraft {
    pub fn totals(&self) -> InvoiceTotals {
        self.line_items.totals()
    }

    /// Bill `client`: links it and copies its display name and email.
    pub fn bill_to(&mut self, client: &Client) {
        self.client_id = Some(client.id.clone());
        self.client_name = client.display_name().to_string();
        self.client_email = client.email.clone();
    }
}

fn generate_invoice_number(ctx: &RecordContext<'_, Invoice>) -> String {
    let prefix = &ctx.config.invoice_number_prefix;
    let (year, month) = (ctx.today.year(), ctx.today.month());
    let mut rng = rand::thread_rng();
    let mut candidate = format!("{prefix}-{year}-{month:02}-{:03}", rng.gen_range(0..1000));
    for _ in 0..1000 {
        if !ctx
            .existing
            .iter()
            .any(|invoice| invoice.invoice_number == candidate)
        {
            break;
        }
        candidate = format!("{prefix}-{year}-{month:02}-{:03}", rng.gen_range(0..1000));
    }
    candidate
}

impl Entity for Invoice {
    type Draft = InvoiceDraft;

    const KIND: EntityKind = EntityKind::Invoice;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.invoice_number.as_str(), self.client_name.as_str()]
    }

    fn default_draft(ctx: &RecordContext<'_, Self>) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: generate_invoice_number(ctx),
            client_id: None,
            client_name: String::new(),
            client_email: String::new(),
            status: InvoiceStatus::Draft,
            issue_date: ctx.today,
            due_date: ctx.today + Duration::days(ctx.config.invoice_due_days),
            line_items: LineItems::default(),
            notes: String::new(),
        }
    }

    fn to_draft(&self) -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: self.invoice_number.clone(),
            client_id: self.client_id.clone(),
            client_name: self.client_name.clone(),
            client_email: self.client_email.clone(),
            status: self.status,
            issue_date: self.issue_date,
            due_date: self.due_date,
            line_items: self.line_items.clone(),
            notes: self.notes.clone(),
        }
    }

    fn validate(draft: &InvoiceDraft) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        require_text(&mut violations, "invoice_number", &draft.invoice_number);
        require_text(&mut violations, "client_name", &draft.client_name);
        let email = draft.client_email.trim();
        if !email.is_empty() && !email.contains('@') {
            violations.push(FieldViolation::new("client_email", "must be an email address"));
        }
        if draft.due_date < draft.issue_date {
            violations.push(FieldViolation::new(
                "due_date",
                "must not be before the issue date",
            ));
        }
        draft.line_items.validate(&mut violations);
        violations
    }

    fn from_draft(id: RecordId, draft: &InvoiceDraft, _ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            invoice_number: draft.invoice_number.trim().to_string(),
            client_id: non_blank(&draft.client_name).and(draft.client_id.clone()),
            client_name: draft.client_name.trim().to_string(),
            client_email: draft.client_email.trim().to_string(),
            status: draft.status,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            line_items: draft.line_items.clone(),
            notes: draft.notes.clone(),
        }
    }

    fn merge_draft(&self, draft: &InvoiceDraft) -> Self {
        let client_name = draft.client_name.trim().to_string();
        Self {
            invoice_number: draft.invoice_number.trim().to_string(),
            client_id: relink_client(
                (self.client_id.as_ref(), Some(self.client_name.as_str())),
                (draft.client_id.as_ref(), non_blank(&client_name).as_deref()),
            ),
            client_name,
            client_email: draft.client_email.trim().to_string(),
            status: draft.status,
            issue_date: draft.issue_date,
            due_date: draft.due_date,
            line_items: draft.line_items.clone(),
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

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::config::DeskConfig;
    use crate::domain::LineItem;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn default_draft_follows_configured_terms() {
        let config = DeskConfig {
            invoice_number_prefix: "BILL".to_string(),
            invoice_due_days: 14,
            ..DeskConfig::default()
        };
        let ctx = RecordContext {
            today: date(2024, 3, 5),
            config: &config,
            existing: &[],
        };
        let draft = Invoice::default_draft(&ctx);

        assert!(draft.invoice_number.starts_with("BILL-2024-03-"));
        assert_eq!(draft.invoice_number.len(), "BILL-2024-03-000".len());
        assert_eq!(draft.issue_date, date(2024, 3, 5));
        assert_eq!(draft.due_date, date(2024, 3, 19));
        assert_eq!(draft.status, InvoiceStatus::Draft);
        assert_eq!(draft.line_items.as_slice(), &[LineItem::blank()]);
        assert_eq!(draft.totals().total, Decimal::ZERO);
    }

    #[test]
    fn validation_collects_header_and_item_problems() {
        let config = DeskConfig::default();
        let ctx = RecordContext {
            today: date(2024, 3, 5),
            config: &config,
            existing: &[],
        };
        let mut draft = Invoice::default_draft(&ctx);
        draft.invoice_number = " ".to_string();
        draft.due_date = date(2024, 3, 1);

        let fields: Vec<_> = Invoice::validate(&draft)
            .into_iter()
            .map(|v| v.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "invoice_number".to_string(),
                "client_name".to_string(),
                "due_date".to_string(),
                "items[0].description".to_string(),
            ]
        );
    }

    #[test]
    fn billed_client_link_survives_save_and_edit() {
        let config = DeskConfig::default();
        let ctx = RecordContext {
            today: date(2023, 6, 15),
            config: &config,
            existing: &[],
        };
        let acme = Client {
            id: RecordId::from("1"),
            name: "John Smith".to_string(),
            email: "john@acme.com".to_string(),
            phone: String::new(),
            company: "Acme Corp".to_string(),
            status: crate::domain::ClientStatus::Active,
            total_revenue: Decimal::ZERO,
            last_contact: date(2023, 6, 1),
            notes: String::new(),
        };
        let mut draft = Invoice::default_draft(&ctx);
        draft.bill_to(&acme);
        let invoice = Invoice::from_draft(RecordId::from("9"), &draft, &ctx);
        assert_eq!(invoice.client_id, Some(RecordId::from("1")));
        assert_eq!(invoice.client_name, "Acme Corp");
        assert_eq!(invoice.client_email, "john@acme.com");

        let mut edit = invoice.to_draft();
        edit.notes = "Net 30".to_string();
        assert_eq!(invoice.merge_draft(&edit).client_id, Some(RecordId::from("1")));

        edit.client_name = "Walk-in customer".to_string();
        let renamed = invoice.merge_draft(&edit);
        assert_eq!(renamed.client_id, None);
        assert_eq!(renamed.client_name, "Walk-in customer");
    }

    #[test]
    fn past_due_only_applies_to_issued_invoices() {
        let mut invoice = Invoice {
            id: RecordId::from("2"),
            invoice_number: "INV-2023-002".to_string(),
            client_id: None,
            client_name: "TechStart Inc".to_string(),
            client_email: "finance@techstart.com".to_string(),
            status: InvoiceStatus::Sent,
            issue_date: date(2023, 6, 1),
            due_date: date(2023, 7, 1),
            line_items: LineItems::new(LineItem::new(
                "Professional services",
                dec!(1),
                dec!(25000),
                dec!(0),
            )),
            notes: String::new(),
        };
        assert!(!invoice.is_past_due(date(2023, 7, 1)));
        assert!(invoice.is_past_due(date(2023, 7, 2)));
        invoice.status = InvoiceStatus::Draft;
        assert!(!invoice.is_past_due(date(2023, 7, 2)));
        assert_eq!(invoice.amount(), dec!(25000));
    }
}
