//! Core of a small business desk: clients, prospects, tasks, invoices and
//! organization administration, with invoice totals and display formatting.
//!
//! Each page owns a [`CollectionManager`] over one record kind. Managers are
//! constructed with an explicit [`SessionContext`] and [`DeskConfig`]; reads
//! are synchronous, mutations go through a [`RecordBackend`] and are applied
//! atomically once acknowledged.

pub mod billing;
pub mod clock;
pub mod collection;
pub mod config;
pub mod dashboard;
pub mod desk;
pub mod domain;
pub mod error;
pub mod format;
pub mod logging;
pub mod org;
pub mod pipeline;
pub mod seed;
pub mod session;
pub mod settings;
pub mod workflow;

pub use billing::InvoiceTotals;
pub use collection::{CollectionManager, Command, LocalBackend, RecordBackend};
pub use config::{AppConfig, DeskConfig, LoggingConfig};
pub use desk::Desk;
pub use domain::{Entity, EntityKind, RecordId};
pub use error::{BackendError, CollectionError, ConfigError, FieldViolation, SeedError};
pub use org::{Organization, OrganizationProfile};
pub use session::{Role, SessionContext};
pub use workflow::WorkflowPolicy;
