use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::Command;
use crate::domain::Entity;
use crate::error::BackendError;

/// Persistence seam. A mutation is committed to the in-memory collection only
/// after `execute` returns `Ok`.
#[async_trait]
pub trait RecordBackend<E: Entity>: Send + Sync {
    async fn execute(&self, command: &Command<E>) -> Result<(), BackendError>;
}

/// In-process backend: waits `latency`, then journals the command as JSON.
#[derive(Debug, Default)]
pub struct LocalBackend {
    latency: Duration,
    journal: Mutex<Vec<serde_json::Value>>,
}

impl LocalBackend {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            journal: Mutex::new(Vec::new()),
        }
    }

    /// Acknowledged commands, oldest first.
    pub fn journal(&self) -> Vec<serde_json::Value> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl<E: Entity> RecordBackend<E> for LocalBackend {
    async fn execute(&self, command: &Command<E>) -> Result<(), BackendError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut entry = serde_json::to_value(command)
            .map_err(|e| BackendError::Rejected(format!("unserializable command: {e}")))?;
        if let Some(object) = entry.as_object_mut() {
            object.insert("kind".to_string(), command.kind().as_str().into());
        }

        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
        Ok(())
    }
}
