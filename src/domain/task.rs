use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{
    Client, Entity, EntityKind, RecordContext, RecordId, labeled_enum, non_blank,
    not_transitionable, parse_choice, relink_client, require_text,
};
use crate::error::{CollectionError, FieldViolation};

labeled_enum! {
    #[derive(Default)]
    pub enum TaskStatus {
        #[default]
        Pending => "pending",
        InProgress => "in-progress",
        Completed => "completed",
    }
}

labeled_enum! {
    #[derive(Default, PartialOrd, Ord)]
    pub enum TaskPriority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: RecordId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: String,
    pub due_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(default)]
    pub client_id: Option<RecordId>,
    #[serde(default)]
    pub client_name: Option<String>,
}

impl Task {
    pub fn is_open(&self) -> bool {
        self.status != TaskStatus::Completed
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub assignee: String,
    pub due_date: NaiveDate,
    /// Linked client, if one was picked. Set through [`TaskDraft::link_client`].
    pub client_id: Option<RecordId>,
    /// Blank means no client.
    pub client_name: String,
}

impl TaskDraft {
    pub fn due(due_date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            assignee: String::new(),
            due_date,
            client_id: None,
            client_name: String::new(),
        }
    }

    pub fn link_client(&mut self, client: &Client) {
        self.client_id = Some(client.id.clone());
        self.client_name = client.display_name().to_string();
    }

    pub fn unlink_client(&mut self) {
        self.client_id = None;
        self.client_name.clear();
    }
}

impl Entity for Task {
    type Draft = TaskDraft;

    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.assignee.as_str()];
        if let Some(client) = &self.client_name {
            fields.push(client);
        }
        fields
    }

    fn default_draft(ctx: &RecordContext<'_, Self>) -> TaskDraft {
        TaskDraft::due(ctx.today)
    }

    fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            assignee: self.assignee.clone(),
            due_date: self.due_date,
            client_id: self.client_id.clone(),
            client_name: self.client_name.clone().unwrap_or_default(),
        }
    }

    fn validate(draft: &TaskDraft) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        require_text(&mut violations, "title", &draft.title);
        require_text(&mut violations, "assignee", &draft.assignee);
        violations
    }

    fn from_draft(id: RecordId, draft: &TaskDraft, ctx: &RecordContext<'_, Self>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            status: draft.status,
            priority: draft.priority,
            assignee: draft.assignee.trim().to_string(),
            due_date: draft.due_date,
            created_at: ctx.today,
            client_id: non_blank(&draft.client_name).and(draft.client_id.clone()),
            client_name: non_blank(&draft.client_name),
        }
    }

    fn merge_draft(&self, draft: &TaskDraft) -> Self {
        let client_name = non_blank(&draft.client_name);
        Self {
            title: draft.title.trim().to_string(),
            description: draft.description.clone(),
            status: draft.status,
            priority: draft.priority,
            assignee: draft.assignee.trim().to_string(),
            due_date: draft.due_date,
            client_id: relink_client(
                (self.client_id.as_ref(), self.client_name.as_deref()),
                (draft.client_id.as_ref(), client_name.as_deref()),
            ),
            client_name,
            ..self.clone()
        }
    }

    fn transition(&self, field: &str, value: &str) -> Result<Self, CollectionError> {
        match field {
            "status" => Ok(Self {
                status: parse_choice(Self::KIND, field, value)?,
                ..self.clone()
            }),
            "priority" => Ok(Self {
                priority: parse_choice(Self::KIND, field, value)?,
                ..self.clone()
            }),
            _ => Err(not_transitionable(Self::KIND, field, value)),
        }
    }

    fn field_value(&self, field: &str) -> Option<&'static str> {
        match field {
            "status" => Some(self.status.as_str()),
            "priority" => Some(self.priority.as_str()),
            _ => None,
        }
    }
}
