//! List pane: full listing, search, add and delete.

use std::sync::Arc;

use crate::models::MemoryRecord;
use crate::transport::MemoryApi;
use crate::view::{ListNotice, PanelView};

const DELETE_PROMPT: &str = "Are you sure you want to delete this memory?";

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added(MemoryRecord),
    /// Blank input; nothing was sent.
    Empty,
    Failed,
}

#[derive(Clone)]
pub struct ListView {
    api: Arc<dyn MemoryApi>,
}

impl ListView {
    pub fn new(api: Arc<dyn MemoryApi>) -> Self {
        Self { api }
    }

    pub async fn list_memories(&self, view: &mut dyn PanelView) {
        match self.api.list_memories().await {
            Some(list) if list.memories.is_empty() => view.show_notice(ListNotice::NoMemories),
            Some(list) => view.show_memories(&list.memories),
            None => view.show_notice(ListNotice::LoadFailed),
        }
    }

    /// Search, or show the full list when the query is blank.
    pub async fn search(&self, query: &str, view: &mut dyn PanelView) {
        let query = query.trim();
        if query.is_empty() {
            return self.list_memories(view).await;
        }

        match self.api.search(query).await {
            Some(results) if results.is_empty() => view.show_notice(ListNotice::NoSearchResults),
            Some(results) => view.show_search_results(&results),
            None => view.show_notice(ListNotice::SearchFailed),
        }
    }

    pub async fn add_memory(&self, content: &str, view: &mut dyn PanelView) -> AddOutcome {
        let content = content.trim();
        if content.is_empty() {
            return AddOutcome::Empty;
        }

        match self.api.add_memory(content).await {
            Some(created) => {
                tracing::info!(id = %created.id, "memory added");
                view.clear_input();
                self.list_memories(view).await;
                AddOutcome::Added(created)
            }
            None => {
                view.alert("Failed to add memory.");
                AddOutcome::Failed
            }
        }
    }

    pub async fn delete_memory(&self, id: &str, view: &mut dyn PanelView) -> DeleteOutcome {
        if !view.confirm(DELETE_PROMPT) {
            tracing::debug!(id, "delete cancelled by user");
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete_memory(id).await {
            Some(response) if response.success => {
                tracing::info!(id, "memory deleted");
                self.list_memories(view).await;
                DeleteOutcome::Deleted
            }
            _ => {
                view.alert("Failed to delete memory.");
                DeleteOutcome::Failed
            }
        }
    }
}
