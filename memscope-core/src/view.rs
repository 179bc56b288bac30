//! Render targets of the panel, abstracted so the controllers can run
//! without a live surface.

use std::fmt;

use crate::graph::NodeDetail;
use crate::mode::Mode;
use crate::models::{MemoryRecord, SearchResult};

/// Inline messages the list pane can show in place of a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListNotice {
    NoMemories,
    NoSearchResults,
    LoadFailed,
    SearchFailed,
}

impl ListNotice {
    pub fn is_error(self) -> bool {
        matches!(self, ListNotice::LoadFailed | ListNotice::SearchFailed)
    }
}

impl fmt::Display for ListNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ListNotice::NoMemories => "No memories found.",
            ListNotice::NoSearchResults => "No memories found for your search.",
            ListNotice::LoadFailed => "Failed to load memories.",
            ListNotice::SearchFailed => "Search failed.",
        };
        f.write_str(text)
    }
}

pub trait PanelView {
    fn show_memories(&mut self, memories: &[MemoryRecord]);

    fn show_search_results(&mut self, results: &[SearchResult]);

    fn show_notice(&mut self, notice: ListNotice);

    /// Blocking, modal message (failed add/delete).
    fn alert(&mut self, message: &str);

    /// Ask the user to confirm a destructive action.
    fn confirm(&mut self, prompt: &str) -> bool;

    fn show_mode(&mut self, mode: Mode);

    fn show_threshold(&mut self, threshold: f64);

    fn show_detail(&mut self, detail: &NodeDetail);

    /// Reset the add-memory input after a successful submit.
    fn clear_input(&mut self) {}
}
