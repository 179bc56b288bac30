//! In-memory fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PanelError;
use crate::graph::{
    EventSink, FitAnimation, GraphInstance, LayoutEngine, LayoutOptions, NodeDetail, NodeUpdate,
    RenderedGraph,
};
use crate::mode::Mode;
use crate::models::{
    DeleteResponse, MemoryList, MemoryRecord, ModelCatalog, ModelSwitch, SearchResult,
};
use crate::transport::MemoryApi;
use crate::view::{ListNotice, PanelView};

pub fn memory(id: &str, content: &str, score: f64) -> MemoryRecord {
    MemoryRecord {
        id: id.to_string(),
        content: content.to_string(),
        score,
        created: "2024-06-01 09:00".to_string(),
    }
}

// ============================================================================
// FakeApi
// ============================================================================

#[derive(Default)]
pub struct FakeState {
    pub memories: Vec<MemoryRecord>,
    pub list_fails: bool,
    /// `None` makes search fail at the transport level.
    pub search_results: Option<Vec<SearchResult>>,
    pub search_calls: Vec<String>,
    pub network: Option<Value>,
    pub network_calls: Vec<f64>,
    pub next_id: usize,
}

#[derive(Default)]
pub struct FakeApi {
    pub state: Mutex<FakeState>,
}

impl FakeApi {
    pub fn with_memories(memories: Vec<MemoryRecord>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().memories = memories;
        api
    }

    pub fn set_network(&self, network: Option<Value>) {
        self.state.lock().unwrap().network = network;
    }
}

#[async_trait]
impl MemoryApi for FakeApi {
    async fn list_memories(&self) -> Option<MemoryList> {
        let state = self.state.lock().unwrap();
        if state.list_fails {
            return None;
        }
        Some(MemoryList {
            memories: state.memories.clone(),
        })
    }

    async fn search(&self, query: &str) -> Option<Vec<SearchResult>> {
        let mut state = self.state.lock().unwrap();
        state.search_calls.push(query.to_string());
        state.search_results.clone()
    }

    async fn add_memory(&self, content: &str) -> Option<MemoryRecord> {
        let mut state = self.state.lock().unwrap();
        if content == "reject me" {
            return None;
        }
        state.next_id += 1;
        let created = memory(&format!("new-{}", state.next_id), content, 0.0);
        state.memories.push(created.clone());
        Some(created)
    }

    async fn delete_memory(&self, id: &str) -> Option<DeleteResponse> {
        let mut state = self.state.lock().unwrap();
        let before = state.memories.len();
        state.memories.retain(|m| m.id != id);
        // Unknown ids answer 404, which the transport reports as None
        (state.memories.len() < before).then_some(DeleteResponse { success: true })
    }

    async fn memory_network(&self, threshold: f64) -> Option<Value> {
        let mut state = self.state.lock().unwrap();
        state.network_calls.push(threshold);
        state.network.clone()
    }

    async fn list_models(&self) -> Option<ModelCatalog> {
        Some(ModelCatalog {
            available: vec!["tfidf".to_string()],
            current: "tfidf".to_string(),
        })
    }

    async fn set_model(&self, model: &str) -> Option<ModelSwitch> {
        Some(ModelSwitch {
            success: model == "tfidf",
            current: Some("tfidf".to_string()),
        })
    }
}

// ============================================================================
// RecordingView
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Memories(Vec<String>),
    SearchResults(Vec<String>),
    Notice(ListNotice),
    Alert(String),
    Confirm(String),
    Mode(Mode),
    Threshold(f64),
    Detail(NodeDetail),
    ClearInput,
}

pub struct RecordingView {
    pub events: Vec<ViewEvent>,
    pub confirm_answer: bool,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            confirm_answer: true,
        }
    }
}

impl RecordingView {
    pub fn last(&self) -> Option<&ViewEvent> {
        self.events.last()
    }
}

impl PanelView for RecordingView {
    fn show_memories(&mut self, memories: &[MemoryRecord]) {
        self.events
            .push(ViewEvent::Memories(memories.iter().map(|m| m.id.clone()).collect()));
    }

    fn show_search_results(&mut self, results: &[SearchResult]) {
        self.events.push(ViewEvent::SearchResults(
            results.iter().map(|r| r.memory.id.clone()).collect(),
        ));
    }

    fn show_notice(&mut self, notice: ListNotice) {
        self.events.push(ViewEvent::Notice(notice));
    }

    fn alert(&mut self, message: &str) {
        self.events.push(ViewEvent::Alert(message.to_string()));
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        self.events.push(ViewEvent::Confirm(prompt.to_string()));
        self.confirm_answer
    }

    fn show_mode(&mut self, mode: Mode) {
        self.events.push(ViewEvent::Mode(mode));
    }

    fn show_threshold(&mut self, threshold: f64) {
        self.events.push(ViewEvent::Threshold(threshold));
    }

    fn show_detail(&mut self, detail: &NodeDetail) {
        self.events.push(ViewEvent::Detail(detail.clone()));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::ClearInput);
    }
}

// ============================================================================
// FakeEngine
// ============================================================================

#[derive(Default)]
pub struct EngineCounters {
    pub built: AtomicUsize,
    pub live: AtomicUsize,
    pub fits: AtomicUsize,
    pub updates: AtomicUsize,
}

#[derive(Default)]
pub struct FakeEngine {
    pub counters: Arc<EngineCounters>,
    pub fail: bool,
    /// Sink handed to each successful build, in build order.
    pub sinks: Arc<Mutex<Vec<EventSink>>>,
}

struct FakeInstance {
    edges: Vec<(String, String)>,
    counters: Arc<EngineCounters>,
    destroyed: bool,
}

impl GraphInstance for FakeInstance {
    fn update_nodes(&mut self, _updates: &[NodeUpdate]) {
        self.counters.updates.fetch_add(1, Ordering::SeqCst);
    }

    fn connected_nodes(&self, id: &str) -> Vec<String> {
        self.edges
            .iter()
            .filter_map(|(from, to)| match (from == id, to == id) {
                (true, _) => Some(to.clone()),
                (_, true) => Some(from.clone()),
                _ => None,
            })
            .collect()
    }

    fn fit(&mut self, _animation: FitAnimation) {
        self.counters.fits.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        if !self.destroyed {
            self.destroyed = true;
            self.counters.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl LayoutEngine for FakeEngine {
    async fn build(
        &self,
        graph: &RenderedGraph,
        _options: &LayoutOptions,
        events: EventSink,
    ) -> Result<Box<dyn GraphInstance>, PanelError> {
        if self.fail {
            return Err(PanelError::Engine("canvas unavailable".to_string()));
        }
        self.sinks.lock().unwrap().push(events);
        self.counters.built.fetch_add(1, Ordering::SeqCst);
        self.counters.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeInstance {
            edges: graph
                .edges
                .iter()
                .map(|e| (e.from.clone(), e.to.clone()))
                .collect(),
            counters: self.counters.clone(),
            destroyed: false,
        }))
    }

    fn name(&self) -> &str {
        "fake"
    }
}
