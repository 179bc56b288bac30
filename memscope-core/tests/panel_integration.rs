//! End-to-end panel flow: real `ApiClient` against a wiremock backend,
//! driven through the `ModeController` with a recording engine and view.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use memscope_core::config::GraphConfig;
use memscope_core::graph::{EventSink, FitAnimation, NodeUpdate};
use memscope_core::{
    ApiClient, DeleteOutcome, EventReceiver, GraphEvent, GraphInstance, GraphOutcome, LayoutEngine,
    LayoutOptions, ListNotice, MemoryRecord, Mode, ModeController, NodeDetail, NodeState,
    PanelError, PanelView, RenderedGraph, SearchResult,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Log {
    lines: Vec<String>,
    live: i32,
}

#[derive(Clone, Default)]
struct ScriptedView {
    log: Arc<Mutex<Log>>,
}

impl ScriptedView {
    fn push(&self, line: String) {
        self.log.lock().unwrap().lines.push(line);
    }

    fn lines(&self) -> Vec<String> {
        self.log.lock().unwrap().lines.clone()
    }
}

impl PanelView for ScriptedView {
    fn show_memories(&mut self, memories: &[MemoryRecord]) {
        let ids: Vec<&str> = memories.iter().map(|m| m.id.as_str()).collect();
        self.push(format!("list {}", ids.join(",")));
    }

    fn show_search_results(&mut self, results: &[SearchResult]) {
        let ids: Vec<&str> = results.iter().map(|r| r.memory.id.as_str()).collect();
        self.push(format!("hits {}", ids.join(",")));
    }

    fn show_notice(&mut self, notice: ListNotice) {
        self.push(format!("notice {notice}"));
    }

    fn alert(&mut self, message: &str) {
        self.push(format!("alert {message}"));
    }

    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }

    fn show_mode(&mut self, mode: Mode) {
        self.push(format!("mode {mode:?}"));
    }

    fn show_threshold(&mut self, threshold: f64) {
        self.push(format!("threshold {threshold:.2}"));
    }

    fn show_detail(&mut self, detail: &NodeDetail) {
        self.push(format!("detail {}", detail.id));
    }
}

struct CountingInstance {
    log: Arc<Mutex<Log>>,
    adjacency: Vec<(String, String)>,
}

impl GraphInstance for CountingInstance {
    fn update_nodes(&mut self, _updates: &[NodeUpdate]) {}

    fn connected_nodes(&self, id: &str) -> Vec<String> {
        self.adjacency
            .iter()
            .filter(|(a, b)| a == id || b == id)
            .map(|(a, b)| if a == id { b.clone() } else { a.clone() })
            .collect()
    }

    fn fit(&mut self, _animation: FitAnimation) {}

    fn destroy(&mut self) {
        self.log.lock().unwrap().live -= 1;
    }
}

struct CountingEngine {
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl LayoutEngine for CountingEngine {
    async fn build(
        &self,
        graph: &RenderedGraph,
        _options: &LayoutOptions,
        _events: EventSink,
    ) -> Result<Box<dyn GraphInstance>, PanelError> {
        self.log.lock().unwrap().live += 1;
        Ok(Box::new(CountingInstance {
            log: self.log.clone(),
            adjacency: graph
                .edges
                .iter()
                .map(|e| (e.from.clone(), e.to.clone()))
                .collect(),
        }))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

/// Publishes a pointer gesture on the live graph and feeds it back in.
fn gesture(
    panel: &mut ModeController<ScriptedView>,
    events: &mut EventReceiver,
    event: GraphEvent,
) {
    panel.live_sink().expect("live graph").send(event).unwrap();
    while let Ok(tagged) = events.try_recv() {
        panel.handle_graph_event(tagged);
    }
}

async fn mount_backend(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/memories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "memories": [
                {"id": "m1", "content": "river walk", "score": 0.8, "created": "2024-06-01"},
                {"id": "m2", "content": "river cruise", "score": 0.3, "created": "2024-06-02"}
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/river"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"memory": {"id": "m2", "content": "river cruise", "score": 0.3, "created": "2024-06-02"},
             "relevance_score": 0.77}
        ])))
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/memories/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Memory not found"})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/memory-network"))
        .and(query_param("threshold", "0.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                {"id": "m1", "label": "river walk", "score": 0.8},
                {"id": "m2", "label": "river cruise", "score": 0.3}
            ],
            "edges": [{"from": "m1", "to": "m2", "value": 0.66}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/memory-network"))
        .and(query_param("threshold", "0.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodes": []})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_panel_session() {
    let server = MockServer::start().await;
    mount_backend(&server).await;

    let view = ScriptedView::default();
    let log = view.log.clone();
    let api = Arc::new(ApiClient::new(server.uri()).expect("client"));
    let engine = Arc::new(CountingEngine { log: log.clone() });
    let (sink, mut events) = EventSink::channel();
    let mut panel = ModeController::new(api, engine, view.clone(), sink, &GraphConfig::default());

    // List pane
    panel.list_memories().await;
    panel.search("river").await;
    panel.search("   ").await;
    assert_eq!(
        panel.delete_memory("ghost").await,
        DeleteOutcome::Failed,
        "unknown id must fail"
    );

    // Graph pane
    let outcome = panel.enter_graph().await;
    assert_eq!(outcome, GraphOutcome::Installed { nodes: 2, edges: 1 });
    gesture(&mut panel, &mut events, GraphEvent::HoverNode("m1".to_string()));
    {
        let graph = panel.graph().expect("live graph");
        assert_eq!(graph.node("m1").unwrap().state, NodeState::Hovered);
        assert_eq!(graph.node("m2").unwrap().state, NodeState::Connected);
    }
    gesture(&mut panel, &mut events, GraphEvent::Click(Some("m2".to_string())));

    // Invalid payload at the new threshold keeps the old graph
    assert_eq!(
        panel.set_threshold(0.9).await,
        Some(GraphOutcome::DataInvalid)
    );
    assert_eq!(panel.graph().unwrap().nodes().len(), 2);
    assert_eq!(log.lock().unwrap().live, 1);

    panel.exit_graph();
    assert_eq!(log.lock().unwrap().live, 0);

    assert_eq!(
        view.lines(),
        vec![
            "list m1,m2".to_string(),
            "hits m2".to_string(),
            "list m1,m2".to_string(),
            "alert Failed to delete memory.".to_string(),
            "mode Graph".to_string(),
            "detail m2".to_string(),
            "threshold 0.90".to_string(),
            "mode List".to_string(),
        ]
    );
}
