//! Mode controller: owns the application state and switches between the
//! list pane and the graph pane.
//!
//! Graph fetches are tagged with a request token. A completion is applied
//! only if its token is still the latest one issued and the panel is still
//! in graph mode; anything else is a superseded response and is dropped.
//! The previous graph instance is always destroyed before a new one is
//! built, and unconditionally on leaving graph mode.
//!
//! The token a graph was built under is also its event generation: each
//! build gets a sink stamping that token, and events carrying any other
//! generation are dropped rather than applied to the current graph.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::GraphConfig;
use crate::graph::{
    map_payload, EventSink, GraphController, LayoutEngine, LayoutOptions, TaggedEvent,
};
use crate::list::{AddOutcome, DeleteOutcome, ListView};
use crate::transport::MemoryApi;
use crate::view::PanelView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    List,
    Graph,
}

/// Identifies one graph fetch: the token it was issued under and the
/// threshold it asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphRequest {
    pub token: u64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphOutcome {
    Installed { nodes: usize, edges: usize },
    /// Superseded by a newer request or by leaving graph mode.
    Stale,
    TransportFailed,
    DataInvalid,
    EngineFailed,
}

struct AppState {
    mode: Mode,
    threshold: f64,
    request_token: u64,
    graph: Option<GraphController>,
}

pub struct ModeController<V: PanelView> {
    api: Arc<dyn MemoryApi>,
    engine: Arc<dyn LayoutEngine>,
    list: ListView,
    view: V,
    events: EventSink,
    options: LayoutOptions,
    zoom_boost_scale: f64,
    state: AppState,
}

impl<V: PanelView> ModeController<V> {
    pub fn new(
        api: Arc<dyn MemoryApi>,
        engine: Arc<dyn LayoutEngine>,
        view: V,
        events: EventSink,
        config: &GraphConfig,
    ) -> Self {
        Self {
            list: ListView::new(api.clone()),
            api,
            engine,
            view,
            events,
            options: LayoutOptions::default(),
            zoom_boost_scale: config.zoom_boost_scale,
            state: AppState {
                mode: Mode::List,
                threshold: clamp_threshold(config.default_threshold).unwrap_or(0.35),
                request_token: 0,
                graph: None,
            },
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn threshold(&self) -> f64 {
        self.state.threshold
    }

    pub fn graph(&self) -> Option<&GraphController> {
        self.state.graph.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn api(&self) -> &Arc<dyn MemoryApi> {
        &self.api
    }

    /// Sink stamping the live graph's generation, for pointer input that
    /// does not originate in the engine. `None` when no graph is live.
    pub fn live_sink(&self) -> Option<EventSink> {
        self.state
            .graph
            .as_ref()
            .map(|graph| self.events.for_generation(graph.generation()))
    }

    // ========================================================================
    // Mode switching
    // ========================================================================

    /// Flip modes. Entering graph mode returns the fetch to issue; the
    /// caller resolves it with [`Self::complete_graph_fetch`].
    pub fn toggle(&mut self) -> Option<GraphRequest> {
        match self.state.mode {
            Mode::List => Some(self.open_graph()),
            Mode::Graph => {
                self.exit_graph();
                None
            }
        }
    }

    pub async fn enter_graph(&mut self) -> GraphOutcome {
        let request = self.open_graph();
        self.fetch_graph(request).await
    }

    /// Switch to graph mode and issue a fetch at the current threshold.
    pub fn open_graph(&mut self) -> GraphRequest {
        if self.state.mode != Mode::Graph {
            self.state.mode = Mode::Graph;
            self.view.show_mode(Mode::Graph);
        }
        self.begin_graph_fetch()
    }

    /// Leave graph mode, destroying the instance whether or not it has
    /// finished stabilizing. In-flight fetches become stale.
    pub fn exit_graph(&mut self) {
        self.state.request_token += 1;
        self.teardown_graph();
        if self.state.mode != Mode::List {
            self.state.mode = Mode::List;
            self.view.show_mode(Mode::List);
        }
    }

    /// Update the threshold. In graph mode this rebuilds the graph from
    /// scratch and returns the outcome; in list mode it only records it.
    pub async fn set_threshold(&mut self, threshold: f64) -> Option<GraphOutcome> {
        let request = self.change_threshold(threshold)?;
        Some(self.fetch_graph(request).await)
    }

    /// Record a new threshold without waiting on the network. Returns the
    /// rebuild fetch to issue when in graph mode.
    pub fn change_threshold(&mut self, threshold: f64) -> Option<GraphRequest> {
        let Some(threshold) = clamp_threshold(threshold) else {
            tracing::warn!(threshold, "ignoring non-finite threshold");
            return None;
        };
        self.state.threshold = threshold;
        self.view.show_threshold(threshold);

        (self.state.mode == Mode::Graph).then(|| self.begin_graph_fetch())
    }

    // ========================================================================
    // Graph fetch lifecycle
    // ========================================================================

    /// Fetch and rebuild at the current threshold.
    pub async fn refresh_graph(&mut self) -> GraphOutcome {
        let request = self.begin_graph_fetch();
        self.fetch_graph(request).await
    }

    async fn fetch_graph(&mut self, request: GraphRequest) -> GraphOutcome {
        let payload = self.api.memory_network(request.threshold).await;
        self.complete_graph_fetch(request, payload).await
    }

    /// Issue a new request token, superseding any fetch still in flight.
    pub fn begin_graph_fetch(&mut self) -> GraphRequest {
        self.state.request_token += 1;
        GraphRequest {
            token: self.state.request_token,
            threshold: self.state.threshold,
        }
    }

    /// Apply a fetch result if it is still current.
    ///
    /// On transport failure or invalid data the prior graph stays as it is.
    pub async fn complete_graph_fetch(
        &mut self,
        request: GraphRequest,
        payload: Option<Value>,
    ) -> GraphOutcome {
        if request.token != self.state.request_token || self.state.mode != Mode::Graph {
            tracing::debug!(
                token = request.token,
                current = self.state.request_token,
                threshold = request.threshold,
                "discarding stale memory network response"
            );
            return GraphOutcome::Stale;
        }

        let Some(payload) = payload else {
            tracing::error!(threshold = request.threshold, "Failed to load memory network.");
            return GraphOutcome::TransportFailed;
        };

        let graph = match map_payload(&payload) {
            Ok(graph) => graph,
            Err(e) => {
                tracing::error!(error = %e, "Invalid network data received");
                return GraphOutcome::DataInvalid;
            }
        };

        self.teardown_graph();

        let (nodes, edges) = (graph.nodes.len(), graph.edges.len());
        let sink = self.events.for_generation(request.token);
        let built = self.engine.build(&graph, &self.options, sink).await;
        match built {
            Ok(instance) => {
                self.state.graph = Some(GraphController::new(
                    instance,
                    graph,
                    request.token,
                    request.threshold,
                    self.zoom_boost_scale,
                ));
                tracing::info!(
                    engine = self.engine.name(),
                    threshold = request.threshold,
                    generation = request.token,
                    nodes,
                    edges,
                    "memory network built"
                );
                GraphOutcome::Installed { nodes, edges }
            }
            Err(e) => {
                tracing::error!(engine = self.engine.name(), error = %e, "Error rendering memory network");
                GraphOutcome::EngineFailed
            }
        }
    }

    /// Route an engine event to the live graph. Events with no live graph,
    /// or stamped by an instance other than the live one, are dropped.
    pub fn handle_graph_event(&mut self, tagged: TaggedEvent) {
        let Some(graph) = self.state.graph.as_mut() else {
            tracing::debug!(event = ?tagged.event, "graph event with no live graph");
            return;
        };
        if tagged.generation != graph.generation() {
            tracing::debug!(
                event = ?tagged.event,
                generation = tagged.generation,
                live = graph.generation(),
                "dropping event from a superseded graph instance"
            );
            return;
        }
        if let Some(detail) = graph.handle_event(tagged.event) {
            self.view.show_detail(&detail);
        }
    }

    fn teardown_graph(&mut self) {
        if let Some(mut graph) = self.state.graph.take() {
            graph.destroy();
        }
    }

    // ========================================================================
    // List pane
    // ========================================================================

    pub async fn list_memories(&mut self) {
        self.list.list_memories(&mut self.view).await
    }

    pub async fn search(&mut self, query: &str) {
        self.list.search(query, &mut self.view).await
    }

    pub async fn add_memory(&mut self, content: &str) -> AddOutcome {
        self.list.add_memory(content, &mut self.view).await
    }

    pub async fn delete_memory(&mut self, id: &str) -> DeleteOutcome {
        self.list.delete_memory(id, &mut self.view).await
    }
}

fn clamp_threshold(threshold: f64) -> Option<f64> {
    threshold.is_finite().then(|| threshold.clamp(0.0, 1.0))
}
