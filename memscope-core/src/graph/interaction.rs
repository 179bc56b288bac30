//! Hover/blur/click/zoom/stabilization handling for one live graph.
//!
//! A `GraphController` owns the engine instance and the render set it was
//! built from. Hover is recomputed over the whole node set on every event;
//! blur recomputes resting visuals from the score, never from a snapshot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::engine::{FitAnimation, GraphEvent, GraphInstance, NodeUpdate};
use super::mapper::{node_size, NodeState, RenderedGraph, RenderedNode};
use super::style::{NodeColor, Shadow};

const HOVERED_SCALE: f64 = 1.3;
const CONNECTED_SCALE: f64 = 1.1;
const FADED_SCALE: f64 = 0.8;
const ZOOM_FONT_SCALE: f64 = 1.2;
const ZOOM_FONT_FLOOR: f64 = 16.0;

/// What a node click surfaces to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDetail {
    pub id: String,
    pub title: String,
    pub score: f64,
}

pub struct GraphController {
    instance: Option<Box<dyn GraphInstance>>,
    graph: RenderedGraph,
    /// Stamp carried by every event the instance publishes.
    generation: u64,
    threshold: f64,
    hovered: Option<String>,
    fitted: bool,
    zoom_boost_scale: f64,
}

impl GraphController {
    pub fn new(
        instance: Box<dyn GraphInstance>,
        graph: RenderedGraph,
        generation: u64,
        threshold: f64,
        zoom_boost_scale: f64,
    ) -> Self {
        Self {
            instance: Some(instance),
            graph,
            generation,
            threshold,
            hovered: None,
            fitted: false,
            zoom_boost_scale,
        }
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.graph.nodes
    }

    pub fn graph(&self) -> &RenderedGraph {
        &self.graph
    }

    pub fn node(&self, id: &str) -> Option<&RenderedNode> {
        self.graph.nodes.iter().find(|n| n.id == id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted
    }

    /// Dispatch one engine event. Returns the node detail for clicks that
    /// hit a node; every other event returns `None`.
    pub fn handle_event(&mut self, event: GraphEvent) -> Option<NodeDetail> {
        match event {
            GraphEvent::HoverNode(id) => {
                self.hover_node(&id);
                None
            }
            GraphEvent::BlurNode => {
                self.blur_node();
                None
            }
            GraphEvent::Click(id) => id.and_then(|id| self.click(&id)),
            GraphEvent::Zoom { scale } => {
                self.zoom(scale);
                None
            }
            GraphEvent::StabilizationIterationsDone => {
                self.stabilized();
                None
            }
        }
    }

    pub fn hover_node(&mut self, id: &str) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };
        if !self.graph.nodes.iter().any(|n| n.id == id) {
            tracing::debug!(node = id, "hover on unknown node ignored");
            return;
        }

        let connected: HashSet<String> = instance.connected_nodes(id).into_iter().collect();

        let mut updates = Vec::with_capacity(self.graph.nodes.len());
        for node in &mut self.graph.nodes {
            let base = node_size(node.score);
            let (state, color, shadow, size) = if node.id == id {
                (
                    NodeState::Hovered,
                    NodeColor::hovered(),
                    Shadow::hovered(),
                    base * HOVERED_SCALE,
                )
            } else if connected.contains(&node.id) {
                (
                    NodeState::Connected,
                    NodeColor::connected(),
                    Shadow::connected(),
                    base * CONNECTED_SCALE,
                )
            } else {
                (
                    NodeState::Faded,
                    NodeColor::faded(),
                    Shadow::disabled(),
                    base * FADED_SCALE,
                )
            };
            node.state = state;
            node.color = color.clone();
            node.shadow = shadow.clone();
            node.size = size;
            updates.push(NodeUpdate {
                id: node.id.clone(),
                color: Some(color),
                shadow: Some(shadow),
                size: Some(size),
                font: None,
            });
        }

        instance.update_nodes(&updates);
        self.hovered = Some(id.to_string());
    }

    pub fn blur_node(&mut self) {
        let Some(instance) = self.instance.as_mut() else {
            return;
        };

        let mut updates = Vec::with_capacity(self.graph.nodes.len());
        for node in &mut self.graph.nodes {
            node.state = NodeState::Default;
            node.color = NodeColor::resting();
            node.shadow = Shadow::resting();
            node.size = node_size(node.score);
            updates.push(NodeUpdate {
                id: node.id.clone(),
                color: Some(node.color.clone()),
                shadow: Some(node.shadow.clone()),
                size: Some(node.size),
                font: None,
            });
        }

        instance.update_nodes(&updates);
        self.hovered = None;
    }

    pub fn click(&self, id: &str) -> Option<NodeDetail> {
        self.node(id).map(|node| NodeDetail {
            id: node.id.clone(),
            title: node.title.clone(),
            score: node.score,
        })
    }

    /// Boost every label below the configured scale. The boost is one-way
    /// and compounds on each qualifying event; zooming back in keeps it.
    pub fn zoom(&mut self, scale: f64) {
        if scale >= self.zoom_boost_scale {
            return;
        }
        let Some(instance) = self.instance.as_mut() else {
            return;
        };

        let mut updates = Vec::with_capacity(self.graph.nodes.len());
        for node in &mut self.graph.nodes {
            node.font.size = (node.font.size * ZOOM_FONT_SCALE).max(ZOOM_FONT_FLOOR);
            updates.push(NodeUpdate {
                id: node.id.clone(),
                color: None,
                shadow: None,
                size: None,
                font: Some(node.font.clone()),
            });
        }
        instance.update_nodes(&updates);
    }

    fn stabilized(&mut self) {
        if self.fitted {
            return;
        }
        if let Some(instance) = self.instance.as_mut() {
            instance.fit(FitAnimation::default());
            self.fitted = true;
        }
    }

    /// Tear the engine instance down. Safe to call more than once.
    pub fn destroy(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.destroy();
            self.hovered = None;
            tracing::debug!(threshold = self.threshold, "graph instance destroyed");
        }
    }

    pub fn is_live(&self) -> bool {
        self.instance.is_some()
    }
}

impl Drop for GraphController {
    fn drop(&mut self) {
        self.destroy();
    }
}
