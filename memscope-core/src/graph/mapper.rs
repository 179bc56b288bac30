//! Graph data mapper: raw `{nodes, edges}` payload into render records.
//!
//! Every visual attribute is a pure function of the node `score` or the edge
//! `value`. The interaction controller calls back into these functions to
//! restore resting sizes, so there is a single source for each formula.

use serde::{Deserialize, Serialize};

use super::style::{EdgeColor, Font, NodeColor, Shadow, Smooth, WidthConstraint};
use crate::error::PanelError;
use crate::models::{GraphEdge, GraphNode, GraphPayload};

/// Labels longer than this many characters are cut and suffixed with `...`.
pub const LABEL_MAX_CHARS: usize = 40;

const BASE_NODE_SIZE: f64 = 60.0;
const MAX_NODE_SIZE: f64 = 150.0;

/// Per-node emphasis relative to the hovered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    #[default]
    Default,
    Hovered,
    Connected,
    Faded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedNode {
    pub id: String,
    pub label: String,
    pub title: String,
    pub size: f64,
    pub color: NodeColor,
    pub font: Font,
    pub shadow: Shadow,
    pub score: f64,
    pub margin: u32,
    pub width_constraint: WidthConstraint,
    #[serde(skip)]
    pub state: NodeState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub value: f64,
    pub color: EdgeColor,
    pub width: f64,
    pub length: f64,
    pub smooth: Smooth,
    pub shadow: Shadow,
    pub physics: bool,
}

/// The full render set for one graph instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderedGraph {
    pub nodes: Vec<RenderedNode>,
    pub edges: Vec<RenderedEdge>,
}

/// `min(60 + max(1, 20 * score), 150)`
pub fn node_size(score: f64) -> f64 {
    (BASE_NODE_SIZE + (score * 20.0).max(1.0)).min(MAX_NODE_SIZE)
}

/// `clamp(12 + 2 * score, 14, 18)`
pub fn node_font_size(score: f64) -> f64 {
    (12.0 + score * 2.0).min(18.0).max(14.0)
}

pub fn edge_width(value: f64) -> f64 {
    (value * 8.0).max(2.0)
}

pub fn edge_opacity(value: f64) -> f64 {
    value.max(0.4)
}

/// Spring rest length; stronger similarity pulls nodes closer.
pub fn edge_length(value: f64) -> f64 {
    200.0 + (1.0 - value) * 300.0
}

pub fn truncate_label(label: &str) -> String {
    if label.chars().count() > LABEL_MAX_CHARS {
        let head: String = label.chars().take(LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

pub fn tooltip(label: &str, score: f64) -> String {
    format!("{label}\n\nScore: {score:.2}")
}

pub fn map_node(node: &GraphNode) -> RenderedNode {
    RenderedNode {
        id: node.id.clone(),
        label: truncate_label(&node.label),
        title: tooltip(&node.label, node.score),
        size: node_size(node.score),
        color: NodeColor::resting(),
        font: Font::label(node_font_size(node.score)),
        shadow: Shadow::resting(),
        score: node.score,
        margin: 10,
        width_constraint: WidthConstraint::default(),
        state: NodeState::Default,
    }
}

pub fn map_edge(index: usize, edge: &GraphEdge) -> RenderedEdge {
    RenderedEdge {
        id: format!("edge_{index}"),
        from: edge.from.clone(),
        to: edge.to.clone(),
        value: edge.value,
        color: EdgeColor::with_opacity(edge_opacity(edge.value)),
        width: edge_width(edge.value),
        length: edge_length(edge.value),
        smooth: Smooth::default(),
        shadow: Shadow::edge(),
        physics: true,
    }
}

/// Map a raw `/memory-network` body into a render set.
///
/// Aborts with [`PanelError::DataInvalid`] if either collection is absent or
/// the body does not have the expected shape. No partial graph is returned.
pub fn map_payload(raw: &serde_json::Value) -> Result<RenderedGraph, PanelError> {
    let payload: GraphPayload = serde_json::from_value(raw.clone())
        .map_err(|e| PanelError::DataInvalid(e.to_string()))?;

    let (nodes, edges) = match (payload.nodes, payload.edges) {
        (Some(nodes), Some(edges)) => (nodes, edges),
        (None, _) => return Err(PanelError::DataInvalid("missing `nodes`".to_string())),
        (_, None) => return Err(PanelError::DataInvalid("missing `edges`".to_string())),
    };

    Ok(RenderedGraph {
        nodes: nodes.iter().map(map_node).collect(),
        edges: edges
            .iter()
            .enumerate()
            .map(|(i, e)| map_edge(i, e))
            .collect(),
    })
}
