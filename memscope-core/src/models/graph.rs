use serde::{Deserialize, Serialize};

/// Raw node as served by `GET /memory-network`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub score: f64,
}

/// Raw similarity edge. `value` is the similarity strength in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub value: f64,
}

/// Response body of `GET /memory-network`.
///
/// Both collections are optional on the wire so that a payload missing one
/// of them can be told apart from a malformed one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Option<Vec<GraphNode>>,
    pub edges: Option<Vec<GraphEdge>>,
}
