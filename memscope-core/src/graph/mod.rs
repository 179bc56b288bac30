//! Similarity-graph rendering: payload mapping, engine seam, and the
//! hover-highlight state machine.

pub mod engine;
pub mod interaction;
pub mod mapper;
pub mod style;

pub use engine::{
    EventReceiver, EventSink, FitAnimation, GraphEvent, GraphInstance, LayoutEngine,
    LayoutOptions, NodeUpdate, TaggedEvent,
};
pub use interaction::{GraphController, NodeDetail};
pub use mapper::{
    edge_length, edge_opacity, edge_width, map_payload, node_font_size, node_size, NodeState,
    RenderedEdge, RenderedGraph, RenderedNode,
};
