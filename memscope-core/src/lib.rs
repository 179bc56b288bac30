pub mod config;
pub mod debounce;
pub mod error;
pub mod graph;
pub mod list;
pub mod mode;
pub mod models;
pub mod transport;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::PanelConfig;
pub use debounce::SearchDebouncer;
pub use error::PanelError;
pub use graph::{
    map_payload, EventReceiver, EventSink, GraphController, GraphEvent, GraphInstance,
    LayoutEngine, LayoutOptions, NodeDetail, NodeState, RenderedEdge, RenderedGraph, RenderedNode,
    TaggedEvent,
};
pub use list::{AddOutcome, DeleteOutcome, ListView};
pub use mode::{GraphOutcome, GraphRequest, Mode, ModeController};
pub use models::{GraphEdge, GraphNode, MemoryRecord, SearchResult};
pub use transport::{ApiClient, MemoryApi, RequestOptions};
pub use view::{ListNotice, PanelView};
