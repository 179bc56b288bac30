pub mod graph;
pub mod memory;

pub use graph::{GraphEdge, GraphNode, GraphPayload};
pub use memory::{
    DeleteResponse, MemoryList, MemoryRecord, ModelCatalog, ModelSwitch, NewMemory, SearchResult,
};
