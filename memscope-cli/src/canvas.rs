//! Text "canvas" layout engine.
//!
//! There is no physics in a terminal: a built graph counts as settled at
//! once, so the stabilization event is published straight away. Node
//! updates are applied to a local table and echoed.

use std::collections::HashMap;

use async_trait::async_trait;
use memscope_core::graph::{EventSink, FitAnimation, NodeUpdate};
use memscope_core::{GraphEvent, GraphInstance, LayoutEngine, LayoutOptions, PanelError, RenderedGraph};

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    pub id: String,
    pub label: String,
    pub size: f64,
    pub background: String,
    pub font_size: f64,
}

pub struct TerminalGraph {
    rows: Vec<NodeRow>,
    adjacency: HashMap<String, Vec<String>>,
}

impl TerminalGraph {
    pub fn new(graph: &RenderedGraph) -> Self {
        let rows = graph
            .nodes
            .iter()
            .map(|n| NodeRow {
                id: n.id.clone(),
                label: n.label.clone(),
                size: n.size,
                background: n.color.base.background.clone(),
                font_size: n.font.size,
            })
            .collect();

        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        for edge in &graph.edges {
            adjacency
                .entry(edge.from.clone())
                .or_default()
                .push(edge.to.clone());
            adjacency
                .entry(edge.to.clone())
                .or_default()
                .push(edge.from.clone());
        }

        Self { rows, adjacency }
    }

    pub fn rows(&self) -> &[NodeRow] {
        &self.rows
    }

    fn apply(&mut self, update: &NodeUpdate) -> Option<&NodeRow> {
        let row = self.rows.iter_mut().find(|r| r.id == update.id)?;
        if let Some(color) = &update.color {
            row.background = color.base.background.clone();
        }
        if let Some(size) = update.size {
            row.size = size;
        }
        if let Some(font) = &update.font {
            row.font_size = font.size;
        }
        Some(row)
    }
}

pub fn format_row(row: &NodeRow) -> String {
    format!(
        "  {:<12} size {:>6.1}  font {:>5.1}  {:<24} {}",
        row.id, row.size, row.font_size, row.background, row.label
    )
}

/// Table of every node and edge in a freshly mapped graph.
pub fn render_summary(graph: &RenderedGraph) -> String {
    let mut out = format!("{} nodes, {} edges\n", graph.nodes.len(), graph.edges.len());
    for node in &graph.nodes {
        out.push_str(&format!(
            "  {:<12} size {:>6.1}  font {:>5.1}  {}\n",
            node.id, node.size, node.font.size, node.label
        ));
    }
    for edge in &graph.edges {
        out.push_str(&format!(
            "  {} -- {}  similarity {:.2}  width {:.1}  length {:.0}\n",
            edge.from, edge.to, edge.value, edge.width, edge.length
        ));
    }
    out
}

impl GraphInstance for TerminalGraph {
    fn update_nodes(&mut self, updates: &[NodeUpdate]) {
        for update in updates {
            if let Some(row) = self.apply(update) {
                println!("{}", format_row(row));
            }
        }
    }

    fn connected_nodes(&self, id: &str) -> Vec<String> {
        self.adjacency.get(id).cloned().unwrap_or_default()
    }

    fn fit(&mut self, animation: FitAnimation) {
        println!(
            "(camera fit to {} nodes over {}ms)",
            self.rows.len(),
            animation.duration
        );
    }

    fn destroy(&mut self) {
        self.rows.clear();
        self.adjacency.clear();
        tracing::debug!("terminal graph destroyed");
    }
}

pub struct TerminalEngine;

#[async_trait]
impl LayoutEngine for TerminalEngine {
    async fn build(
        &self,
        graph: &RenderedGraph,
        _options: &LayoutOptions,
        events: EventSink,
    ) -> Result<Box<dyn GraphInstance>, PanelError> {
        print!("{}", render_summary(graph));
        let instance = TerminalGraph::new(graph);
        events.send(GraphEvent::StabilizationIterationsDone)?;
        Ok(Box::new(instance))
    }

    fn name(&self) -> &str {
        "terminal"
    }
}
