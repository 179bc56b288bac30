//! Seam to the force-directed layout engine.
//!
//! The engine owns physics, positions and pixels. The panel only hands it
//! render records and options, patches node visuals, and consumes the
//! events it publishes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::mapper::RenderedGraph;
use super::style::{Font, NodeColor, Shadow};
use crate::error::PanelError;

/// Events a live graph instance publishes.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    HoverNode(String),
    BlurNode,
    /// Pointer click; `None` when the click landed on empty canvas.
    Click(Option<String>),
    /// Camera zoom; carries the scale after the zoom step.
    Zoom { scale: f64 },
    StabilizationIterationsDone,
}

/// A [`GraphEvent`] stamped with the generation of the instance that
/// published it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEvent {
    pub generation: u64,
    pub event: GraphEvent,
}

pub type EventReceiver = UnboundedReceiver<TaggedEvent>;

/// Publishing end handed to one graph instance.
///
/// All sinks cut from the same channel share one receiver; each stamps
/// its own generation so the receiver can drop events from instances that
/// have since been torn down.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: u64,
    tx: UnboundedSender<TaggedEvent>,
}

impl EventSink {
    pub fn channel() -> (Self, EventReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { generation: 0, tx }, rx)
    }

    /// A sink on the same channel stamping `generation`.
    pub fn for_generation(&self, generation: u64) -> Self {
        Self {
            generation,
            tx: self.tx.clone(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn send(&self, event: GraphEvent) -> Result<(), PanelError> {
        self.tx
            .send(TaggedEvent {
                generation: self.generation,
                event,
            })
            .map_err(|_| PanelError::Engine("graph event channel closed".to_string()))
    }
}

/// Partial visual update for one node. `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<NodeColor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    EaseInOutQuad,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitAnimation {
    pub duration: u32,
    pub easing_function: Easing,
}

impl Default for FitAnimation {
    fn default() -> Self {
        Self {
            duration: 1000,
            easing_function: Easing::EaseInOutQuad,
        }
    }
}

/// A built, live graph. Dropped instances are not assumed to release
/// anything; callers must call [`GraphInstance::destroy`].
pub trait GraphInstance: Send {
    fn update_nodes(&mut self, updates: &[NodeUpdate]);

    /// Ids adjacent to `id` through any edge, in either direction.
    fn connected_nodes(&self, id: &str) -> Vec<String>;

    fn fit(&mut self, animation: FitAnimation);

    fn destroy(&mut self);
}

/// Builds graph instances from render records.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    async fn build(
        &self,
        graph: &RenderedGraph,
        options: &LayoutOptions,
        events: EventSink,
    ) -> Result<Box<dyn GraphInstance>, PanelError>;

    /// Engine name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Layout options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    pub nodes: NodeDefaults,
    pub edges: EdgeDefaults,
    pub physics: Physics,
    pub interaction: Interaction,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefaults {
    pub shape: String,
    pub border_width: u32,
    pub scaling: NodeScaling,
    pub shadow: Shadow,
    pub margin: Margin,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeScaling {
    pub min: u32,
    pub max: u32,
    pub label: LabelScaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelScaling {
    pub enabled: bool,
    pub min: u32,
    pub max: u32,
    pub max_visible: u32,
    pub draw_threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDefaults {
    pub shadow: Shadow,
    pub smooth: super::style::Smooth,
    pub scaling: EdgeScaling,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeScaling {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Physics {
    pub enabled: bool,
    pub solver: String,
    pub force_atlas2_based: ForceAtlas2,
    pub stabilization: Stabilization,
    pub timestep: f64,
    pub adaptive_timestep: bool,
    pub max_velocity: f64,
    pub min_velocity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceAtlas2 {
    pub gravitational_constant: f64,
    pub central_gravity: f64,
    pub spring_length: f64,
    pub spring_constant: f64,
    pub damping: f64,
    pub avoid_overlap: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stabilization {
    pub enabled: bool,
    pub iterations: u32,
    pub update_interval: u32,
    pub only_dynamic_edges: bool,
    pub fit: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub hover: bool,
    pub tooltip_delay: u32,
    pub zoom_view: bool,
    pub drag_view: bool,
    pub drag_nodes: bool,
    pub select_connected_edges: bool,
    pub hover_connected_edges: bool,
    pub multiselect: bool,
    pub navigation_buttons: bool,
    pub zoom_speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub improved_layout: bool,
    pub cluster_threshold: u32,
    pub hierarchical: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            nodes: NodeDefaults {
                shape: "dot".to_string(),
                border_width: 3,
                scaling: NodeScaling {
                    min: 60,
                    max: 150,
                    label: LabelScaling {
                        enabled: true,
                        min: 14,
                        max: 20,
                        max_visible: 20,
                        draw_threshold: 8,
                    },
                },
                shadow: Shadow::resting(),
                margin: Margin {
                    top: 15,
                    right: 15,
                    bottom: 15,
                    left: 15,
                },
            },
            edges: EdgeDefaults {
                shadow: Shadow::edge(),
                smooth: super::style::Smooth::default(),
                scaling: EdgeScaling { min: 2, max: 12 },
            },
            physics: Physics {
                enabled: true,
                solver: "forceAtlas2Based".to_string(),
                force_atlas2_based: ForceAtlas2 {
                    gravitational_constant: -120.0,
                    central_gravity: 0.01,
                    spring_length: 350.0,
                    spring_constant: 0.12,
                    damping: 0.6,
                    avoid_overlap: 2.0,
                },
                stabilization: Stabilization {
                    enabled: true,
                    iterations: 3000,
                    update_interval: 25,
                    only_dynamic_edges: false,
                    fit: true,
                },
                timestep: 0.25,
                adaptive_timestep: true,
                max_velocity: 30.0,
                min_velocity: 0.75,
            },
            interaction: Interaction {
                hover: true,
                tooltip_delay: 200,
                zoom_view: true,
                drag_view: true,
                drag_nodes: true,
                select_connected_edges: false,
                hover_connected_edges: false,
                multiselect: false,
                navigation_buttons: false,
                zoom_speed: 0.8,
            },
            layout: Layout {
                improved_layout: true,
                cluster_threshold: 150,
                hierarchical: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_options_serialize_engine_keys() {
        let json = serde_json::to_value(LayoutOptions::default()).unwrap();
        assert_eq!(json["physics"]["solver"], "forceAtlas2Based");
        assert_eq!(
            json["physics"]["forceAtlas2Based"]["gravitationalConstant"],
            -120.0
        );
        assert_eq!(json["physics"]["stabilization"]["iterations"], 3000);
        assert_eq!(json["interaction"]["hover"], true);
        assert_eq!(json["nodes"]["scaling"]["label"]["drawThreshold"], 8);
    }

    #[test]
    fn test_fit_animation_defaults() {
        let json = serde_json::to_value(FitAnimation::default()).unwrap();
        assert_eq!(json["duration"], 1000);
        assert_eq!(json["easingFunction"], "easeInOutQuad");
    }

    #[test]
    fn test_node_update_omits_untouched_fields() {
        let update = NodeUpdate {
            id: "n1".to_string(),
            color: None,
            shadow: None,
            size: Some(72.0),
            font: None,
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"id": "n1", "size": 72.0}));
    }

    #[tokio::test]
    async fn test_sinks_stamp_their_own_generation() {
        let (root, mut rx) = EventSink::channel();
        let first = root.for_generation(1);
        let second = first.for_generation(2);

        first.send(GraphEvent::BlurNode).unwrap();
        second.send(GraphEvent::StabilizationIterationsDone).unwrap();

        assert_eq!(
            rx.recv().await,
            Some(TaggedEvent {
                generation: 1,
                event: GraphEvent::BlurNode
            })
        );
        assert_eq!(rx.recv().await.map(|t| t.generation), Some(2));
    }

    #[test]
    fn test_send_after_receiver_dropped_is_an_engine_error() {
        let (sink, rx) = EventSink::channel();
        drop(rx);
        assert!(matches!(
            sink.send(GraphEvent::BlurNode),
            Err(PanelError::Engine(_))
        ));
    }
}
