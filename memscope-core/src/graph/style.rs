//! Visual vocabulary shared by the mapper and the interaction controller.
//!
//! Field names serialize in camelCase so that a browser-side layout engine
//! can take the records as-is.

use serde::{Deserialize, Serialize};

pub const FONT_FACE: &str = "Inter, -apple-system, BlinkMacSystemFont, sans-serif";

/// Background/border pair with an optional border width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swatch {
    pub background: String,
    pub border: String,
    pub border_width: u32,
}

impl Swatch {
    fn new(background: &str, border: &str, border_width: u32) -> Self {
        Self {
            background: background.to_string(),
            border: border.to_string(),
            border_width,
        }
    }
}

/// Full node colour: the resting swatch plus the engine's own
/// selection/hover variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeColor {
    #[serde(flatten)]
    pub base: Swatch,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Swatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hover: Option<Swatch>,
}

impl NodeColor {
    /// Resting purple palette. Constant, independent of the node's data.
    pub fn resting() -> Self {
        let variant = Swatch::new("#a78bfa", "#c084fc", 4);
        Self {
            base: Swatch::new("#8b5cf6", "#a855f7", 3),
            highlight: Some(variant.clone()),
            hover: Some(variant),
        }
    }

    /// Golden palette for the node under the pointer.
    pub fn hovered() -> Self {
        Self::plain(Swatch::new("#fbbf24", "#f59e0b", 5))
    }

    /// Lighter purple for direct neighbours of the hovered node.
    pub fn connected() -> Self {
        Self::plain(Swatch::new("#c084fc", "#e879f9", 4))
    }

    /// Low-opacity purple for everything else while a node is hovered.
    pub fn faded() -> Self {
        Self::plain(Swatch::new(
            "rgba(139, 92, 246, 0.3)",
            "rgba(168, 85, 247, 0.4)",
            2,
        ))
    }

    fn plain(base: Swatch) -> Self {
        Self {
            base,
            highlight: None,
            hover: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
}

impl Shadow {
    fn glow(color: &str, size: u32) -> Self {
        Self {
            enabled: true,
            color: Some(color.to_string()),
            size: Some(size),
            x: Some(0),
            y: Some(0),
        }
    }

    pub fn resting() -> Self {
        Self::glow("rgba(139, 92, 246, 0.3)", 15)
    }

    pub fn hovered() -> Self {
        Self::glow("rgba(251, 191, 36, 0.8)", 25)
    }

    pub fn connected() -> Self {
        Self::glow("rgba(192, 132, 252, 0.6)", 18)
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            color: None,
            size: None,
            x: None,
            y: None,
        }
    }

    pub fn edge() -> Self {
        Self {
            enabled: true,
            color: Some("rgba(168, 85, 247, 0.2)".to_string()),
            size: Some(8),
            x: None,
            y: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Font {
    pub color: String,
    pub size: f64,
    pub face: String,
    pub stroke_width: u32,
    pub stroke_color: String,
    pub multi: String,
    pub bold: bool,
}

impl Font {
    pub fn label(size: f64) -> Self {
        Self {
            color: "#ffffff".to_string(),
            size,
            face: FONT_FACE.to_string(),
            stroke_width: 2,
            stroke_color: "#000000".to_string(),
            multi: "md".to_string(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeColor {
    pub color: String,
    pub highlight: String,
    pub hover: String,
}

impl EdgeColor {
    /// Edge tint at the given opacity; highlight/hover brighten by 0.3.
    pub fn with_opacity(opacity: f64) -> Self {
        let lifted = (opacity + 0.3).min(1.0);
        Self {
            color: format!("rgba(168, 85, 247, {opacity})"),
            highlight: format!("rgba(192, 132, 252, {lifted})"),
            hover: format!("rgba(192, 132, 252, {lifted})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Smooth {
    #[serde(rename = "type")]
    pub kind: String,
    pub roundness: f64,
}

impl Default for Smooth {
    fn default() -> Self {
        Self {
            kind: "continuous".to_string(),
            roundness: 0.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WidthConstraint {
    pub minimum: u32,
    pub maximum: u32,
}

impl Default for WidthConstraint {
    fn default() -> Self {
        Self {
            minimum: 100,
            maximum: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_color_lift_is_capped_at_one() {
        let color = EdgeColor::with_opacity(0.9);
        assert_eq!(color.color, "rgba(168, 85, 247, 0.9)");
        assert_eq!(color.highlight, "rgba(192, 132, 252, 1)");
        assert_eq!(color.hover, color.highlight);
    }

    #[test]
    fn test_resting_palette_serializes_flat_with_variants() {
        let json = serde_json::to_value(NodeColor::resting()).unwrap();
        assert_eq!(json["background"], "#8b5cf6");
        assert_eq!(json["border"], "#a855f7");
        assert_eq!(json["borderWidth"], 3);
        assert_eq!(json["highlight"]["background"], "#a78bfa");
        assert_eq!(json["hover"]["borderWidth"], 4);
    }

    #[test]
    fn test_state_palettes_omit_engine_variants() {
        let json = serde_json::to_value(NodeColor::faded()).unwrap();
        assert!(json.get("highlight").is_none());
        assert!(json.get("hover").is_none());
    }

    #[test]
    fn test_disabled_shadow_only_carries_flag() {
        let json = serde_json::to_value(Shadow::disabled()).unwrap();
        assert_eq!(json, serde_json::json!({"enabled": false}));
    }
}
