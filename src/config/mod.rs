//! Editor configuration
//! Visual constants for nodes, arrows, markers and labels

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;


#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Tunable constants shared by the graph model, label layout and editor.
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base radius of every state circle
    pub node_radius: f32,
    /// Outline width of a state circle
    pub node_stroke_width: f32,
    /// Stroke width of transition arrows and self-loops
    pub edge_stroke_width: f32,
    /// Gap between a circle outline and an arrow end
    pub arrow_margin: f32,
    pub arrowhead_size: f32,
    /// Radius increase of a hovered node
    pub hover_grow: f32,
    /// Radius decrease of the ghost node while the pointer is pressed
    pub press_shrink: f32,
    /// Stroke increase of a hovered arrow
    pub highlight_extra_width: f32,
    /// Lateral offset of opposite edges, in multiples of `edge_stroke_width`
    pub lateral_offset_factor: f32,
    pub loop_radius_ratio: f32,
    pub final_ring_ratio: f32,
    pub initial_arrow_length: f32,
    /// Rotation quantum of the initial-state arrow, in degrees
    pub sector_size: f32,
    /// Gap between a transition label and its arrow
    pub label_clearance: f32,
    pub font_size: f32,
    /// Default state label is this prefix followed by the node id
    pub state_label_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            node_radius: 40.0,
            node_stroke_width: 5.0,
            edge_stroke_width: 4.0,
            arrow_margin: 10.0,
            arrowhead_size: 10.0,
            hover_grow: 5.0,
            press_shrink: 10.0,
            highlight_extra_width: 3.0,
            lateral_offset_factor: 2.0,
            loop_radius_ratio: 0.8,
            final_ring_ratio: 0.8,
            initial_arrow_length: 40.0,
            sector_size: 15.0,
            label_clearance: 4.0,
            font_size: 16.0,
            state_label_prefix: "q".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Distance between the two arrows of an opposite-direction pair and their shared axis.
    pub fn lateral_offset(&self) -> f32 {
        self.lateral_offset_factor * self.edge_stroke_width
    }

    pub fn loop_radius(&self) -> f32 {
        self.node_radius * self.loop_radius_ratio
    }

    pub fn final_ring_radius(&self) -> f32 {
        self.node_radius * self.final_ring_ratio
    }

    /// Pointer distance from a node center that still counts as hovering the node itself.
    pub fn self_hover_radius(&self) -> f32 {
        self.node_radius + self.node_stroke_width
    }
}
