//! Transient interaction state: everything that is not part of the graph

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Segment};
use crate::graph::{self_loop_rotation, EdgeId, LabelId, LoopEdgeVisual, NodeId};
use crate::view::PickTarget;

/// Editing mode, chosen from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Select,
    InsertState,
    /// Waiting for the source state of a new transition
    InsertTransitionFrom,
    /// Source picked, waiting for the target
    InsertTransitionTo,
    Remove,
    MarkInitial,
    MarkFinal,
}

impl Mode {
    pub const ALL: [Mode; 7] = [
        Mode::Select,
        Mode::InsertState,
        Mode::InsertTransitionFrom,
        Mode::InsertTransitionTo,
        Mode::Remove,
        Mode::MarkInitial,
        Mode::MarkFinal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mode::Select => "Select",
            Mode::InsertState => "Insert state",
            Mode::InsertTransitionFrom => "Insert transition (from)",
            Mode::InsertTransitionTo => "Insert transition (to)",
            Mode::Remove => "Remove",
            Mode::MarkInitial => "Mark initial",
            Mode::MarkFinal => "Mark final",
        }
    }

    /// Whether a hovered node is drawn enlarged in this mode.
    pub fn grows_hovered_node(self) -> bool {
        !matches!(self, Mode::InsertState | Mode::MarkInitial | Mode::MarkFinal)
    }
}

/// The selected entity in [`Mode::Select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Node(NodeId),
    Edge(EdgeId),
    Label(LabelId),
}

impl Selection {
    pub fn from_target(target: PickTarget) -> Option<Self> {
        match target {
            PickTarget::Canvas => None,
            PickTarget::Node(id) => Some(Selection::Node(id)),
            PickTarget::Edge(id) => Some(Selection::Edge(id)),
            PickTarget::Label(id) => Some(Selection::Label(id)),
        }
    }
}

/// A transition being drawn: the straight arrow and the self-loop previews
/// both exist, only one is shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingEdge {
    pub source: NodeId,
    /// Straight preview, `None` until the pointer leaves the source
    pub arrow: Option<Segment>,
    pub self_loop: LoopEdgeVisual,
    /// Pointer is over the source itself: the self-loop preview is shown
    pub self_hover: bool,
    /// Distinct state the arrow is snapped to
    pub target_hover: Option<NodeId>,
}

impl PendingEdge {
    pub fn new(source: NodeId, center: Point) -> Self {
        Self {
            source,
            arrow: None,
            self_loop: LoopEdgeVisual::new(center),
            self_hover: true,
            target_hover: None,
        }
    }

    /// Show the self-loop preview, turned towards `pointer`.
    pub(crate) fn hover_source(&mut self, pointer: Point) {
        self.self_hover = true;
        self.target_hover = None;
        if let Some(rotation) = self_loop_rotation(self.self_loop.center, pointer) {
            self.self_loop.rotation = rotation;
        }
    }
}

/// Preview state following the pointer in [`Mode::InsertState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GhostNode {
    pub position: Point,
    pub pressed: bool,
}

/// Uncommitted marker shown on the hovered state in the mark modes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerPreview {
    Initial { node: NodeId, rotation: f32 },
    Final { node: NodeId },
}

impl MarkerPreview {
    pub fn node(&self) -> NodeId {
        match *self {
            MarkerPreview::Initial { node, .. } | MarkerPreview::Final { node } => node,
        }
    }
}

/// Everything the editor remembers between pointer events.
#[derive(Debug, Clone, Default)]
pub struct InteractionSession {
    pub mode: Mode,
    pub selected: Option<Selection>,
    pub pending: Option<PendingEdge>,
    pub ghost: Option<GhostNode>,
    pub marker_preview: Option<MarkerPreview>,
    /// Entity under the pointer as of the last event
    pub hovered: Option<PickTarget>,
    pub pressed: bool,
    pub pointer: Option<Point>,
    /// Node position minus pointer position at press time
    pub(crate) grab_offset: Point,
    /// Nodes brought to the front, most recent last
    pub(crate) raised: Vec<NodeId>,
}

impl InteractionSession {
    pub fn hovered_node(&self) -> Option<NodeId> {
        match self.hovered {
            Some(PickTarget::Node(id)) => Some(id),
            _ => None,
        }
    }

    pub fn is_selected(&self, target: PickTarget) -> bool {
        self.selected.is_some() && self.selected == Selection::from_target(target)
    }

    /// Nodes in drawing order: raised nodes last.
    pub fn raised(&self) -> &[NodeId] {
        &self.raised
    }

    pub(crate) fn raise(&mut self, id: NodeId) {
        self.raised.retain(|&n| n != id);
        self.raised.push(id);
    }

    /// Drop every transient reference to a state that no longer exists.
    pub(crate) fn forget_node(&mut self, id: NodeId) {
        self.raised.retain(|&n| n != id);
        if self.selected == Some(Selection::Node(id)) {
            self.selected = None;
        }
        if self.hovered == Some(PickTarget::Node(id)) {
            self.hovered = None;
        }
        if self.marker_preview.map(|p| p.node()) == Some(id) {
            self.marker_preview = None;
        }
        if self.pending.map(|p| p.source) == Some(id) {
            self.pending = None;
        }
    }

    pub(crate) fn forget_target(&mut self, target: PickTarget) {
        if self.is_selected(target) {
            self.selected = None;
        }
        if self.hovered == Some(target) {
            self.hovered = None;
        }
    }
}
