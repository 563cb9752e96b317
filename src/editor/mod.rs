//! Interaction State Machine
//! Interprets pointer events under the current mode as graph mutations and
//! transient feedback, re-solves derived geometry and asks the view to redraw

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::automaton::AutomatonDefinition;
use crate::config::EditorConfig;
use crate::geometry::{
    angle_degrees, distance, quantize_angle, trimmed_segment_with_margin, Point,
};
use crate::graph::{
    self_loop_rotation, EdgeId, EdgeInsertion, EdgeVisual, Graph, GraphError, LabelId,
    LabelOwner, NodeId,
};
use crate::label::{self, transition_text};
use crate::view::{PickTarget, ViewAdapter};

mod scene;
mod session;

#[cfg(test)]
mod tests;

pub use scene::initial_arrow;
pub use session::{GhostNode, InteractionSession, MarkerPreview, Mode, PendingEdge, Selection};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}

pub type EditResult<T> = Result<T, EditError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    /// Pointer entered the canvas
    Enter,
    /// Pointer left the canvas
    Leave,
    Move,
    Down,
    Up,
    /// Press and release without a drag in between
    Click,
    /// Pointer moved while pressed on `target`
    Drag,
}

/// A pointer event in model coordinates, carrying the entity the adapter picked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub target: PickTarget,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, target: PickTarget, position: Point) -> Self {
        Self {
            kind,
            target,
            position,
        }
    }
}

/// Label text fields, read only when something is committed.
pub trait TextInputs {
    fn state_label(&self) -> String;
    fn transition_label(&self) -> String;
}

/// Side panel showing the selection or, with nothing selected, the whole diagram.
pub trait DetailDisplay {
    fn show_selection(&mut self, detail: &SelectionDetail);
    fn show_diagram(&mut self, summary: &AutomatonDefinition);
}

/// Everything the editor talks to.
pub trait EditorHost: ViewAdapter + TextInputs + DetailDisplay {}

impl<T: ViewAdapter + TextInputs + DetailDisplay> EditorHost for T {}

/// What the detail panel shows for a selected entity.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionDetail {
    Node {
        id: NodeId,
        label: Option<String>,
        position: Point,
        initial: bool,
        accepting: bool,
    },
    Edge {
        id: EdgeId,
        source: NodeId,
        target: NodeId,
        label: Option<String>,
    },
    Label {
        id: LabelId,
        owner: LabelOwner,
        text: String,
    },
}

/// The diagram editor: sole owner and mutator of the graph.
///
/// Every call to [`Editor::handle`] or [`Editor::set_mode`] completes its
/// mutation and geometry refresh before issuing exactly one redraw.
#[derive(Debug, Clone)]
pub struct Editor {
    config: EditorConfig,
    graph: Graph,
    session: InteractionSession,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            graph: Graph::new(&config),
            session: InteractionSession::default(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn summary(&self) -> AutomatonDefinition {
        AutomatonDefinition::from_graph(&self.graph)
    }

    // ------------------------------------------------------------------
    // Mode switching
    // ------------------------------------------------------------------

    /// Switch modes, tearing down whatever the old mode left provisional.
    ///
    /// Asking for [`Mode::InsertTransitionTo`] with no source picked yields
    /// [`Mode::InsertTransitionFrom`].
    pub fn set_mode(&mut self, mode: Mode, host: &mut impl EditorHost) {
        let mode = if mode == Mode::InsertTransitionTo && self.session.pending.is_none() {
            Mode::InsertTransitionFrom
        } else {
            mode
        };
        let previous = self.session.mode;
        if previous == mode {
            return;
        }

        let deselected = self.leave_mode(previous);
        self.session.mode = mode;
        log::debug!("mode {:?} -> {:?}", previous, mode);

        if deselected {
            host.show_diagram(&self.summary());
        }
        host.redraw(&self.display_list());
    }

    /// Destroy the provisional state owned by `mode`. Returns whether a
    /// selection was cleared.
    fn leave_mode(&mut self, mode: Mode) -> bool {
        match mode {
            Mode::Select => self.session.selected.take().is_some(),
            Mode::InsertState => {
                self.session.ghost = None;
                false
            }
            Mode::InsertTransitionTo => {
                if let Some(pending) = self.session.pending.take() {
                    log::debug!("discarded transition from {}", pending.source);
                }
                false
            }
            Mode::MarkInitial | Mode::MarkFinal => {
                self.session.marker_preview = None;
                false
            }
            Mode::InsertTransitionFrom | Mode::Remove => false,
        }
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    /// Apply one pointer event and redraw.
    ///
    /// Invalid gestures (stale ids, duplicate transitions, degenerate
    /// geometry) are dropped here; nothing reaches the host as an error.
    pub fn handle(&mut self, event: PointerEvent, host: &mut impl EditorHost) {
        let PointerEvent {
            kind,
            target,
            position,
        } = event;
        self.session.pointer = Some(position);

        let result = match kind {
            PointerKind::Enter => {
                self.pointer_enter(position);
                Ok(())
            }
            PointerKind::Leave => {
                self.pointer_leave();
                Ok(())
            }
            PointerKind::Move => self.pointer_move(target, position),
            PointerKind::Down => self.pointer_down(target, position),
            PointerKind::Up => self.pointer_up(target, position),
            PointerKind::Click => self.click(target, position, host),
            PointerKind::Drag => self.drag(target, position),
        };
        if let Err(err) = result {
            log::debug!("ignored {:?} on {:?}: {}", kind, target, err);
        }

        host.redraw(&self.display_list());
    }

    fn pointer_enter(&mut self, position: Point) {
        if self.session.mode == Mode::InsertState {
            self.session.ghost = Some(GhostNode {
                position,
                pressed: false,
            });
        }
    }

    fn pointer_leave(&mut self) {
        self.session.ghost = None;
        self.session.hovered = None;
        self.session.pressed = false;
        self.session.pointer = None;
        self.session.marker_preview = None;
    }

    fn pointer_move(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        let previous = self.session.hovered.replace(target);
        match self.session.mode {
            Mode::InsertState => {
                let pressed = self.session.ghost.map_or(self.session.pressed, |g| g.pressed);
                self.session.ghost = Some(GhostNode { position, pressed });
                Ok(())
            }
            Mode::InsertTransitionTo => self.update_pending(target, position),
            Mode::MarkInitial | Mode::MarkFinal => {
                if previous != Some(target) {
                    self.session.marker_preview = self.marker_preview_for(target);
                }
                self.rotate_initial_preview(position)
            }
            Mode::Select | Mode::InsertTransitionFrom | Mode::Remove => Ok(()),
        }
    }

    fn pointer_down(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        self.session.pressed = true;
        if let Some(ghost) = self.session.ghost.as_mut() {
            ghost.pressed = true;
        }
        self.session.grab_offset = match target {
            PickTarget::Node(id) => {
                let node = self.graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
                node.position - position
            }
            _ => Point::ZERO,
        };
        // The pressed node shrinks back, so the snapped arrow has to follow
        if self.session.mode == Mode::InsertTransitionTo {
            self.update_pending(target, position)?;
        }
        Ok(())
    }

    fn pointer_up(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        self.session.pressed = false;
        if let Some(ghost) = self.session.ghost.as_mut() {
            ghost.pressed = false;
        }
        if self.session.mode == Mode::InsertTransitionTo {
            self.update_pending(target, position)?;
        }
        Ok(())
    }

    fn click(
        &mut self,
        target: PickTarget,
        position: Point,
        host: &mut impl EditorHost,
    ) -> EditResult<()> {
        match self.session.mode {
            Mode::Select => self.select(target)?,
            Mode::InsertState => self.insert_state(target, position, host)?,
            Mode::InsertTransitionFrom => self.begin_transition(target, position)?,
            Mode::InsertTransitionTo => self.commit_transition(target, position, host)?,
            Mode::Remove => self.remove(target)?,
            Mode::MarkInitial => self.toggle_initial(target, position)?,
            Mode::MarkFinal => self.toggle_final(target)?,
        }
        self.show_details(host);
        Ok(())
    }

    fn drag(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        match target {
            PickTarget::Node(id) => {
                self.graph.move_node(id, position + self.session.grab_offset)?;
                self.relayout_node(id)
            }
            PickTarget::Edge(id) if self.session.mode == Mode::Select => {
                self.rotate_loop(id, position)
            }
            PickTarget::Label(id) => self.drag_label(id, position),
            PickTarget::Edge(_) | PickTarget::Canvas => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Select
    // ------------------------------------------------------------------

    fn select(&mut self, target: PickTarget) -> EditResult<()> {
        let selection = Selection::from_target(target);
        if let Some(selection) = selection {
            self.selection_detail(selection)?;
            if let Selection::Node(id) = selection {
                self.session.raise(id);
            }
        }
        self.session.selected = selection;
        log::debug!("selected {:?}", selection);
        Ok(())
    }

    pub fn selection_detail(&self, selection: Selection) -> EditResult<SelectionDetail> {
        let detail = match selection {
            Selection::Node(id) => {
                let node = self.graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
                SelectionDetail::Node {
                    id,
                    label: self.graph.node_label(id).map(|l| l.text.clone()),
                    position: node.position,
                    initial: self.graph.is_initial(id),
                    accepting: self.graph.is_final(id),
                }
            }
            Selection::Edge(id) => {
                let edge = self.graph.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
                SelectionDetail::Edge {
                    id,
                    source: edge.source,
                    target: edge.target,
                    label: self.graph.edge_label(id).map(|l| l.text.clone()),
                }
            }
            Selection::Label(id) => {
                let label = self.graph.label(id).ok_or(GraphError::LabelNotFound(id))?;
                SelectionDetail::Label {
                    id,
                    owner: label.owner,
                    text: label.text.clone(),
                }
            }
        };
        Ok(detail)
    }

    fn show_details(&self, host: &mut impl EditorHost) {
        match self.session.selected.map(|s| self.selection_detail(s)) {
            Some(Ok(detail)) => host.show_selection(&detail),
            _ => host.show_diagram(&self.summary()),
        }
    }

    // ------------------------------------------------------------------
    // Insert state
    // ------------------------------------------------------------------

    fn insert_state(
        &mut self,
        target: PickTarget,
        position: Point,
        host: &mut impl EditorHost,
    ) -> EditResult<()> {
        if target != PickTarget::Canvas {
            return Ok(());
        }
        let id = self.graph.add_node(position);
        let input = host.state_label();
        let text = if input.trim().is_empty() {
            format!("{}{}", self.config.state_label_prefix, id.0)
        } else {
            input
        };
        let label_id = self.graph.set_node_label(id, text)?;
        self.measure_label(label_id, &*host)?;
        self.layout_node_label(id)
    }

    // ------------------------------------------------------------------
    // Insert transition
    // ------------------------------------------------------------------

    fn begin_transition(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        let PickTarget::Node(source) = target else {
            return Ok(());
        };
        let node = self.graph.node(source).ok_or(GraphError::NodeNotFound(source))?;
        self.session.pending = Some(PendingEdge::new(source, node.position));
        self.session.mode = Mode::InsertTransitionTo;
        log::debug!("transition from {source}");
        self.update_pending(target, position)
    }

    /// Point the provisional arrow at the hovered state, the pointer, or turn
    /// the self-loop preview towards the pointer.
    fn update_pending(&mut self, target: PickTarget, position: Point) -> EditResult<()> {
        let Some(mut pending) = self.session.pending else {
            return Ok(());
        };
        let source = self
            .graph
            .node(pending.source)
            .ok_or(GraphError::NodeNotFound(pending.source))?;
        let (center, radius) = (source.position, source.radius);
        let margin = self.config.arrow_margin;
        pending.self_loop.center = center;

        match target {
            PickTarget::Node(id) if id != pending.source => {
                let node = self.graph.node(id).ok_or(GraphError::NodeNotFound(id))?;
                pending.self_hover = false;
                pending.target_hover = Some(id);
                pending.arrow = trimmed_segment_with_margin(
                    center,
                    radius,
                    node.position,
                    self.node_display_radius(id),
                    margin,
                );
            }
            // Anything still picked as the source counts, even past the hover radius
            PickTarget::Node(_) => pending.hover_source(position),
            _ if distance(center, position) <= self.config.self_hover_radius() => {
                pending.hover_source(position)
            }
            _ => {
                pending.self_hover = false;
                pending.target_hover = None;
                pending.arrow = trimmed_segment_with_margin(center, radius, position, 0.0, margin);
            }
        }

        self.session.pending = Some(pending);
        Ok(())
    }

    fn commit_transition(
        &mut self,
        target: PickTarget,
        position: Point,
        host: &mut impl EditorHost,
    ) -> EditResult<()> {
        // The click itself decides the destination, not the last hover
        self.update_pending(target, position)?;
        let Some(pending) = self.session.pending else {
            self.session.mode = Mode::InsertTransitionFrom;
            return Ok(());
        };
        let destination = match target {
            PickTarget::Node(id) if id != pending.source => id,
            _ if pending.self_hover => pending.source,
            // Keep drawing until a state is clicked
            _ => return Ok(()),
        };

        self.session.pending = None;
        self.session.mode = Mode::InsertTransitionFrom;

        let text = transition_text(&host.transition_label());
        match self.graph.add_edge(pending.source, destination, Some(text))? {
            EdgeInsertion::Inserted(id) => {
                if destination == pending.source {
                    self.graph.set_loop_rotation(id, pending.self_loop.rotation)?;
                }
                let refreshed = self.graph.refresh_edge_pair(id)?;
                if let Some(label_id) = self.graph.edge_label_id(id) {
                    self.measure_label(label_id, &*host)?;
                }
                for edge in refreshed {
                    self.layout_edge_label(edge)?;
                }
            }
            EdgeInsertion::Rejected { existing } => {
                log::debug!(
                    "discarded {} -> {}: already drawn as {existing}",
                    pending.source,
                    destination
                );
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    fn remove(&mut self, target: PickTarget) -> EditResult<()> {
        match target {
            PickTarget::Canvas => return Ok(()),
            PickTarget::Node(id) => {
                self.graph.remove_node(id)?;
                self.session.forget_node(id);
            }
            PickTarget::Edge(id) => {
                let edge = self.graph.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
                let reverse = if edge.is_self_loop() {
                    None
                } else {
                    self.graph.edge_between(edge.target, edge.source)
                };
                self.graph.remove_edge(id)?;
                // The opposite arrow loses its offset
                if let Some(reverse) = reverse {
                    self.graph.refresh_edge(reverse)?;
                    self.layout_edge_label(reverse)?;
                }
            }
            PickTarget::Label(id) => self.graph.remove_label(id)?,
        }
        self.session.forget_target(target);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    fn marker_preview_for(&self, target: PickTarget) -> Option<MarkerPreview> {
        let PickTarget::Node(node) = target else {
            return None;
        };
        match self.session.mode {
            Mode::MarkInitial if !self.graph.is_initial(node) => Some(MarkerPreview::Initial {
                node,
                rotation: 0.0,
            }),
            Mode::MarkFinal if !self.graph.is_final(node) => Some(MarkerPreview::Final { node }),
            _ => None,
        }
    }

    fn initial_rotation(&self, node: NodeId, pointer: Point) -> EditResult<f32> {
        let center = self
            .graph
            .node(node)
            .ok_or(GraphError::NodeNotFound(node))?
            .position;
        let theta = angle_degrees(center, pointer)
            .ok_or(EditError::DegenerateGeometry("pointer on state center"))?;
        Ok(quantize_angle(theta, self.config.sector_size))
    }

    fn rotate_initial_preview(&mut self, pointer: Point) -> EditResult<()> {
        if let Some(MarkerPreview::Initial { node, .. }) = self.session.marker_preview {
            let quantized = self.initial_rotation(node, pointer)?;
            self.session.marker_preview = Some(MarkerPreview::Initial {
                node,
                rotation: quantized,
            });
        }
        Ok(())
    }

    fn toggle_initial(&mut self, target: PickTarget, pointer: Point) -> EditResult<()> {
        let PickTarget::Node(id) = target else {
            return Ok(());
        };
        if self.graph.is_initial(id) {
            self.graph.set_initial(id, false)?;
            log::debug!("unmarked initial {id}");
        } else {
            let rotation = match self.session.marker_preview {
                Some(MarkerPreview::Initial { node, rotation }) if node == id => rotation,
                _ => self.initial_rotation(id, pointer).unwrap_or(0.0),
            };
            self.graph.set_initial(id, true)?;
            self.graph.set_initial_rotation(id, rotation)?;
            log::debug!("marked initial {id}");
        }
        self.session.marker_preview = None;
        Ok(())
    }

    fn toggle_final(&mut self, target: PickTarget) -> EditResult<()> {
        let PickTarget::Node(id) = target else {
            return Ok(());
        };
        let is_final = self.graph.is_final(id);
        self.graph.set_final(id, !is_final)?;
        self.session.marker_preview = None;
        log::debug!("{} final {id}", if is_final { "unmarked" } else { "marked" });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Dragging
    // ------------------------------------------------------------------

    /// Re-solve everything derived from a state's position in one pass: its
    /// label, every incident edge and its opposite, their labels and the
    /// provisional arrow. Markers are placed from the state at draw time.
    fn relayout_node(&mut self, id: NodeId) -> EditResult<()> {
        self.layout_node_label(id)?;

        let mut touched: Vec<EdgeId> = Vec::new();
        for edge in self.graph.incident_edges(id) {
            for refreshed in self.graph.refresh_edge_pair(edge)? {
                if !touched.contains(&refreshed) {
                    touched.push(refreshed);
                }
            }
        }
        for &edge in &touched {
            if let Err(err) = self.layout_edge_label(edge) {
                log::trace!("kept label of {edge}: {err}");
            }
        }
        log::trace!("moved {id}: {} transitions refreshed", touched.len());

        if let Some(pending) = self.session.pending {
            if pending.source == id || pending.target_hover == Some(id) {
                let target = self.session.hovered.unwrap_or(PickTarget::Canvas);
                let pointer = self.session.pointer.unwrap_or(pending.self_loop.center);
                self.update_pending(target, pointer)?;
            }
        }
        Ok(())
    }

    fn rotate_loop(&mut self, id: EdgeId, pointer: Point) -> EditResult<()> {
        let edge = self.graph.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
        let EdgeVisual::Loop(visual) = edge.visual else {
            return Ok(());
        };
        let rotation = self_loop_rotation(visual.center, pointer)
            .ok_or(EditError::DegenerateGeometry("pointer on loop center"))?;
        self.graph.set_loop_rotation(id, rotation)?;
        self.layout_edge_label(id)
    }

    fn drag_label(&mut self, id: LabelId, pointer: Point) -> EditResult<()> {
        let record = self.graph.label(id).ok_or(GraphError::LabelNotFound(id))?;
        // State labels stay centered
        let LabelOwner::Edge(edge_id) = record.owner else {
            return Ok(());
        };
        let edge = self
            .graph
            .edge(edge_id)
            .ok_or(GraphError::EdgeNotFound(edge_id))?;
        let ratio = match edge.visual {
            EdgeVisual::Straight(straight) => {
                let direction = self.endpoint_direction(edge.source, edge.target)?;
                label::drag_ratio(straight.segment, direction, pointer)
            }
            EdgeVisual::Loop(visual) => {
                let loop_radius = self.config.loop_radius();
                let geometry = visual.geometry(self.graph.node_radius(), loop_radius);
                label::loop_drag_ratio(visual.center, geometry.tip.end, 2.0 * loop_radius, pointer)
            }
        }
        .ok_or(EditError::DegenerateGeometry("collapsed transition"))?;

        self.graph.label_mut(id)?.anchor.ratio = ratio;
        self.layout_edge_label(edge_id)
    }

    // ------------------------------------------------------------------
    // Label layout
    // ------------------------------------------------------------------

    fn measure_label(&mut self, id: LabelId, host: &impl EditorHost) -> EditResult<()> {
        let font_size = self.config.font_size;
        let record = self.graph.label_mut(id)?;
        record.size = host.measure_text(&record.text, font_size);
        Ok(())
    }

    fn endpoint_direction(&self, source: NodeId, target: NodeId) -> EditResult<Point> {
        let a = self.graph.node(source).ok_or(GraphError::NodeNotFound(source))?;
        let b = self.graph.node(target).ok_or(GraphError::NodeNotFound(target))?;
        Ok(b.position - a.position)
    }

    fn layout_node_label(&mut self, id: NodeId) -> EditResult<()> {
        let Some(label_id) = self.graph.node_label_id(id) else {
            return Ok(());
        };
        let center = self
            .graph
            .node(id)
            .ok_or(GraphError::NodeNotFound(id))?
            .position;
        let record = self.graph.label_mut(label_id)?;
        record.top_left = label::layout_node_label(center, record.size);
        Ok(())
    }

    fn layout_edge_label(&mut self, id: EdgeId) -> EditResult<()> {
        let Some(label_id) = self.graph.edge_label_id(id) else {
            return Ok(());
        };
        let edge = self.graph.edge(id).ok_or(GraphError::EdgeNotFound(id))?;
        let record = self
            .graph
            .label(label_id)
            .ok_or(GraphError::LabelNotFound(label_id))?;
        let (size, ratio) = (record.size, record.anchor.ratio);
        let clearance = self.config.label_clearance;

        let placement = match edge.visual {
            EdgeVisual::Straight(straight) => {
                let direction = self.endpoint_direction(edge.source, edge.target)?;
                label::layout_edge_label(straight.segment, direction, size, ratio, clearance)
            }
            EdgeVisual::Loop(visual) => {
                let loop_radius = self.config.loop_radius();
                let geometry = visual.geometry(self.graph.node_radius(), loop_radius);
                label::layout_loop_label(
                    visual.center,
                    geometry.tip.end,
                    2.0 * loop_radius,
                    size,
                    ratio,
                    clearance,
                )
            }
        }
        .ok_or(EditError::DegenerateGeometry("transition label"))?;

        let record = self.graph.label_mut(label_id)?;
        record.top_left = placement.top_left;
        record.anchor.corner = placement.corner;
        Ok(())
    }

    /// Radius a state is drawn with: grown while hovered, base size while pressed.
    pub fn node_display_radius(&self, id: NodeId) -> f32 {
        let base = self
            .graph
            .node(id)
            .map_or(self.config.node_radius, |n| n.radius);
        let hovered = self.session.hovered_node() == Some(id);
        if hovered && !self.session.pressed && self.session.mode.grows_hovered_node() {
            base + self.config.hover_grow
        } else {
            base
        }
    }
}
