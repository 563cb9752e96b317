//! Graph Model
//! States, transitions and their labels as a directed graph with at most one
//! edge per ordered pair of states

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::geometry::{
    angle_degrees, perpendicular_unit_vector, rotate, trimmed_segment_with_margin, Point,
    Segment, Size,
};
use crate::label::{LabelAnchor, EPSILON};


#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Unknown state: {0}")]
    NodeNotFound(NodeId),
    #[error("Unknown transition: {0}")]
    EdgeNotFound(EdgeId),
    #[error("Unknown label: {0}")]
    LabelNotFound(LabelId),
    #[error("State {0} is not initial")]
    NotInitial(NodeId),
}

pub type GraphResult<T> = Result<T, GraphError>;

macro_rules! entity_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

entity_id!(NodeId, "n");
entity_id!(EdgeId, "e");
entity_id!(LabelId, "l");

/// A state circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub position: Point,
    /// Base radius, fixed for the whole diagram
    pub radius: f32,
}

/// Derived drawing geometry of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeVisual {
    Straight(StraightEdgeVisual),
    Loop(LoopEdgeVisual),
}

/// Arrow between two distinct states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StraightEdgeVisual {
    pub segment: Segment,
    /// Whether the arrow is shifted sideways because the opposite edge exists
    pub offset: bool,
}

/// Self-loop drawn as an arc plus arrow tip, anchored at the state's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopEdgeVisual {
    pub center: Point,
    /// Rotation of the whole loop group, in degrees
    pub rotation: f32,
}

// ============================================================================
// SELF-LOOP SHAPE
// ============================================================================

/// Horizontal gap between the node outline and the loop arc center, before rotation.
const LOOP_SIDE_GAP: f32 = 5.0;
/// Vertical drop of the loop arc center below the node outline, before rotation.
const LOOP_DROP: f32 = 10.0;
const LOOP_ARC_START: f32 = 10.0;
pub const LOOP_ARC_SWEEP: f32 = 260.0;

/// Absolute shape of a self-loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopGeometry {
    pub arc_center: Point,
    pub arc_radius: f32,
    /// Start of the arc in degrees, clockwise from `+x`
    pub start_angle: f32,
    pub sweep: f32,
    /// Short arrow carrying the arrowhead at the end of the arc
    pub tip: Segment,
}

impl LoopEdgeVisual {
    pub fn new(center: Point) -> Self {
        Self {
            center,
            rotation: 0.0,
        }
    }

    pub fn geometry(&self, node_radius: f32, loop_radius: f32) -> LoopGeometry {
        let arc_local = Point::new(-(node_radius + LOOP_SIDE_GAP), node_radius + LOOP_DROP);
        let tip_start = arc_local + Point::new(loop_radius, 5.0);
        let tip_end = arc_local + Point::new(loop_radius + 2.0, -1.0);
        let place = |local: Point| self.center + rotate(local, self.rotation);
        LoopGeometry {
            arc_center: place(arc_local),
            arc_radius: loop_radius,
            start_angle: LOOP_ARC_START + self.rotation,
            sweep: LOOP_ARC_SWEEP,
            tip: Segment::new(place(tip_start), place(tip_end)),
        }
    }
}

/// Rotation that turns a self-loop of the state at `center` towards `pointer`.
pub fn self_loop_rotation(center: Point, pointer: Point) -> Option<f32> {
    let theta = angle_degrees(center, pointer)? + 45.0;
    Some(theta.rem_euclid(360.0))
}

// ============================================================================
// EDGES, LABELS AND MARKERS
// ============================================================================

/// A transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub visual: EdgeVisual,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelOwner {
    Node(NodeId),
    Edge(EdgeId),
}

/// A text label attached to a state or a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub owner: LabelOwner,
    pub text: String,
    /// Measured size of the rendered text
    pub size: Size,
    pub top_left: Point,
    pub anchor: LabelAnchor,
}

impl Label {
    pub fn center(&self) -> Point {
        self.top_left + self.size.half()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.top_left.x
            && point.y >= self.top_left.y
            && point.x <= self.top_left.x + self.size.width
            && point.y <= self.top_left.y + self.size.height
    }
}

/// Arrow pointing into an initial state; rotation in degrees, `0` comes from the left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InitialMarker {
    pub rotation: f32,
}

/// Inner ring of a final state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalMarker {
    pub radius: f32,
}

/// Outcome of [`Graph::add_edge`]. A duplicate ordered pair is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsertion {
    Inserted(EdgeId),
    Rejected { existing: EdgeId },
}

impl EdgeInsertion {
    pub fn inserted(self) -> Option<EdgeId> {
        match self {
            EdgeInsertion::Inserted(id) => Some(id),
            EdgeInsertion::Rejected { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Metrics {
    node_radius: f32,
    arrow_margin: f32,
    lateral_offset: f32,
    final_ring_radius: f32,
}

// ============================================================================
// GRAPH
// ============================================================================

/// The diagram: owns every state, transition, label and marker and keeps the
/// adjacency indices consistent with them.
///
/// Derived geometry is only refreshed on request ([`Graph::refresh_edge`],
/// [`Graph::refresh_edge_pair`]); moving a node does not touch its edges.
#[derive(Debug, Clone)]
pub struct Graph {
    metrics: Metrics,
    nodes: BTreeMap<NodeId, Node>,
    edges: BTreeMap<EdgeId, Edge>,
    labels: BTreeMap<LabelId, Label>,
    /// state -> states it points to
    directed_out: HashMap<NodeId, Vec<NodeId>>,
    /// state -> states pointing to it
    directed_in: HashMap<NodeId, Vec<NodeId>>,
    edge_lookup: HashMap<(NodeId, NodeId), EdgeId>,
    node_labels: HashMap<NodeId, LabelId>,
    edge_labels: HashMap<EdgeId, LabelId>,
    initial_markers: HashMap<NodeId, InitialMarker>,
    final_markers: HashMap<NodeId, FinalMarker>,
    next_node: u64,
    next_edge: u64,
    next_label: u64,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl Graph {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            metrics: Metrics {
                node_radius: config.node_radius,
                arrow_margin: config.arrow_margin,
                lateral_offset: config.lateral_offset(),
                final_ring_radius: config.final_ring_radius(),
            },
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            labels: BTreeMap::new(),
            directed_out: HashMap::new(),
            directed_in: HashMap::new(),
            edge_lookup: HashMap::new(),
            node_labels: HashMap::new(),
            edge_labels: HashMap::new(),
            initial_markers: HashMap::new(),
            final_markers: HashMap::new(),
            next_node: 0,
            next_edge: 0,
            next_label: 0,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edge_between(&self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        self.edge_lookup.get(&(source, target)).copied()
    }

    /// States `id` has an outgoing edge to, in insertion order.
    pub fn outgoing(&self, id: NodeId) -> &[NodeId] {
        self.directed_out.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// States with an edge into `id`, in insertion order.
    pub fn incoming(&self, id: NodeId) -> &[NodeId] {
        self.directed_in.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every edge touching `id`, outgoing first; a self-loop is listed once.
    pub fn incident_edges(&self, id: NodeId) -> Vec<EdgeId> {
        let mut out: Vec<EdgeId> = self
            .outgoing(id)
            .iter()
            .filter_map(|&t| self.edge_between(id, t))
            .collect();
        out.extend(
            self.incoming(id)
                .iter()
                .filter(|&&s| s != id)
                .filter_map(|&s| self.edge_between(s, id)),
        );
        out
    }

    /// Whether `target -> source` exists for two distinct states.
    pub fn has_reverse_edge(&self, source: NodeId, target: NodeId) -> bool {
        source != target && self.edge_lookup.contains_key(&(target, source))
    }

    pub fn node_label_id(&self, id: NodeId) -> Option<LabelId> {
        self.node_labels.get(&id).copied()
    }

    pub fn edge_label_id(&self, id: EdgeId) -> Option<LabelId> {
        self.edge_labels.get(&id).copied()
    }

    pub fn node_label(&self, id: NodeId) -> Option<&Label> {
        self.node_label_id(id).and_then(|l| self.labels.get(&l))
    }

    pub fn edge_label(&self, id: EdgeId) -> Option<&Label> {
        self.edge_label_id(id).and_then(|l| self.labels.get(&l))
    }

    pub fn initial_marker(&self, id: NodeId) -> Option<&InitialMarker> {
        self.initial_markers.get(&id)
    }

    pub fn final_marker(&self, id: NodeId) -> Option<&FinalMarker> {
        self.final_markers.get(&id)
    }

    pub fn is_initial(&self, id: NodeId) -> bool {
        self.initial_markers.contains_key(&id)
    }

    pub fn is_final(&self, id: NodeId) -> bool {
        self.final_markers.contains_key(&id)
    }

    pub fn node_radius(&self) -> f32 {
        self.metrics.node_radius
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, position: Point) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                position,
                radius: self.metrics.node_radius,
            },
        );
        self.directed_out.insert(id, Vec::new());
        self.directed_in.insert(id, Vec::new());
        log::debug!("added state {id} at ({}, {})", position.x, position.y);
        id
    }

    /// Remove a state together with every edge touching it, its markers and its label.
    ///
    /// Adjacency entries whose edge record is already gone are skipped.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }

        let in_nodes = self.directed_in.remove(&id).unwrap_or_default();
        for other in in_nodes {
            if let Some(out) = self.directed_out.get_mut(&other) {
                remove_first(out, id);
            }
            if let Some(edge_id) = self.edge_lookup.remove(&(other, id)) {
                self.drop_edge_record(edge_id);
            }
        }

        let out_nodes = self.directed_out.remove(&id).unwrap_or_default();
        for other in out_nodes {
            if let Some(incoming) = self.directed_in.get_mut(&other) {
                remove_first(incoming, id);
            }
            if let Some(edge_id) = self.edge_lookup.remove(&(id, other)) {
                self.drop_edge_record(edge_id);
            }
        }

        self.initial_markers.remove(&id);
        self.final_markers.remove(&id);
        if let Some(label_id) = self.node_labels.remove(&id) {
            self.labels.remove(&label_id);
        }
        self.nodes.remove(&id);
        log::debug!("removed state {id}");
        Ok(())
    }

    /// Update a state's position. Edge and label geometry is left to the caller.
    pub fn move_node(&mut self, id: NodeId, position: Point) -> GraphResult<()> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))?;
        node.position = position;
        Ok(())
    }

    /// Mark or unmark a state as initial. Marking an already initial state is a no-op.
    pub fn set_initial(&mut self, id: NodeId, initial: bool) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        if initial {
            self.initial_markers.entry(id).or_default();
        } else {
            self.initial_markers.remove(&id);
        }
        Ok(())
    }

    /// Rotate the initial arrow of a state that is already initial.
    pub fn set_initial_rotation(&mut self, id: NodeId, rotation: f32) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        let marker = self
            .initial_markers
            .get_mut(&id)
            .ok_or(GraphError::NotInitial(id))?;
        marker.rotation = rotation;
        Ok(())
    }

    /// Mark or unmark a state as final. Marking an already final state is a no-op.
    pub fn set_final(&mut self, id: NodeId, is_final: bool) -> GraphResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        if is_final {
            let radius = self.metrics.final_ring_radius;
            self.final_markers.entry(id).or_insert(FinalMarker { radius });
        } else {
            self.final_markers.remove(&id);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Insert `source -> target`, labelled with `text` or epsilon.
    ///
    /// An existing edge for the same ordered pair rejects the insertion
    /// without touching the graph.
    pub fn add_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        text: Option<String>,
    ) -> GraphResult<EdgeInsertion> {
        if !self.nodes.contains_key(&source) {
            return Err(GraphError::NodeNotFound(source));
        }
        if !self.nodes.contains_key(&target) {
            return Err(GraphError::NodeNotFound(target));
        }
        if let Some(existing) = self.edge_between(source, target) {
            log::debug!("rejected duplicate transition {source} -> {target}");
            return Ok(EdgeInsertion::Rejected { existing });
        }

        let id = EdgeId(self.next_edge);
        self.next_edge += 1;

        self.directed_out.entry(source).or_default().push(target);
        self.directed_in.entry(target).or_default().push(source);
        self.edge_lookup.insert((source, target), id);

        let visual = self.compute_visual(source, target).unwrap_or_else(|| {
            EdgeVisual::Straight(StraightEdgeVisual {
                segment: Segment::default(),
                offset: false,
            })
        });
        self.edges.insert(
            id,
            Edge {
                id,
                source,
                target,
                visual,
            },
        );

        let text = text.filter(|t| !t.is_empty()).unwrap_or_else(|| EPSILON.to_string());
        let label_id = self.insert_label(LabelOwner::Edge(id), text);
        self.edge_labels.insert(id, label_id);

        log::debug!("added transition {id}: {source} -> {target}");
        Ok(EdgeInsertion::Inserted(id))
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.edges.get(&id).ok_or(GraphError::EdgeNotFound(id))?;
        let (source, target) = (edge.source, edge.target);

        if let Some(out) = self.directed_out.get_mut(&source) {
            remove_first(out, target);
        }
        if let Some(incoming) = self.directed_in.get_mut(&target) {
            remove_first(incoming, source);
        }
        self.edge_lookup.remove(&(source, target));
        self.drop_edge_record(id);
        log::debug!("removed transition {id}: {source} -> {target}");
        Ok(())
    }

    /// Drop an edge record and its label; adjacency is handled by the caller.
    fn drop_edge_record(&mut self, id: EdgeId) {
        self.edges.remove(&id);
        if let Some(label_id) = self.edge_labels.remove(&id) {
            self.labels.remove(&label_id);
        }
    }

    /// Arrow between two distinct states, trimmed to their outlines and shifted
    /// sideways when the opposite edge exists.
    ///
    /// Returns `None` for coincident centers.
    pub fn straight_segment(&self, source: NodeId, target: NodeId) -> Option<Segment> {
        let a = self.nodes.get(&source)?;
        let b = self.nodes.get(&target)?;
        let segment = trimmed_segment_with_margin(
            a.position,
            a.radius,
            b.position,
            b.radius,
            self.metrics.arrow_margin,
        )?;
        if self.has_reverse_edge(source, target) {
            let normal = perpendicular_unit_vector(b.position - a.position)?;
            Some(segment.translate(normal * self.metrics.lateral_offset))
        } else {
            Some(segment)
        }
    }

    fn compute_visual(&self, source: NodeId, target: NodeId) -> Option<EdgeVisual> {
        if source == target {
            let node = self.nodes.get(&source)?;
            return Some(EdgeVisual::Loop(LoopEdgeVisual::new(node.position)));
        }
        let segment = self.straight_segment(source, target)?;
        Some(EdgeVisual::Straight(StraightEdgeVisual {
            segment,
            offset: self.has_reverse_edge(source, target),
        }))
    }

    /// Recompute the geometry of one edge from its endpoints.
    ///
    /// Self-loops follow their node and keep their rotation. When the geometry
    /// is degenerate the previous value is kept.
    pub fn refresh_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.edges.get(&id).ok_or(GraphError::EdgeNotFound(id))?;
        let (source, target) = (edge.source, edge.target);
        let visual = match edge.visual {
            EdgeVisual::Loop(mut loop_visual) => {
                let node = self
                    .nodes
                    .get(&source)
                    .ok_or(GraphError::NodeNotFound(source))?;
                loop_visual.center = node.position;
                Some(EdgeVisual::Loop(loop_visual))
            }
            EdgeVisual::Straight(_) => self.compute_visual(source, target),
        };
        match visual {
            Some(visual) => {
                if let Some(edge) = self.edges.get_mut(&id) {
                    edge.visual = visual;
                }
            }
            None => log::trace!("kept geometry of {id}: coincident endpoints"),
        }
        Ok(())
    }

    /// Refresh an edge and, if present, the opposite edge of the same pair.
    ///
    /// Returns the ids that were refreshed.
    pub fn refresh_edge_pair(&mut self, id: EdgeId) -> GraphResult<Vec<EdgeId>> {
        self.refresh_edge(id)?;
        let mut refreshed = vec![id];
        if let Some(edge) = self.edges.get(&id) {
            if !edge.is_self_loop() {
                if let Some(reverse) = self.edge_between(edge.target, edge.source) {
                    self.refresh_edge(reverse)?;
                    refreshed.push(reverse);
                }
            }
        }
        Ok(refreshed)
    }

    pub fn set_loop_rotation(&mut self, id: EdgeId, rotation: f32) -> GraphResult<()> {
        let edge = self.edges.get_mut(&id).ok_or(GraphError::EdgeNotFound(id))?;
        if let EdgeVisual::Loop(loop_visual) = &mut edge.visual {
            loop_visual.rotation = rotation;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------

    fn insert_label(&mut self, owner: LabelOwner, text: String) -> LabelId {
        let id = LabelId(self.next_label);
        self.next_label += 1;
        self.labels.insert(
            id,
            Label {
                id,
                owner,
                text,
                size: Size::default(),
                top_left: Point::ZERO,
                anchor: LabelAnchor::default(),
            },
        );
        id
    }

    /// Set the text of a state's label, creating the label if needed.
    pub fn set_node_label(&mut self, id: NodeId, text: impl Into<String>) -> GraphResult<LabelId> {
        if !self.nodes.contains_key(&id) {
            return Err(GraphError::NodeNotFound(id));
        }
        let text = text.into();
        if let Some(label) = self.node_label_id(id).and_then(|l| self.labels.get_mut(&l)) {
            label.text = text;
            return Ok(label.id);
        }
        let label_id = self.insert_label(LabelOwner::Node(id), text);
        self.node_labels.insert(id, label_id);
        Ok(label_id)
    }

    /// Set the text of a transition's label, creating the label if needed.
    pub fn set_edge_label(&mut self, id: EdgeId, text: impl Into<String>) -> GraphResult<LabelId> {
        if !self.edges.contains_key(&id) {
            return Err(GraphError::EdgeNotFound(id));
        }
        let text = text.into();
        if let Some(label) = self.edge_label_id(id).and_then(|l| self.labels.get_mut(&l)) {
            label.text = text;
            return Ok(label.id);
        }
        let label_id = self.insert_label(LabelOwner::Edge(id), text);
        self.edge_labels.insert(id, label_id);
        Ok(label_id)
    }

    /// Remove a label; its owner stays in the graph without one.
    pub fn remove_label(&mut self, id: LabelId) -> GraphResult<()> {
        let label = self.labels.remove(&id).ok_or(GraphError::LabelNotFound(id))?;
        match label.owner {
            LabelOwner::Node(node) => {
                self.node_labels.remove(&node);
            }
            LabelOwner::Edge(edge) => {
                self.edge_labels.remove(&edge);
            }
        }
        Ok(())
    }

    pub fn label_mut(&mut self, id: LabelId) -> GraphResult<&mut Label> {
        self.labels.get_mut(&id).ok_or(GraphError::LabelNotFound(id))
    }

    // ------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------

    /// Verify that adjacency lists, the edge lookup and the label index agree
    /// with the entity records.
    pub fn check_consistency(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        for edge in self.edges.values() {
            for endpoint in [edge.source, edge.target] {
                if !self.nodes.contains_key(&endpoint) {
                    errors.push(format!("{} references missing state {}", edge.id, endpoint));
                }
            }
            if self.edge_between(edge.source, edge.target) != Some(edge.id) {
                errors.push(format!("{} missing from lookup", edge.id));
            }
            if !self.outgoing(edge.source).contains(&edge.target) {
                errors.push(format!("{} missing from forward adjacency", edge.id));
            }
            if !self.incoming(edge.target).contains(&edge.source) {
                errors.push(format!("{} missing from reverse adjacency", edge.id));
            }
        }

        for (&(source, target), edge_id) in &self.edge_lookup {
            match self.edges.get(edge_id) {
                Some(edge) if edge.source == source && edge.target == target => {}
                _ => errors.push(format!("stale lookup entry {source} -> {target}")),
            }
        }

        for (&node, targets) in &self.directed_out {
            if !self.nodes.contains_key(&node) {
                errors.push(format!("forward adjacency for missing state {node}"));
            }
            for &target in targets {
                if self.edge_between(node, target).is_none() {
                    errors.push(format!("forward adjacency {node} -> {target} has no edge"));
                }
            }
        }

        for (&node, sources) in &self.directed_in {
            if !self.nodes.contains_key(&node) {
                errors.push(format!("reverse adjacency for missing state {node}"));
            }
            for &source in sources {
                if self.edge_between(source, node).is_none() {
                    errors.push(format!("reverse adjacency {source} -> {node} has no edge"));
                }
            }
        }

        for label in self.labels.values() {
            let indexed = match label.owner {
                LabelOwner::Node(node) => self.node_label_id(node),
                LabelOwner::Edge(edge) => self.edge_label_id(edge),
            };
            if indexed != Some(label.id) {
                errors.push(format!("{} not indexed by its owner", label.id));
            }
        }

        for node in self.initial_markers.keys().chain(self.final_markers.keys()) {
            if !self.nodes.contains_key(node) {
                errors.push(format!("marker on missing state {node}"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn remove_first(list: &mut Vec<NodeId>, id: NodeId) {
    if let Some(index) = list.iter().position(|&n| n == id) {
        list.remove(index);
    }
}
