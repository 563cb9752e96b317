//! Display list construction: committed graph first, previews on top,
//! provisional loops and marker previews at the very bottom

use crate::config::EditorConfig;
use crate::geometry::{rotate, Point, Segment};
use crate::graph::{Edge, EdgeVisual, LabelOwner, LoopEdgeVisual, NodeId};
use crate::view::{DisplayList, PickTarget, Primitive, Tone};

use super::{Editor, MarkerPreview, Mode};

/// Arrow of an initial-state marker: it lies left of the state at rotation
/// `0` and points at its outline.
pub fn initial_arrow(center: Point, rotation: f32, config: &EditorConfig) -> Segment {
    let tip = -config.node_radius - config.node_stroke_width - 5.0;
    let tail = tip - config.initial_arrow_length;
    Segment::new(
        center + rotate(Point::new(tail, 0.0), rotation),
        center + rotate(Point::new(tip, 0.0), rotation),
    )
}

impl Editor {
    /// The current frame, back to front.
    pub fn display_list(&self) -> DisplayList {
        let mut scene = DisplayList::default();
        self.push_background_previews(&mut scene);
        self.push_initial_markers(&mut scene);
        for edge in self.graph.edges() {
            self.push_edge(&mut scene, edge);
        }
        for id in self.node_order() {
            self.push_node(&mut scene, id);
        }
        self.push_labels(&mut scene);
        self.push_foreground_previews(&mut scene);
        scene
    }

    /// Node ids in drawing order, raised nodes last.
    fn node_order(&self) -> Vec<NodeId> {
        let raised = self.session.raised();
        let mut order: Vec<NodeId> = self
            .graph
            .nodes()
            .map(|n| n.id)
            .filter(|id| !raised.contains(id))
            .collect();
        order.extend(raised.iter().filter(|&&id| self.graph.node(id).is_some()));
        order
    }

    fn loop_primitives(&self, visual: &LoopEdgeVisual, stroke_width: f32) -> Vec<Primitive> {
        let geometry = visual.geometry(self.graph.node_radius(), self.config.loop_radius());
        vec![
            Primitive::Arc {
                center: geometry.arc_center,
                radius: geometry.arc_radius,
                start_angle: geometry.start_angle,
                sweep: geometry.sweep,
                stroke_width,
            },
            Primitive::Arrow {
                segment: geometry.tip,
                stroke_width,
                head_size: self.config.arrowhead_size,
            },
        ]
    }

    fn push_background_previews(&self, scene: &mut DisplayList) {
        if let Some(pending) = self.session.pending.filter(|p| p.self_hover) {
            let primitives = self.loop_primitives(&pending.self_loop, self.config.edge_stroke_width);
            scene.push(None, Tone::Preview, primitives);
        }

        let Some(preview) = self.session.marker_preview else {
            return;
        };
        let Some(node) = self.graph.node(preview.node()) else {
            return;
        };
        let primitive = match preview {
            MarkerPreview::Initial { rotation, .. } => Primitive::Arrow {
                segment: initial_arrow(node.position, rotation, &self.config),
                stroke_width: self.config.edge_stroke_width,
                head_size: self.config.arrowhead_size,
            },
            MarkerPreview::Final { .. } => Primitive::Circle {
                center: node.position,
                radius: self.config.final_ring_radius(),
                stroke_width: self.config.node_stroke_width,
            },
        };
        scene.push(None, Tone::Preview, vec![primitive]);
    }

    fn push_initial_markers(&self, scene: &mut DisplayList) {
        for node in self.graph.nodes() {
            if let Some(marker) = self.graph.initial_marker(node.id) {
                scene.push(
                    None,
                    Tone::Normal,
                    vec![Primitive::Arrow {
                        segment: initial_arrow(node.position, marker.rotation, &self.config),
                        stroke_width: self.config.edge_stroke_width,
                        head_size: self.config.arrowhead_size,
                    }],
                );
            }
        }
    }

    fn edge_tone(&self, edge: &Edge) -> Tone {
        let target = PickTarget::Edge(edge.id);
        if self.session.is_selected(target) {
            return Tone::Selected;
        }
        let highlights = match self.session.mode {
            Mode::Select | Mode::Remove => true,
            Mode::InsertTransitionFrom => edge.is_self_loop(),
            _ => false,
        };
        if highlights && self.session.hovered == Some(target) {
            Tone::Highlighted
        } else {
            Tone::Normal
        }
    }

    fn push_edge(&self, scene: &mut DisplayList, edge: &Edge) {
        let tone = self.edge_tone(edge);
        let stroke_width = match tone {
            Tone::Highlighted => self.config.edge_stroke_width + self.config.highlight_extra_width,
            _ => self.config.edge_stroke_width,
        };
        let primitives = match &edge.visual {
            EdgeVisual::Straight(straight) => vec![Primitive::Arrow {
                segment: straight.segment,
                stroke_width,
                head_size: self.config.arrowhead_size,
            }],
            EdgeVisual::Loop(visual) => self.loop_primitives(visual, stroke_width),
        };
        scene.push(Some(PickTarget::Edge(edge.id)), tone, primitives);
    }

    fn push_node(&self, scene: &mut DisplayList, id: NodeId) {
        let Some(node) = self.graph.node(id) else {
            return;
        };
        let target = PickTarget::Node(id);
        let mut primitives = vec![Primitive::Circle {
            center: node.position,
            radius: self.node_display_radius(id),
            stroke_width: self.config.node_stroke_width,
        }];
        if let Some(ring) = self.graph.final_marker(id) {
            primitives.push(Primitive::Circle {
                center: node.position,
                radius: ring.radius,
                stroke_width: self.config.node_stroke_width,
            });
        }
        let tone = if self.session.is_selected(target) {
            Tone::Selected
        } else {
            Tone::Normal
        };
        scene.push(Some(target), tone, primitives);
    }

    fn push_labels(&self, scene: &mut DisplayList) {
        for label in self.graph.labels() {
            let target = PickTarget::Label(label.id);
            // State labels sit on their state and let it receive the pointer
            let pick = match label.owner {
                LabelOwner::Node(_) => None,
                LabelOwner::Edge(_) => Some(target),
            };
            let tone = if self.session.is_selected(target) {
                Tone::Selected
            } else {
                Tone::Normal
            };
            scene.push(
                pick,
                tone,
                vec![Primitive::Text {
                    top_left: label.top_left,
                    size: label.size,
                    text: label.text.clone(),
                }],
            );
        }
    }

    fn push_foreground_previews(&self, scene: &mut DisplayList) {
        if let Some(pending) = self.session.pending.filter(|p| !p.self_hover) {
            if let Some(segment) = pending.arrow {
                scene.push(
                    None,
                    Tone::Preview,
                    vec![Primitive::Arrow {
                        segment,
                        stroke_width: self.config.edge_stroke_width,
                        head_size: self.config.arrowhead_size,
                    }],
                );
            }
        }

        if let Some(ghost) = self.session.ghost {
            let radius = if ghost.pressed {
                self.config.node_radius - self.config.press_shrink
            } else {
                self.config.node_radius
            };
            scene.push(
                None,
                Tone::Preview,
                vec![Primitive::Circle {
                    center: ghost.position,
                    radius,
                    stroke_width: self.config.node_stroke_width,
                }],
            );
        }
    }
}
