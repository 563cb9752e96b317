//! Scenario tests for the interaction state machine

use crate::automaton::AutomatonDefinition;
use crate::config::EditorConfig;
use crate::editor::{
    initial_arrow, DetailDisplay, Editor, MarkerPreview, Mode, PointerEvent, PointerKind,
    Selection, SelectionDetail, TextInputs,
};
use crate::geometry::{distance, Point};
use crate::graph::{EdgeVisual, NodeId};
use crate::label::EPSILON;
use crate::view::{DisplayList, PickTarget, Primitive, Tone, ViewAdapter};

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

/// Host double recording every call the editor makes.
#[derive(Default)]
struct RecordingHost {
    state_input: String,
    transition_input: String,
    redraws: usize,
    scene: DisplayList,
    selections: Vec<SelectionDetail>,
    diagrams: Vec<AutomatonDefinition>,
}

impl ViewAdapter for RecordingHost {
    fn redraw(&mut self, scene: &DisplayList) {
        self.redraws += 1;
        self.scene = scene.clone();
    }
}

impl TextInputs for RecordingHost {
    fn state_label(&self) -> String {
        self.state_input.clone()
    }

    fn transition_label(&self) -> String {
        self.transition_input.clone()
    }
}

impl DetailDisplay for RecordingHost {
    fn show_selection(&mut self, detail: &SelectionDetail) {
        self.selections.push(detail.clone());
    }

    fn show_diagram(&mut self, summary: &AutomatonDefinition) {
        self.diagrams.push(summary.clone());
    }
}

fn send(editor: &mut Editor, host: &mut RecordingHost, kind: PointerKind, target: PickTarget, at: Point) {
    editor.handle(PointerEvent::new(kind, target, at), host);
}

fn add_state(editor: &mut Editor, host: &mut RecordingHost, x: f32, y: f32) -> NodeId {
    editor.set_mode(Mode::InsertState, host);
    send(editor, host, PointerKind::Click, PickTarget::Canvas, Point::new(x, y));
    editor.graph().nodes().last().unwrap().id
}

fn position(editor: &Editor, id: NodeId) -> Point {
    editor.graph().node(id).unwrap().position
}

/// Draw a transition the way a user does: pick the source, hover the target, click it.
fn connect(editor: &mut Editor, host: &mut RecordingHost, source: NodeId, target: NodeId) {
    editor.set_mode(Mode::InsertTransitionFrom, host);
    let from = position(editor, source);
    send(editor, host, PointerKind::Click, PickTarget::Node(source), from);
    let to = position(editor, target);
    send(editor, host, PointerKind::Move, PickTarget::Node(target), to);
    send(editor, host, PointerKind::Click, PickTarget::Node(target), to);
}

#[test]
fn test_insert_state_with_default_and_custom_labels() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();

    let a = add_state(&mut editor, &mut host, 100.0, 100.0);
    host.state_input = "start".to_string();
    let b = add_state(&mut editor, &mut host, 300.0, 100.0);

    assert_eq!(editor.graph().node_count(), 2);
    assert_eq!(editor.graph().node_label(a).unwrap().text, "q0");
    assert_eq!(editor.graph().node_label(b).unwrap().text, "start");

    let label = editor.graph().node_label(a).unwrap();
    assert!(label.size.width > 0.0);
    assert!(approx_eq(label.center().x, 100.0));
    assert!(approx_eq(label.center().y, 100.0));
}

#[test]
fn test_click_on_state_in_insert_mode_adds_nothing() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert_eq!(editor.graph().node_count(), 1);
}

#[test]
fn test_every_event_redraws_once() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    editor.set_mode(Mode::InsertState, &mut host);
    assert_eq!(host.redraws, 1);

    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Canvas, Point::ZERO);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Canvas, Point::ZERO);
    editor.set_mode(Mode::Remove, &mut host);
    assert_eq!(host.redraws, 4);

    // Stale ids are ignored but still produce a frame
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(NodeId(99)), Point::ZERO);
    assert_eq!(host.redraws, 5);
    assert_eq!(editor.graph().node_count(), 1);

    // Setting the current mode again is not a change
    editor.set_mode(Mode::Remove, &mut host);
    assert_eq!(host.redraws, 5);
}

#[test]
fn test_self_loop_scenario() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert_eq!(editor.mode(), Mode::InsertTransitionTo);
    let pending = editor.session().pending.unwrap();
    assert_eq!(pending.source, a);
    assert!(pending.self_hover);

    // The loop preview turns towards the pointer while over the source
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::new(10.0, 0.0));
    let pending = editor.session().pending.unwrap();
    assert!(pending.self_hover);
    assert!(approx_eq(pending.self_loop.rotation, 225.0));
    assert!(host.scene.visuals[0].tone == Tone::Preview);

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::new(10.0, 0.0));
    assert_eq!(editor.graph().edge_count(), 1);
    let edge = editor.graph().edges().next().unwrap();
    assert_eq!(edge.source, a);
    assert_eq!(edge.target, a);
    match edge.visual {
        EdgeVisual::Loop(visual) => assert!(approx_eq(visual.rotation, 225.0)),
        EdgeVisual::Straight(_) => panic!("expected a self-loop"),
    }
    assert_eq!(editor.graph().edge_label(edge.id).unwrap().text, EPSILON);
    assert_eq!(editor.mode(), Mode::InsertTransitionFrom);
    assert!(editor.session().pending.is_none());
}

#[test]
fn test_click_on_target_without_hover_commits_to_it() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(b), Point::new(300.0, 0.0));

    let edges: Vec<_> = editor.graph().edges().map(|e| (e.source, e.target)).collect();
    assert_eq!(edges, vec![(a, b)]);
    assert!(matches!(
        editor.graph().edges().next().unwrap().visual,
        EdgeVisual::Straight(_)
    ));
    assert_eq!(editor.mode(), Mode::InsertTransitionFrom);
}

#[test]
fn test_source_rim_shows_and_commits_self_loop() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);

    // Past the hover radius but still picked as the source
    let rim = Point::new(47.0, 0.0);
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), rim);
    let pending = editor.session().pending.unwrap();
    assert!(pending.self_hover);
    assert_eq!(pending.target_hover, None);
    assert!(approx_eq(pending.self_loop.rotation, 225.0));

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), rim);
    let edge = editor.graph().edges().next().unwrap();
    assert_eq!((edge.source, edge.target), (a, a));
    match edge.visual {
        EdgeVisual::Loop(visual) => assert!(approx_eq(visual.rotation, 225.0)),
        EdgeVisual::Straight(_) => panic!("expected a self-loop"),
    }
}

#[test]
fn test_pending_arrow_snaps_and_follows_pointer() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 200.0, 0.0);

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);

    // Free end: trimmed on the source side only
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Canvas, Point::new(0.0, 150.0));
    let arrow = editor.session().pending.unwrap().arrow.unwrap();
    assert!(approx_eq(arrow.start.y, 50.0));
    assert!(approx_eq(arrow.end.y, 140.0));

    // Snapped to the hovered state, which is drawn enlarged
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(b), Point::new(200.0, 0.0));
    let pending = editor.session().pending.unwrap();
    assert_eq!(pending.target_hover, Some(b));
    assert!(!pending.self_hover);
    let arrow = pending.arrow.unwrap();
    assert!(approx_eq(arrow.start.x, 50.0));
    assert!(approx_eq(arrow.end.x, 145.0));
    assert_eq!(host.scene.visuals.last().unwrap().tone, Tone::Preview);

    // Pressing restores the base radius
    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Node(b), Point::new(200.0, 0.0));
    let arrow = editor.session().pending.unwrap().arrow.unwrap();
    assert!(approx_eq(arrow.end.x, 150.0));
}

#[test]
fn test_transition_label_substitution() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);

    host.transition_input = "a->b, \\e".to_string();
    connect(&mut editor, &mut host, a, b);

    let edge = editor.graph().edge_between(a, b).unwrap();
    let label = editor.graph().edge_label(edge).unwrap();
    assert_eq!(label.text, "a\u{2192}b, \u{03B5}");
    // Laid out above the rightward arrow
    assert!(label.top_left.y + label.size.height < 0.0);
}

#[test]
fn test_duplicate_transition_is_discarded() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);

    connect(&mut editor, &mut host, a, b);
    connect(&mut editor, &mut host, a, b);

    assert_eq!(editor.graph().edge_count(), 1);
    assert_eq!(editor.mode(), Mode::InsertTransitionFrom);
    assert!(editor.session().pending.is_none());
    assert!(host.scene.visuals.iter().all(|v| v.tone != Tone::Preview));
}

#[test]
fn test_opposite_transitions_are_offset() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);

    connect(&mut editor, &mut host, a, b);
    connect(&mut editor, &mut host, b, a);

    for edge in editor.graph().edges() {
        match edge.visual {
            EdgeVisual::Straight(straight) => {
                assert!(straight.offset);
                assert!(approx_eq(straight.segment.midpoint().y.abs(), 8.0));
            }
            EdgeVisual::Loop(_) => panic!("expected straight arrows"),
        }
    }

    // Removing one of them straightens the other
    editor.set_mode(Mode::Remove, &mut host);
    let ab = editor.graph().edge_between(a, b).unwrap();
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Edge(ab), Point::new(150.0, 8.0));
    let ba = editor.graph().edge_between(b, a).unwrap();
    match editor.graph().edge(ba).unwrap().visual {
        EdgeVisual::Straight(straight) => {
            assert!(!straight.offset);
            assert!(approx_eq(straight.segment.midpoint().y, 0.0));
        }
        EdgeVisual::Loop(_) => panic!("expected a straight arrow"),
    }
}

#[test]
fn test_remove_state_scenario() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);
    let c = add_state(&mut editor, &mut host, 0.0, 300.0);
    connect(&mut editor, &mut host, a, b);
    connect(&mut editor, &mut host, c, a);
    connect(&mut editor, &mut host, a, a);

    editor.set_mode(Mode::Remove, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);

    let graph = editor.graph();
    assert!(graph.node(a).is_none());
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.incoming(b).is_empty());
    assert!(graph.outgoing(c).is_empty());
    assert_eq!(graph.labels().count(), 2);
    assert!(graph.check_consistency().is_ok());
    assert!(host
        .scene
        .visuals
        .iter()
        .all(|v| v.target != Some(PickTarget::Node(a))));
}

#[test]
fn test_remove_label_keeps_transition() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);
    connect(&mut editor, &mut host, a, b);
    let edge = editor.graph().edge_between(a, b).unwrap();
    let label = editor.graph().edge_label_id(edge).unwrap();

    editor.set_mode(Mode::Remove, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Label(label), Point::ZERO);

    assert!(editor.graph().edge(edge).is_some());
    assert!(editor.graph().edge_label(edge).is_none());
}

#[test]
fn test_mark_initial_toggles() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);

    editor.set_mode(Mode::MarkInitial, &mut host);
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::new(-30.0, 0.0));
    assert_eq!(
        editor.session().marker_preview,
        Some(MarkerPreview::Initial { node: a, rotation: 0.0 })
    );

    // Quantized to 15 degree sectors while following the pointer
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::new(1.0, 30.0));
    match editor.session().marker_preview {
        Some(MarkerPreview::Initial { rotation, .. }) => assert!(approx_eq(rotation, 270.0)),
        other => panic!("unexpected preview {:?}", other),
    }

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::new(1.0, 30.0));
    assert!(editor.graph().is_initial(a));
    assert!(approx_eq(editor.graph().initial_marker(a).unwrap().rotation, 270.0));
    assert!(editor.session().marker_preview.is_none());

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::new(1.0, 30.0));
    assert!(!editor.graph().is_initial(a));
}

#[test]
fn test_initial_arrow_points_at_state() {
    let config = EditorConfig::default();
    let arrow = initial_arrow(Point::ZERO, 0.0, &config);
    assert!(approx_eq(arrow.start.x, -90.0));
    assert!(approx_eq(arrow.end.x, -50.0));

    let turned = initial_arrow(Point::new(10.0, 10.0), 270.0, &config);
    assert!(approx_eq(turned.end.x, 10.0));
    assert!(approx_eq(turned.end.y, 60.0));
    assert!(turned.start.y > turned.end.y);
}

#[test]
fn test_mark_final_toggles() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);

    editor.set_mode(Mode::MarkFinal, &mut host);
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::ZERO);
    assert_eq!(editor.session().marker_preview, Some(MarkerPreview::Final { node: a }));
    // Hovered nodes do not grow in the mark modes
    match &host.scene.visuals_for(PickTarget::Node(a)).next().unwrap().primitives[0] {
        Primitive::Circle { radius, .. } => assert!(approx_eq(*radius, 40.0)),
        other => panic!("unexpected primitive {:?}", other),
    }

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert!(editor.graph().is_final(a));
    let node_visual = host.scene.visuals_for(PickTarget::Node(a)).next().unwrap();
    assert_eq!(node_visual.primitives.len(), 2);

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert!(!editor.graph().is_final(a));

    // Leaving the state drops the preview
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Canvas, Point::new(200.0, 0.0));
    assert!(editor.session().marker_preview.is_none());
}

#[test]
fn test_mode_switch_tears_down_provisional_visuals() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Canvas, Point::new(100.0, 0.0));
    assert!(editor.session().ghost.is_some());

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    assert!(editor.session().ghost.is_none());
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert!(editor.session().pending.is_some());

    editor.set_mode(Mode::Select, &mut host);
    assert!(editor.session().pending.is_none());
    assert!(host.scene.visuals.iter().all(|v| v.tone != Tone::Preview));
    assert_eq!(editor.graph().edge_count(), 0);

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert_eq!(editor.session().selected, Some(Selection::Node(a)));
    let shown = host.diagrams.len();
    editor.set_mode(Mode::MarkInitial, &mut host);
    assert!(editor.session().selected.is_none());
    assert_eq!(host.diagrams.len(), shown + 1);

    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::new(-30.0, 0.0));
    assert!(editor.session().marker_preview.is_some());
    editor.set_mode(Mode::Remove, &mut host);
    assert!(editor.session().marker_preview.is_none());

    // There is nothing to finish, so the toolbar lands on picking a source
    editor.set_mode(Mode::InsertTransitionTo, &mut host);
    assert_eq!(editor.mode(), Mode::InsertTransitionFrom);
}

#[test]
fn test_ghost_node_lifecycle() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    editor.set_mode(Mode::InsertState, &mut host);

    send(&mut editor, &mut host, PointerKind::Enter, PickTarget::Canvas, Point::new(10.0, 10.0));
    assert!(editor.session().ghost.is_some());

    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Canvas, Point::new(10.0, 10.0));
    match &host.scene.visuals.last().unwrap().primitives[0] {
        Primitive::Circle { radius, .. } => assert!(approx_eq(*radius, 30.0)),
        other => panic!("unexpected primitive {:?}", other),
    }

    send(&mut editor, &mut host, PointerKind::Up, PickTarget::Canvas, Point::new(10.0, 10.0));
    match &host.scene.visuals.last().unwrap().primitives[0] {
        Primitive::Circle { radius, .. } => assert!(approx_eq(*radius, 40.0)),
        other => panic!("unexpected primitive {:?}", other),
    }

    send(&mut editor, &mut host, PointerKind::Leave, PickTarget::Canvas, Point::new(-5.0, 10.0));
    assert!(editor.session().ghost.is_none());
    assert!(host.scene.is_empty());
    // The ghost is never part of the graph
    assert_eq!(editor.graph().node_count(), 0);
}

#[test]
fn test_drag_round_trip_restores_geometry() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 100.0);
    connect(&mut editor, &mut host, a, b);
    connect(&mut editor, &mut host, b, a);
    connect(&mut editor, &mut host, a, a);
    editor.set_mode(Mode::MarkInitial, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::new(-60.0, 0.0));

    let edges_before: Vec<_> = editor.graph().edges().cloned().collect();
    let labels_before: Vec<_> = editor.graph().labels().cloned().collect();

    editor.set_mode(Mode::Select, &mut host);
    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Node(a), Point::ZERO);
    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Node(a), Point::new(50.0, 80.0));

    let moved = Point::new(50.0, 80.0);
    assert_eq!(position(&editor, a), moved);
    let ab = editor.graph().edge_between(a, b).unwrap();
    match editor.graph().edge(ab).unwrap().visual {
        EdgeVisual::Straight(straight) => {
            // Start sits on the moved outline plus margin, shifted sideways by the offset
            let d = distance(straight.segment.start, moved);
            assert!(approx_eq(d, (50.0f32 * 50.0 + 8.0 * 8.0).sqrt()));
        }
        EdgeVisual::Loop(_) => panic!("expected a straight arrow"),
    }
    let own_label = editor.graph().node_label(a).unwrap();
    assert!(approx_eq(own_label.center().x, 50.0));
    assert!(approx_eq(own_label.center().y, 80.0));
    let aa = editor.graph().edge_between(a, a).unwrap();
    match editor.graph().edge(aa).unwrap().visual {
        EdgeVisual::Loop(visual) => assert_eq!(visual.center, moved),
        EdgeVisual::Straight(_) => panic!("expected a self-loop"),
    }

    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Node(a), Point::ZERO);
    send(&mut editor, &mut host, PointerKind::Up, PickTarget::Node(a), Point::ZERO);

    let edges_after: Vec<_> = editor.graph().edges().cloned().collect();
    let labels_after: Vec<_> = editor.graph().labels().cloned().collect();
    assert_eq!(edges_before, edges_after);
    assert_eq!(labels_before, labels_after);
}

#[test]
fn test_drag_keeps_grab_offset() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 100.0, 100.0);
    editor.set_mode(Mode::Select, &mut host);

    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Node(a), Point::new(110.0, 90.0));
    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Node(a), Point::new(210.0, 90.0));
    assert_eq!(position(&editor, a), Point::new(200.0, 100.0));
}

#[test]
fn test_label_drag_sets_ratio() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);
    connect(&mut editor, &mut host, a, b);
    let edge = editor.graph().edge_between(a, b).unwrap();
    let label_id = editor.graph().edge_label_id(edge).unwrap();
    let before = editor.graph().label(label_id).unwrap().top_left;

    editor.set_mode(Mode::Select, &mut host);
    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Label(label_id), Point::new(225.0, -40.0));

    let label = editor.graph().label(label_id).unwrap();
    assert!(approx_eq(label.anchor.ratio, 0.375));
    assert!(approx_eq(label.top_left.x - before.x, 75.0));
    assert!(approx_eq(label.top_left.y, before.y));

    // The ratio survives moving an endpoint
    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Node(b), Point::new(300.0, 0.0));
    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Node(b), Point::new(500.0, 0.0));
    let label = editor.graph().label(label_id).unwrap();
    assert!(approx_eq(label.anchor.ratio, 0.375));
    assert!(approx_eq(label.top_left.x - before.x, 100.0 + 150.0));
}

#[test]
fn test_self_loop_drag_rotates() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    connect(&mut editor, &mut host, a, a);
    let edge = editor.graph().edge_between(a, a).unwrap();

    editor.set_mode(Mode::Select, &mut host);
    send(&mut editor, &mut host, PointerKind::Drag, PickTarget::Edge(edge), Point::new(10.0, 0.0));
    match editor.graph().edge(edge).unwrap().visual {
        EdgeVisual::Loop(visual) => {
            assert!(approx_eq(visual.rotation, 225.0));
            assert_eq!(visual.center, Point::ZERO);
        }
        EdgeVisual::Straight(_) => panic!("expected a self-loop"),
    }
}

#[test]
fn test_selection_feeds_detail_display() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);
    connect(&mut editor, &mut host, a, b);
    let edge = editor.graph().edge_between(a, b).unwrap();

    editor.set_mode(Mode::Select, &mut host);
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Node(a), Point::ZERO);
    assert_eq!(
        host.selections.last(),
        Some(&SelectionDetail::Node {
            id: a,
            label: Some("q0".to_string()),
            position: Point::ZERO,
            initial: false,
            accepting: false,
        })
    );
    // Selected states come to the front
    let last_node = host
        .scene
        .visuals
        .iter()
        .filter(|v| matches!(v.target, Some(PickTarget::Node(_))))
        .last()
        .unwrap();
    assert_eq!(last_node.target, Some(PickTarget::Node(a)));
    assert_eq!(last_node.tone, Tone::Selected);

    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Edge(edge), Point::new(150.0, 0.0));
    assert_eq!(
        host.selections.last(),
        Some(&SelectionDetail::Edge {
            id: edge,
            source: a,
            target: b,
            label: Some(EPSILON.to_string()),
        })
    );

    let shown = host.diagrams.len();
    send(&mut editor, &mut host, PointerKind::Click, PickTarget::Canvas, Point::new(500.0, 500.0));
    assert!(editor.session().selected.is_none());
    assert_eq!(host.diagrams.len(), shown + 1);
    assert_eq!(host.diagrams.last().unwrap().states.len(), 2);
}

#[test]
fn test_hover_feedback() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);
    connect(&mut editor, &mut host, a, b);
    let edge = editor.graph().edge_between(a, b).unwrap();
    editor.set_mode(Mode::Select, &mut host);

    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Node(a), Point::ZERO);
    assert!(approx_eq(editor.node_display_radius(a), 45.0));
    send(&mut editor, &mut host, PointerKind::Down, PickTarget::Node(a), Point::ZERO);
    assert!(approx_eq(editor.node_display_radius(a), 40.0));
    send(&mut editor, &mut host, PointerKind::Up, PickTarget::Node(a), Point::ZERO);
    assert!(approx_eq(editor.node_display_radius(a), 45.0));

    send(&mut editor, &mut host, PointerKind::Move, PickTarget::Edge(edge), Point::new(150.0, 0.0));
    let visual = host.scene.visuals_for(PickTarget::Edge(edge)).next().unwrap();
    assert_eq!(visual.tone, Tone::Highlighted);
    match visual.primitives[0] {
        Primitive::Arrow { stroke_width, .. } => assert!(approx_eq(stroke_width, 7.0)),
        ref other => panic!("unexpected primitive {:?}", other),
    }
}

#[test]
fn test_events_picked_from_the_scene() {
    let mut editor = Editor::default();
    let mut host = RecordingHost::default();
    let a = add_state(&mut editor, &mut host, 0.0, 0.0);
    let b = add_state(&mut editor, &mut host, 300.0, 0.0);

    // State labels do not shadow their state
    assert_eq!(host.scene.pick(Point::ZERO, 0.0), PickTarget::Node(a));

    editor.set_mode(Mode::InsertTransitionFrom, &mut host);
    for (kind, at) in [
        (PointerKind::Move, Point::ZERO),
        (PointerKind::Click, Point::ZERO),
        (PointerKind::Move, Point::new(150.0, 0.0)),
        (PointerKind::Move, Point::new(300.0, 0.0)),
        (PointerKind::Click, Point::new(300.0, 0.0)),
    ] {
        let target = host.scene.pick(at, 0.0);
        send(&mut editor, &mut host, kind, target, at);
    }
    assert!(editor.graph().edge_between(a, b).is_some());
}
