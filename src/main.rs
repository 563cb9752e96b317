//! Automata Canvas GUI
//! egui front end around the editor: mode toolbar, label inputs, detail panel
//! and the drawing surface that paints the display list and reports pointer events

use eframe::egui;

use automata_canvas::automaton::{AutomatonDefinition, MachineModel};
use automata_canvas::config::EditorConfig;
use automata_canvas::editor::{
    DetailDisplay, Editor, Mode, PointerEvent, PointerKind, SelectionDetail, TextInputs,
};
use automata_canvas::geometry::{Point, Size};
use automata_canvas::graph::NodeId;
use automata_canvas::view::{DisplayList, PickTarget, Primitive, Tone, ViewAdapter};

/// Extra pick radius around thin strokes, in points
const PICK_TOLERANCE: f32 = 3.0;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => EditorConfig::load(&path).unwrap_or_else(|err| {
            log::warn!("{path}: {err}; using default settings");
            EditorConfig::default()
        }),
        None => EditorConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title("Automata Canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "Automata Canvas",
        options,
        Box::new(|cc| Ok(Box::new(CanvasApp::new(cc, config)))),
    )
}

/// What the side panel currently shows
enum Detail {
    Selection(SelectionDetail),
    Diagram(AutomatonDefinition),
}

/// The editor's host: scene storage, text fields and detail panel state.
struct Surface {
    ctx: egui::Context,
    scene: DisplayList,
    state_input: String,
    transition_input: String,
    detail: Detail,
}

impl ViewAdapter for Surface {
    fn redraw(&mut self, scene: &DisplayList) {
        self.scene = scene.clone();
        self.ctx.request_repaint();
    }

    fn measure_text(&self, text: &str, font_size: f32) -> Size {
        let font_id = egui::FontId::proportional(font_size);
        let size = self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), font_id, egui::Color32::WHITE)
                .size()
        });
        Size::new(size.x, size.y)
    }
}

impl TextInputs for Surface {
    fn state_label(&self) -> String {
        self.state_input.clone()
    }

    fn transition_label(&self) -> String {
        self.transition_input.clone()
    }
}

impl DetailDisplay for Surface {
    fn show_selection(&mut self, detail: &SelectionDetail) {
        self.detail = Detail::Selection(detail.clone());
    }

    fn show_diagram(&mut self, summary: &AutomatonDefinition) {
        self.detail = Detail::Diagram(summary.clone());
    }
}

/// Pointer bookkeeping between frames
#[derive(Default)]
struct PointerTracker {
    inside: bool,
    last: Option<Point>,
    pressed_on: Option<PickTarget>,
}

struct CanvasApp {
    editor: Editor,
    surface: Surface,
    pointer: PointerTracker,
    machine: MachineModel,
}

impl CanvasApp {
    fn new(cc: &eframe::CreationContext<'_>, config: EditorConfig) -> Self {
        let editor = Editor::new(config);
        let surface = Surface {
            ctx: cc.egui_ctx.clone(),
            scene: editor.display_list(),
            state_input: String::new(),
            transition_input: String::new(),
            detail: Detail::Diagram(editor.summary()),
        };
        Self {
            editor,
            surface,
            pointer: PointerTracker::default(),
            machine: MachineModel::default(),
        }
    }

    fn send(&mut self, kind: PointerKind, target: PickTarget, position: Point) {
        self.editor
            .handle(PointerEvent::new(kind, target, position), &mut self.surface);
    }

    fn pick(&self, position: Point) -> PickTarget {
        self.surface.scene.pick(position, PICK_TOLERANCE)
    }

    /// Translate this frame's egui input on the canvas into editor events.
    fn feed_pointer(&mut self, ctx: &egui::Context, response: &egui::Response) {
        let origin = response.rect.min;
        let to_model = |p: egui::Pos2| Point::new(p.x - origin.x, p.y - origin.y);

        let Some(hover) = response.hover_pos().map(to_model) else {
            if self.pointer.inside && !response.dragged() {
                self.pointer.inside = false;
                self.pointer.last = None;
                self.send(PointerKind::Leave, PickTarget::Canvas, Point::ZERO);
            }
            return;
        };

        if !self.pointer.inside {
            self.pointer.inside = true;
            self.send(PointerKind::Enter, PickTarget::Canvas, hover);
        }

        let (pressed, released) =
            ctx.input(|i| (i.pointer.primary_pressed(), i.pointer.primary_released()));

        if pressed {
            let target = self.pick(hover);
            self.pointer.pressed_on = Some(target);
            self.send(PointerKind::Down, target, hover);
        }

        let moved = self.pointer.last != Some(hover);
        self.pointer.last = Some(hover);
        if moved {
            match self.pointer.pressed_on {
                Some(target) if response.dragged() => self.send(PointerKind::Drag, target, hover),
                _ => {
                    let target = self.pick(hover);
                    self.send(PointerKind::Move, target, hover);
                }
            }
        }

        if released {
            let target = self.pick(hover);
            self.send(PointerKind::Up, target, hover);
            if response.clicked() {
                self.send(PointerKind::Click, target, hover);
            }
            self.pointer.pressed_on = None;
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for mode in Mode::ALL {
                if ui
                    .selectable_label(self.editor.mode() == mode, mode.name())
                    .clicked()
                {
                    self.editor.set_mode(mode, &mut self.surface);
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("State label:");
            ui.add(
                egui::TextEdit::singleline(&mut self.surface.state_input)
                    .desired_width(120.0)
                    .hint_text(self.editor.config().state_label_prefix.as_str()),
            );
            ui.separator();
            ui.label("Transition label:");
            ui.add(
                egui::TextEdit::singleline(&mut self.surface.transition_input)
                    .desired_width(160.0)
                    .hint_text("0, 1, \\e"),
            );
        });
    }

    fn detail_panel(&mut self, ui: &mut egui::Ui) {
        match &self.surface.detail {
            Detail::Selection(detail) => selection_details(ui, detail),
            Detail::Diagram(summary) => {
                ui.heading("Automaton");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.machine, MachineModel::Nfa, "NFA");
                    ui.selectable_value(&mut self.machine, MachineModel::Dfa, "DFA");
                });
                diagram_details(ui, summary, self.machine);
            }
        }
    }
}

fn selection_details(ui: &mut egui::Ui, detail: &SelectionDetail) {
    match detail {
        SelectionDetail::Node {
            id,
            label,
            position,
            initial,
            accepting,
        } => {
            ui.heading(format!("State {}", label.as_deref().unwrap_or("")));
            ui.label(format!("id: {id}"));
            ui.label(format!("position: ({:.0}, {:.0})", position.x, position.y));
            ui.label(format!("initial: {initial}"));
            ui.label(format!("final: {accepting}"));
        }
        SelectionDetail::Edge {
            id,
            source,
            target,
            label,
        } => {
            ui.heading("Transition");
            ui.label(format!("id: {id}"));
            ui.label(format!("{source} \u{2192} {target}"));
            ui.label(format!("label: {}", label.as_deref().unwrap_or("(none)")));
        }
        SelectionDetail::Label { id, owner, text } => {
            ui.heading("Label");
            ui.label(format!("id: {id}"));
            ui.label(format!("owner: {owner:?}"));
            ui.label(format!("text: {text}"));
        }
    }
}

fn diagram_details(ui: &mut egui::Ui, summary: &AutomatonDefinition, model: MachineModel) {
    let names = |ids: &[NodeId]| {
        ids.iter()
            .map(|&id| summary.state_name(id).unwrap_or("?").to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };

    ui.label(format!(
        "Q = {{{}}}",
        summary
            .states
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    ui.label(format!("\u{03A3} = {{{}}}", summary.alphabet.join(", ")));
    ui.label(format!("initial = {{{}}}", names(&summary.initial)));
    ui.label(format!("F = {{{}}}", names(&summary.final_states)));

    ui.separator();
    egui::ScrollArea::vertical().show(ui, |ui| {
        for t in &summary.transitions {
            ui.label(format!(
                "\u{03B4}({}, {}) \u{2192} {}",
                summary.state_name(t.source).unwrap_or("?"),
                t.symbols.join(", "),
                summary.state_name(t.target).unwrap_or("?"),
            ));
        }
    });

    ui.separator();
    match summary.validate(model) {
        Ok(()) => {
            ui.colored_label(egui::Color32::from_rgb(120, 200, 140), "Valid");
        }
        Err(errors) => {
            for error in errors {
                ui.colored_label(egui::Color32::from_rgb(230, 150, 90), error);
            }
        }
    }
}

impl eframe::App for CanvasApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        egui::SidePanel::right("details")
            .default_width(260.0)
            .show(ctx, |ui| self.detail_panel(ui));

        egui::TopBottomPanel::bottom("info_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.editor.mode().name());
                ui.separator();
                ui.label(format!(
                    "{} states, {} transitions",
                    self.editor.graph().node_count(),
                    self.editor.graph().edge_count()
                ));
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            self.feed_pointer(ctx, &response);

            let rect = response.rect;
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(25, 28, 32));
            let font_size = self.editor.config().font_size;
            for visual in &self.surface.scene.visuals {
                let color = tone_color(visual.tone);
                for primitive in &visual.primitives {
                    paint(&painter, rect.min, primitive, color, font_size);
                }
            }
        });
    }
}

fn tone_color(tone: Tone) -> egui::Color32 {
    match tone {
        Tone::Normal => egui::Color32::from_rgb(200, 205, 215),
        Tone::Selected => egui::Color32::from_rgb(230, 80, 80),
        Tone::Highlighted => egui::Color32::from_rgb(255, 230, 120),
        Tone::Preview => egui::Color32::from_rgba_unmultiplied(200, 205, 215, 120),
    }
}

fn paint(
    painter: &egui::Painter,
    origin: egui::Pos2,
    primitive: &Primitive,
    color: egui::Color32,
    font_size: f32,
) {
    let screen = |p: Point| egui::pos2(origin.x + p.x, origin.y + p.y);
    match primitive {
        Primitive::Circle {
            center,
            radius,
            stroke_width,
        } => {
            painter.circle_stroke(screen(*center), *radius, egui::Stroke::new(*stroke_width, color));
        }
        Primitive::Arrow {
            segment,
            stroke_width,
            head_size,
        } => draw_arrow(
            painter,
            screen(segment.start),
            screen(segment.end),
            *stroke_width,
            *head_size,
            color,
        ),
        Primitive::Arc {
            center,
            radius,
            start_angle,
            sweep,
            stroke_width,
        } => {
            let steps = 48;
            let points: Vec<egui::Pos2> = (0..=steps)
                .map(|i| {
                    let angle = (start_angle + sweep * i as f32 / steps as f32).to_radians();
                    screen(*center + Point::new(angle.cos(), angle.sin()) * *radius)
                })
                .collect();
            painter.add(egui::Shape::line(points, egui::Stroke::new(*stroke_width, color)));
        }
        Primitive::Text { top_left, text, .. } => {
            painter.text(
                screen(*top_left),
                egui::Align2::LEFT_TOP,
                text,
                egui::FontId::proportional(font_size),
                color,
            );
        }
    }
}

/// Straight arrow with a filled head at `end`
fn draw_arrow(
    painter: &egui::Painter,
    start: egui::Pos2,
    end: egui::Pos2,
    width: f32,
    head_size: f32,
    color: egui::Color32,
) {
    painter.line_segment([start, end], egui::Stroke::new(width, color));

    let delta = end - start;
    if delta.length() <= f32::EPSILON {
        return;
    }
    let dir = delta.normalized();
    let perp = egui::vec2(-dir.y, dir.x);
    let p1 = end - dir * head_size + perp * head_size * 0.5;
    let p2 = end - dir * head_size - perp * head_size * 0.5;

    painter.add(egui::Shape::convex_polygon(
        vec![end + dir * head_size * 0.5, p1, p2],
        color,
        egui::Stroke::NONE,
    ));
}
