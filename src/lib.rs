//! Automata Canvas - interactive state/transition diagram editor engine
//! Graph model, label layout and pointer-driven editing for finite automata,
//! rendered through a host-supplied view adapter

pub mod automaton;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod graph;
pub mod label;
pub mod view;

pub use automaton::{AutomatonDefinition, MachineModel};
pub use config::EditorConfig;
pub use editor::{Editor, EditorHost, Mode, PointerEvent, PointerKind};
pub use graph::{Graph, GraphError};
pub use view::{DisplayList, PickTarget, ViewAdapter};
