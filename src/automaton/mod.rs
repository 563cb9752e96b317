//! Automaton Definition
//! Snapshot of a diagram as a finite automaton: states, alphabet, initial and
//! final sets and the transition relation

use serde::{Deserialize, Serialize};

use crate::graph::{EdgeId, Graph, NodeId};
use crate::label::EPSILON;


/// Which kind of machine a definition is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MachineModel {
    /// Non-deterministic, any number of initial states
    #[default]
    Nfa,
    /// Deterministic, exactly one initial state
    Dfa,
}

/// A complete automaton snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomatonDefinition {
    /// All states in id order
    pub states: Vec<StateSummary>,
    /// Input symbols used by any transition, sorted, without epsilon
    pub alphabet: Vec<String>,
    pub initial: Vec<NodeId>,
    pub final_states: Vec<NodeId>,
    pub transitions: Vec<TransitionSummary>,
}

/// A state in the automaton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub id: NodeId,
    /// Label text, or the id when the state is unlabelled
    pub name: String,
}

/// A transition and the symbols it accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionSummary {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    /// Comma separated symbols of the label; `ε` marks an empty transition
    pub symbols: Vec<String>,
}

impl TransitionSummary {
    pub fn is_epsilon(&self) -> bool {
        self.symbols.iter().any(|s| s == EPSILON)
    }
}

/// Split a transition label into its symbols.
pub fn parse_symbols(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl AutomatonDefinition {
    pub fn from_graph(graph: &Graph) -> Self {
        let states = graph
            .nodes()
            .map(|node| StateSummary {
                id: node.id,
                name: graph
                    .node_label(node.id)
                    .map(|l| l.text.clone())
                    .unwrap_or_else(|| node.id.to_string()),
            })
            .collect();

        let transitions = graph
            .edges()
            .map(|edge| TransitionSummary {
                id: edge.id,
                source: edge.source,
                target: edge.target,
                symbols: graph
                    .edge_label(edge.id)
                    .map(|l| parse_symbols(&l.text))
                    .unwrap_or_default(),
            })
            .collect();

        let mut definition = Self {
            states,
            alphabet: Vec::new(),
            initial: graph.nodes().map(|n| n.id).filter(|&id| graph.is_initial(id)).collect(),
            final_states: graph.nodes().map(|n| n.id).filter(|&id| graph.is_final(id)).collect(),
            transitions,
        };
        definition.alphabet = definition.collect_alphabet();
        definition
    }

    /// Get all unique input symbols from transitions
    pub fn collect_alphabet(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .transitions
            .iter()
            .flat_map(|t| t.symbols.iter())
            .filter(|s| s.as_str() != EPSILON)
            .cloned()
            .collect();

        symbols.sort();
        symbols.dedup();
        symbols
    }

    pub fn state_name(&self, id: NodeId) -> Option<&str> {
        self.states.iter().find(|s| s.id == id).map(|s| s.name.as_str())
    }

    fn has_state(&self, id: NodeId) -> bool {
        self.states.iter().any(|s| s.id == id)
    }

    /// Validate the definition as data; no completeness or language checks
    pub fn validate(&self, model: MachineModel) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Check for an initial state
        if self.initial.is_empty() {
            errors.push("No initial state defined".to_string());
        }
        // Check determinism of the start
        if model == MachineModel::Dfa && self.initial.len() > 1 {
            errors.push(format!(
                "A DFA has exactly one initial state, found {}",
                self.initial.len()
            ));
        }

        // Check that markers point at existing states
        for id in self.initial.iter().chain(&self.final_states) {
            if !self.has_state(*id) {
                errors.push(format!("Marked state '{}' not found", id));
            }
        }

        // Check that all transitions reference valid states
        for transition in &self.transitions {
            if !self.has_state(transition.source) {
                errors.push(format!(
                    "Transition {} source state '{}' not found",
                    transition.id, transition.source
                ));
            }
            if !self.has_state(transition.target) {
                errors.push(format!(
                    "Transition {} target state '{}' not found",
                    transition.id, transition.target
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
