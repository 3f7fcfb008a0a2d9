use std::collections::BTreeSet;

use log::debug;

use crate::domain::encoder::KmstModel;
use crate::domain::graph::{CandidateEdge, CandidateGraph, NodeId};
use crate::domain::model::VarId;
use crate::domain::solver::Assignment;

/// Binary variables above this value count as 1.
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// Nodes and edges picked by a solved model.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<CandidateEdge>,
}

impl Selection {
    pub fn empty() -> Self {
        Selection {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn root_only() -> Self {
        Selection {
            nodes: vec![NodeId::Root],
            edges: Vec::new(),
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }
}

/// Read the selected nodes and edges out of a solver assignment.
///
/// Without an incumbent the result is the root alone. Edge weights are the
/// ones computed during pruning, and an edge is reported once even if both
/// of its arcs read as selected.
pub fn decode(model: &KmstModel, graph: &CandidateGraph, assignment: Assignment) -> Selection {
    if !assignment.has_solution() {
        debug!("No incumbent ({:?}), returning root only", assignment.status);
        return Selection::root_only();
    }

    let instance = model.instance();
    let is_selected =
        |var: VarId| assignment.value(&instance.variable(var).name) > SELECTION_THRESHOLD;

    let nodes: Vec<NodeId> = std::iter::once(NodeId::Root)
        .chain(
            graph
                .nodes()
                .skip(1)
                .filter(|&node| is_selected(model.node_var(node))),
        )
        .collect();

    let mut seen = BTreeSet::new();
    let edges: Vec<CandidateEdge> = graph
        .edges()
        .iter()
        .zip(model.edge_vars())
        .filter(|(_, vars)| is_selected(vars.forward) || is_selected(vars.backward))
        .filter(|(edge, _)| seen.insert(edge.key()))
        .map(|(edge, _)| *edge)
        .collect();

    Selection { nodes, edges }
}
