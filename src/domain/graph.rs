use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::geometry::{distance, Position};

/// Largest candidate set the model is built for.
pub const MAX_CANDIDATES: usize = 1500;

/// Identity of a node in the candidate graph.
///
/// The root sorts before every candidate, so a sorted endpoint pair always
/// puts the root first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Root,
    Candidate(usize),
}

impl NodeId {
    pub fn is_root(&self) -> bool {
        matches!(self, NodeId::Root)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Root => write!(f, "root"),
            NodeId::Candidate(index) => write!(f, "{}", index),
        }
    }
}

/// Serialized as `"root"` or the candidate index.
impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeId::Root => serializer.serialize_str("root"),
            NodeId::Candidate(index) => serializer.serialize_u64(*index as u64),
        }
    }
}

/// Undirected edge that survived pruning, with its precomputed length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateEdge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
}

impl CandidateEdge {
    /// Canonical (sorted) endpoint pair.
    pub fn key(&self) -> (NodeId, NodeId) {
        if self.a <= self.b {
            (self.a, self.b)
        } else {
            (self.b, self.a)
        }
    }

    pub fn touches_root(&self) -> bool {
        self.a.is_root() || self.b.is_root()
    }
}

/// Root plus candidates, and the pruned edge list between them.
#[derive(Debug, Clone)]
pub struct CandidateGraph {
    root: Position,
    candidates: Vec<Position>,
    edges: Vec<CandidateEdge>,
}

impl CandidateGraph {
    /// Builds the node set and the pruned edge list.
    ///
    /// An edge is kept if one endpoint is the root, or if it is no longer
    /// than the larger of its endpoints' distances to the root. Pruned edges
    /// can still belong to the optimum of the complete graph; the model is
    /// only optimal over the edges kept here.
    pub fn build(root: Position, candidates: &[Position]) -> Self {
        let nodes: Vec<NodeId> = std::iter::once(NodeId::Root)
            .chain((0..candidates.len()).map(NodeId::Candidate))
            .collect();

        let position_of = |node: NodeId| match node {
            NodeId::Root => root,
            NodeId::Candidate(index) => candidates[index],
        };

        let distance_to_root: Vec<f64> = nodes
            .iter()
            .map(|&node| distance(&position_of(node), &root))
            .collect();

        let mut edges = Vec::new();
        for (i, &node1) in nodes.iter().enumerate() {
            for (offset, &node2) in nodes[i + 1..].iter().enumerate() {
                let j = i + 1 + offset;
                let weight = distance(&position_of(node1), &position_of(node2));
                let keep = node1.is_root()
                    || node2.is_root()
                    || weight <= distance_to_root[i].max(distance_to_root[j]);
                if keep {
                    edges.push(CandidateEdge {
                        a: node1,
                        b: node2,
                        weight,
                    });
                }
            }
        }

        CandidateGraph {
            root,
            candidates: candidates.to_vec(),
            edges,
        }
    }

    pub fn root(&self) -> Position {
        self.root
    }

    pub fn candidates(&self) -> &[Position] {
        &self.candidates
    }

    pub fn num_candidates(&self) -> usize {
        self.candidates.len()
    }

    /// Root first, then every candidate in index order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(NodeId::Root).chain((0..self.candidates.len()).map(NodeId::Candidate))
    }

    pub fn position(&self, node: NodeId) -> Position {
        match node {
            NodeId::Root => self.root,
            NodeId::Candidate(index) => self.candidates[index],
        }
    }

    pub fn edges(&self) -> &[CandidateEdge] {
        &self.edges
    }
}
