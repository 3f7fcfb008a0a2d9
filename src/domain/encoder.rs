use crate::domain::graph::{CandidateGraph, NodeId};
use crate::domain::model::{
    ConstraintSense, LinExpr, MipBuilder, MipInstance, SolverDirection, VarId,
};

/// Branching priority for arcs leaving or entering the root.
pub const ROOT_ARC_PRIORITY: i32 = 10;

/// Variables attached to one pruned edge `a - b`.
#[derive(Debug, Clone, Copy)]
pub struct EdgeVars {
    /// Arc `a -> b`
    pub forward: VarId,
    /// Arc `b -> a`
    pub backward: VarId,
    pub forward_flow: VarId,
    pub backward_flow: VarId,
}

/// Single-commodity flow formulation of the rooted k-MST over a candidate
/// graph.
///
/// The root injects `k - 1` units of flow and every selected node consumes
/// one, so every selected node must be reachable from the root through
/// selected arcs. Cardinality alone would also accept forests and cycles.
#[derive(Debug)]
pub struct KmstModel {
    instance: MipInstance,
    k: usize,
    node_vars: Vec<VarId>,
    edge_vars: Vec<EdgeVars>,
}

fn slot(node: NodeId) -> usize {
    match node {
        NodeId::Root => 0,
        NodeId::Candidate(index) => index + 1,
    }
}

impl KmstModel {
    /// Encode the k-MST over `graph`; `k` counts the root and must be at
    /// least 1.
    pub fn encode(graph: &CandidateGraph, k: usize) -> Self {
        let capacity = k.saturating_sub(1) as f64;
        let mut builder = MipBuilder::new("kmst_directed");

        let node_vars: Vec<VarId> = graph
            .nodes()
            .map(|node| builder.add_binary(format!("node_{}", node)))
            .collect();

        let mut edge_vars = Vec::with_capacity(graph.edges().len());
        let mut all_arcs = LinExpr::new();
        let mut objective = LinExpr::new();
        // inflow minus outflow, per node slot
        let mut balance: Vec<LinExpr> = vec![LinExpr::new(); node_vars.len()];

        for edge in graph.edges() {
            let (a, b) = (edge.a, edge.b);
            let vars = EdgeVars {
                forward: builder.add_binary(format!("arc_{}_{}", a, b)),
                backward: builder.add_binary(format!("arc_{}_{}", b, a)),
                forward_flow: builder.add_continuous(format!("flow_{}_{}", a, b), 0.0, capacity),
                backward_flow: builder.add_continuous(format!("flow_{}_{}", b, a), 0.0, capacity),
            };

            builder.add_constraint(
                format!("one_dir_{}_{}", a, b),
                LinExpr::new().term(vars.forward, 1.0).term(vars.backward, 1.0),
                ConstraintSense::LessEqual,
                1.0,
            );

            let arcs = [
                (a, b, vars.forward, vars.forward_flow),
                (b, a, vars.backward, vars.backward_flow),
            ];
            for (tail, head, arc, flow) in arcs {
                builder.add_constraint(
                    format!("flow_cap_{}_{}", tail, head),
                    LinExpr::new().term(flow, 1.0).term(arc, -capacity),
                    ConstraintSense::LessEqual,
                    0.0,
                );
                builder.add_constraint(
                    format!("arc_tail_{}_{}", tail, head),
                    LinExpr::new()
                        .term(arc, 1.0)
                        .term(node_vars[slot(tail)], -1.0),
                    ConstraintSense::LessEqual,
                    0.0,
                );
                builder.add_constraint(
                    format!("arc_head_{}_{}", tail, head),
                    LinExpr::new()
                        .term(arc, 1.0)
                        .term(node_vars[slot(head)], -1.0),
                    ConstraintSense::LessEqual,
                    0.0,
                );

                if edge.touches_root() {
                    builder.set_branch_priority(arc, ROOT_ARC_PRIORITY);
                }

                balance[slot(head)].add(flow, 1.0);
                balance[slot(tail)].add(flow, -1.0);
                all_arcs.add(arc, 1.0);
                objective.add(arc, edge.weight);
            }

            edge_vars.push(vars);
        }

        builder.add_constraint(
            "root_selected",
            LinExpr::new().term(node_vars[0], 1.0),
            ConstraintSense::Equal,
            1.0,
        );

        builder.add_constraint(
            "k_nodes",
            node_vars[1..].iter().map(|&var| (var, 1.0)).collect(),
            ConstraintSense::Equal,
            capacity,
        );
        builder.add_constraint("k_edges", all_arcs, ConstraintSense::Equal, capacity);

        let mut balance = balance.into_iter();
        if let Some(root_balance) = balance.next() {
            let root_outflow: LinExpr = root_balance
                .terms()
                .iter()
                .map(|&(var, coeff)| (var, -coeff))
                .collect();
            builder.add_constraint("root_flow", root_outflow, ConstraintSense::Equal, capacity);
        }

        for (index, mut node_balance) in balance.enumerate() {
            node_balance.add(node_vars[index + 1], -1.0);
            builder.add_constraint(
                format!("flow_cons_{}", index),
                node_balance,
                ConstraintSense::Equal,
                0.0,
            );
        }

        builder.set_objective(objective, SolverDirection::Minimize);

        KmstModel {
            instance: builder.build(),
            k,
            node_vars,
            edge_vars,
        }
    }

    pub fn instance(&self) -> &MipInstance {
        &self.instance
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn node_var(&self, node: NodeId) -> VarId {
        self.node_vars[slot(node)]
    }

    /// One entry per pruned edge, in the graph's edge order.
    pub fn edge_vars(&self) -> &[EdgeVars] {
        &self.edge_vars
    }
}
