use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use crate::domain::decoder::{decode, Selection};
use crate::domain::encoder::KmstModel;
use crate::domain::geometry::Position;
use crate::domain::graph::{CandidateGraph, MAX_CANDIDATES};
use crate::domain::solver::{SolveOptions, SolveStatus, Solver};
use crate::domain::validate::{validate_k, validate_options, validate_positions};
use crate::error::Result;

/// Matches the default integer feasibility tolerance of the commercial backends
const AUDIT_TOLERANCE: f64 = 1e-5;

/// Recoverable conditions met while solving.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    NoCandidates,
    CapacityExceeded { candidates: usize, max: usize },
    KClamped { requested: usize, used: usize },
    NoIncumbent { status: SolveStatus },
    OptionsIgnored { solver: String },
    InvalidIncumbent { violated: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoCandidates => write!(f, "No candidate nodes provided"),
            Diagnostic::CapacityExceeded { candidates, max } => write!(
                f,
                "{} candidate nodes given, the model supports at most {}",
                candidates, max
            ),
            Diagnostic::KClamped { requested, used } => write!(
                f,
                "k = {} is not feasible, designing for {} nodes instead",
                requested, used
            ),
            Diagnostic::NoIncumbent { status } => {
                write!(f, "Solver found no solution (status {:?})", status)
            }
            Diagnostic::OptionsIgnored { solver } => write!(
                f,
                "{} cannot apply the gap or time limit; the solve runs to optimality",
                solver
            ),
            Diagnostic::InvalidIncumbent { violated } => write!(
                f,
                "Solver returned a point violating {} constraint(s); falling back to root only",
                violated
            ),
        }
    }
}

/// Everything one solve call produced.
#[derive(Debug, Clone)]
pub struct KmstResult {
    pub selection: Selection,
    /// The k actually used after clamping
    pub k: usize,
    /// `None` when the solver was never invoked
    pub status: Option<SolveStatus>,
    /// Objective value reported by the solver
    pub objective: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

impl KmstResult {
    fn without_solve(selection: Selection, k: usize, diagnostics: Vec<Diagnostic>) -> Self {
        KmstResult {
            selection,
            k,
            status: None,
            objective: None,
            diagnostics,
        }
    }
}

/// Solve the rooted k-MST over `candidates`.
///
/// `k` counts the root. It is clamped to `candidates.len() + 1` when larger.
/// Malformed input is an error; an empty or oversized candidate set, an
/// unsolved model and a solver point that breaks the model produce
/// degenerate results with a diagnostic instead.
pub fn solve_kmst(
    solver: &dyn Solver,
    candidates: &[Position],
    root: Position,
    k: usize,
    options: &SolveOptions,
) -> Result<KmstResult> {
    validate_positions(candidates, &root)?;
    validate_k(k)?;
    validate_options(options)?;

    let mut diagnostics = Vec::new();

    if candidates.is_empty() {
        let diagnostic = Diagnostic::NoCandidates;
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
        return Ok(KmstResult::without_solve(Selection::empty(), 0, diagnostics));
    }

    if candidates.len() > MAX_CANDIDATES {
        let diagnostic = Diagnostic::CapacityExceeded {
            candidates: candidates.len(),
            max: MAX_CANDIDATES,
        };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
        return Ok(KmstResult::without_solve(Selection::empty(), 0, diagnostics));
    }

    let available = candidates.len() + 1;
    let k = if k > available {
        let diagnostic = Diagnostic::KClamped {
            requested: k,
            used: available,
        };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
        available
    } else {
        k
    };

    if k == 1 {
        return Ok(KmstResult::without_solve(Selection::root_only(), k, diagnostics));
    }

    let graph = CandidateGraph::build(root, candidates);
    let model = KmstModel::encode(&graph, k);
    debug!(
        "Encoded model with {} variables and {} constraints over {} pruned edges",
        model.instance().variables().len(),
        model.instance().constraints().len(),
        graph.edges().len(),
    );

    if !solver.honors_limits() {
        let diagnostic = Diagnostic::OptionsIgnored {
            solver: solver.name().to_string(),
        };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
    }

    info!(
        "Solving k-MST with {} (k = {}, {} candidates, gap {}, time limit {:?})",
        solver.name(),
        k,
        candidates.len(),
        options.tolerance_gap,
        options.time_limit,
    );
    let assignment = solver.solve(model.instance(), options)?;
    let status = assignment.status;
    let mut objective = assignment.objective;

    let selection = if assignment.has_solution() {
        let values = model.instance().values_from(&assignment);
        let violated = model.instance().violated_constraints(&values, AUDIT_TOLERANCE);
        if violated.is_empty() {
            decode(&model, &graph, assignment)
        } else {
            debug!("{} violated: {:?}", solver.name(), violated);
            let diagnostic = Diagnostic::InvalidIncumbent {
                violated: violated.len(),
            };
            warn!("{}", diagnostic);
            diagnostics.push(diagnostic);
            objective = None;
            Selection::root_only()
        }
    } else {
        let diagnostic = Diagnostic::NoIncumbent { status };
        warn!("{}", diagnostic);
        diagnostics.push(diagnostic);
        decode(&model, &graph, assignment)
    };

    info!(
        "Solved with status {:?}: {} nodes, {} edges, total weight {}",
        status,
        selection.nodes.len(),
        selection.edges.len(),
        selection.total_weight(),
    );

    Ok(KmstResult {
        selection,
        k,
        status: Some(status),
        objective,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::NodeId;
    use crate::domain::model::MipInstance;
    use crate::domain::solver::Assignment;
    use crate::error::KmstError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed status and counts how often it is called.
    struct ScriptedSolver {
        status: SolveStatus,
        calls: AtomicUsize,
    }

    impl ScriptedSolver {
        fn new(status: SolveStatus) -> Self {
            ScriptedSolver {
                status,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Solver for ScriptedSolver {
        fn solve(&self, _instance: &MipInstance, _options: &SolveOptions) -> Result<Assignment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Assignment::without_solution(self.status))
        }

        fn name(&self) -> &str {
            "Scripted"
        }
    }

    /// Reports a fixed point as optimal.
    struct FixedPointSolver {
        values: Vec<(&'static str, f64)>,
        honors_limits: bool,
    }

    impl FixedPointSolver {
        fn new(values: Vec<(&'static str, f64)>) -> Self {
            FixedPointSolver {
                values,
                honors_limits: true,
            }
        }
    }

    impl Solver for FixedPointSolver {
        fn solve(&self, _instance: &MipInstance, _options: &SolveOptions) -> Result<Assignment> {
            let mut assignment = Assignment::without_solution(SolveStatus::Optimal);
            assignment.objective = Some(0.0);
            assignment.values = self
                .values
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect();
            Ok(assignment)
        }

        fn name(&self) -> &str {
            "FixedPoint"
        }

        fn honors_limits(&self) -> bool {
            self.honors_limits
        }
    }

    /// Root to candidate 0, the only tree for one candidate and k = 2.
    fn single_edge_point(scale: f64) -> Vec<(&'static str, f64)> {
        vec![
            ("node_root", scale),
            ("node_0", scale),
            ("arc_root_0", scale),
            ("flow_root_0", scale),
        ]
    }

    fn candidates(count: usize) -> Vec<Position> {
        (0..count).map(|i| Position::new(i as f64 + 1.0, 0.0)).collect()
    }

    #[test]
    fn test_solve_given_no_candidates_should_not_invoke_solver() {
        let solver = ScriptedSolver::new(SolveStatus::Optimal);
        let result = solve_kmst(&solver, &[], Position::new(0.0, 0.0), 5, &SolveOptions::default())
            .unwrap();
        assert_eq!(result.selection, Selection::empty());
        assert_eq!(result.diagnostics, vec![Diagnostic::NoCandidates]);
        assert_eq!(solver.calls(), 0);
    }

    #[test]
    fn test_solve_given_k_one_should_return_root_without_solving() {
        let solver = ScriptedSolver::new(SolveStatus::Optimal);
        let result = solve_kmst(
            &solver,
            &candidates(4),
            Position::new(0.0, 0.0),
            1,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection, Selection::root_only());
        assert_eq!(result.status, None);
        assert_eq!(solver.calls(), 0);
    }

    #[test]
    fn test_solve_given_too_many_candidates_should_return_empty_with_diagnostic() {
        let solver = ScriptedSolver::new(SolveStatus::Optimal);
        let result = solve_kmst(
            &solver,
            &candidates(MAX_CANDIDATES + 1),
            Position::new(0.0, 0.0),
            3,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection, Selection::empty());
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::CapacityExceeded {
                candidates: MAX_CANDIDATES + 1,
                max: MAX_CANDIDATES
            }]
        );
        assert_eq!(solver.calls(), 0);
    }

    #[test]
    fn test_solve_given_no_solution_should_return_root_only() {
        let solver = ScriptedSolver::new(SolveStatus::NoSolution);
        let result = solve_kmst(
            &solver,
            &candidates(6),
            Position::new(0.0, 0.0),
            4,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection.nodes, vec![NodeId::Root]);
        assert!(result.selection.edges.is_empty());
        assert_eq!(result.status, Some(SolveStatus::NoSolution));
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::NoIncumbent {
                status: SolveStatus::NoSolution
            }]
        );
        assert_eq!(solver.calls(), 1);
    }

    #[test]
    fn test_solve_given_large_k_should_clamp_and_report() {
        let solver = ScriptedSolver::new(SolveStatus::Infeasible);
        let result = solve_kmst(
            &solver,
            &candidates(5),
            Position::new(0.0, 0.0),
            10,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.k, 6);
        assert_eq!(
            result.diagnostics[0],
            Diagnostic::KClamped {
                requested: 10,
                used: 6
            }
        );
    }

    #[test]
    fn test_solve_given_non_finite_root_should_fail_before_solving() {
        let solver = ScriptedSolver::new(SolveStatus::Optimal);
        let err = solve_kmst(
            &solver,
            &candidates(2),
            Position::new(f64::NAN, 0.0),
            2,
            &SolveOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, KmstError::InvalidInput(_)));
        assert_eq!(solver.calls(), 0);
    }

    #[test]
    fn test_solve_given_k_zero_should_fail() {
        let solver = ScriptedSolver::new(SolveStatus::Optimal);
        let result = solve_kmst(
            &solver,
            &candidates(2),
            Position::new(0.0, 0.0),
            0,
            &SolveOptions::default(),
        );
        assert!(matches!(result, Err(KmstError::InvalidInput(_))));
    }

    #[test]
    fn test_solve_given_point_breaking_model_should_fall_back_to_root() {
        // Both directions of 0-1 and no arc from the root
        let solver = FixedPointSolver::new(vec![
            ("node_root", 1.0),
            ("node_0", 1.0),
            ("node_1", 1.0),
            ("arc_0_1", 1.0),
            ("arc_1_0", 1.0),
        ]);
        let result = solve_kmst(
            &solver,
            &candidates(2),
            Position::new(0.0, 0.0),
            3,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection, Selection::root_only());
        assert_eq!(result.status, Some(SolveStatus::Optimal));
        assert_eq!(result.objective, None);
        assert!(matches!(
            result.diagnostics.as_slice(),
            [Diagnostic::InvalidIncumbent { violated }] if *violated > 0
        ));
    }

    #[test]
    fn test_solve_given_point_within_integrality_tolerance_should_decode() {
        let solver = FixedPointSolver::new(single_edge_point(1.0 - 3e-6));
        let result = solve_kmst(
            &solver,
            &candidates(1),
            Position::new(0.0, 0.0),
            2,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection.nodes, vec![NodeId::Root, NodeId::Candidate(0)]);
        assert_eq!(result.selection.edges.len(), 1);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_solve_given_solver_without_limits_should_report_it() {
        let solver = FixedPointSolver {
            values: single_edge_point(1.0),
            honors_limits: false,
        };
        let result = solve_kmst(
            &solver,
            &candidates(1),
            Position::new(0.0, 0.0),
            2,
            &SolveOptions::default(),
        )
        .unwrap();
        assert_eq!(result.selection.edges.len(), 1);
        assert_eq!(
            result.diagnostics,
            vec![Diagnostic::OptionsIgnored {
                solver: "FixedPoint".to_string()
            }]
        );
    }

    #[test]
    fn test_diagnostic_should_serialize_with_kind_tag() {
        let value = serde_json::to_value(Diagnostic::InvalidIncumbent { violated: 2 }).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "invalid_incumbent", "violated": 2 }));
    }
}
