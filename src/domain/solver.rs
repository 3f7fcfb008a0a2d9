use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::model::MipInstance;
use crate::error::Result;

/// Outcome of a solve call
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SolveStatus {
    /// Proven optimal within the requested gap
    Optimal,
    /// An incumbent exists but optimality was not proven (e.g. time limit)
    Feasible,
    /// The model has no feasible point
    Infeasible,
    /// The solver stopped without any incumbent
    NoSolution,
}

impl SolveStatus {
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

/// Values a solver assigned to the variables of one instance, keyed by
/// variable name.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub status: SolveStatus,
    pub objective: Option<f64>,
    pub values: HashMap<String, f64>,
}

impl Assignment {
    pub fn without_solution(status: SolveStatus) -> Self {
        Assignment {
            status,
            objective: None,
            values: HashMap::new(),
        }
    }

    pub fn has_solution(&self) -> bool {
        self.status.has_solution()
    }

    /// Value of a variable; variables the solver did not report read as 0.
    pub fn value(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }
}

/// Per-call solver configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SolveOptions {
    /// Relative gap to the best bound at which the search stops
    pub tolerance_gap: f64,
    /// Wall-clock budget after which the incumbent is returned
    pub time_limit: Duration,
    pub presolve: bool,
    /// Spend more effort per branching decision (Gurobi `VarBranch = 2`)
    pub strong_branching: bool,
    /// Let the backend print its own progress log
    pub verbose: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            tolerance_gap: 0.01,
            time_limit: Duration::from_secs(300),
            presolve: true,
            strong_branching: true,
            verbose: false,
        }
    }
}

/// Common interface for MIP solvers
pub trait Solver: Send + Sync {
    /// Solve a mixed-integer program
    ///
    /// # Arguments
    /// * `instance` - Variables, constraints and objective to optimize
    /// * `options` - Gap, time budget and backend behaviour
    ///
    /// # Returns
    /// An assignment with a status. Infeasible or unsolved models are not
    /// errors; only failures of the backend itself are.
    fn solve(&self, instance: &MipInstance, options: &SolveOptions) -> Result<Assignment>;

    /// Get the solver name for logging/debugging
    fn name(&self) -> &str;

    /// Whether `tolerance_gap` and `time_limit` reach the backend
    fn honors_limits(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_solution_should_match_incumbent_statuses() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::NoSolution.has_solution());
    }

    #[test]
    fn test_value_given_missing_variable_should_read_zero() {
        let mut assignment = Assignment::without_solution(SolveStatus::Feasible);
        assignment.values.insert("x".to_string(), 0.9999);
        assert_eq!(assignment.value("x"), 0.9999);
        assert_eq!(assignment.value("y"), 0.0);
    }
}
