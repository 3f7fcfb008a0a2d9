use std::collections::HashMap;

use log::debug;

use crate::convert::{to_borrowed_objective, to_glpk_polyhedron};
use crate::domain::model::{MipInstance, SolverDirection};
use crate::domain::solver::{Assignment, SolveOptions, SolveStatus, Solver};
use crate::error::{KmstError, Result};

use glpk_rust::{solve_ilps as glpk_solve_ilps, Solution};

/// GLPK solver implementation
///
/// GLPK solves every column as an integer column, so flow variables take
/// integral values. An integral optimal flow exists for any tree, so the
/// optimum is unchanged.
pub struct GlpkSolver;

impl GlpkSolver {
    pub fn new() -> Self {
        GlpkSolver
    }
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for GlpkSolver {
    fn solve(&self, instance: &MipInstance, options: &SolveOptions) -> Result<Assignment> {
        debug!("GLPK ignores branching priorities; solving to optimality");

        let glpk_polyhedron = to_glpk_polyhedron(instance)?;
        let objective = to_borrowed_objective(instance);
        let maximize = instance.direction() == SolverDirection::Maximize;

        // Solver expects &mut
        let mut mut_polyhedron = glpk_polyhedron;

        let mut lib_solutions: Vec<Solution> = glpk_solve_ilps(
            &mut mut_polyhedron,
            vec![objective],
            maximize,
            options.presolve,
            options.verbose,
        );

        let solution = lib_solutions
            .pop()
            .ok_or_else(|| KmstError::solver("GLPK returned no solution record"))?;

        if let Some(error) = &solution.error {
            debug!("GLPK reported: {}", error);
        }

        let status: SolveStatus = solution.status.into();
        let values: HashMap<String, f64> = solution
            .solution
            .into_iter()
            .map(|(k, v)| (k.to_string(), v as f64))
            .collect();

        let mut assignment = Assignment {
            status,
            objective: None,
            values,
        };
        if assignment.has_solution() {
            let dense = instance.values_from(&assignment);
            assignment.objective = Some(instance.objective_value(&dense));
        }

        Ok(assignment)
    }

    fn name(&self) -> &str {
        "GLPK"
    }

    fn honors_limits(&self) -> bool {
        false
    }
}
