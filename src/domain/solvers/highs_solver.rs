use std::collections::HashMap;

use log::debug;

use crate::domain::model::{ConstraintSense, MipInstance, SolverDirection, VarKind};
use crate::domain::solver::{Assignment, SolveOptions, SolveStatus, Solver};
use crate::error::Result;

use ::highs::{ColProblem, HighsModelStatus, Sense};

const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// HiGHS solver implementation
pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        HighsSolver
    }

    /// Convert HiGHS status to ours. A solver stopped by a limit may or may
    /// not hold an incumbent, so `feasible` says whether its point checks out.
    fn convert_status(model_status: HighsModelStatus, feasible: bool) -> SolveStatus {
        match model_status {
            HighsModelStatus::Optimal => SolveStatus::Optimal,
            HighsModelStatus::Infeasible => SolveStatus::Infeasible,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit
                if feasible =>
            {
                SolveStatus::Feasible
            }
            _ => SolveStatus::NoSolution,
        }
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for HighsSolver {
    fn solve(&self, instance: &MipInstance, options: &SolveOptions) -> Result<Assignment> {
        let sense = match instance.direction() {
            SolverDirection::Maximize => Sense::Maximise,
            SolverDirection::Minimize => Sense::Minimise,
        };

        if instance.variables().iter().any(|v| v.branch_priority != 0) {
            debug!("HiGHS has no branching priorities; ignoring them");
        }

        let mut problem = ColProblem::new();

        // First, add all constraint rows
        let mut rows = Vec::with_capacity(instance.constraints().len());
        for constraint in instance.constraints() {
            let rhs = constraint.rhs;
            let row = match constraint.sense {
                ConstraintSense::LessEqual => problem.add_row(..=rhs),
                ConstraintSense::Equal => problem.add_row(rhs..=rhs),
                ConstraintSense::GreaterEqual => problem.add_row(rhs..),
            };
            rows.push(row);
        }

        // Build sparse matrix data: for each column, collect its row entries
        let mut col_data = vec![Vec::new(); instance.variables().len()];
        for (row_idx, constraint) in instance.constraints().iter().enumerate() {
            for &(var, coeff) in constraint.expr.terms() {
                col_data[var.index()].push((rows[row_idx], coeff));
            }
        }

        let objective = instance.objective_coefficients();
        for ((variable, row_factors), obj_coeff) in
            instance.variables().iter().zip(&col_data).zip(objective)
        {
            let bounds = variable.lower..=variable.upper;
            match variable.kind {
                VarKind::Binary => {
                    problem.add_integer_column(obj_coeff, bounds, row_factors);
                }
                VarKind::Continuous => {
                    problem.add_column(obj_coeff, bounds, row_factors);
                }
            }
        }

        let mut model = problem.optimise(sense);
        model.set_option("output_flag", options.verbose);
        model.set_option("mip_rel_gap", options.tolerance_gap);
        model.set_option("time_limit", options.time_limit.as_secs_f64());
        model.set_option("presolve", if options.presolve { "on" } else { "off" });
        let solved = model.solve();

        let model_status = solved.status();
        let solution = solved.get_solution();
        let columns = solution.columns();

        let dense: Vec<f64> = (0..instance.variables().len())
            .map(|idx| columns.get(idx).copied().unwrap_or(0.0))
            .collect();
        let values: HashMap<String, f64> = instance
            .variables()
            .iter()
            .zip(&dense)
            .map(|(v, &value)| (v.name.clone(), value))
            .collect();

        let feasible = !columns.is_empty()
            && instance
                .violated_constraints(&dense, FEASIBILITY_TOLERANCE)
                .is_empty();
        let status = Self::convert_status(model_status, feasible);

        Ok(Assignment {
            status,
            objective: status
                .has_solution()
                .then(|| instance.objective_value(&dense)),
            values,
        })
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
