use std::collections::HashMap;

use crate::domain::model::{ConstraintSense, MipInstance, SolverDirection, VarKind};
use crate::domain::solver::{Assignment, SolveOptions, SolveStatus, Solver};
use crate::error::{KmstError, Result};

use grb::prelude::*;

/// Gurobi solver implementation
pub struct GurobiSolver;

impl GurobiSolver {
    pub fn new() -> Self {
        GurobiSolver
    }

    /// Convert Gurobi status to our status; limits with an incumbent count
    /// as feasible
    fn convert_status(status: grb::Status, solution_count: i32) -> SolveStatus {
        match status {
            grb::Status::Optimal => SolveStatus::Optimal,
            grb::Status::Infeasible | grb::Status::InfOrUnbd => SolveStatus::Infeasible,
            _ if solution_count > 0 => SolveStatus::Feasible,
            _ => SolveStatus::NoSolution,
        }
    }
}

impl Default for GurobiSolver {
    fn default() -> Self {
        Self::new()
    }
}

fn gurobi_error(context: &str) -> impl Fn(grb::Error) -> KmstError + '_ {
    move |e| KmstError::solver(format!("{}: {}", context, e))
}

impl Solver for GurobiSolver {
    fn solve(&self, instance: &MipInstance, options: &SolveOptions) -> Result<Assignment> {
        let sense = match instance.direction() {
            SolverDirection::Maximize => ModelSense::Maximize,
            SolverDirection::Minimize => ModelSense::Minimize,
        };

        let mut env = Env::new("").map_err(gurobi_error("Failed to create Gurobi environment"))?;

        env.set(param::OutputFlag, if options.verbose { 1 } else { 0 })
            .map_err(gurobi_error("Failed to set Gurobi output flag"))?;

        // 0 = use all available cores
        env.set(param::Threads, 0)
            .map_err(gurobi_error("Failed to set Gurobi thread count"))?;

        // -1 = auto, 0 = off
        env.set(param::Presolve, if options.presolve { -1 } else { 0 })
            .map_err(gurobi_error("Failed to set Gurobi presolve"))?;

        env.set(param::MIPGap, options.tolerance_gap)
            .map_err(gurobi_error("Failed to set Gurobi MIP gap"))?;

        env.set(param::TimeLimit, options.time_limit.as_secs_f64())
            .map_err(gurobi_error("Failed to set Gurobi time limit"))?;

        // 2 = strong branching, -1 = automatic
        env.set(param::VarBranch, if options.strong_branching { 2 } else { -1 })
            .map_err(gurobi_error("Failed to set Gurobi branching strategy"))?;

        let mut model = Model::with_env(instance.name(), &env)
            .map_err(gurobi_error("Failed to create Gurobi model"))?;

        // Add variables
        let mut vars: Vec<Var> = Vec::with_capacity(instance.variables().len());
        for variable in instance.variables() {
            let gurobi_var = match variable.kind {
                VarKind::Binary => add_binvar!(model, name: &variable.name)
                    .map_err(gurobi_error("Failed to add binary variable"))?,
                VarKind::Continuous => add_ctsvar!(
                    model,
                    name: &variable.name,
                    bounds: variable.lower..variable.upper
                )
                .map_err(gurobi_error("Failed to add continuous variable"))?,
            };
            vars.push(gurobi_var);
        }

        model
            .update()
            .map_err(gurobi_error("Failed to update model after adding variables"))?;

        for (variable, var) in instance.variables().iter().zip(&vars) {
            if variable.branch_priority != 0 {
                model
                    .set_obj_attr(attr::BranchPriority, var, variable.branch_priority)
                    .map_err(gurobi_error("Failed to set branching priority"))?;
            }
        }

        for constraint in instance.constraints() {
            let expr = constraint
                .expr
                .terms()
                .iter()
                .fold(Expr::Constant(0.0), |acc, &(var, coeff)| {
                    acc + coeff * vars[var.index()]
                });
            let rhs = constraint.rhs;
            let ineq = match constraint.sense {
                ConstraintSense::LessEqual => c!(expr <= rhs),
                ConstraintSense::Equal => c!(expr == rhs),
                ConstraintSense::GreaterEqual => c!(expr >= rhs),
            };
            model
                .add_constr(&constraint.name, ineq)
                .map_err(gurobi_error("Failed to add constraint"))?;
        }

        let obj_expr = instance
            .objective()
            .terms()
            .iter()
            .fold(Expr::Constant(0.0), |acc, &(var, coeff)| {
                acc + coeff * vars[var.index()]
            });
        model
            .set_objective(obj_expr, sense)
            .map_err(gurobi_error("Failed to set objective"))?;

        model
            .optimize()
            .map_err(gurobi_error("Failed to optimize"))?;

        let model_status = model
            .status()
            .map_err(gurobi_error("Failed to get model status"))?;
        let solution_count = model
            .get_attr(attr::SolCount)
            .map_err(gurobi_error("Failed to get solution count"))?;
        let status = Self::convert_status(model_status, solution_count);

        if !status.has_solution() {
            return Ok(Assignment::without_solution(status));
        }

        let mut values: HashMap<String, f64> = HashMap::with_capacity(vars.len());
        for (variable, var) in instance.variables().iter().zip(&vars) {
            let value = model
                .get_obj_attr(attr::X, var)
                .map_err(gurobi_error("Failed to read variable value"))?;
            values.insert(variable.name.clone(), value);
        }

        let objective = model
            .get_attr(attr::ObjVal)
            .map_err(gurobi_error("Failed to read objective value"))?;

        Ok(Assignment {
            status,
            objective: Some(objective),
            values,
        })
    }

    fn name(&self) -> &str {
        "Gurobi"
    }
}
