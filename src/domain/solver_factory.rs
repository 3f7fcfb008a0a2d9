use std::fmt;
use std::str::FromStr;

use crate::domain::solver::Solver;
use crate::domain::solvers::GlpkSolver;
use crate::error::KmstError;

#[cfg(feature = "highs-solver")]
use crate::domain::solvers::HighsSolver;

#[cfg(feature = "gurobi-solver")]
use crate::domain::solvers::GurobiSolver;

/// Backends compiled into this build.
///
/// The default is HiGHS when it is available, since GLPK cannot stop at a
/// gap or a time limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverType {
    #[cfg_attr(not(feature = "highs-solver"), default)]
    Glpk,
    #[cfg(feature = "highs-solver")]
    #[default]
    Highs,
    #[cfg(feature = "gurobi-solver")]
    Gurobi,
}

impl SolverType {
    pub const AVAILABLE: &'static [SolverType] = &[
        SolverType::Glpk,
        #[cfg(feature = "highs-solver")]
        SolverType::Highs,
        #[cfg(feature = "gurobi-solver")]
        SolverType::Gurobi,
    ];

    /// Lowercase name accepted by `KMST_SOLVER`
    pub fn name(&self) -> &'static str {
        match self {
            SolverType::Glpk => "glpk",
            #[cfg(feature = "highs-solver")]
            SolverType::Highs => "highs",
            #[cfg(feature = "gurobi-solver")]
            SolverType::Gurobi => "gurobi",
        }
    }
}

impl fmt::Display for SolverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverType {
    type Err = KmstError;

    /// Case-insensitive; unknown names and backends left out of the build
    /// are rejected with the list of what is available.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SolverType::AVAILABLE
            .iter()
            .copied()
            .find(|solver_type| solver_type.name() == wanted)
            .ok_or_else(|| {
                let available: Vec<&str> =
                    SolverType::AVAILABLE.iter().map(|t| t.name()).collect();
                KmstError::invalid_input(format!(
                    "Unknown or disabled solver '{}', available: {}",
                    s,
                    available.join(", ")
                ))
            })
    }
}

/// Create a solver instance based on the specified type
pub fn create_solver(solver_type: SolverType) -> Box<dyn Solver> {
    match solver_type {
        SolverType::Glpk => Box::new(GlpkSolver::new()),
        #[cfg(feature = "highs-solver")]
        SolverType::Highs => Box::new(HighsSolver::new()),
        #[cfg(feature = "gurobi-solver")]
        SolverType::Gurobi => Box::new(GurobiSolver::new()),
    }
}
