//! # rust-kmst
//!
//! Rooted k-node minimum spanning tree (k-MST) as a mixed-integer program.
//!
//! Candidate points are pruned into a sparse graph, encoded as a directed
//! single-commodity flow model, handed to a MIP solver (GLPK by default,
//! HiGHS or Gurobi behind features) and decoded back into a tree.
//!
//! ## Example
//!
//! ```no_run
//! use rust_kmst::{solve_kmst, GlpkSolver, Position, SolveOptions};
//!
//! let candidates = vec![Position::new(10.0, 0.0), Position::new(0.0, 12.0)];
//! let result = solve_kmst(
//!     &GlpkSolver::new(),
//!     &candidates,
//!     Position::new(0.0, 0.0),
//!     2,
//!     &SolveOptions::default(),
//! )?;
//! println!("{:?}", result.selection.edges);
//! # Ok::<(), rust_kmst::KmstError>(())
//! ```

pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod models;
pub mod solve;

pub use domain::decoder::Selection;
pub use domain::geometry::Position;
pub use domain::graph::{CandidateEdge, CandidateGraph, NodeId, MAX_CANDIDATES};
pub use domain::sink::{GeoJsonSink, KmstReport, ResultSink};
pub use domain::solve::{solve_kmst, Diagnostic, KmstResult};
pub use domain::solver::{Assignment, SolveOptions, SolveStatus, Solver};
pub use domain::solver_factory::{create_solver, SolverType};
pub use domain::solvers::GlpkSolver;
pub use error::{KmstError, Result};
