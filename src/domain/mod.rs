pub mod decoder;
pub mod encoder;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod sink;
pub mod solve;
pub mod solver;
pub mod solver_factory;
pub mod solvers;
pub mod validate;
