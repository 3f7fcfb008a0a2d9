//! Solve a random k-MST around the origin and write the result as GeoJSON.
//!
//! Replace the generated points with projected coordinates (meters) of your
//! own to run it on real data. `KMST_SOLVER` picks the backend.

use std::f64::consts::PI;

use dotenv::dotenv;
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rust_kmst::config::ServerConfig;
use rust_kmst::{create_solver, solve_kmst, GeoJsonSink, KmstReport, Position, ResultSink};

const SEED: u64 = 42;
const NUM_SAMPLE_NODES: usize = 100;
const RADIUS: f64 = 1000.0;
const K: usize = 20;
const OUTPUT_FOLDER: &str = "output";

fn sample_nodes(center: Position) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(SEED);
    (0..NUM_SAMPLE_NODES)
        .map(|_| {
            let angle = rng.gen_range(0.0..2.0 * PI);
            let radius = rng.gen_range(0.0..RADIUS);
            Position::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

fn main() -> rust_kmst::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()?;
    let solver = create_solver(config.solver_type);

    let root = Position::new(0.0, 0.0);
    let candidates = sample_nodes(root);

    let result = solve_kmst(solver.as_ref(), &candidates, root, K, &config.solve_options)?;
    info!(
        "Selected nodes: {:?}",
        result
            .selection
            .nodes
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
    );

    if result.selection.edges.is_empty() {
        warn!("No solution found or problem infeasible.");
        return Ok(());
    }

    GeoJsonSink::new(OUTPUT_FOLDER).write(&KmstReport {
        selection: &result.selection,
        candidates: &candidates,
        root,
        k: result.k,
    })
}
