use std::time::Duration;

use crate::convert::to_response;
use crate::domain::solve::solve_kmst;
use crate::domain::solver::{SolveOptions, Solver};
use crate::domain::validate::{parse_position, parse_positions};
use crate::error::{KmstError, Result};
use crate::models::{KmstRequest, KmstResponse};

/// Request-level options: server defaults overridden by the request.
pub fn request_options(req: &KmstRequest, defaults: &SolveOptions) -> Result<SolveOptions> {
    let mut options = defaults.clone();

    if let Some(gap) = req.tolerance_gap {
        options.tolerance_gap = gap;
    }

    if let Some(secs) = req.time_limit_secs {
        options.time_limit = Duration::try_from_secs_f64(secs).map_err(|_| {
            KmstError::invalid_input(format!("time_limit_secs must be positive, got {}", secs))
        })?;
    }

    Ok(options)
}

/// POST /kmst
pub fn solve_request(
    solver: &dyn Solver,
    defaults: &SolveOptions,
    req: &KmstRequest,
) -> Result<KmstResponse> {
    let candidates = parse_positions(&req.candidates)?;
    let root = parse_position(&req.root, "root")?;
    let options = request_options(req, defaults)?;

    let result = solve_kmst(solver, &candidates, root, req.k, &options)?;

    Ok(to_response(result, &candidates, root, req.include_geojson))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::solvers::GlpkSolver;

    fn request(candidates: Vec<Vec<f64>>, k: usize) -> KmstRequest {
        KmstRequest {
            candidates,
            root: vec![0.0, 0.0],
            k,
            tolerance_gap: None,
            time_limit_secs: None,
            include_geojson: false,
        }
    }

    #[test]
    fn test_request_options_should_override_defaults() {
        let mut req = request(vec![], 1);
        req.tolerance_gap = Some(0.05);
        req.time_limit_secs = Some(2.5);

        let options = request_options(&req, &SolveOptions::default()).unwrap();
        assert_eq!(options.tolerance_gap, 0.05);
        assert_eq!(options.time_limit, Duration::from_millis(2500));
        assert_eq!(options.presolve, SolveOptions::default().presolve);
    }

    #[test]
    fn test_request_options_given_negative_time_should_return_error() {
        let mut req = request(vec![], 1);
        req.time_limit_secs = Some(-1.0);
        assert!(request_options(&req, &SolveOptions::default()).is_err());
    }

    #[test]
    fn test_solve_request_given_bad_dimension_should_return_invalid_input() {
        let req = request(vec![vec![1.0, 2.0, 3.0]], 2);
        let result = solve_request(&GlpkSolver::new(), &SolveOptions::default(), &req);
        assert!(matches!(result, Err(KmstError::InvalidInput(_))));
    }

    #[test]
    fn test_solve_request_single_candidate() {
        let req = request(vec![vec![10.0, 0.0]], 2);
        let response = solve_request(&GlpkSolver::new(), &SolveOptions::default(), &req).unwrap();

        assert_eq!(response.k, 2);
        assert_eq!(response.selected_nodes.len(), 2);
        assert_eq!(response.selected_edges.len(), 1);
        assert_eq!(response.selected_edges[0].weight, 10.0);
        assert_eq!(response.total_weight, 10.0);
        assert!(response.geojson.is_none());
    }
}
