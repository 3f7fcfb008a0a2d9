use std::env;
use std::time::Duration;

use crate::domain::solver::SolveOptions;
use crate::domain::solver_factory::SolverType;
use crate::error::{KmstError, Result};

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024; // 2 MB
const DEFAULT_CACHE_SIZE: usize = 64;

/// Server settings read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub json_limit: usize,
    pub solver_type: SolverType,
    pub solve_options: SolveOptions,
    /// 0 disables the result cache
    pub cache_size: usize,
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let json_limit = lookup("JSON_PAYLOAD_LIMIT")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_JSON_LIMIT);

        let solver_type = match lookup("KMST_SOLVER") {
            Some(name) => name.parse::<SolverType>()?,
            None => SolverType::default(),
        };

        let mut solve_options = SolveOptions::default();
        if let Some(gap) = lookup("KMST_MIP_GAP").and_then(|v| v.parse::<f64>().ok()) {
            solve_options.tolerance_gap = gap;
        }
        if let Some(secs) = lookup("KMST_TIME_LIMIT_SECS").and_then(|v| v.parse::<f64>().ok()) {
            solve_options.time_limit = Duration::try_from_secs_f64(secs).map_err(|_| {
                KmstError::invalid_input(format!("KMST_TIME_LIMIT_SECS must be positive, got {}", secs))
            })?;
        }
        if let Some(verbose) = lookup("KMST_SOLVER_VERBOSE").and_then(|v| v.parse::<bool>().ok()) {
            solve_options.verbose = verbose;
        }

        let cache_size = lookup("KMST_RESULT_CACHE_SIZE")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty());

        Ok(ServerConfig {
            port,
            json_limit,
            solver_type,
            solve_options,
            cache_size,
            sentry_dsn,
        })
    }
}
