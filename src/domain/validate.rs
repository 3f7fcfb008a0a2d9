use crate::domain::geometry::Position;
use crate::domain::solver::SolveOptions;
use crate::error::{KmstError, Result};

/// Parse a raw coordinate into a position, rejecting anything that is not
/// exactly two finite numbers.
pub fn parse_position(raw: &[f64], label: &str) -> Result<Position> {
    match raw {
        [x, y] => {
            let position = Position::new(*x, *y);
            validate_position(&position, label)?;
            Ok(position)
        }
        _ => Err(KmstError::invalid_input(format!(
            "{} must have exactly 2 coordinates, got {}",
            label,
            raw.len(),
        ))),
    }
}

pub fn parse_positions(raw: &[Vec<f64>]) -> Result<Vec<Position>> {
    raw.iter()
        .enumerate()
        .map(|(index, coords)| parse_position(coords, &format!("candidate {}", index)))
        .collect()
}

pub fn validate_position(position: &Position, label: &str) -> Result<()> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(KmstError::invalid_input(format!(
            "{} has non-finite coordinates ({}, {})",
            label, position.x, position.y,
        )))
    }
}

pub fn validate_positions(candidates: &[Position], root: &Position) -> Result<()> {
    validate_position(root, "root")?;
    for (index, candidate) in candidates.iter().enumerate() {
        validate_position(candidate, &format!("candidate {}", index))?;
    }
    Ok(())
}

pub fn validate_k(k: usize) -> Result<()> {
    if k == 0 {
        return Err(KmstError::invalid_input("k must be at least 1 (the root)"));
    }
    Ok(())
}

pub fn validate_options(options: &SolveOptions) -> Result<()> {
    if !options.tolerance_gap.is_finite() || options.tolerance_gap < 0.0 {
        return Err(KmstError::invalid_input(format!(
            "tolerance gap must be a non-negative number, got {}",
            options.tolerance_gap,
        )));
    }
    if options.time_limit.is_zero() {
        return Err(KmstError::invalid_input("time limit must be positive"));
    }
    Ok(())
}
