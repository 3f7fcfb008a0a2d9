use std::collections::HashMap;

use crate::domain::geometry::Position;
use crate::domain::model::MipInstance;
use crate::domain::sink::{edges_feature_collection, nodes_feature_collection, KmstReport};
use crate::domain::solve::KmstResult;
use crate::domain::solver::SolveStatus;
use crate::error::{KmstError, Result};
use crate::models::{ApiDiagnostic, ApiEdge, ApiGeoJson, KmstResponse};

use glpk_rust::{
    Bound, IntegerSparseMatrix as GlpkMatrix, SparseLEIntegerPolyhedron as GlpkPoly,
    Status as GlpkStatus, Variable as GlpkVar,
};

/// Objective as GLPK wants it, borrowing variable names from the instance.
pub fn to_borrowed_objective(instance: &MipInstance) -> HashMap<&str, f64> {
    instance
        .objective_coefficients()
        .into_iter()
        .zip(instance.variables())
        .filter(|(coeff, _)| *coeff != 0.0)
        .map(|(coeff, v)| (v.name.as_str(), coeff))
        .collect()
}

/// Lower an instance to GLPK's integer `A x <= b` polyhedron.
///
/// Every coefficient, right-hand side and bound must be integral. All
/// columns become integer columns, continuous ones included.
pub fn to_glpk_polyhedron(instance: &MipInstance) -> Result<GlpkPoly<'_>> {
    let form = instance.to_sparse_le();

    let vals = form
        .vals
        .iter()
        .map(|&v| to_integer(v, "constraint coefficient"))
        .collect::<Result<Vec<i32>>>()?;

    let b = form
        .rhs
        .iter()
        .map(|&v| Ok((0, to_integer(v, "right-hand side")?)))
        .collect::<Result<Vec<Bound>>>()?;

    let variables = instance
        .variables()
        .iter()
        .map(|v| {
            Ok(GlpkVar {
                id: v.name.as_str(), // borrow directly from the instance
                bound: (
                    to_integer(v.lower, "variable bound")?,
                    to_integer(v.upper, "variable bound")?,
                ),
            })
        })
        .collect::<Result<Vec<GlpkVar<'_>>>>()?;

    Ok(GlpkPoly {
        a: GlpkMatrix {
            rows: form.rows.iter().map(|&r| r as i32).collect(),
            cols: form.cols.iter().map(|&c| c as i32).collect(),
            vals,
        },
        b,
        variables,
        double_bound: false,
    })
}

fn to_integer(value: f64, what: &str) -> Result<i32> {
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Ok(value as i32)
    } else {
        Err(KmstError::solver(format!(
            "GLPK needs integral data, got {} {}",
            what, value
        )))
    }
}

impl From<GlpkStatus> for SolveStatus {
    fn from(s: GlpkStatus) -> Self {
        match s {
            GlpkStatus::Optimal => SolveStatus::Optimal,
            GlpkStatus::Feasible => SolveStatus::Feasible,
            GlpkStatus::Infeasible | GlpkStatus::NoFeasible => SolveStatus::Infeasible,
            GlpkStatus::Undefined
            | GlpkStatus::Unbounded
            | GlpkStatus::SimplexFailed
            | GlpkStatus::MIPFailed
            | GlpkStatus::EmptySpace => SolveStatus::NoSolution,
        }
    }
}

/// Map a solve result to the API response, optionally with GeoJSON layers.
pub fn to_response(
    result: KmstResult,
    candidates: &[Position],
    root: Position,
    include_geojson: bool,
) -> KmstResponse {
    let geojson = include_geojson.then(|| {
        let report = KmstReport {
            selection: &result.selection,
            candidates,
            root,
            k: result.k,
        };
        ApiGeoJson {
            nodes: nodes_feature_collection(&report),
            edges: edges_feature_collection(&report),
        }
    });

    KmstResponse {
        status: result.status,
        k: result.k,
        total_weight: result.selection.total_weight(),
        selected_edges: result
            .selection
            .edges
            .iter()
            .map(|e| ApiEdge {
                node_a: e.a,
                node_b: e.b,
                weight: e.weight,
            })
            .collect(),
        selected_nodes: result.selection.nodes,
        objective: result.objective,
        diagnostics: result
            .diagnostics
            .into_iter()
            .map(|d| ApiDiagnostic {
                message: d.to_string(),
                detail: d,
            })
            .collect(),
        geojson,
    }
}
