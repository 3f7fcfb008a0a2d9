use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::graph::NodeId;
use crate::domain::solve::Diagnostic;
use crate::domain::solver::SolveStatus;

// ---------- API (wire) types: owned & serde-friendly ----------

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct KmstRequest {
    /// Candidate coordinates, each `[x, y]` in projected units
    pub candidates: Vec<Vec<f64>>,
    /// Root coordinate `[x, y]`
    pub root: Vec<f64>,
    /// Number of nodes to connect, root included
    pub k: usize,
    #[serde(default)]
    pub tolerance_gap: Option<f64>,
    #[serde(default)]
    pub time_limit_secs: Option<f64>,
    #[serde(default)]
    pub include_geojson: bool,
}

#[derive(Serialize, Clone, Debug)]
pub struct ApiEdge {
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub weight: f64,
}

#[derive(Serialize, Clone, Debug)]
pub struct ApiDiagnostic {
    #[serde(flatten)]
    pub detail: Diagnostic,
    pub message: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ApiGeoJson {
    pub nodes: Value,
    pub edges: Value,
}

#[derive(Serialize, Clone, Debug)]
pub struct KmstResponse {
    /// Absent when no solver call was needed
    pub status: Option<SolveStatus>,
    pub k: usize,
    pub selected_nodes: Vec<NodeId>,
    pub selected_edges: Vec<ApiEdge>,
    pub total_weight: f64,
    pub objective: Option<f64>,
    pub diagnostics: Vec<ApiDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geojson: Option<ApiGeoJson>,
}

impl KmstResponse {
    /// Proven optima and answers that needed no solver stay valid on retry;
    /// anything cut short by a limit does not.
    pub fn is_cacheable(&self) -> bool {
        matches!(self.status, None | Some(SolveStatus::Optimal))
    }
}
