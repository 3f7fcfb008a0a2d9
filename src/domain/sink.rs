use std::fs;
use std::path::PathBuf;

use log::info;
use serde_json::{json, Value};

use crate::domain::decoder::Selection;
use crate::domain::geometry::Position;
use crate::domain::graph::NodeId;
use crate::error::Result;

/// What a sink receives after one solve.
#[derive(Debug, Clone, Copy)]
pub struct KmstReport<'a> {
    pub selection: &'a Selection,
    pub candidates: &'a [Position],
    pub root: Position,
    pub k: usize,
}

impl KmstReport<'_> {
    fn position(&self, node: NodeId) -> Position {
        match node {
            NodeId::Root => self.root,
            NodeId::Candidate(index) => self.candidates[index],
        }
    }
}

/// Destination for solved trees
pub trait ResultSink {
    fn write(&self, report: &KmstReport<'_>) -> Result<()>;
}

fn point(position: Position) -> Value {
    json!({ "type": "Point", "coordinates": [position.x, position.y] })
}

/// Every candidate as a Point flagged `selected`, followed by the root.
pub fn nodes_feature_collection(report: &KmstReport<'_>) -> Value {
    let mut features: Vec<Value> = report
        .candidates
        .iter()
        .enumerate()
        .map(|(index, &position)| {
            let node = NodeId::Candidate(index);
            json!({
                "type": "Feature",
                "geometry": point(position),
                "properties": {
                    "node_id": node,
                    "selected": report.selection.nodes.contains(&node),
                },
            })
        })
        .collect();

    features.push(json!({
        "type": "Feature",
        "geometry": point(report.root),
        "properties": { "node_id": NodeId::Root, "selected": true },
    }));

    json!({ "type": "FeatureCollection", "features": features })
}

/// Every selected edge as a two-point LineString.
pub fn edges_feature_collection(report: &KmstReport<'_>) -> Value {
    let features: Vec<Value> = report
        .selection
        .edges
        .iter()
        .map(|edge| {
            let (a, b) = (report.position(edge.a), report.position(edge.b));
            json!({
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[a.x, a.y], [b.x, b.y]],
                },
                "properties": {
                    "node_a": edge.a,
                    "node_b": edge.b,
                    "weight": edge.weight,
                },
            })
        })
        .collect();

    json!({ "type": "FeatureCollection", "features": features })
}

pub fn summary_text(report: &KmstReport<'_>) -> String {
    format!(
        "k: {}\nnodes_selected: {}\nedges_selected: {}\ntotal_weight: {}\nroot: [{}, {}]\n",
        report.k,
        report.selection.nodes.len(),
        report.selection.edges.len(),
        report.selection.total_weight(),
        report.root.x,
        report.root.y,
    )
}

/// Writes `nodes.geojson`, `edges.geojson` and `summary.txt` into a folder.
pub struct GeoJsonSink {
    output_dir: PathBuf,
}

impl GeoJsonSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        GeoJsonSink {
            output_dir: output_dir.into(),
        }
    }
}

impl ResultSink for GeoJsonSink {
    fn write(&self, report: &KmstReport<'_>) -> Result<()> {
        fs::create_dir_all(&self.output_dir)?;

        fs::write(
            self.output_dir.join("nodes.geojson"),
            serde_json::to_string_pretty(&nodes_feature_collection(report))?,
        )?;
        fs::write(
            self.output_dir.join("edges.geojson"),
            serde_json::to_string_pretty(&edges_feature_collection(report))?,
        )?;
        fs::write(self.output_dir.join("summary.txt"), summary_text(report))?;

        info!(
            "Results saved to {}: nodes.geojson, edges.geojson, summary.txt",
            self.output_dir.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::CandidateEdge;

    fn selection() -> Selection {
        Selection {
            nodes: vec![NodeId::Root, NodeId::Candidate(1)],
            edges: vec![CandidateEdge {
                a: NodeId::Root,
                b: NodeId::Candidate(1),
                weight: 5.0,
            }],
        }
    }

    fn candidates() -> Vec<Position> {
        vec![Position::new(100.0, 100.0), Position::new(3.0, 4.0)]
    }

    #[test]
    fn test_nodes_feature_collection_should_flag_selection_and_append_root() {
        let selection = selection();
        let candidates = candidates();
        let report = KmstReport {
            selection: &selection,
            candidates: &candidates,
            root: Position::new(0.0, 0.0),
            k: 2,
        };

        let nodes = nodes_feature_collection(&report);
        let features = nodes["features"].as_array().unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0]["properties"]["selected"], json!(false));
        assert_eq!(features[1]["properties"]["selected"], json!(true));
        assert_eq!(features[2]["properties"]["node_id"], json!("root"));
        assert_eq!(features[1]["geometry"]["coordinates"], json!([3.0, 4.0]));
    }

    #[test]
    fn test_edges_feature_collection_should_draw_line_between_endpoints() {
        let selection = selection();
        let candidates = candidates();
        let report = KmstReport {
            selection: &selection,
            candidates: &candidates,
            root: Position::new(0.0, 0.0),
            k: 2,
        };

        let edges = edges_feature_collection(&report);
        let feature = &edges["features"][0];
        assert_eq!(feature["geometry"]["coordinates"], json!([[0.0, 0.0], [3.0, 4.0]]));
        assert_eq!(feature["properties"]["node_b"], json!(1));
        assert_eq!(feature["properties"]["weight"], json!(5.0));
    }

    #[test]
    fn test_geojson_sink_should_write_three_files() {
        let selection = selection();
        let candidates = candidates();
        let report = KmstReport {
            selection: &selection,
            candidates: &candidates,
            root: Position::new(0.0, 0.0),
            k: 2,
        };
        let dir = std::env::temp_dir().join(format!("kmst-sink-{}", std::process::id()));

        GeoJsonSink::new(&dir).write(&report).unwrap();

        let summary = fs::read_to_string(dir.join("summary.txt")).unwrap();
        assert!(summary.contains("nodes_selected: 2"));
        assert!(summary.contains("total_weight: 5"));
        let edges: Value =
            serde_json::from_str(&fs::read_to_string(dir.join("edges.geojson")).unwrap()).unwrap();
        assert_eq!(edges["type"], json!("FeatureCollection"));
        assert!(dir.join("nodes.geojson").exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
