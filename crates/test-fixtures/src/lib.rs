//! Test support for Causeway: oracles over known graphs, graph builders, and
//! the golden scenario loader.
//!
//! Fixture files live in `test-fixtures/golden/` at the workspace root.

mod oracles;

pub use oracles::{CountingOracle, DSeparationOracle, FailingOracle, ScriptedOracle};

use std::path::PathBuf;

use causeway_core::config::CausewayConfig;
use causeway_core::graph::{Endpoint, Graph, Node};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Root directory of the fixture files.
fn fixtures_root() -> PathBuf {
    // Works from any crate in the workspace: walk up until test-fixtures/golden shows up.
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let mut path = PathBuf::from(&manifest_dir);
    while !path.join("test-fixtures").join("golden").exists() {
        if !path.pop() {
            panic!(
                "Could not find test-fixtures/golden from CARGO_MANIFEST_DIR={}",
                manifest_dir
            );
        }
    }
    path.join("test-fixtures")
}

/// Read a JSON fixture under `test-fixtures/`, such as
/// `golden/collider.json`, into `T`. Golden scenarios load as
/// [`GoldenScenario`].
///
/// # Panics
/// Panics when the file is missing or does not match `T`, naming the path.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => panic!("fixture {} unreadable: {e}", path.display()),
    };
    match serde_json::from_str(&text) {
        Ok(fixture) => fixture,
        Err(e) => panic!("fixture {} does not match the expected shape: {e}", path.display()),
    }
}

/// All JSON files in a fixture subdirectory, sorted by name.
pub fn list_fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = fixtures_root().join(subdir);
    let Ok(entries) = std::fs::read_dir(&dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            path.extension().is_some_and(|ext| ext == "json").then_some(path)
        })
        .collect();
    files.sort();
    files
}

/// A known causal structure together with the search output expected from it.
#[derive(Debug, Clone, Deserialize)]
pub struct GoldenScenario {
    pub description: String,
    /// Observed variables, in oracle order.
    pub variables: Vec<String>,
    /// Hidden variables of the true graph.
    #[serde(default)]
    pub latents: Vec<String>,
    /// Directed edges of the true graph.
    pub dag: Vec<(String, String)>,
    #[serde(default)]
    pub config: CausewayConfig,
    /// Expected output edges in `Edge` display form.
    pub expected_edges: Vec<String>,
    /// Expected separating sets as `[x, y, [set]]`.
    #[serde(default)]
    pub expected_sepsets: Vec<(String, String, Vec<String>)>,
}

impl GoldenScenario {
    /// The true DAG, observed variables first.
    pub fn true_graph(&self) -> Graph {
        let nodes = self
            .variables
            .iter()
            .map(|n| Node::measured(n.as_str()))
            .chain(self.latents.iter().map(|n| Node::latent(n.as_str())));
        let mut graph = Graph::from_nodes(nodes).expect("scenario node names are unique");
        for (from, to) in &self.dag {
            let a = graph.require_id(from).expect("dag edge uses a known node");
            let b = graph.require_id(to).expect("dag edge uses a known node");
            graph.add_directed_edge(a, b).expect("dag edges are unique");
        }
        graph
    }

    pub fn oracle(&self) -> DSeparationOracle {
        DSeparationOracle::new(&self.true_graph())
    }
}

/// Directed graph over `names` with the given `from -> to` edges.
///
/// # Panics
/// Panics on unknown names or duplicate edges.
pub fn dag(names: &[&str], edges: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::from_names(names.iter().copied()).expect("unique names");
    for (from, to) in edges {
        let a = graph.require_id(from).expect("known node");
        let b = graph.require_id(to).expect("known node");
        graph.add_directed_edge(a, b).expect("edge added once");
    }
    graph
}

/// Undirected (`---`) graph over `names` with the given adjacencies.
pub fn skeleton(names: &[&str], pairs: &[(&str, &str)]) -> Graph {
    let mut graph = Graph::from_names(names.iter().copied()).expect("unique names");
    for (a, b) in pairs {
        let a = graph.require_id(a).expect("known node");
        let b = graph.require_id(b).expect("known node");
        graph.add_undirected_edge(a, b).expect("edge added once");
    }
    graph
}

/// Sorted display strings of every edge, for order-insensitive comparison.
///
/// Arrowheads face right where possible (`C --> B`, `A o-> B`); symmetric
/// edges list the smaller name first.
pub fn edge_strings(graph: &Graph) -> Vec<String> {
    let mut out: Vec<String> = graph
        .edges()
        .into_iter()
        .map(|e| {
            let flip = if e.endpoint1 == e.endpoint2 {
                e.node1 > e.node2
            } else {
                e.endpoint1 == Endpoint::Arrow
                    || (e.endpoint1 == Endpoint::Circle && e.endpoint2 == Endpoint::Tail)
            };
            let e = if flip { e.reversed() } else { e };
            e.to_string()
        })
        .collect();
    out.sort();
    out
}

/// Node id by name.
///
/// # Panics
/// Panics if the graph has no such node.
pub fn id(graph: &Graph, name: &str) -> usize {
    graph.require_id(name).expect("known node")
}
