//! The import graph.
//!
//! A [`Graph`] maps each source node to the ordered list of nodes it imports.
//! It is assembled once (from a graph file, from the built-in Rust extractor,
//! or programmatically) and only read afterwards.

use crate::error::{ImportMapsError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Directed import graph: source node → ordered, distinct imported nodes.
///
/// Only nodes with at least one outgoing edge are guaranteed to appear as
/// keys; a node that is only ever imported shows up through [`Graph::nodes`].
/// Importing the same node twice is a single edge; the first occurrence
/// fixes its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Graph {
    edges: BTreeMap<String, Vec<String>>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from `(source, imports)` pairs.
    ///
    /// Repeated sources are appended to, in the order given.
    pub fn from_edges<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<T>)>,
        S: Into<String>,
        T: Into<String>,
    {
        pairs.into_iter().collect()
    }

    /// Appends imports to `source` while the graph is still being built,
    /// skipping targets `source` already imports.
    pub(crate) fn insert_edges<I, T>(&mut self, source: impl Into<String>, imports: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let targets = self.edges.entry(source.into()).or_default();
        for target in imports {
            let target = target.into();
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }

    /// Source nodes in sorted order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    /// The imports of `source`, or an empty slice if it imports nothing.
    pub fn imports_of(&self, source: &str) -> &[String] {
        self.edges.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(source, imports)` pairs, sources in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.edges.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Every `(source, target)` edge, sources sorted, targets in import order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .flat_map(|(src, targets)| targets.iter().map(move |t| (src.as_str(), t.as_str())))
    }

    /// Every node mentioned as a source or as a target, sorted.
    pub fn nodes(&self) -> BTreeSet<&str> {
        self.edges
            .iter()
            .flat_map(|(src, targets)| {
                std::iter::once(src.as_str()).chain(targets.iter().map(String::as_str))
            })
            .collect()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Returns `true` if the graph has no sources.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of source nodes.
    pub fn len(&self) -> usize {
        self.edges.len()
    }
}

impl<S, T> FromIterator<(S, Vec<T>)> for Graph
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, Vec<T>)>>(iter: I) -> Self {
        let mut graph = Graph::new();
        for (source, imports) in iter {
            graph.insert_edges(source, imports);
        }
        graph
    }
}

impl<'de> Deserialize<'de> for Graph {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let edges = BTreeMap::<String, Vec<String>>::deserialize(deserializer)?;
        Ok(edges.into_iter().collect())
    }
}

/// Loads a graph produced by an external graph builder.
///
/// The file must hold a mapping from module name to a list of imported module
/// names. `.yaml`/`.yml` files are read as YAML, everything else as JSON.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_graph_file(path: &Path) -> Result<Graph> {
    let content = fs::read_to_string(path).map_err(|e| {
        ImportMapsError::io_error_with_source("read graph file", path.to_path_buf(), e)
    })?;

    let graph: Graph = if is_yaml(path) {
        serde_yaml::from_str(&content)
            .map_err(|e| ImportMapsError::from(e).with_path(path.to_path_buf()))?
    } else {
        serde_json::from_str(&content)
            .map_err(|e| ImportMapsError::from(e).with_path(path.to_path_buf()))?
    };

    tracing::info!(
        sources = graph.len(),
        edges = graph.edge_count(),
        "Loaded import graph from file"
    );
    Ok(graph)
}

/// Loads a graph from `path`: a crate directory is extracted from its Rust
/// sources, a `.json`/`.yaml`/`.yml` file is read as a serialized graph.
pub fn load_graph(path: &Path) -> Result<Graph> {
    if !path.exists() {
        return Err(ImportMapsError::invalid_input_with_arg(
            "path does not exist",
            path.display().to_string(),
        ));
    }
    if path.is_dir() {
        return crate::extract::extract_rust_crate(path);
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") | Some("yaml") | Some("yml") => load_graph_file(path),
        _ => Err(ImportMapsError::invalid_input_with_arg(
            "expected a crate directory or a .json/.yaml graph file",
            path.display().to_string(),
        )),
    }
}

pub(crate) fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
