//! Direction algebra for board topologies.
//!
//! A `DirectionGraph` answers "facing D, turning by relative direction R,
//! which absolute direction results". Absolute and relative directions are
//! both listed in a fixed cyclic order; resolving is an offset in that cycle.
//! Built once per topology and shared read-only by every board copy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default adjacency kinds whose step tokens are relative directions.
pub const DEFAULT_RELATIVE_KINDS: [&str; 2] = ["edge", "vertex"];

/// Serialized form of a direction graph; lookup tables are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DirectionTable {
    absolute: Vec<String>,
    relative: Vec<String>,
    included_adjacency_types: Vec<String>,
}

/// Cyclic direction table for one topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DirectionTable", into = "DirectionTable")]
pub struct DirectionGraph {
    /// Absolute directions in clockwise order.
    absolute: Vec<String>,
    /// Relative directions; `relative[i]` turns by `i` steps.
    relative: Vec<String>,
    /// Adjacency kinds that resolve step tokens through this graph.
    included_adjacency_types: Vec<String>,
    abs_index: HashMap<String, usize>,
    rel_index: HashMap<String, usize>,
}

impl From<DirectionTable> for DirectionGraph {
    fn from(t: DirectionTable) -> Self {
        let mut graph = DirectionGraph {
            absolute: t.absolute,
            relative: t.relative,
            included_adjacency_types: t.included_adjacency_types,
            abs_index: HashMap::new(),
            rel_index: HashMap::new(),
        };
        graph.rebuild_index();
        graph
    }
}

impl From<DirectionGraph> for DirectionTable {
    fn from(g: DirectionGraph) -> Self {
        DirectionTable {
            absolute: g.absolute,
            relative: g.relative,
            included_adjacency_types: g.included_adjacency_types,
        }
    }
}

impl DirectionGraph {
    /// Builds a graph from equally sized cyclic lists.
    ///
    /// Returns `None` if the lists differ in length, are empty, or contain
    /// duplicates.
    pub fn new<A, R>(absolute: &[A], relative: &[R]) -> Option<Self>
    where
        A: AsRef<str>,
        R: AsRef<str>,
    {
        if absolute.is_empty() || absolute.len() != relative.len() {
            return None;
        }
        let mut graph = DirectionGraph {
            absolute: absolute.iter().map(|d| d.as_ref().to_string()).collect(),
            relative: relative.iter().map(|d| d.as_ref().to_string()).collect(),
            included_adjacency_types: DEFAULT_RELATIVE_KINDS.iter().map(|k| k.to_string()).collect(),
            abs_index: HashMap::new(),
            rel_index: HashMap::new(),
        };
        graph.rebuild_index();
        if graph.abs_index.len() != graph.absolute.len() || graph.rel_index.len() != graph.relative.len() {
            return None;
        }
        Some(graph)
    }

    /// Replaces the adjacency kinds that use relative step tokens.
    pub fn with_relative_kinds<K: AsRef<str>>(mut self, kinds: &[K]) -> Self {
        self.included_adjacency_types = kinds.iter().map(|k| k.as_ref().to_string()).collect();
        self
    }

    fn rebuild_index(&mut self) {
        self.abs_index = self
            .absolute
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
        self.rel_index = self
            .relative
            .iter()
            .enumerate()
            .map(|(i, d)| (d.clone(), i))
            .collect();
    }

    /// 4-neighbour square topology.
    pub fn orthogonal_2d() -> Self {
        Self::new(&["n", "e", "s", "w"], &["f", "r", "b", "l"])
            .expect("static direction table is well formed")
    }

    /// 8-neighbour square topology.
    pub fn cartesian_2d() -> Self {
        Self::new(
            &["n", "ne", "e", "se", "s", "sw", "w", "nw"],
            &["f", "fr", "r", "br", "b", "bl", "l", "fl"],
        )
        .expect("static direction table is well formed")
    }

    /// 12-direction hexagonal topology (6 edge plus 6 vertex neighbours).
    pub fn hexagonal_2d() -> Self {
        Self::new(
            &["n", "nne", "ne", "e", "se", "sse", "s", "ssw", "sw", "w", "nw", "nnw"],
            &["f", "ffr", "fr", "r", "br", "bbr", "b", "bbl", "bl", "l", "fl", "ffl"],
        )
        .expect("static direction table is well formed")
    }

    /// Returns the absolute direction reached by turning `relative` from `from`.
    pub fn resolve(&self, from: &str, relative: &str) -> Option<&str> {
        let a = *self.abs_index.get(from)?;
        let r = *self.rel_index.get(relative)?;
        Some(&self.absolute[(a + r) % self.absolute.len()])
    }

    /// Returns the relative direction that undoes `relative`.
    pub fn inverse(&self, relative: &str) -> Option<&str> {
        let r = *self.rel_index.get(relative)?;
        let n = self.relative.len();
        Some(&self.relative[(n - r) % n])
    }

    /// Returns the absolute direction opposite to `direction`.
    pub fn opposite(&self, direction: &str) -> Option<&str> {
        let back = self.relative.get(self.relative.len() / 2)?;
        if self.relative.len() % 2 != 0 {
            return None;
        }
        self.resolve(direction, back)
    }

    /// Whether `direction` is an absolute direction of this topology.
    pub fn contains(&self, direction: &str) -> bool {
        self.abs_index.contains_key(direction)
    }

    /// Whether `relative` is a relative direction of this topology.
    pub fn is_relative(&self, relative: &str) -> bool {
        self.rel_index.contains_key(relative)
    }

    /// Whether steps of the given adjacency kind use relative tokens.
    pub fn is_relative_kind(&self, kind: &str) -> bool {
        self.included_adjacency_types.iter().any(|k| k == kind)
    }

    pub fn absolute_directions(&self) -> &[String] {
        &self.absolute
    }

    pub fn relative_directions(&self) -> &[String] {
        &self.relative
    }

    pub fn relative_kinds(&self) -> &[String] {
        &self.included_adjacency_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_presets() -> Vec<DirectionGraph> {
        vec![
            DirectionGraph::orthogonal_2d(),
            DirectionGraph::cartesian_2d(),
            DirectionGraph::hexagonal_2d(),
        ]
    }

    #[test]
    fn resolve_is_closed_and_invertible() {
        for graph in all_presets() {
            for a in graph.absolute_directions() {
                for r in graph.relative_directions() {
                    let turned = graph.resolve(a, r).expect("closure");
                    let inv = graph.inverse(r).unwrap();
                    assert_eq!(graph.resolve(turned, inv), Some(a.as_str()), "{} by {}", a, r);
                }
            }
        }
    }

    #[test]
    fn cartesian_turns() {
        let g = DirectionGraph::cartesian_2d();
        assert_eq!(g.resolve("n", "f"), Some("n"));
        assert_eq!(g.resolve("n", "r"), Some("e"));
        assert_eq!(g.resolve("s", "fl"), Some("se"));
        assert_eq!(g.resolve("w", "b"), Some("e"));
        assert_eq!(g.opposite("ne"), Some("sw"));
    }

    #[test]
    fn hex_turns() {
        let g = DirectionGraph::hexagonal_2d();
        assert_eq!(g.resolve("n", "fr"), Some("ne"));
        assert_eq!(g.resolve("n", "ffr"), Some("nne"));
        assert_eq!(g.resolve("s", "b"), Some("n"));
    }

    #[test]
    fn foreign_directions_fail() {
        let g = DirectionGraph::orthogonal_2d();
        assert_eq!(g.resolve("ne", "f"), None);
        assert_eq!(g.resolve("n", "ffr"), None);
        assert!(!g.is_relative_kind("warp"));
        assert!(g.is_relative_kind("edge"));
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(DirectionGraph::new(&["n", "s"], &["f"]).is_none());
        assert!(DirectionGraph::new(&["n", "n"], &["f", "b"]).is_none());
        let empty: [&str; 0] = [];
        assert!(DirectionGraph::new(&empty, &empty).is_none());
    }

    #[test]
    fn survives_serde() {
        let g = DirectionGraph::cartesian_2d().with_relative_kinds(&["edge", "vertex", "layer"]);
        let json = serde_json::to_string(&g).unwrap();
        let back: DirectionGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.resolve("e", "r"), Some("s"));
        assert!(back.is_relative_kind("layer"));
    }
}
