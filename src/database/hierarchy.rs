use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::HashMap;

/// Supertype graph used for member-resolution fallback.
///
/// Nodes are fully qualified type names, edges point from a type to its
/// direct supertypes. Traversal is a DFS whose visited set makes walks over
/// self-referential or cyclic input terminate instead of looping.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    graph: DiGraph<String, ()>,
    indices: HashMap<String, NodeIndex>,
}

impl TypeHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.indices.insert(name.to_string(), idx);
        idx
    }

    /// Record `ty` as directly extending/implementing `supertype`
    pub fn add_supertype(&mut self, ty: &str, supertype: &str) {
        let from = self.node(ty);
        let to = self.node(supertype);
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
    }

    /// `ty` together with every supertype reachable from it, `ty` first.
    /// Unknown types yield just themselves.
    pub fn closure(&self, ty: &str) -> Vec<String> {
        let Some(&start) = self.indices.get(ty) else {
            return vec![ty.to_string()];
        };

        let mut result = Vec::new();
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            result.push(self.graph[idx].clone());
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}
