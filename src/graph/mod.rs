//! Dependency graph between drafted objects.
//!
//! Every vertex is an object id; an edge `from -> to` means `to` was
//! constructed from `from`. A tool can only reference objects that already
//! exist, so the graph is acyclic by construction; a debug check guards
//! that invariant.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use crate::container::ObjectId;
use crate::geom::curve::GObjectKind;

/// Failures of graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("unknown vertex {0}")]
    UnknownVertex(ObjectId),
}

/// Per-vertex metadata: what kind of object it is and which draw block it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vertex {
    pub kind: GObjectKind,
    pub block: String,
}

/// Dependency graph with sorted adjacency lists, keeping the recompute
/// order deterministic.
#[derive(Debug, Clone, Default)]
pub struct DepGraph {
    vertices: HashMap<ObjectId, Vertex>,
    edges: HashMap<ObjectId, Vec<ObjectId>>,
}

impl DepGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.vertices.contains_key(&id)
    }

    #[must_use]
    pub fn vertex(&self, id: ObjectId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Add a vertex. Idempotent: an existing id is left unchanged.
    pub fn add_vertex(&mut self, id: ObjectId, kind: GObjectKind, block: &str) {
        self.vertices.entry(id).or_insert_with(|| Vertex {
            kind,
            block: block.to_owned(),
        });
        self.edges.entry(id).or_default();
    }

    /// Add an edge from source to derived object. Both vertices must
    /// exist; duplicate edges are ignored.
    pub fn add_edge(&mut self, from: ObjectId, to: ObjectId) -> Result<(), GraphError> {
        if !self.vertices.contains_key(&from) {
            return Err(GraphError::UnknownVertex(from));
        }
        if !self.vertices.contains_key(&to) {
            return Err(GraphError::UnknownVertex(to));
        }

        let neighbours = self.edges.entry(from).or_default();
        if !neighbours.contains(&to) {
            neighbours.push(to);
            neighbours.sort_unstable();
        }

        debug_assert!(
            self.find_cycle().is_none(),
            "dependency graph must stay acyclic"
        );
        Ok(())
    }

    /// All transitive dependents of the given objects, each exactly once,
    /// in topological order (Kahn, with sorted neighbours as tie-break).
    /// The changed objects themselves are not part of the result.
    #[must_use]
    pub fn dependents_in_order(&self, changed: &[ObjectId]) -> Vec<ObjectId> {
        let mut reachable: HashSet<ObjectId> = HashSet::new();
        let mut queue: VecDeque<ObjectId> = changed.iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if let Some(neighbours) = self.edges.get(&id) {
                for &neighbour in neighbours {
                    if reachable.insert(neighbour) {
                        queue.push_back(neighbour);
                    }
                }
            }
        }

        // Kahn over the subgraph of reachable vertices.
        let mut indegree: HashMap<ObjectId, usize> =
            reachable.iter().map(|&id| (id, 0)).collect();
        for &id in &reachable {
            if let Some(neighbours) = self.edges.get(&id) {
                for neighbour in neighbours {
                    if let Some(count) = indegree.get_mut(neighbour) {
                        *count += 1;
                    }
                }
            }
        }

        let mut zero_indegree: Vec<ObjectId> = indegree
            .iter()
            .filter_map(|(&id, &count)| (count == 0).then_some(id))
            .collect();
        zero_indegree.sort_unstable();

        let mut queue: VecDeque<ObjectId> = zero_indegree.into();
        let mut order = Vec::with_capacity(reachable.len());
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(neighbours) = self.edges.get(&id) {
                for &neighbour in neighbours {
                    if let Some(count) = indegree.get_mut(&neighbour) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(neighbour);
                        }
                    }
                }
            }
        }

        order
    }

    /// Look for a cycle via DFS. Should always return `None`; the path in
    /// the result makes a broken invariant debuggable.
    #[must_use]
    pub fn find_cycle(&self) -> Option<Vec<ObjectId>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum VisitState {
            Unvisited,
            Visiting,
            Visited,
        }

        fn dfs(
            id: ObjectId,
            edges: &HashMap<ObjectId, Vec<ObjectId>>,
            state: &mut HashMap<ObjectId, VisitState>,
            stack: &mut Vec<ObjectId>,
        ) -> Option<Vec<ObjectId>> {
            state.insert(id, VisitState::Visiting);
            stack.push(id);

            if let Some(neighbours) = edges.get(&id) {
                for &neighbour in neighbours {
                    match state.get(&neighbour).copied().unwrap_or(VisitState::Unvisited) {
                        VisitState::Unvisited => {
                            if let Some(cycle) = dfs(neighbour, edges, state, stack) {
                                return Some(cycle);
                            }
                        }
                        VisitState::Visiting => {
                            if let Some(position) = stack.iter().position(|&n| n == neighbour) {
                                let mut cycle = stack[position..].to_vec();
                                cycle.push(neighbour);
                                return Some(cycle);
                            }
                        }
                        VisitState::Visited => {}
                    }
                }
            }

            stack.pop();
            state.insert(id, VisitState::Visited);
            None
        }

        let mut ids: Vec<ObjectId> = self.vertices.keys().copied().collect();
        ids.sort_unstable();

        let mut state: HashMap<ObjectId, VisitState> = HashMap::new();
        for id in ids {
            if state.get(&id).copied().unwrap_or(VisitState::Unvisited) == VisitState::Unvisited {
                let mut stack = Vec::new();
                if let Some(cycle) = dfs(id, &self.edges, &mut state, &mut stack) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(graph: &mut DepGraph, id: ObjectId) {
        graph.add_vertex(id, GObjectKind::Point, "draft");
    }

    #[test]
    fn add_vertex_is_idempotent() {
        let mut graph = DepGraph::new();
        vertex(&mut graph, 1);
        graph.add_vertex(1, GObjectKind::Arc, "other");
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.vertex(1).unwrap().kind, GObjectKind::Point);
    }

    #[test]
    fn edge_requires_both_vertices() {
        let mut graph = DepGraph::new();
        vertex(&mut graph, 1);
        assert_eq!(graph.add_edge(1, 2), Err(GraphError::UnknownVertex(2)));
        assert_eq!(graph.add_edge(3, 1), Err(GraphError::UnknownVertex(3)));
    }

    #[test]
    fn dependents_come_out_in_topological_order() {
        // 1 -> 2 -> 4, 1 -> 3 -> 4: 4 has to come after 2 and 3.
        let mut graph = DepGraph::new();
        for id in 1..=4 {
            vertex(&mut graph, id);
        }
        graph.add_edge(1, 2).unwrap();
        graph.add_edge(1, 3).unwrap();
        graph.add_edge(2, 4).unwrap();
        graph.add_edge(3, 4).unwrap();

        let order = graph.dependents_in_order(&[1]);
        assert_eq!(order, vec![2, 3, 4]);
    }

    #[test]
    fn dependents_exclude_the_changed_object() {
        let mut graph = DepGraph::new();
        vertex(&mut graph, 1);
        vertex(&mut graph, 2);
        graph.add_edge(1, 2).unwrap();

        assert_eq!(graph.dependents_in_order(&[1]), vec![2]);
        assert!(graph.dependents_in_order(&[2]).is_empty());
    }

    #[test]
    fn duplicate_edges_do_not_duplicate_work() {
        let mut graph = DepGraph::new();
        vertex(&mut graph, 1);
        vertex(&mut graph, 2);
        graph.add_edge(1, 2).unwrap();
        graph.add_edge(1, 2).unwrap();
        assert_eq!(graph.dependents_in_order(&[1]), vec![2]);
    }

    #[test]
    fn acyclic_graph_has_no_cycle() {
        let mut graph = DepGraph::new();
        vertex(&mut graph, 1);
        vertex(&mut graph, 2);
        graph.add_edge(1, 2).unwrap();
        assert!(graph.find_cycle().is_none());
    }
}
