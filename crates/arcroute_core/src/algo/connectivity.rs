//! Connectivity queries behind the solvers' feasibility screens and the
//! Eulerian preconditions.

use std::collections::VecDeque;

use crate::graph::{Graph, VertexId};

/// Component index per vertex (0-based, indexed by `vertex id - 1`) under
/// the undirected projection. Component numbering follows ascending lowest
/// member id.
pub fn components(graph: &Graph) -> Vec<usize> {
    let n = graph.vertex_count();
    let mut comp = vec![usize::MAX; n];
    let mut next = 0;
    for start in 1..=n {
        if comp[start - 1] != usize::MAX {
            continue;
        }
        comp[start - 1] = next;
        let mut queue = VecDeque::from([start]);
        while let Some(v) = queue.pop_front() {
            for t in graph.symmetric_traversals_from(v) {
                if comp[t.to - 1] == usize::MAX {
                    comp[t.to - 1] = next;
                    queue.push_back(t.to);
                }
            }
        }
        next += 1;
    }
    comp
}

/// Vertices reachable from `start` under true traversal rules.
pub fn reachable_from(graph: &Graph, start: VertexId) -> Vec<bool> {
    let mut seen = vec![false; graph.vertex_count()];
    seen[start - 1] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for t in graph.traversals_from(v) {
            if !seen[t.to - 1] {
                seen[t.to - 1] = true;
                queue.push_back(t.to);
            }
        }
    }
    seen
}

/// Vertices from which `start` is reachable under true traversal rules
/// (reverse BFS).
pub fn coreachable_to(graph: &Graph, start: VertexId) -> Vec<bool> {
    let mut seen = vec![false; graph.vertex_count()];
    seen[start - 1] = true;
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        for &id in graph.incident_links(v) {
            let link = graph.link(id);
            let source = if link.directed {
                if link.to != v {
                    continue;
                }
                link.from
            } else {
                link.other_end(v)
            };
            if !seen[source - 1] {
                seen[source - 1] = true;
                queue.push_back(source);
            }
        }
    }
    seen
}

/// True when `v` lies in the depot's strongly connected region: the depot
/// reaches it and it reaches the depot.
pub fn strongly_connected_with(
    reachable: &[bool],
    coreachable: &[bool],
    v: VertexId,
) -> bool {
    reachable[v - 1] && coreachable[v - 1]
}
