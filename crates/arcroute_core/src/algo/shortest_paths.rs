//! All-pairs and single-source shortest paths.
//!
//! Costs are non-negative, so Floyd–Warshall and Dijkstra both apply; the
//! all-pairs form feeds matching weights, the single-source form feeds
//! local reroute checks. Ties on equal cost keep the lower-id intermediate
//! vertex so path reconstruction is deterministic.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::graph::{Graph, LinkId, Traversal, VertexId};
use crate::{Error, Result};

/// Sentinel for unreachable pairs; large enough that a sum of two never
/// wraps.
pub const INF: i64 = i64::MAX / 4;

/// Which traversal rule the path search follows.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CostView {
    /// Arcs one-way, edges per-direction cost.
    True,
    /// Every link both ways at its cheapest cost (undirected projection).
    Symmetric,
}

fn moves_from(graph: &Graph, v: VertexId, view: CostView) -> Vec<Traversal> {
    match view {
        CostView::True => graph.traversals_from(v),
        CostView::Symmetric => graph.symmetric_traversals_from(v),
    }
}

/// Dense all-pairs result: cost matrix, predecessor matrix and the
/// cheapest direct link per ordered vertex pair.
pub struct ShortestPaths {
    n: usize,
    dist: Vec<i64>,
    pred: Vec<VertexId>,
    hop: Vec<LinkId>,
}

impl ShortestPaths {
    pub fn dist(&self, u: VertexId, v: VertexId) -> i64 {
        self.dist[(u - 1) * self.n + (v - 1)]
    }

    pub fn reachable(&self, u: VertexId, v: VertexId) -> bool {
        self.dist(u, v) < INF
    }

    fn pred(&self, u: VertexId, v: VertexId) -> VertexId {
        self.pred[(u - 1) * self.n + (v - 1)]
    }

    fn hop(&self, u: VertexId, v: VertexId) -> LinkId {
        self.hop[(u - 1) * self.n + (v - 1)]
    }

    /// Vertex sequence of the shortest `u -> v` path, endpoints included.
    /// A predecessor chain longer than the vertex count is a corrupted
    /// matrix and reported as an internal invariant violation.
    pub fn path_vertices(&self, u: VertexId, v: VertexId) -> Result<Vec<VertexId>> {
        if !self.reachable(u, v) {
            return Err(Error::invariant(format!(
                "path requested for unreachable pair ({u}, {v})"
            )));
        }
        let mut chain = vec![v];
        let mut at = v;
        while at != u {
            at = self.pred(u, at);
            if at == 0 || chain.len() > self.n {
                return Err(Error::invariant(format!(
                    "predecessor chain for ({u}, {v}) loops or escapes"
                )));
            }
            chain.push(at);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Link sequence of the shortest `u -> v` path.
    pub fn path_links(&self, u: VertexId, v: VertexId) -> Result<Vec<LinkId>> {
        let vertices = self.path_vertices(u, v)?;
        let mut links = Vec::with_capacity(vertices.len().saturating_sub(1));
        for pair in vertices.windows(2) {
            let hop = self.hop(pair[0], pair[1]);
            if hop == 0 {
                return Err(Error::invariant(format!(
                    "no direct link behind path step {} -> {}",
                    pair[0], pair[1]
                )));
            }
            links.push(hop);
        }
        Ok(links)
    }
}

/// Floyd–Warshall over the chosen cost view. O(V^3).
pub fn all_pairs(graph: &Graph, view: CostView) -> ShortestPaths {
    let n = graph.vertex_count();
    let mut dist = vec![INF; n * n];
    let mut pred = vec![0; n * n];
    let mut hop = vec![0; n * n];

    for v in 1..=n {
        dist[(v - 1) * n + (v - 1)] = 0;
    }
    for u in 1..=n {
        for t in moves_from(graph, u, view) {
            if t.to == u {
                continue;
            }
            let slot = (u - 1) * n + (t.to - 1);
            if t.cost < dist[slot] || (t.cost == dist[slot] && t.link_id < hop[slot]) {
                dist[slot] = t.cost;
                pred[slot] = u;
                hop[slot] = t.link_id;
            }
        }
    }

    for k in 0..n {
        for i in 0..n {
            let ik = dist[i * n + k];
            if ik >= INF {
                continue;
            }
            for j in 0..n {
                let kj = dist[k * n + j];
                if kj >= INF {
                    continue;
                }
                let through = ik + kj;
                if through < dist[i * n + j] {
                    dist[i * n + j] = through;
                    pred[i * n + j] = pred[k * n + j];
                }
            }
        }
    }

    ShortestPaths { n, dist, pred, hop }
}

/// Single-source Dijkstra with predecessor links.
pub struct SingleSource {
    source: VertexId,
    dist: Vec<i64>,
    pred_vertex: Vec<VertexId>,
    pred_link: Vec<LinkId>,
}

impl SingleSource {
    pub fn dist(&self, v: VertexId) -> i64 {
        self.dist[v - 1]
    }

    pub fn reachable(&self, v: VertexId) -> bool {
        self.dist(v) < INF
    }

    pub fn path_links(&self, target: VertexId) -> Result<Vec<LinkId>> {
        if !self.reachable(target) {
            return Err(Error::invariant(format!(
                "path requested for unreachable target {target}"
            )));
        }
        let mut links = Vec::new();
        let mut at = target;
        while at != self.source {
            let link = self.pred_link[at - 1];
            if link == 0 || links.len() > self.dist.len() {
                return Err(Error::invariant(format!(
                    "predecessor chain for target {target} loops or escapes"
                )));
            }
            links.push(link);
            at = self.pred_vertex[at - 1];
        }
        links.reverse();
        Ok(links)
    }
}

pub fn single_source(graph: &Graph, source: VertexId, view: CostView) -> SingleSource {
    let n = graph.vertex_count();
    let mut dist = vec![INF; n];
    let mut pred_vertex = vec![0; n];
    let mut pred_link = vec![0; n];
    dist[source - 1] = 0;

    let mut heap = BinaryHeap::new();
    heap.push(Reverse((0i64, source)));
    while let Some(Reverse((d, v))) = heap.pop() {
        if d > dist[v - 1] {
            continue;
        }
        for t in moves_from(graph, v, view) {
            if t.to == v {
                continue;
            }
            let next = d + t.cost;
            if next < dist[t.to - 1] {
                dist[t.to - 1] = next;
                pred_vertex[t.to - 1] = v;
                pred_link[t.to - 1] = t.link_id;
                heap.push(Reverse((next, t.to)));
            }
        }
    }

    SingleSource {
        source,
        dist,
        pred_vertex,
        pred_link,
    }
}

#[cfg(test)]
mod tests {
    use super::{CostView, INF, all_pairs, single_source};
    use crate::graph::{Graph, GraphKind};

    fn square() -> Graph {
        let mut g = Graph::new(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 5).expect("edge");
        g.add_edge(2, 3, 3).expect("edge");
        g.add_edge(3, 4, 7).expect("edge");
        g.add_edge(4, 1, 2).expect("edge");
        g
    }

    #[test]
    fn all_pairs_matches_hand_computed_square_distances() {
        let sp = all_pairs(&square(), CostView::True);
        assert_eq!(sp.dist(1, 1), 0);
        assert_eq!(sp.dist(1, 2), 5);
        assert_eq!(sp.dist(1, 3), 8);
        assert_eq!(sp.dist(1, 4), 2);
        assert_eq!(sp.dist(2, 4), 7);
    }

    #[test]
    fn all_pairs_reports_unreachable_pairs_as_infinite() {
        let mut g = Graph::new(GraphKind::Directed, 3);
        g.add_arc(1, 2, 1).expect("arc");
        let sp = all_pairs(&g, CostView::True);
        assert_eq!(sp.dist(2, 1), INF);
        assert!(!sp.reachable(1, 3));
        assert!(sp.reachable(1, 2));
    }

    #[test]
    fn path_links_reconstruct_the_shortest_route() {
        let sp = all_pairs(&square(), CostView::True);
        assert_eq!(sp.path_vertices(2, 4).expect("path"), [2, 1, 4]);
        assert_eq!(sp.path_links(2, 4).expect("path"), [1, 4]);
    }

    #[test]
    fn equal_cost_paths_prefer_the_lower_id_intermediate() {
        // 1-2-4 and 1-3-4 both cost 2; vertex 2 must win.
        let mut g = Graph::new(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1).expect("edge");
        g.add_edge(1, 3, 1).expect("edge");
        g.add_edge(2, 4, 1).expect("edge");
        g.add_edge(3, 4, 1).expect("edge");
        let sp = all_pairs(&g, CostView::True);
        assert_eq!(sp.dist(1, 4), 2);
        assert_eq!(sp.path_vertices(1, 4).expect("path"), [1, 2, 4]);
    }

    #[test]
    fn parallel_links_of_equal_cost_prefer_the_lower_id() {
        let mut g = Graph::new(GraphKind::Undirected, 2);
        let first = g.add_edge(1, 2, 4).expect("edge");
        let _second = g.add_edge(1, 2, 4).expect("edge");
        let sp = all_pairs(&g, CostView::True);
        assert_eq!(sp.path_links(1, 2).expect("path"), [first]);
    }

    #[test]
    fn corrupted_predecessor_chain_is_reported_not_looped() {
        let mut sp = all_pairs(&square(), CostView::True);
        // Force a cycle into the predecessor matrix: pred(1, 2) = 2.
        sp.pred[(1 - 1) * sp.n + (2 - 1)] = 2;
        let err = sp.path_vertices(1, 2).expect_err("loop must be detected");
        assert!(err.to_string().contains("loops or escapes"));
    }

    #[test]
    fn symmetric_view_lets_arcs_run_backwards() {
        let mut g = Graph::new(GraphKind::Directed, 2);
        g.add_arc(1, 2, 3).expect("arc");
        let sp = all_pairs(&g, CostView::Symmetric);
        assert_eq!(sp.dist(2, 1), 3);
    }

    #[test]
    fn symmetric_view_uses_the_cheaper_windy_cost() {
        let mut g = Graph::new(GraphKind::Windy, 2);
        g.add_windy_edge(1, 2, 9, 4).expect("edge");
        let sp = all_pairs(&g, CostView::Symmetric);
        assert_eq!(sp.dist(1, 2), 4);
        assert_eq!(sp.dist(2, 1), 4);
    }

    #[test]
    fn single_source_agrees_with_all_pairs() {
        let g = square();
        let sp = all_pairs(&g, CostView::True);
        let ss = single_source(&g, 2, CostView::True);
        for v in 1..=4 {
            assert_eq!(ss.dist(v), sp.dist(2, v));
        }
        assert_eq!(ss.path_links(4).expect("path"), [1, 4]);
    }

    #[test]
    fn single_source_respects_arc_direction_in_true_view() {
        let mut g = Graph::new(GraphKind::Directed, 3);
        g.add_arc(1, 2, 1).expect("arc");
        g.add_arc(2, 3, 1).expect("arc");
        let ss = single_source(&g, 3, CostView::True);
        assert!(!ss.reachable(1));
    }
}
