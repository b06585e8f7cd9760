//! Kruskal minimum spanning tree / forest.

use crate::graph::{Graph, LinkId};

/// Path-compressing union-find over `0..n`.
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            let root = self.find(self.parent[x]);
            self.parent[x] = root;
        }
        self.parent[x]
    }

    /// Returns false when both elements were already in one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }
}

/// Edge set of a minimum spanning tree (forest when disconnected) over the
/// graph's undirected projection at symmetric costs. Equal weights break to
/// the lower link id; self-loops never qualify.
pub fn minimum_spanning_forest(graph: &Graph) -> Vec<LinkId> {
    let mut candidates: Vec<(i64, LinkId)> = graph
        .links()
        .filter(|l| !l.is_self_loop())
        .map(|l| (l.symmetric_cost(), l.id))
        .collect();
    candidates.sort();

    let mut uf = UnionFind::new(graph.vertex_count());
    let mut chosen = Vec::new();
    for (_, id) in candidates {
        let link = graph.link(id);
        if uf.union(link.from - 1, link.to - 1) {
            chosen.push(id);
        }
    }
    chosen
}
