//! Graph model shared by all solvers.
//!
//! One flat representation covers the four flavors; `GraphKind` tags which
//! link constructors are legal and how traversal costs are read. Vertices
//! and links live in dense id-indexed arrays, so copies are cheap and
//! cross-references are indices rather than pointers.

mod link;
mod vertex;

pub use link::{Direction, Link, LinkId};
pub use vertex::Vertex;

use crate::{Error, Result};

pub type VertexId = usize;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GraphKind {
    Undirected,
    Directed,
    Mixed,
    Windy,
}

impl GraphKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Undirected => "undirected",
            Self::Directed => "directed",
            Self::Mixed => "mixed",
            Self::Windy => "windy",
        }
    }
}

/// One legal move out of a vertex: which link, where it lands, what it
/// costs in the direction taken.
#[derive(Clone, Copy, Debug)]
pub struct Traversal {
    pub link_id: LinkId,
    pub to: VertexId,
    pub cost: i64,
    pub direction: Direction,
}

#[derive(Clone, Debug)]
pub struct Graph {
    kind: GraphKind,
    vertices: Vec<Vertex>,
    links: Vec<Link>,
    incidence: Vec<Vec<LinkId>>,
    depot: VertexId,
}

impl Graph {
    /// Creates a graph with vertices `1..=n`. The depot defaults to vertex 1.
    pub fn new(kind: GraphKind, n: usize) -> Self {
        let vertices = (1..=n).map(Vertex::new).collect();
        Self {
            kind,
            vertices,
            links: Vec::new(),
            incidence: vec![Vec::new(); n],
            depot: if n > 0 { 1 } else { 0 },
        }
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn add_vertex(&mut self) -> VertexId {
        let id = self.vertices.len() + 1;
        self.vertices.push(Vertex::new(id));
        self.incidence.push(Vec::new());
        if self.depot == 0 {
            self.depot = id;
        }
        id
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id - 1]
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> &mut Vertex {
        &mut self.vertices[id - 1]
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id - 1]
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    pub fn depot(&self) -> VertexId {
        self.depot
    }

    pub fn set_depot(&mut self, id: VertexId) -> Result<()> {
        if id == 0 || id > self.vertices.len() {
            return Err(Error::invalid_input(format!(
                "depot id {id} does not reference an existing vertex"
            )));
        }
        self.depot = id;
        Ok(())
    }

    pub fn set_coords(&mut self, id: VertexId, x: f64, y: f64) -> Result<()> {
        if id == 0 || id > self.vertices.len() {
            return Err(Error::invalid_input(format!(
                "vertex id {id} does not exist"
            )));
        }
        self.vertices[id - 1].coords = Some((x, y));
        Ok(())
    }

    pub fn set_required(&mut self, id: LinkId, required: bool) {
        self.links[id - 1].required = required;
    }

    pub fn set_label(&mut self, id: LinkId, label: impl Into<String>) {
        self.links[id - 1].label = Some(label.into());
    }

    /// Adds an undirected edge. Legal on undirected, mixed and windy graphs
    /// (a windy edge added this way is symmetric).
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, cost: i64) -> Result<LinkId> {
        if self.kind == GraphKind::Directed {
            return Err(Error::invalid_input(
                "cannot add an undirected edge to a directed graph",
            ));
        }
        self.push_link(from, to, cost, cost, false)
    }

    /// Adds a directed arc. Legal on directed and mixed graphs.
    pub fn add_arc(&mut self, from: VertexId, to: VertexId, cost: i64) -> Result<LinkId> {
        match self.kind {
            GraphKind::Directed | GraphKind::Mixed => self.push_link(from, to, cost, cost, true),
            _ => Err(Error::invalid_input(format!(
                "cannot add an arc to an {} graph",
                self.kind.as_str()
            ))),
        }
    }

    /// Adds a windy edge with direction-dependent costs.
    pub fn add_windy_edge(
        &mut self,
        from: VertexId,
        to: VertexId,
        cost: i64,
        reverse_cost: i64,
    ) -> Result<LinkId> {
        if self.kind != GraphKind::Windy {
            return Err(Error::invalid_input(format!(
                "cannot add a windy edge to an {} graph",
                self.kind.as_str()
            )));
        }
        self.push_link(from, to, cost, reverse_cost, false)
    }

    fn push_link(
        &mut self,
        from: VertexId,
        to: VertexId,
        cost: i64,
        reverse_cost: i64,
        directed: bool,
    ) -> Result<LinkId> {
        let n = self.vertices.len();
        if from == 0 || from > n || to == 0 || to > n {
            return Err(Error::invalid_input(format!(
                "link endpoints ({from}, {to}) must reference existing vertices (1..={n})"
            )));
        }
        if cost < 0 || reverse_cost < 0 {
            return Err(Error::invalid_input("link costs must be non-negative"));
        }

        let id = self.links.len() + 1;
        self.links.push(Link {
            id,
            from,
            to,
            cost,
            reverse_cost,
            directed,
            required: true,
            label: None,
        });

        self.incidence[from - 1].push(id);
        if to != from {
            self.incidence[to - 1].push(id);
        }

        let loop_bump = if from == to { 2 } else { 1 };
        self.vertices[from - 1].degree += loop_bump;
        if to != from {
            self.vertices[to - 1].degree += 1;
        }
        if directed {
            self.vertices[from - 1].out_degree += 1;
            self.vertices[to - 1].in_degree += 1;
        }

        Ok(id)
    }

    /// Ids of links incident to `v`, in insertion order.
    pub fn incident_links(&self, v: VertexId) -> &[LinkId] {
        &self.incidence[v - 1]
    }

    /// Legal moves out of `v` under the flavor's true traversal rules:
    /// arcs leave only from their tail, edges leave either endpoint at the
    /// direction-specific cost.
    pub fn traversals_from(&self, v: VertexId) -> Vec<Traversal> {
        let mut moves = Vec::with_capacity(self.incidence[v - 1].len());
        for &id in &self.incidence[v - 1] {
            let link = &self.links[id - 1];
            if link.directed {
                if link.from == v {
                    moves.push(Traversal {
                        link_id: id,
                        to: link.to,
                        cost: link.cost,
                        direction: Direction::Forward,
                    });
                }
            } else {
                let direction = link.direction_from(v);
                moves.push(Traversal {
                    link_id: id,
                    to: link.other_end(v),
                    cost: link.cost_in(direction),
                    direction,
                });
            }
        }
        moves
    }

    /// Moves out of `v` ignoring directedness, each at the link's cheapest
    /// cost. This is the projection used for component distances and for
    /// parity repair on mixed graphs.
    pub fn symmetric_traversals_from(&self, v: VertexId) -> Vec<Traversal> {
        let mut moves = Vec::with_capacity(self.incidence[v - 1].len());
        for &id in &self.incidence[v - 1] {
            let link = &self.links[id - 1];
            moves.push(Traversal {
                link_id: id,
                to: link.other_end(v),
                cost: link.symmetric_cost(),
                direction: link.direction_from(v),
            });
        }
        moves
    }

    pub fn required_links(&self) -> Vec<LinkId> {
        self.links
            .iter()
            .filter(|l| l.required)
            .map(|l| l.id)
            .collect()
    }

    /// Copy with the same vertex set but only the listed links, renumbered
    /// densely. Vertices remember their host id in `match_id`.
    pub fn subgraph(&self, link_ids: &[LinkId]) -> Graph {
        let mut sub = Graph::new(self.kind, self.vertices.len());
        for v in 1..=self.vertices.len() {
            sub.vertices[v - 1].coords = self.vertices[v - 1].coords;
            sub.vertices[v - 1].match_id = Some(v);
        }
        sub.depot = self.depot;
        for &id in link_ids {
            let link = &self.links[id - 1];
            let copied = sub
                .push_link(link.from, link.to, link.cost, link.reverse_cost, link.directed)
                .expect("host link endpoints exist in the copy");
            sub.links[copied - 1].required = link.required;
            sub.links[copied - 1].label = link.label.clone();
        }
        sub
    }

    /// Recomputes (degree, in_degree, out_degree) per vertex from the link
    /// set. Used by tests to check the cached counters.
    pub fn recounted_degrees(&self) -> Vec<(usize, usize, usize)> {
        let mut counts = vec![(0usize, 0usize, 0usize); self.vertices.len()];
        for link in &self.links {
            if link.is_self_loop() {
                counts[link.from - 1].0 += 2;
            } else {
                counts[link.from - 1].0 += 1;
                counts[link.to - 1].0 += 1;
            }
            if link.directed {
                counts[link.from - 1].2 += 1;
                counts[link.to - 1].1 += 1;
            }
        }
        counts
    }
}
