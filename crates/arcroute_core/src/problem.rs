//! Binding of a graph, its required links and a depot into the immutable
//! object solvers consume.

use crate::algo::connectivity;
use crate::graph::{Graph, GraphKind, LinkId, VertexId};
use crate::{Error, Result};

/// Postman (every link required) vs rural postman (a subset).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProblemClass {
    Postman,
    RuralPostman,
}

#[derive(Clone, Debug)]
pub struct Problem {
    graph: Graph,
    required: Vec<LinkId>,
    name: String,
}

impl Problem {
    /// Postman problem: every link of the graph is required, whatever the
    /// parsed flags say.
    pub fn postman(mut graph: Graph, name: impl Into<String>) -> Self {
        for id in 1..=graph.link_count() {
            graph.set_required(id, true);
        }
        let required = (1..=graph.link_count()).collect();
        Self {
            graph,
            required,
            name: name.into(),
        }
    }

    /// Rural postman problem: the required set comes from the link flags.
    pub fn rural(graph: Graph, name: impl Into<String>) -> Self {
        let required = graph.required_links();
        Self {
            graph,
            required,
            name: name.into(),
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn required(&self) -> &[LinkId] {
        &self.required
    }

    pub fn depot(&self) -> VertexId {
        self.graph.depot()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> ProblemClass {
        if self.required.len() == self.graph.link_count() {
            ProblemClass::Postman
        } else {
            ProblemClass::RuralPostman
        }
    }

    /// Checks that every required link can be served on a closed walk from
    /// the depot under the flavor's connectivity rules, naming the first
    /// offender by ascending link id.
    pub fn check_feasible(&self) -> Result<()> {
        if self.required.is_empty() {
            return Ok(());
        }
        match self.graph.kind() {
            GraphKind::Undirected | GraphKind::Windy => {
                let comp = connectivity::components(&self.graph);
                let depot_comp = comp[self.depot() - 1];
                for &id in &self.required {
                    let link = self.graph.link(id);
                    if comp[link.from - 1] != depot_comp || comp[link.to - 1] != depot_comp {
                        return Err(Error::Infeasible { link_id: id });
                    }
                }
            }
            GraphKind::Directed | GraphKind::Mixed => {
                let fwd = connectivity::reachable_from(&self.graph, self.depot());
                let back = connectivity::coreachable_to(&self.graph, self.depot());
                for &id in &self.required {
                    let link = self.graph.link(id);
                    // An arc is serviceable when the depot reaches its tail
                    // and its head reaches the depot; an edge may be taken
                    // in either direction.
                    let serviceable = if link.directed {
                        fwd[link.from - 1] && back[link.to - 1]
                    } else {
                        (fwd[link.from - 1] && back[link.to - 1])
                            || (fwd[link.to - 1] && back[link.from - 1])
                    };
                    if !serviceable {
                        return Err(Error::Infeasible { link_id: id });
                    }
                }
            }
        }
        Ok(())
    }
}
