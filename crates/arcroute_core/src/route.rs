//! Ordered walk of links returned by a solve, with cost accounting and
//! validity checking.

use itertools::Itertools;

use crate::algo::euler::Step;
use crate::graph::{Direction, Graph, LinkId, VertexId};
use crate::problem::Problem;
use crate::{Error, Result};

/// One link traversal of the walk, under the variant's true cost rule.
#[derive(Clone, Copy, Debug)]
pub struct Traversal {
    pub link_id: LinkId,
    pub from: VertexId,
    pub to: VertexId,
    pub cost: i64,
    pub direction: Direction,
}

#[derive(Clone, Debug)]
pub struct Route {
    depot: VertexId,
    traversals: Vec<Traversal>,
}

impl Route {
    /// The trivial route: stay at the depot.
    pub fn trivial(depot: VertexId) -> Self {
        Self {
            depot,
            traversals: Vec::new(),
        }
    }

    pub fn from_steps(depot: VertexId, steps: Vec<Step>) -> Self {
        let traversals = steps
            .into_iter()
            .map(|s| Traversal {
                link_id: s.source_link,
                from: s.from,
                to: s.to,
                cost: s.cost,
                direction: s.direction,
            })
            .collect();
        Self { depot, traversals }
    }

    pub fn depot(&self) -> VertexId {
        self.depot
    }

    pub fn traversals(&self) -> &[Traversal] {
        &self.traversals
    }

    /// Visited vertices, depot first and last. A trivial route is just
    /// `[depot]`.
    pub fn vertex_sequence(&self) -> Vec<VertexId> {
        let mut seq = Vec::with_capacity(self.traversals.len() + 1);
        seq.push(self.depot);
        seq.extend(self.traversals.iter().map(|t| t.to));
        seq
    }

    /// Checked sum of traversal costs.
    pub fn total_cost(&self) -> Result<i64> {
        let mut total = 0i64;
        for t in &self.traversals {
            total = total.checked_add(t.cost).ok_or(Error::CostOverflow)?;
        }
        Ok(total)
    }

    /// Traversals of links outside the required set.
    pub fn deadhead_count(&self, problem: &Problem) -> usize {
        let mut required = vec![false; problem.graph().link_count()];
        for &id in problem.required() {
            required[id - 1] = true;
        }
        self.traversals
            .iter()
            .filter(|t| !required[t.link_id - 1])
            .count()
    }

    /// How many times each required link is traversed, in required-set
    /// order.
    pub fn required_traversal_counts(&self, problem: &Problem) -> Vec<(LinkId, usize)> {
        problem
            .required()
            .iter()
            .map(|&id| {
                let count = self
                    .traversals
                    .iter()
                    .filter(|t| t.link_id == id)
                    .count();
                (id, count)
            })
            .collect()
    }

    /// A route is valid when consecutive traversals chain head-to-tail,
    /// it starts and ends at the depot, and every required link is
    /// traversed at least once.
    pub fn validate(&self, problem: &Problem) -> Result<()> {
        if let Some(first) = self.traversals.first() {
            if first.from != self.depot {
                return Err(Error::invariant(format!(
                    "route starts at vertex {} instead of the depot {}",
                    first.from, self.depot
                )));
            }
        }
        if let Some(last) = self.traversals.last() {
            if last.to != self.depot {
                return Err(Error::invariant(format!(
                    "route ends at vertex {} instead of the depot {}",
                    last.to, self.depot
                )));
            }
        }
        for (a, b) in self.traversals.iter().tuple_windows() {
            if a.to != b.from {
                return Err(Error::invariant(format!(
                    "route breaks between link {} (ends at {}) and link {} (starts at {})",
                    a.link_id, a.to, b.link_id, b.from
                )));
            }
        }
        for (id, count) in self.required_traversal_counts(problem) {
            if count == 0 {
                return Err(Error::invariant(format!(
                    "required link {id} is never traversed"
                )));
            }
        }
        Ok(())
    }

    /// Replays the walk against the host graph, recomputing each step's
    /// cost from the stored direction. Confirms the reported costs are
    /// honest and returns the recomputed total.
    pub fn replay_cost(&self, graph: &Graph) -> Result<i64> {
        let mut total = 0i64;
        let mut at = self.depot;
        for t in &self.traversals {
            let link = graph.link(t.link_id);
            let (expected_from, expected_to) = match t.direction {
                Direction::Forward => (link.from, link.to),
                Direction::Reverse => (link.to, link.from),
            };
            if t.from != expected_from || t.to != expected_to || t.from != at {
                return Err(Error::invariant(format!(
                    "replay of link {} diverges from the recorded walk",
                    t.link_id
                )));
            }
            total = total
                .checked_add(link.cost_in(t.direction))
                .ok_or(Error::CostOverflow)?;
            at = t.to;
        }
        if at != self.depot {
            return Err(Error::invariant("replay does not return to the depot"));
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::{Route, Traversal};
    use crate::graph::{Direction, Graph, GraphKind};
    use crate::problem::Problem;

    fn square_problem() -> Problem {
        let mut g = Graph::new(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 5).expect("edge");
        g.add_edge(2, 3, 3).expect("edge");
        g.add_edge(3, 4, 7).expect("edge");
        g.add_edge(4, 1, 2).expect("edge");
        Problem::postman(g, "square")
    }

    fn square_route() -> Route {
        Route {
            depot: 1,
            traversals: vec![
                Traversal {
                    link_id: 1,
                    from: 1,
                    to: 2,
                    cost: 5,
                    direction: Direction::Forward,
                },
                Traversal {
                    link_id: 2,
                    from: 2,
                    to: 3,
                    cost: 3,
                    direction: Direction::Forward,
                },
                Traversal {
                    link_id: 3,
                    from: 3,
                    to: 4,
                    cost: 7,
                    direction: Direction::Forward,
                },
                Traversal {
                    link_id: 4,
                    from: 4,
                    to: 1,
                    cost: 2,
                    direction: Direction::Forward,
                },
            ],
        }
    }

    #[test]
    fn trivial_route_is_the_depot_alone() {
        let route = Route::trivial(3);
        assert_eq!(route.vertex_sequence(), [3]);
        assert_eq!(route.total_cost().expect("cost"), 0);
    }

    #[test]
    fn square_walk_costs_seventeen_and_validates() {
        let problem = square_problem();
        let route = square_route();
        assert_eq!(route.total_cost().expect("cost"), 17);
        assert_eq!(route.vertex_sequence(), [1, 2, 3, 4, 1]);
        route.validate(&problem).expect("valid");
        assert_eq!(route.deadhead_count(&problem), 0);
    }

    #[test]
    fn replay_reproduces_the_reported_cost() {
        let problem = square_problem();
        let route = square_route();
        let replayed = route.replay_cost(problem.graph()).expect("replay");
        assert_eq!(replayed, route.total_cost().expect("cost"));
    }

    #[test]
    fn broken_chain_is_invalid() {
        let problem = square_problem();
        let mut route = square_route();
        route.traversals.swap(1, 2);
        let err = route.validate(&problem).expect_err("broken chain");
        assert!(err.to_string().contains("breaks"));
    }

    #[test]
    fn missing_required_link_is_invalid() {
        let problem = square_problem();
        let mut route = square_route();
        route.traversals.pop();
        let err = route.validate(&problem).expect_err("misses link 4");
        assert!(err.to_string().contains("ends at vertex 4"));
    }

    #[test]
    fn deadheads_count_non_required_traversals() {
        let mut g = Graph::new(GraphKind::Windy, 3);
        g.add_windy_edge(1, 2, 5, 7).expect("edge");
        let connector = g.add_windy_edge(2, 1, 5, 7).expect("edge");
        g.set_required(connector, false);
        let problem = Problem::rural(g, "t");

        let route = Route {
            depot: 1,
            traversals: vec![
                Traversal {
                    link_id: 1,
                    from: 1,
                    to: 2,
                    cost: 5,
                    direction: Direction::Forward,
                },
                Traversal {
                    link_id: connector,
                    from: 2,
                    to: 1,
                    cost: 5,
                    direction: Direction::Forward,
                },
            ],
        };
        assert_eq!(route.deadhead_count(&problem), 1);
        assert_eq!(route.required_traversal_counts(&problem), [(1, 1)]);
    }

    #[test]
    fn overflowing_costs_are_reported_not_wrapped() {
        let route = Route {
            depot: 1,
            traversals: vec![
                Traversal {
                    link_id: 1,
                    from: 1,
                    to: 2,
                    cost: i64::MAX - 1,
                    direction: Direction::Forward,
                },
                Traversal {
                    link_id: 2,
                    from: 2,
                    to: 1,
                    cost: i64::MAX - 1,
                    direction: Direction::Forward,
                },
            ],
        };
        assert!(matches!(
            route.total_cost(),
            Err(crate::Error::CostOverflow)
        ));
    }
}
