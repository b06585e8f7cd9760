//! Mixed Chinese Postman, Frederickson's two-phase heuristic.
//!
//! Both sub-procedures turn the mixed graph into a fully oriented,
//! in/out-balanced multigraph (a valid mixed Eulerian multigraph) and the
//! cheaper circuit wins:
//!
//! 1. parity repair on the undirected projection, then orient-and-balance;
//! 2. orient-and-balance first, then parity repair and a final balance of
//!    whatever the repair introduced.

use crate::algo::euler::{EulerGraph, TraversalPreference};
use crate::algo::flow::FlowNetwork;
use crate::algo::matching;
use crate::algo::shortest_paths::{self, CostView, ShortestPaths};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::{Direction, Graph, LinkId, VertexId};
use crate::problem::Problem;
use crate::route::Route;
use crate::{Error, Result};

/// One traversal of the final augmented multigraph.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OrientedLink {
    pub source: LinkId,
    pub direction: Direction,
    pub is_duplicate: bool,
}

impl OrientedLink {
    pub(crate) fn endpoints(&self, graph: &Graph) -> (VertexId, VertexId) {
        let link = graph.link(self.source);
        match self.direction {
            Direction::Forward => (link.from, link.to),
            Direction::Reverse => (link.to, link.from),
        }
    }

    pub(crate) fn cost(&self, graph: &Graph) -> i64 {
        graph.link(self.source).cost_in(self.direction)
    }
}

/// Working entry: orientation `None` means the edge has not been assigned
/// a direction yet.
#[derive(Clone, Copy, Debug)]
struct WorkLink {
    source: LinkId,
    orientation: Option<Direction>,
    is_duplicate: bool,
}

fn initial_multiset(graph: &Graph) -> Vec<WorkLink> {
    graph
        .links()
        .map(|l| WorkLink {
            source: l.id,
            orientation: if l.directed {
                Some(Direction::Forward)
            } else {
                None
            },
            is_duplicate: false,
        })
        .collect()
}

/// Total-degree parity repair on the undirected projection: odd vertices
/// are matched over symmetric shortest paths and the paths' links are
/// copied in (arcs keep their direction, edges stay open).
fn parity_repair(
    graph: &Graph,
    working: &mut Vec<WorkLink>,
    sp_sym: &ShortestPaths,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let n = graph.vertex_count();
    let mut degree = vec![0usize; n];
    for w in working.iter() {
        let link = graph.link(w.source);
        if link.is_self_loop() {
            degree[link.from - 1] += 2;
        } else {
            degree[link.from - 1] += 1;
            degree[link.to - 1] += 1;
        }
    }
    let odd: Vec<VertexId> = (1..=n).filter(|&v| degree[v - 1] % 2 == 1).collect();
    if odd.is_empty() {
        return Ok(());
    }

    let k = odd.len();
    let mut weights = vec![vec![0i64; k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let d = sp_sym.dist(odd[i], odd[j]);
            weights[i][j] = d;
            weights[j][i] = d;
        }
    }
    let pairs = matching::min_cost_pairs(&weights, cancel, diagnostics)?;
    for (a, b) in pairs {
        for id in sp_sym.path_links(odd[a], odd[b])? {
            let link = graph.link(id);
            working.push(WorkLink {
                source: id,
                orientation: if link.directed {
                    Some(Direction::Forward)
                } else {
                    None
                },
                is_duplicate: true,
            });
        }
    }
    Ok(())
}

/// Orients every open edge by the imbalance-reducing default rule, then
/// repairs the remaining in/out imbalance with duplicated shortest paths,
/// as in the directed solver.
fn orient_and_balance(
    graph: &Graph,
    working: &mut Vec<WorkLink>,
    sp_true: &ShortestPaths,
    cancel: &CancelToken,
) -> Result<()> {
    let n = graph.vertex_count();
    let mut imbalance = vec![0i64; n];
    let bump = |imbalance: &mut Vec<i64>, tail: VertexId, head: VertexId| {
        imbalance[tail - 1] -= 1;
        imbalance[head - 1] += 1;
    };

    for w in working.iter() {
        if let Some(d) = w.orientation {
            let link = graph.link(w.source);
            let (tail, head) = match d {
                Direction::Forward => (link.from, link.to),
                Direction::Reverse => (link.to, link.from),
            };
            bump(&mut imbalance, tail, head);
        }
    }

    for w in working.iter_mut() {
        if w.orientation.is_some() {
            continue;
        }
        let link = graph.link(w.source);
        if link.is_self_loop() {
            w.orientation = Some(Direction::Forward);
            continue;
        }
        let (u, v) = (link.from, link.to);
        let forward_penalty = (imbalance[u - 1] - 1).abs() + (imbalance[v - 1] + 1).abs();
        let reverse_penalty = (imbalance[v - 1] - 1).abs() + (imbalance[u - 1] + 1).abs();
        let direction = if reverse_penalty < forward_penalty {
            Direction::Reverse
        } else {
            Direction::Forward
        };
        let (tail, head) = match direction {
            Direction::Forward => (u, v),
            Direction::Reverse => (v, u),
        };
        bump(&mut imbalance, tail, head);
        w.orientation = Some(direction);
    }

    let supplies: Vec<(VertexId, i64)> = (1..=n)
        .filter(|&v| imbalance[v - 1] > 0)
        .map(|v| (v, imbalance[v - 1]))
        .collect();
    let deficits: Vec<(VertexId, i64)> = (1..=n)
        .filter(|&v| imbalance[v - 1] < 0)
        .map(|v| (v, -imbalance[v - 1]))
        .collect();
    if supplies.is_empty() {
        return Ok(());
    }

    let source = 0;
    let sink = supplies.len() + deficits.len() + 1;
    let mut net = FlowNetwork::new(sink + 1);
    let total_excess: i64 = supplies.iter().map(|&(_, e)| e).sum();
    for (i, &(_, excess)) in supplies.iter().enumerate() {
        net.add_arc(source, 1 + i, excess, 0);
    }
    for (j, &(_, deficit)) in deficits.iter().enumerate() {
        net.add_arc(1 + supplies.len() + j, sink, deficit, 0);
    }
    let mut pair_handles = Vec::new();
    for (i, &(s, _)) in supplies.iter().enumerate() {
        for (j, &(d, _)) in deficits.iter().enumerate() {
            if sp_true.reachable(s, d) {
                let handle =
                    net.add_arc(1 + i, 1 + supplies.len() + j, total_excess, sp_true.dist(s, d));
                pair_handles.push((handle, s, d));
            }
        }
    }
    let (flow, _) = net.min_cost_flow(source, sink, cancel)?;
    if flow != total_excess {
        return Err(Error::invariant(format!(
            "orientation balancing shipped {flow} of {total_excess} units"
        )));
    }

    for (handle, s, d) in pair_handles {
        let units = net.flow_on(handle);
        for _ in 0..units {
            let vertices = sp_true.path_vertices(s, d)?;
            let links = sp_true.path_links(s, d)?;
            for (hop, id) in vertices.windows(2).zip(links) {
                let link = graph.link(id);
                let direction = if link.directed {
                    Direction::Forward
                } else {
                    link.direction_from(hop[0])
                };
                working.push(WorkLink {
                    source: id,
                    orientation: Some(direction),
                    is_duplicate: true,
                });
            }
        }
    }
    Ok(())
}

fn finish(working: Vec<WorkLink>) -> Result<Vec<OrientedLink>> {
    working
        .into_iter()
        .map(|w| {
            let direction = w.orientation.ok_or_else(|| {
                Error::invariant(format!("link {} left unoriented", w.source))
            })?;
            Ok(OrientedLink {
                source: w.source,
                direction,
                is_duplicate: w.is_duplicate,
            })
        })
        .collect()
}

fn multiset_cost(graph: &Graph, multiset: &[OrientedLink]) -> Result<i64> {
    let mut total = 0i64;
    for entry in multiset {
        total = total
            .checked_add(entry.cost(graph))
            .ok_or(Error::CostOverflow)?;
    }
    Ok(total)
}

/// Runs both sub-procedures and returns the cheaper fully oriented
/// multiset; ties go to the first.
pub(crate) fn best_augmentation(
    problem: &Problem,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<OrientedLink>> {
    let graph = problem.graph();
    let sp_sym = shortest_paths::all_pairs(graph, CostView::Symmetric);
    let sp_true = shortest_paths::all_pairs(graph, CostView::True);

    let mut even_first = initial_multiset(graph);
    parity_repair(graph, &mut even_first, &sp_sym, cancel, diagnostics)?;
    orient_and_balance(graph, &mut even_first, &sp_true, cancel)?;
    let even_first = finish(even_first)?;
    let even_cost = multiset_cost(graph, &even_first)?;

    let mut inout_first = initial_multiset(graph);
    orient_and_balance(graph, &mut inout_first, &sp_true, cancel)?;
    parity_repair(graph, &mut inout_first, &sp_sym, cancel, diagnostics)?;
    orient_and_balance(graph, &mut inout_first, &sp_true, cancel)?;
    let inout_first = finish(inout_first)?;
    let inout_cost = multiset_cost(graph, &inout_first)?;

    log::debug!("frederickson: even_first={even_cost} inout_first={inout_cost}");
    if even_cost <= inout_cost {
        Ok(even_first)
    } else {
        Ok(inout_first)
    }
}

pub(crate) fn route_of_multiset(
    problem: &Problem,
    multiset: &[OrientedLink],
    cancel: &CancelToken,
) -> Result<Route> {
    let graph = problem.graph();
    let mut euler = EulerGraph::new(graph.vertex_count());
    for entry in multiset {
        euler.add_oriented(graph.link(entry.source), entry.direction);
    }
    let steps = euler.extract_circuit(
        problem.depot(),
        TraversalPreference::LowestLinkId,
        cancel,
    )?;
    Ok(Route::from_steps(problem.depot(), steps))
}

pub fn solve(
    problem: &Problem,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Route> {
    let depot = problem.depot();
    if problem.required().is_empty() {
        return Ok(Route::trivial(depot));
    }
    problem.check_feasible()?;

    let multiset = best_augmentation(problem, cancel, diagnostics)?;
    route_of_multiset(problem, &multiset, cancel)
}

#[cfg(test)]
mod tests {
    use super::solve;
    use crate::cancel::CancelToken;
    use crate::diagnostics::Diagnostics;
    use crate::graph::{Graph, GraphKind};
    use crate::problem::Problem;

    fn run(graph: Graph) -> crate::Result<crate::route::Route> {
        let problem = Problem::postman(graph, "t");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())?;
        route.validate(&problem)?;
        Ok(route)
    }

    #[test]
    fn mixed_triangle_is_solved_without_duplicates() {
        let mut g = Graph::new(GraphKind::Mixed, 3);
        g.add_arc(1, 2, 2).expect("arc");
        g.add_edge(2, 3, 3).expect("edge");
        g.add_edge(3, 1, 4).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 9);
        assert_eq!(route.traversals().len(), 3);
    }

    #[test]
    fn edge_orientation_absorbs_the_arc_imbalance() {
        let mut g = Graph::new(GraphKind::Mixed, 2);
        g.add_arc(1, 2, 3).expect("arc");
        g.add_edge(1, 2, 4).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 7);
        assert_eq!(route.traversals().len(), 2);
    }

    #[test]
    fn parallel_arcs_force_a_duplicated_return() {
        let mut g = Graph::new(GraphKind::Mixed, 2);
        g.add_arc(1, 2, 1).expect("arc");
        g.add_arc(1, 2, 1).expect("arc");
        g.add_edge(2, 1, 5).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.traversals().len(), 4);
        assert_eq!(route.total_cost().expect("cost"), 12);
    }

    #[test]
    fn cost_stays_within_twice_the_link_sum_lower_bound() {
        let mut g = Graph::new(GraphKind::Mixed, 4);
        g.add_arc(1, 2, 5).expect("arc");
        g.add_edge(2, 3, 3).expect("edge");
        g.add_arc(3, 4, 7).expect("arc");
        g.add_edge(4, 1, 2).expect("edge");
        g.add_edge(1, 3, 4).expect("edge");

        let lower_bound: i64 = 5 + 3 + 7 + 2 + 4;
        let route = run(g).expect("solve");
        assert!(route.total_cost().expect("cost") <= 2 * lower_bound);
    }

    #[test]
    fn depot_only_instance_returns_the_trivial_route() {
        let g = Graph::new(GraphKind::Mixed, 1);
        let route = run(g).expect("solve");
        assert_eq!(route.vertex_sequence(), [1]);
    }

    #[test]
    fn unreachable_required_arc_is_infeasible() {
        let mut g = Graph::new(GraphKind::Mixed, 4);
        g.add_edge(1, 2, 1).expect("edge");
        g.add_arc(3, 4, 1).expect("arc");
        let problem = Problem::postman(g, "t");
        let err = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect_err("island arc");
        assert!(matches!(err, crate::Error::Infeasible { link_id: 2 }));
    }
}
