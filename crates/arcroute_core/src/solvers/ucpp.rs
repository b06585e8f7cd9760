//! Undirected Chinese Postman, exact.
//!
//! Odd-degree vertices are paired by a minimum-cost perfect matching on
//! shortest-path distances; each matched pair's path is doubled with
//! parallel copies, after which the multigraph is Eulerian. Optimality
//! holds whenever the matching is exact.

use crate::algo::euler::{EulerGraph, TraversalPreference};
use crate::algo::matching;
use crate::algo::shortest_paths::{self, CostView};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::VertexId;
use crate::problem::Problem;
use crate::route::Route;
use crate::Result;

pub fn solve(
    problem: &Problem,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Route> {
    let graph = problem.graph();
    let depot = problem.depot();
    if problem.required().is_empty() {
        return Ok(Route::trivial(depot));
    }
    problem.check_feasible()?;

    let odd: Vec<VertexId> = graph
        .vertices()
        .filter(|v| v.has_odd_degree())
        .map(|v| v.id)
        .collect();
    log::debug!("ucpp: odd_vertices={}", odd.len());

    let mut euler = EulerGraph::new(graph.vertex_count());
    for link in graph.links() {
        euler.add_original(link);
    }

    if !odd.is_empty() {
        let sp = shortest_paths::all_pairs(graph, CostView::True);
        let k = odd.len();
        let mut weights = vec![vec![0i64; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let d = sp.dist(odd[i], odd[j]);
                weights[i][j] = d;
                weights[j][i] = d;
            }
        }
        let pairs = matching::min_cost_pairs(&weights, cancel, diagnostics)?;
        for (a, b) in pairs {
            for id in sp.path_links(odd[a], odd[b])? {
                euler.add_original(graph.link(id));
            }
        }
    }

    let steps = euler.extract_circuit(depot, TraversalPreference::LowestLinkId, cancel)?;
    Ok(Route::from_steps(depot, steps))
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
    fn eulerian_square_needs_no_augmentation() {
        let mut g = Graph::new(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 5).expect("edge");
        g.add_edge(2, 3, 3).expect("edge");
        g.add_edge(3, 4, 7).expect("edge");
        g.add_edge(4, 1, 2).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 17);
        assert_eq!(route.vertex_sequence(), [1, 2, 3, 4, 1]);
    }

    #[test]
    fn single_odd_pair_doubles_the_cheapest_path() {
        // Path graph 1-2-3: both ends odd; optimal doubles both edges.
        let mut g = Graph::new(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 2).expect("edge");
        g.add_edge(2, 3, 3).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 10);
        assert_eq!(route.traversals().len(), 4);
    }

    #[test]
    fn odd_pair_on_a_spur_doubles_the_spur() {
        // Parallel 1-2 edges keep vertex 1 even; the odd pair {2, 3}
        // is repaired by doubling the spur edge.
        let mut g = Graph::new(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 3).expect("edge");
        g.add_edge(1, 2, 9).expect("edge");
        g.add_edge(2, 3, 4).expect("edge");

        // Degrees: 1 -> 2 (even), 2 -> 3 (odd), 3 -> 1 (odd).
        // Optimal doubles 2-3: total 3 + 9 + 4 + 4 = 20.
        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 20);
    }

    #[test]
    fn depot_only_instance_returns_the_trivial_route() {
        let g = Graph::new(GraphKind::Undirected, 1);
        let route = run(g).expect("solve");
        assert_eq!(route.vertex_sequence(), [1]);
        assert_eq!(route.total_cost().expect("cost"), 0);
    }

    #[test]
    fn required_self_loop_is_traversed_once_with_no_deadheads() {
        let mut g = Graph::new(GraphKind::Undirected, 1);
        g.add_edge(1, 1, 6).expect("loop");
        let problem = Problem::postman(g, "loop");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");
        route.validate(&problem).expect("valid");
        assert_eq!(route.total_cost().expect("cost"), 6);
        assert_eq!(route.deadhead_count(&problem), 0);
        assert_eq!(route.traversals().len(), 1);
    }

    #[test]
    fn disconnected_required_link_is_infeasible() {
        let mut g = Graph::new(GraphKind::Undirected, 4);
        g.add_edge(1, 2, 1).expect("edge");
        g.add_edge(3, 4, 1).expect("edge");
        let problem = Problem::postman(g, "t");
        let err = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect_err("infeasible");
        assert!(matches!(err, crate::Error::Infeasible { link_id: 2 }));
    }

    #[test]
    fn cancellation_stops_the_solve() {
        let mut g = Graph::new(GraphKind::Undirected, 3);
        g.add_edge(1, 2, 1).expect("edge");
        g.add_edge(2, 3, 1).expect("edge");
        let problem = Problem::postman(g, "t");
        let token = CancelToken::new();
        token.cancel();
        let err = solve(&problem, &token, &mut Diagnostics::new()).expect_err("cancelled");
        assert!(matches!(err, crate::Error::Cancelled));
    }
}
