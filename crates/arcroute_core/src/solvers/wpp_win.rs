//! Windy Chinese Postman, Win's heuristic.
//!
//! The augmentation pattern is computed on the symmetric average-cost
//! projection (weights `cost + reverse_cost`, which order paths exactly
//! like the average while staying integral); the circuit is then walked
//! under true windy costs, taking the cheaper direction of each edge at
//! traversal time.

use crate::algo::euler::{EulerGraph, TraversalPreference};
use crate::algo::matching;
use crate::algo::shortest_paths::{self, CostView};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::{Graph, GraphKind, VertexId};
use crate::problem::Problem;
use crate::route::Route;
use crate::Result;

/// Undirected twin of a windy graph with link ids preserved and weights
/// `cost + reverse_cost`.
pub(crate) fn average_cost_projection(graph: &Graph) -> Result<Graph> {
    let mut avg = Graph::new(GraphKind::Undirected, graph.vertex_count());
    for v in 1..=graph.vertex_count() {
        avg.vertex_mut(v).match_id = Some(v);
    }
    for link in graph.links() {
        let id = avg.add_edge(link.from, link.to, link.cost + link.reverse_cost)?;
        debug_assert_eq!(id, link.id);
        avg.set_required(id, link.required);
    }
    avg.set_depot(graph.depot())?;
    Ok(avg)
}

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
    log::debug!("wpp: odd_vertices={}", odd.len());

    let mut euler = EulerGraph::new(graph.vertex_count());
    for link in graph.links() {
        euler.add_original(link);
    }

    if !odd.is_empty() {
        let avg = average_cost_projection(graph)?;
        let sp_avg = shortest_paths::all_pairs(&avg, CostView::True);
        let k = odd.len();
        let mut weights = vec![vec![0i64; k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let d = sp_avg.dist(odd[i], odd[j]);
                weights[i][j] = d;
                weights[j][i] = d;
            }
        }
        let pairs = matching::min_cost_pairs(&weights, cancel, diagnostics)?;
        for (a, b) in pairs {
            for id in sp_avg.path_links(odd[a], odd[b])? {
                euler.add_original(graph.link(id));
            }
        }
    }

    let steps = euler.extract_circuit(
        depot,
        TraversalPreference::CheaperDirectionFirst,
        cancel,
    )?;
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
    fn windy_triangle_takes_the_cheap_rotation() {
        let mut g = Graph::new(GraphKind::Windy, 3);
        g.add_windy_edge(1, 2, 4, 8).expect("edge");
        g.add_windy_edge(2, 3, 5, 3).expect("edge");
        g.add_windy_edge(3, 1, 6, 6).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 15);
        assert_eq!(route.vertex_sequence(), [1, 2, 3, 1]);
    }

    #[test]
    fn single_windy_edge_goes_out_cheap_and_back_dear() {
        let mut g = Graph::new(GraphKind::Windy, 2);
        g.add_windy_edge(1, 2, 2, 10).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 12);
        assert_eq!(route.vertex_sequence(), [1, 2, 1]);
    }

    #[test]
    fn asymmetric_square_rotates_the_cheap_way() {
        let mut g = Graph::new(GraphKind::Windy, 4);
        g.add_windy_edge(1, 2, 1, 100).expect("edge");
        g.add_windy_edge(2, 3, 1, 100).expect("edge");
        g.add_windy_edge(3, 4, 1, 100).expect("edge");
        g.add_windy_edge(4, 1, 1, 100).expect("edge");

        let route = run(g).expect("solve");
        assert_eq!(route.total_cost().expect("cost"), 4);
        assert_eq!(route.vertex_sequence(), [1, 2, 3, 4, 1]);
    }

    #[test]
    fn depot_only_instance_returns_the_trivial_route() {
        let g = Graph::new(GraphKind::Windy, 1);
        let route = run(g).expect("solve");
        assert_eq!(route.vertex_sequence(), [1]);
    }

    #[test]
    fn disconnected_required_edge_is_infeasible() {
        let mut g = Graph::new(GraphKind::Windy, 4);
        g.add_windy_edge(1, 2, 1, 1).expect("edge");
        g.add_windy_edge(3, 4, 1, 1).expect("edge");
        let problem = Problem::postman(g, "t");
        let err = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect_err("island edge");
        assert!(matches!(err, crate::Error::Infeasible { link_id: 2 }));
    }
}
