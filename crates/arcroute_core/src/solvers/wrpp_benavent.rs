//! Windy Rural Postman, Benavent et al.'s H1 heuristic.
//!
//! Four phases: (1) split the required links into connected components,
//! (2) reconnect the components (and the depot) along a minimum spanning
//! tree of cheapest symmetric distances, (3) repair odd parity with a
//! matching on average costs whose repairs follow cheapest symmetric
//! paths, (4) extract the circuit choosing the cheaper direction of each
//! edge at traversal time.

use std::collections::{BTreeMap, BTreeSet};

use crate::algo::connectivity;
use crate::algo::euler::{EulerGraph, TraversalPreference};
use crate::algo::matching;
use crate::algo::mst;
use crate::algo::shortest_paths::{self, CostView};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::{Graph, GraphKind, LinkId, VertexId};
use crate::problem::Problem;
use crate::route::Route;
use crate::solvers::wpp_win;
use crate::Result;

pub fn solve(
    problem: &Problem,
    cancel: &CancelToken,
    diagnostics: &mut Diagnostics,
) -> Result<Route> {
    let graph = problem.graph();
    let depot = problem.depot();
    let required = problem.required();
    if required.is_empty() {
        return Ok(Route::trivial(depot));
    }
    problem.check_feasible()?;

    let n = graph.vertex_count();
    let sp_sym = shortest_paths::all_pairs(graph, CostView::Symmetric);

    // Phase 1: components of the required subgraph. The depot joins as a
    // singleton when no required link touches it.
    let required_subgraph = graph.subgraph(required);
    let comp = connectivity::components(&required_subgraph);
    let mut active: BTreeSet<usize> = BTreeSet::new();
    for &id in required {
        let link = graph.link(id);
        active.insert(comp[link.from - 1]);
        active.insert(comp[link.to - 1]);
    }
    active.insert(comp[depot - 1]);

    let mut multiset: Vec<LinkId> = required.to_vec();

    // Phase 2: connect the components over an MST of cheapest symmetric
    // distances; the traced paths become deadhead links of the route.
    if active.len() > 1 {
        let comps: Vec<usize> = active.iter().copied().collect();
        let members: Vec<Vec<VertexId>> = comps
            .iter()
            .map(|&c| (1..=n).filter(|&v| comp[v - 1] == c).collect())
            .collect();

        let mut component_graph = Graph::new(GraphKind::Undirected, comps.len());
        for (i, member_list) in members.iter().enumerate() {
            // Components answer as their lowest member vertex.
            component_graph.vertex_mut(i + 1).match_id = member_list.first().copied();
        }
        let mut representatives: BTreeMap<LinkId, (VertexId, VertexId)> = BTreeMap::new();
        for i in 0..comps.len() {
            for j in (i + 1)..comps.len() {
                let mut best: Option<(i64, VertexId, VertexId)> = None;
                for &u in &members[i] {
                    for &v in &members[j] {
                        if !sp_sym.reachable(u, v) {
                            continue;
                        }
                        let key = (sp_sym.dist(u, v), u, v);
                        if best.map_or(true, |b| key < b) {
                            best = Some(key);
                        }
                    }
                }
                if let Some((d, u, v)) = best {
                    let id = component_graph.add_edge(i + 1, j + 1, d)?;
                    representatives.insert(id, (u, v));
                }
            }
        }

        let tree = mst::minimum_spanning_forest(&component_graph);
        let mut connector_links = 0usize;
        for id in tree {
            let (u, v) = representatives[&id];
            for link_id in sp_sym.path_links(u, v)? {
                multiset.push(link_id);
                connector_links += 1;
            }
        }
        log::debug!(
            "wrpp: components={} connector_links={connector_links}",
            comps.len()
        );
    }

    // Phase 3: windy parity repair. Matching weights come from the
    // average-cost projection; the repair paths follow the cheaper of the
    // two directions.
    let mut degree = vec![0usize; n];
    for &id in &multiset {
        let link = graph.link(id);
        if link.is_self_loop() {
            degree[link.from - 1] += 2;
        } else {
            degree[link.from - 1] += 1;
            degree[link.to - 1] += 1;
        }
    }
    let odd: Vec<VertexId> = (1..=n).filter(|&v| degree[v - 1] % 2 == 1).collect();
    if !odd.is_empty() {
        let avg = wpp_win::average_cost_projection(graph)?;
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
            multiset.extend(sp_sym.path_links(odd[a], odd[b])?);
        }
    }

    // Phase 4: direction resolution happens during extraction.
    let mut euler = EulerGraph::new(n);
    for &id in &multiset {
        euler.add_original(graph.link(id));
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

    fn hexagon(required: &[usize]) -> Graph {
        let mut g = Graph::new(GraphKind::Windy, 6);
        for i in 1..=6 {
            let j = if i == 6 { 1 } else { i + 1 };
            g.add_windy_edge(i, j, 5, 7).expect("edge");
        }
        for id in 1..=6 {
            g.set_required(id, required.contains(&id));
        }
        g
    }

    #[test]
    fn disconnected_required_components_are_reconnected_by_the_mst() {
        // Required: (1-2), (3-4), (5-6). The MST adds (2-3) and (6-1);
        // parity repair adds (4-5); the circuit is the full hexagon.
        let g = hexagon(&[1, 3, 5]);
        let problem = Problem::rural(g, "hex");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");
        route.validate(&problem).expect("valid");

        assert_eq!(route.total_cost().expect("cost"), 30);
        assert_eq!(route.deadhead_count(&problem), 3);
        assert_eq!(route.vertex_sequence(), [1, 2, 3, 4, 5, 6, 1]);
    }

    #[test]
    fn all_links_required_degenerates_to_the_windy_postman() {
        let g = hexagon(&[1, 2, 3, 4, 5, 6]);
        let rural = Problem::rural(g.clone(), "hex");
        let rural_route = solve(&rural, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");

        let postman = Problem::postman(g, "hex");
        let postman_route = crate::solvers::wpp_win::solve(
            &postman,
            &CancelToken::new(),
            &mut Diagnostics::new(),
        )
        .expect("solve");

        assert_eq!(
            rural_route.total_cost().expect("cost"),
            postman_route.total_cost().expect("cost")
        );
    }

    #[test]
    fn depot_outside_the_required_set_gets_connected() {
        // Only the far edge (3-4) is required; the depot must be joined
        // by deadheading there and back.
        let g = hexagon(&[3]);
        let problem = Problem::rural(g, "hex");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");
        route.validate(&problem).expect("valid");

        // Cheapest depot-to-component path is 1-2-3 (two hops, cost 10
        // symmetric); parity forces the return, so four deadheads.
        assert_eq!(route.deadhead_count(&problem), 4);
        let cost = route.total_cost().expect("cost");
        assert!(cost >= 25, "cost {cost} must cover the edge and connectors");
    }

    #[test]
    fn required_self_loop_is_covered_without_deadheads() {
        let mut g = Graph::new(GraphKind::Windy, 1);
        g.add_windy_edge(1, 1, 6, 9).expect("loop");
        let problem = Problem::rural(g, "loop");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");
        route.validate(&problem).expect("valid");
        assert_eq!(route.traversals().len(), 1);
        assert_eq!(route.deadhead_count(&problem), 0);
    }

    #[test]
    fn no_required_links_returns_the_trivial_route() {
        let g = hexagon(&[]);
        let problem = Problem::rural(g, "hex");
        let route = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect("solve");
        assert_eq!(route.vertex_sequence(), [1]);
        assert_eq!(route.total_cost().expect("cost"), 0);
    }

    #[test]
    fn unreachable_required_edge_is_infeasible_and_named() {
        let mut g = Graph::new(GraphKind::Windy, 4);
        g.add_windy_edge(1, 2, 1, 1).expect("edge");
        let island = g.add_windy_edge(3, 4, 1, 1).expect("edge");
        g.set_required(1, false);
        let problem = Problem::rural(g, "t");
        let err = solve(&problem, &CancelToken::new(), &mut Diagnostics::new())
            .expect_err("island edge");
        assert!(matches!(err, crate::Error::Infeasible { link_id } if link_id == island));
    }
}
