//! Directed Chinese Postman, exact.
//!
//! Vertices with surplus arrivals ship flow to vertices with surplus
//! departures over a bipartite transportation network priced by shortest
//! directed distances; every unit of flow duplicates its path's arcs.

use crate::algo::euler::{EulerGraph, TraversalPreference};
use crate::algo::flow::FlowNetwork;
use crate::algo::shortest_paths::{self, CostView};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::VertexId;
use crate::problem::Problem;
use crate::route::Route;
use crate::{Error, Result};

pub fn solve(
    problem: &Problem,
    cancel: &CancelToken,
    _diagnostics: &mut Diagnostics,
) -> Result<Route> {
    let graph = problem.graph();
    let depot = problem.depot();
    if problem.required().is_empty() {
        return Ok(Route::trivial(depot));
    }
    problem.check_feasible()?;

    // in > out: needs extra departures (flow sources);
    // out > in: needs extra arrivals (flow sinks).
    let supplies: Vec<(VertexId, i64)> = graph
        .vertices()
        .filter(|v| v.imbalance() > 0)
        .map(|v| (v.id, v.imbalance()))
        .collect();
    let deficits: Vec<(VertexId, i64)> = graph
        .vertices()
        .filter(|v| v.imbalance() < 0)
        .map(|v| (v.id, -v.imbalance()))
        .collect();
    log::debug!(
        "dcpp: supplies={} deficits={}",
        supplies.len(),
        deficits.len()
    );

    let mut euler = EulerGraph::new(graph.vertex_count());
    for link in graph.links() {
        euler.add_original(link);
    }

    if !supplies.is_empty() {
        let sp = shortest_paths::all_pairs(graph, CostView::True);

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
                if sp.reachable(s, d) {
                    let handle =
                        net.add_arc(1 + i, 1 + supplies.len() + j, total_excess, sp.dist(s, d));
                    pair_handles.push((handle, s, d));
                }
            }
        }

        let (flow, cost) = net.min_cost_flow(source, sink, cancel)?;
        if flow != total_excess {
            return Err(Error::invariant(format!(
                "balancing flow shipped {flow} of {total_excess} units"
            )));
        }
        log::debug!("dcpp: balancing_units={flow} balancing_cost={cost}");

        for (handle, s, d) in pair_handles {
            let units = net.flow_on(handle);
            for _ in 0..units {
                for id in sp.path_links(s, d)? {
                    euler.add_original(graph.link(id));
                }
            }
        }
    }

    let steps = euler.extract_circuit(depot, TraversalPreference::LowestLinkId, cancel)?;
    Ok(Route::from_steps(depot, steps))
}
