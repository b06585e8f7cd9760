//! Mixed Chinese Postman, Yaoyuenyong-style iterative improvement.
//!
//! Starts from the cheaper Frederickson augmentation and applies
//! cost-improving local moves until none remains or the move budget runs
//! out. Moves are considered in increasing `(cost delta, link id)` order,
//! so the procedure is deterministic:
//!
//! - *pair cancellation*: two duplicate copies running opposite ways
//!   between the same endpoints are both dropped (balance is preserved,
//!   and the originals keep the multigraph connected);
//! - *reroute*: one duplicate copy is replaced by the currently cheapest
//!   directed path between its endpoints.

use std::collections::BTreeMap;

use crate::algo::shortest_paths::{self, CostView, SingleSource};
use crate::cancel::CancelToken;
use crate::diagnostics::Diagnostics;
use crate::graph::{Direction, Graph, LinkId, VertexId};
use crate::problem::Problem;
use crate::route::Route;
use crate::solvers::mcpp_frederickson::{self, OrientedLink};
use crate::Result;

const MOVE_BUDGET: usize = 128;

enum Move {
    CancelPair { first: usize, second: usize },
    Reroute {
        entry: usize,
        path: Vec<(LinkId, Direction)>,
    },
}

struct Candidate {
    delta: i64,
    key: LinkId,
    action: Move,
}

fn oriented_path(
    graph: &Graph,
    sources: &SingleSource,
    from: VertexId,
    to: VertexId,
) -> Result<Vec<(LinkId, Direction)>> {
    let ids = sources.path_links(to)?;
    let mut at = from;
    let mut path = Vec::with_capacity(ids.len());
    for id in ids {
        let link = graph.link(id);
        let direction = if link.directed {
            Direction::Forward
        } else {
            link.direction_from(at)
        };
        path.push((id, direction));
        at = link.other_end(at);
    }
    Ok(path)
}

fn best_move(graph: &Graph, multiset: &[OrientedLink]) -> Result<Option<Candidate>> {
    let mut best: Option<Candidate> = None;
    let mut consider = |candidate: Candidate| {
        let better = match &best {
            None => true,
            Some(current) => (candidate.delta, candidate.key) < (current.delta, current.key),
        };
        if better {
            best = Some(candidate);
        }
    };

    // Pair cancellation: opposed duplicate copies annihilate.
    for i in 0..multiset.len() {
        if !multiset[i].is_duplicate {
            continue;
        }
        let (ui, vi) = multiset[i].endpoints(graph);
        if ui == vi {
            continue;
        }
        for j in (i + 1)..multiset.len() {
            if !multiset[j].is_duplicate {
                continue;
            }
            let (uj, vj) = multiset[j].endpoints(graph);
            if uj == vi && vj == ui {
                let delta = -(multiset[i].cost(graph) + multiset[j].cost(graph));
                consider(Candidate {
                    delta,
                    key: multiset[i].source.min(multiset[j].source),
                    action: Move::CancelPair {
                        first: i,
                        second: j,
                    },
                });
            }
        }
    }

    // Reroute: a duplicate copy dearer than the true shortest path between
    // its endpoints gets replaced. One Dijkstra per distinct tail.
    let mut by_tail: BTreeMap<VertexId, SingleSource> = BTreeMap::new();
    for (i, entry) in multiset.iter().enumerate() {
        if !entry.is_duplicate {
            continue;
        }
        let (u, v) = entry.endpoints(graph);
        if u == v {
            continue;
        }
        let sources = by_tail
            .entry(u)
            .or_insert_with(|| shortest_paths::single_source(graph, u, CostView::True));
        if !sources.reachable(v) {
            continue;
        }
        let delta = sources.dist(v) - entry.cost(graph);
        if delta < 0 {
            let path = oriented_path(graph, sources, u, v)?;
            consider(Candidate {
                delta,
                key: entry.source,
                action: Move::Reroute { entry: i, path },
            });
        }
    }

    Ok(best.filter(|c| c.delta < 0))
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

    let graph = problem.graph();
    let mut multiset = mcpp_frederickson::best_augmentation(problem, cancel, diagnostics)?;

    let mut applied = 0;
    while applied < MOVE_BUDGET {
        cancel.check()?;
        let Some(candidate) = best_move(graph, &multiset)? else {
            break;
        };
        match candidate.action {
            Move::CancelPair { first, second } => {
                // Remove the higher index first so the lower stays valid.
                multiset.remove(second);
                multiset.remove(first);
            }
            Move::Reroute { entry, path } => {
                multiset.remove(entry);
                for (id, direction) in path {
                    multiset.push(OrientedLink {
                        source: id,
                        direction,
                        is_duplicate: true,
                    });
                }
            }
        }
        applied += 1;
    }
    log::debug!("yaoyuenyong: improvement_moves={applied}");

    mcpp_frederickson::route_of_multiset(problem, &multiset, cancel)
}
