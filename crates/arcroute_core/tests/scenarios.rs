//! End-to-end fixtures: each known instance runs through parse, solve and
//! report, and the walk-level claims are checked on the route objects.

use arcroute_core::cancel::CancelToken;
use arcroute_core::diagnostics::Diagnostics;
use arcroute_core::graph::{Graph, GraphKind};
use arcroute_core::{solve_instance, solvers, Error, Problem, SolverId};

fn solve_graph(solver: SolverId, graph: Graph) -> arcroute_core::Result<arcroute_core::Route> {
    let problem = if solver.is_rural() {
        Problem::rural(graph, "fixture")
    } else {
        Problem::postman(graph, "fixture")
    };
    let route = solvers::solve(
        solver,
        &problem,
        &CancelToken::new(),
        &mut Diagnostics::new(),
    )?;
    route.validate(&problem)?;
    Ok(route)
}

#[test]
fn ucpp_square_walks_the_cycle_for_seventeen() {
    let text = "Graph Type: undirected\n\
                N: 4\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,5\n\
                2,3,3\n\
                3,4,7\n\
                4,1,2\n\
                END LINKS\n";
    let report = solve_instance(2, text).expect("solve");
    assert!(report.contains("Total cost: 17"));
    assert!(report.contains("Route: 1 -> 2 -> 3 -> 4 -> 1"));
    assert!(report.contains("Deadheads: 0"));
}

#[test]
fn dcpp_imbalanced_square_pays_the_nine_cost_return() {
    let text = "Graph Type: directed\n\
                N: 4\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,5\n\
                2,3,3\n\
                3,4,7\n\
                4,1,2\n\
                1,3,4\n\
                END LINKS\n";
    let report = solve_instance(1, text).expect("solve");
    assert!(report.contains("Total cost: 30"));
}

#[test]
fn wpp_triangle_resolves_directions_for_fifteen() {
    let text = "Graph Type: windy\n\
                N: 3\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,4,8\n\
                2,3,5,3\n\
                3,1,6,6\n\
                END LINKS\n";
    let report = solve_instance(5, text).expect("solve");
    assert!(report.contains("Total cost: 15"));
    assert!(report.contains("Route: 1 -> 2 -> 3 -> 1"));
}

#[test]
fn wrpp_hexagon_subset_deadheads_exactly_the_three_connectors() {
    let text = "Graph Type: windy\n\
                N: 6\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,5,7,true\n\
                2,3,5,7,false\n\
                3,4,5,7,true\n\
                4,5,5,7,false\n\
                5,6,5,7,true\n\
                6,1,5,7,false\n\
                END LINKS\n";
    let report = solve_instance(7, text).expect("solve");
    assert!(report.contains("Required links: 3"));
    assert!(report.contains("Deadheads: 3"));
    assert!(report.contains("Total cost: 30"));
}

#[test]
fn every_solver_reports_the_unreachable_required_link() {
    let cases = [
        (SolverId::UndirectedCpp, {
            let mut g = Graph::new(GraphKind::Undirected, 4);
            g.add_edge(1, 2, 1).expect("edge");
            g.add_edge(3, 4, 1).expect("edge");
            g
        }),
        (SolverId::DirectedCpp, {
            let mut g = Graph::new(GraphKind::Directed, 4);
            g.add_arc(1, 2, 1).expect("arc");
            g.add_arc(2, 1, 1).expect("arc");
            g.add_arc(3, 4, 1).expect("arc");
            g
        }),
        (SolverId::MixedFrederickson, {
            let mut g = Graph::new(GraphKind::Mixed, 4);
            g.add_edge(1, 2, 1).expect("edge");
            g.add_arc(3, 4, 1).expect("arc");
            g
        }),
        (SolverId::MixedYaoyuenyong, {
            let mut g = Graph::new(GraphKind::Mixed, 4);
            g.add_edge(1, 2, 1).expect("edge");
            g.add_arc(3, 4, 1).expect("arc");
            g
        }),
        (SolverId::WindyWin, {
            let mut g = Graph::new(GraphKind::Windy, 4);
            g.add_windy_edge(1, 2, 1, 1).expect("edge");
            g.add_windy_edge(3, 4, 1, 1).expect("edge");
            g
        }),
        (SolverId::WindyRuralBenavent, {
            let mut g = Graph::new(GraphKind::Windy, 4);
            let keep = g.add_windy_edge(1, 2, 1, 1).expect("edge");
            g.add_windy_edge(3, 4, 1, 1).expect("edge");
            g.set_required(keep, false);
            g
        }),
    ];
    for (solver, graph) in cases {
        let island = graph.link_count();
        let err = solve_graph(solver, graph).expect_err("island instance");
        match err {
            Error::Infeasible { link_id } => {
                assert_eq!(link_id, island, "{solver:?} must name the island link")
            }
            other => panic!("{solver:?} returned {other} instead of Infeasible"),
        }
    }
}

#[test]
fn every_solver_returns_the_trivial_route_on_a_bare_depot() {
    for id in [1u32, 2, 3, 4, 5, 7] {
        let solver = SolverId::from_id(id).expect("id");
        let graph = Graph::new(solver.expected_kind(), 1);
        let route = solve_graph(solver, graph).expect("trivial solve");
        assert_eq!(route.vertex_sequence(), [1], "solver {id}");
        assert_eq!(route.total_cost().expect("cost"), 0, "solver {id}");
    }
}

#[test]
fn forward_movement_preference_runs_the_side_loop_at_first_visit() {
    // Two loops meet at vertex 2. The greedy first trail closes
    // 1-2-3-1, so without forward splicing the 2-4-5-2 loop would run
    // only after returning to the depot. With the preference it runs at
    // the first visit of vertex 2.
    let text = "Graph Type: undirected\n\
                N: 5\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,1\n\
                2,3,1\n\
                3,1,1\n\
                2,4,1\n\
                4,5,1\n\
                5,2,1\n\
                END LINKS\n";
    let report = solve_instance(2, text).expect("solve");
    assert!(report.contains("Route: 1 -> 2 -> 4 -> 5 -> 2 -> 3 -> 1"));
}

#[test]
fn solver_six_stays_reserved() {
    let text = "Graph Type: directed\nN: 2\nLINKS\n1,2,1\n2,1,1\nEND LINKS\n";
    let err = solve_instance(6, text).expect_err("reserved");
    assert!(matches!(err, Error::UnsupportedSolver { id: 6 }));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn wrpp_with_everything_required_matches_the_windy_postman_cost() {
    let text = "Graph Type: windy\n\
                N: 4\n\
                Depot ID: 1\n\
                LINKS\n\
                1,2,2,6\n\
                2,3,3,3\n\
                3,4,4,2\n\
                4,1,5,5\n\
                END LINKS\n";
    let wpp = solve_instance(5, text).expect("wpp");
    let wrpp = solve_instance(7, text).expect("wrpp");
    let cost_of = |report: &str| -> i64 {
        report
            .lines()
            .find_map(|l| l.strip_prefix("Total cost: "))
            .expect("cost line")
            .parse()
            .expect("numeric cost")
    };
    assert_eq!(cost_of(&wpp), cost_of(&wrpp));
}

#[test]
fn solve_replay_reproduces_cost_and_returns_to_the_depot() {
    let mut g = Graph::new(GraphKind::Windy, 5);
    g.add_windy_edge(1, 2, 3, 9).expect("edge");
    g.add_windy_edge(2, 3, 4, 4).expect("edge");
    g.add_windy_edge(3, 4, 2, 8).expect("edge");
    g.add_windy_edge(4, 5, 6, 1).expect("edge");
    g.add_windy_edge(5, 1, 2, 2).expect("edge");
    g.add_windy_edge(2, 4, 3, 3).expect("edge");

    let problem = Problem::postman(g, "replay");
    let route = solvers::solve(
        SolverId::WindyWin,
        &problem,
        &CancelToken::new(),
        &mut Diagnostics::new(),
    )
    .expect("solve");
    let replayed = route.replay_cost(problem.graph()).expect("replay");
    assert_eq!(replayed, route.total_cost().expect("cost"));
}
