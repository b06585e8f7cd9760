//! Arc-routing solvers for street-like graphs: the Chinese postman family
//! (undirected, directed, mixed, windy) and the windy rural postman, with
//! the graph algebra they stand on.
//!
//! A solve is a pure function of `(graph, required set, depot, solver)`:
//! single-threaded, deterministic, no I/O, reproducible byte for byte.

pub mod algo;
pub mod cancel;
pub mod diagnostics;
mod error;
pub mod graph;
pub mod io;
pub mod logging;
pub mod options;
pub mod problem;
pub mod report;
pub mod route;
pub mod solvers;

pub use cancel::CancelToken;
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use options::RunOptions;
pub use problem::{Problem, ProblemClass};
pub use route::Route;
pub use solvers::SolverId;

/// Programmatic entry point for embedding shells: parse, solve, report.
pub fn solve_instance(solver_id: u32, instance_text: &str) -> Result<String> {
    solve_instance_named(solver_id, instance_text, "instance", &CancelToken::new())
}

/// As [`solve_instance`], with a caller-chosen instance name and cancel
/// token.
pub fn solve_instance_named(
    solver_id: u32,
    instance_text: &str,
    name: &str,
    cancel: &CancelToken,
) -> Result<String> {
    let solver = SolverId::from_id(solver_id)?;
    let mut diagnostics = Diagnostics::new();
    let graph = io::parse_instance(instance_text, &mut diagnostics)?;
    let problem = if solver.is_rural() {
        Problem::rural(graph, name)
    } else {
        Problem::postman(graph, name)
    };
    let route = solvers::solve(solver, &problem, cancel, &mut diagnostics)?;
    report::render(&problem, solver.name(), &route, &diagnostics)
}

#[cfg(test)]
mod tests {
    use super::{solve_instance, Error};

    const SQUARE: &str = "Graph Type: undirected\n\
                          N: 4\n\
                          Depot ID: 1\n\
                          LINKS\n\
                          1,2,5\n\
                          2,3,3\n\
                          3,4,7\n\
                          4,1,2\n\
                          END LINKS\n";

    #[test]
    fn square_instance_solves_end_to_end() {
        let report = solve_instance(2, SQUARE).expect("solve");
        assert!(report.contains("Total cost: 17"));
        assert!(report.contains("Route: 1 -> 2 -> 3 -> 4 -> 1"));
    }

    #[test]
    fn identical_inputs_produce_byte_identical_reports() {
        let once = solve_instance(2, SQUARE).expect("solve");
        let twice = solve_instance(2, SQUARE).expect("solve");
        assert_eq!(once, twice);
    }

    #[test]
    fn reserved_solver_id_is_unsupported() {
        assert!(matches!(
            solve_instance(6, SQUARE),
            Err(Error::UnsupportedSolver { id: 6 })
        ));
    }

    #[test]
    fn wrong_flavor_for_the_solver_is_a_user_error() {
        let err = solve_instance(1, SQUARE).expect_err("directed solver, undirected file");
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn parse_failures_surface_with_their_line() {
        let err = solve_instance(2, "Graph Type: undirected\nLINKS\nEND LINKS\n")
            .expect_err("empty links");
        assert!(matches!(err, Error::Parse { .. }));
    }
}
