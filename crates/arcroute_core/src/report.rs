//! Textual solve report.

use std::fmt::Write as _;

use crate::diagnostics::Diagnostics;
use crate::problem::Problem;
use crate::route::Route;
use crate::Result;

/// Renders the report block for a finished solve. Output is fully
/// deterministic: identical inputs produce byte-identical text.
pub fn render(
    problem: &Problem,
    solver_name: &str,
    route: &Route,
    diagnostics: &Diagnostics,
) -> Result<String> {
    let total = route.total_cost()?;
    let mut out = String::new();

    let _ = writeln!(out, "Instance: {}", problem.name());
    let _ = writeln!(out, "Solver: {solver_name}");
    let _ = writeln!(out, "Total cost: {total}");
    let _ = writeln!(out, "Required links: {}", problem.required().len());
    let _ = writeln!(out, "Deadheads: {}", route.deadhead_count(problem));

    let walk = route
        .vertex_sequence()
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" -> ");
    let _ = writeln!(out, "Route: {walk}");

    for t in route.traversals() {
        let _ = writeln!(
            out,
            "  link {}: {} -> {} ({}) cost {}",
            t.link_id,
            t.from,
            t.to,
            t.direction.as_str(),
            t.cost
        );
    }

    if !diagnostics.is_empty() {
        let _ = write!(out, "{diagnostics}");
    }

    Ok(out)
}
