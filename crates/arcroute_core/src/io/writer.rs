//! OARLIB instance serializer. Emits exactly what the parser reads, so a
//! parse -> write -> parse round trip is isomorphic.

use std::fmt::Write as _;

use crate::graph::{Graph, GraphKind};

fn bool_token(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

pub fn write_instance(graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Graph Type: {}", graph.kind().as_str());
    let _ = writeln!(out, "N: {}", graph.vertex_count());
    let _ = writeln!(out, "M: {}", graph.link_count());
    let _ = writeln!(out, "Depot ID: {}", graph.depot());

    let _ = writeln!(out, "LINKS");
    for link in graph.links() {
        match graph.kind() {
            GraphKind::Undirected | GraphKind::Directed => {
                let _ = writeln!(
                    out,
                    "{},{},{},{}",
                    link.from,
                    link.to,
                    link.cost,
                    bool_token(link.required)
                );
            }
            GraphKind::Windy => {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{}",
                    link.from,
                    link.to,
                    link.cost,
                    link.reverse_cost,
                    bool_token(link.required)
                );
            }
            GraphKind::Mixed => {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{}",
                    link.from,
                    link.to,
                    link.cost,
                    bool_token(link.directed),
                    bool_token(link.required)
                );
            }
        }
    }
    let _ = writeln!(out, "END LINKS");

    if graph.vertices().any(|v| v.coords.is_some()) {
        let _ = writeln!(out, "VERTICES");
        for vertex in graph.vertices() {
            if let Some((x, y)) = vertex.coords {
                let _ = writeln!(out, "{},{},{}", vertex.id, x, y);
            }
        }
        let _ = writeln!(out, "END VERTICES");
    }
    out
}
