//! OARLIB instance parser.
//!
//! Line-oriented UTF-8: `%` comments and blank lines are ignored, header
//! tokens are case-insensitive and may appear anywhere before the data
//! sections, links live between `LINKS`/`END LINKS` and optional vertex
//! coordinates between `VERTICES`/`END VERTICES`. An optional
//! `LINE FORMAT:` line overrides the flavor's default columns.

use crate::diagnostics::Diagnostics;
use crate::graph::{Graph, GraphKind};
use crate::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Outside,
    Links,
    Vertices,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Column {
    V1,
    V2,
    Cost,
    ReverseCost,
    Required,
    Directed,
}

#[derive(Clone, Debug)]
struct LinkSpec {
    line: usize,
    v1: usize,
    v2: usize,
    cost: i64,
    reverse_cost: i64,
    directed: bool,
    required: bool,
}

#[derive(Clone, Debug)]
struct VertexSpec {
    line: usize,
    id: usize,
    x: f64,
    y: f64,
}

fn default_columns(kind: GraphKind) -> Vec<Column> {
    match kind {
        GraphKind::Undirected | GraphKind::Directed => {
            vec![Column::V1, Column::V2, Column::Cost, Column::Required]
        }
        GraphKind::Windy => vec![
            Column::V1,
            Column::V2,
            Column::Cost,
            Column::ReverseCost,
            Column::Required,
        ],
        GraphKind::Mixed => vec![
            Column::V1,
            Column::V2,
            Column::Cost,
            Column::Directed,
            Column::Required,
        ],
    }
}

/// How many leading columns a link line must provide; the rest default.
fn mandatory_columns(kind: GraphKind) -> usize {
    match kind {
        GraphKind::Windy => 4,
        _ => 3,
    }
}

fn parse_bool(token: &str) -> Option<bool> {
    match token.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "1" => Some(true),
        "false" | "f" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_columns(line: usize, spec: &str) -> Result<Vec<Column>> {
    let mut columns = Vec::new();
    for token in spec.split([',', ' ']).filter(|t| !t.is_empty()) {
        let normalized = token.to_ascii_lowercase().replace('_', "");
        let column = match normalized.as_str() {
            "v1" | "from" => Column::V1,
            "v2" | "to" => Column::V2,
            "cost" => Column::Cost,
            "reversecost" => Column::ReverseCost,
            "required" | "isrequired" => Column::Required,
            "directed" | "isdirected" => Column::Directed,
            other => {
                return Err(Error::parse(
                    line,
                    format!("unknown LINE FORMAT column: {other}"),
                ));
            }
        };
        columns.push(column);
    }
    if columns.is_empty() {
        return Err(Error::parse(line, "empty LINE FORMAT"));
    }
    Ok(columns)
}

fn header_value<'a>(lower: &str, raw: &'a str, key: &str) -> Option<&'a str> {
    if lower.starts_with(key) {
        Some(raw[key.len()..].trim())
    } else {
        None
    }
}

fn parse_link_line(
    line_no: usize,
    raw: &str,
    columns: &[Column],
    mandatory: usize,
) -> std::result::Result<LinkSpec, String> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    if fields.len() < mandatory {
        return Err(format!(
            "expected at least {mandatory} columns, got {}",
            fields.len()
        ));
    }
    if fields.len() > columns.len() {
        return Err(format!(
            "expected at most {} columns, got {}",
            columns.len(),
            fields.len()
        ));
    }

    let mut spec = LinkSpec {
        line: line_no,
        v1: 0,
        v2: 0,
        cost: 0,
        reverse_cost: 0,
        directed: false,
        required: true,
    };
    let mut saw_reverse = false;
    for (column, field) in columns.iter().zip(&fields) {
        match column {
            Column::V1 => {
                spec.v1 = field
                    .parse::<usize>()
                    .map_err(|_| format!("invalid vertex id: {field}"))?;
            }
            Column::V2 => {
                spec.v2 = field
                    .parse::<usize>()
                    .map_err(|_| format!("invalid vertex id: {field}"))?;
            }
            Column::Cost => {
                spec.cost = field
                    .parse::<i64>()
                    .map_err(|_| format!("invalid cost: {field}"))?;
            }
            Column::ReverseCost => {
                spec.reverse_cost = field
                    .parse::<i64>()
                    .map_err(|_| format!("invalid reverse cost: {field}"))?;
                saw_reverse = true;
            }
            Column::Required => {
                spec.required =
                    parse_bool(field).ok_or_else(|| format!("invalid boolean: {field}"))?;
            }
            Column::Directed => {
                spec.directed =
                    parse_bool(field).ok_or_else(|| format!("invalid boolean: {field}"))?;
            }
        }
    }
    if spec.v1 == 0 || spec.v2 == 0 {
        return Err("vertex ids are 1-based".into());
    }
    if spec.cost < 0 || (saw_reverse && spec.reverse_cost < 0) {
        return Err("costs must be non-negative".into());
    }
    if !saw_reverse {
        spec.reverse_cost = spec.cost;
    }
    Ok(spec)
}

fn parse_vertex_line(
    line_no: usize,
    raw: &str,
    sequence: usize,
) -> std::result::Result<VertexSpec, String> {
    let fields: Vec<&str> = raw.split(',').map(str::trim).collect();
    let (id, x_field, y_field) = match fields.len() {
        2 => (sequence, fields[0], fields[1]),
        3 => {
            let id = fields[0]
                .parse::<usize>()
                .map_err(|_| format!("invalid vertex id: {}", fields[0]))?;
            (id, fields[1], fields[2])
        }
        n => return Err(format!("expected 2 or 3 columns, got {n}")),
    };
    if id == 0 {
        return Err("vertex ids are 1-based".into());
    }
    let x = x_field
        .parse::<f64>()
        .map_err(|_| format!("invalid x coordinate: {x_field}"))?;
    let y = y_field
        .parse::<f64>()
        .map_err(|_| format!("invalid y coordinate: {y_field}"))?;
    Ok(VertexSpec {
        line: line_no,
        id,
        x,
        y,
    })
}

/// Parses an OARLIB instance into a graph. Recoverable link-line problems
/// land in `diagnostics`; structural problems are hard errors.
pub fn parse_instance(text: &str, diagnostics: &mut Diagnostics) -> Result<Graph> {
    let mut kind: Option<GraphKind> = None;
    let mut header_n: Option<usize> = None;
    let mut advisory_m: Option<usize> = None;
    let mut depot: Option<usize> = None;

    let mut section = Section::Outside;
    let mut links_line = 0usize;
    let mut link_columns: Option<Vec<Column>> = None;
    let mut links: Vec<LinkSpec> = Vec::new();
    let mut vertices: Vec<VertexSpec> = Vec::new();
    let mut skipped: Vec<(usize, String)> = Vec::new();
    let mut last_good_link_line = 0usize;
    let mut saw_links_section = false;

    for (idx, raw_line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let lower = line.to_ascii_lowercase();

        match lower.as_str() {
            "links" => {
                section = Section::Links;
                saw_links_section = true;
                links_line = line_no;
                continue;
            }
            "end links" => {
                section = Section::Outside;
                continue;
            }
            "vertices" => {
                section = Section::Vertices;
                continue;
            }
            "end vertices" => {
                section = Section::Outside;
                continue;
            }
            _ => {}
        }

        match section {
            Section::Outside => {
                if let Some(value) = header_value(&lower, line, "graph type:") {
                    kind = Some(match value.to_ascii_lowercase().as_str() {
                        "undirected" => GraphKind::Undirected,
                        "directed" => GraphKind::Directed,
                        "mixed" => GraphKind::Mixed,
                        "windy" => GraphKind::Windy,
                        other => {
                            return Err(Error::parse(
                                line_no,
                                format!("unknown graph type: {other}"),
                            ));
                        }
                    });
                } else if let Some(value) = header_value(&lower, line, "depot id:") {
                    depot = Some(value.parse().map_err(|_| {
                        Error::parse(line_no, format!("invalid depot id: {value}"))
                    })?);
                } else if let Some(value) = header_value(&lower, line, "n:") {
                    header_n = Some(value.parse().map_err(|_| {
                        Error::parse(line_no, format!("invalid vertex count: {value}"))
                    })?);
                } else if let Some(value) = header_value(&lower, line, "m:") {
                    advisory_m = Some(value.parse().map_err(|_| {
                        Error::parse(line_no, format!("invalid link count: {value}"))
                    })?);
                } else {
                    return Err(Error::parse(
                        line_no,
                        format!("unexpected content outside any section: {line}"),
                    ));
                }
            }
            Section::Links => {
                let kind = kind.ok_or_else(|| {
                    Error::parse(line_no, "LINKS section before a Graph Type header")
                })?;
                if let Some(value) = header_value(&lower, line, "line format:") {
                    link_columns = Some(parse_columns(line_no, value)?);
                    continue;
                }
                // With an explicit LINE FORMAT every declared column is
                // mandatory; the flavor defaults leave trailing flags
                // optional.
                let (columns, mandatory) = match &link_columns {
                    Some(columns) => (columns.clone(), columns.len()),
                    None => {
                        let columns = default_columns(kind);
                        (columns, mandatory_columns(kind))
                    }
                };
                match parse_link_line(line_no, line, &columns, mandatory) {
                    Ok(spec) => {
                        last_good_link_line = line_no;
                        links.push(spec);
                    }
                    Err(reason) => skipped.push((line_no, reason)),
                }
            }
            Section::Vertices => {
                if header_value(&lower, line, "line format:").is_some() {
                    // Vertex lines have a fixed [id,]x,y shape.
                    continue;
                }
                match parse_vertex_line(line_no, line, vertices.len() + 1) {
                    Ok(spec) => vertices.push(spec),
                    Err(reason) => return Err(Error::parse(line_no, reason)),
                }
            }
        }
    }

    let kind = kind.ok_or_else(|| Error::parse(1, "missing Graph Type header"))?;
    if !saw_links_section || links.is_empty() {
        let at = if saw_links_section { links_line } else { 1 };
        return Err(Error::parse(at, "instance has no well-formed LINKS section"));
    }

    // A malformed link line is only recoverable when a later well-formed
    // line proves the section kept going.
    for &(line_no, ref reason) in &skipped {
        if line_no > last_good_link_line {
            return Err(Error::parse(line_no, reason.clone()));
        }
        diagnostics.warn(format!("skipped malformed link line {line_no}: {reason}"));
    }

    if let Some(m) = advisory_m {
        if m != links.len() {
            diagnostics.warn(format!(
                "header M: {m} disagrees with {} parsed links",
                links.len()
            ));
        }
    }

    // Effective vertex count: the header, grown by any larger id in the
    // VERTICES section; link endpoints may grow it only when the header
    // was absent.
    let mut n = header_n.unwrap_or(0);
    for v in &vertices {
        n = n.max(v.id);
    }
    if header_n.is_none() {
        for l in &links {
            n = n.max(l.v1.max(l.v2));
        }
    }
    for l in &links {
        if l.v1 > n || l.v2 > n {
            return Err(Error::parse(
                l.line,
                format!("link references vertex {} beyond N: {n}", l.v1.max(l.v2)),
            ));
        }
    }

    let mut graph = Graph::new(kind, n);
    for l in &links {
        let id = match kind {
            GraphKind::Undirected => graph.add_edge(l.v1, l.v2, l.cost),
            GraphKind::Directed => graph.add_arc(l.v1, l.v2, l.cost),
            GraphKind::Windy => graph.add_windy_edge(l.v1, l.v2, l.cost, l.reverse_cost),
            GraphKind::Mixed => {
                if l.directed {
                    graph.add_arc(l.v1, l.v2, l.cost)
                } else {
                    graph.add_edge(l.v1, l.v2, l.cost)
                }
            }
        }
        .map_err(|e| Error::parse(l.line, e.to_string()))?;
        graph.set_required(id, l.required);
    }
    for v in &vertices {
        graph
            .set_coords(v.id, v.x, v.y)
            .map_err(|e| Error::parse(v.line, e.to_string()))?;
    }
    let depot = depot.unwrap_or(1);
    graph
        .set_depot(depot)
        .map_err(|_| Error::parse(1, format!("depot id {depot} beyond N: {n}")))?;

    log::debug!(
        "parser: kind={} n={} m={} depot={}",
        kind.as_str(),
        graph.vertex_count(),
        graph.link_count(),
        graph.depot()
    );
    Ok(graph)
}
