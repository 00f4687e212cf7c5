//! Human-readable lookup format: one line per table cell with nine floats,
//! `current.x current.y current.z goal.x goal.y goal.z next.x next.y next.z`.
//! Cells are identified by position, so decoding needs the waypoint set.

use crate::common::{NavError, NavResult, Point3};
use crate::domains::navigation::graph::NavGraph;
use crate::domains::navigation::routing_table::RoutingTable;
use std::collections::HashMap;
use std::fmt::Write;

pub fn encode_legacy(graph: &NavGraph, table: &RoutingTable) -> String {
    let mut out = String::new();
    let n = table.node_count() as u32;
    for from in 0..n {
        for to in 0..n {
            let Some(next) = table.next_hop(from, to) else {
                continue;
            };
            let (Some(c), Some(g), Some(x)) = (graph.position(from), graph.position(to), graph.position(next)) else {
                continue;
            };
            // f32 Display is the shortest form that parses back to the same bits.
            let _ = writeln!(
                out,
                "{} {} {} {} {} {} {} {} {}",
                c.x, c.y, c.z, g.x, g.y, g.z, x.x, x.y, x.z
            );
        }
    }
    out
}

fn key(p: &Point3) -> [u32; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

pub fn decode_legacy(text: &str, graph: &NavGraph) -> NavResult<RoutingTable> {
    let mut index: HashMap<[u32; 3], u32> = HashMap::with_capacity(graph.len());
    for waypoint in graph.waypoints() {
        if let Some(prev) = index.insert(key(&waypoint.position), waypoint.index) {
            return Err(NavError::InvalidTable(format!(
                "waypoints {} and {} share a position, positional lookups are ambiguous",
                prev, waypoint.index
            )));
        }
    }
    let resolve = |p: Point3, line: usize| {
        index.get(&key(&p)).copied().ok_or_else(|| {
            NavError::InvalidTable(format!(
                "line {}: ({}, {}, {}) is not a waypoint",
                line, p.x, p.y, p.z
            ))
        })
    };

    let mut table = RoutingTable::unfilled(graph.len());
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let values = line
            .split_whitespace()
            .map(|v| v.parse::<f32>())
            .collect::<Result<Vec<f32>, _>>()
            .map_err(|e| NavError::InvalidTable(format!("line {}: {}", line_no, e)))?;
        if values.len() != 9 {
            return Err(NavError::InvalidTable(format!(
                "line {}: expected 9 values, found {}",
                line_no,
                values.len()
            )));
        }
        let current = resolve(Point3::new(values[0], values[1], values[2]), line_no)?;
        let goal = resolve(Point3::new(values[3], values[4], values[5]), line_no)?;
        let next = resolve(Point3::new(values[6], values[7], values[8]), line_no)?;
        if !table.fill(current, goal, next) {
            return Err(NavError::InvalidTable(format!(
                "line {}: duplicate or diagonal entry ({}, {})",
                line_no, current, goal
            )));
        }
    }
    Ok(table)
}
