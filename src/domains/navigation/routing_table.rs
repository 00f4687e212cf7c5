use crate::common::{NavError, NavResult};
use super::graph::NavGraph;

/// Marker for a cell that was never filled.
pub const NO_HOP: u32 = u32::MAX;

/// Dense `N x (N-1)` next-hop table. Row `i` holds, for every goal `j != i`,
/// the waypoint to move to next; the goal column skips `i` itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    node_count: usize,
    cells: Vec<u32>,
}

/// Result of following next hops from one waypoint toward another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HopWalk {
    /// Visited waypoints, starting with the origin.
    pub hops: Vec<u32>,
    /// False when the walk was cut short by a malformed cell.
    pub complete: bool,
}

impl RoutingTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A table of `node_count` rows with every cell unfilled.
    pub fn unfilled(node_count: usize) -> Self {
        Self {
            node_count,
            cells: vec![NO_HOP; node_count * node_count.saturating_sub(1)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of cells, `N * (N - 1)`.
    pub fn lookup_count(&self) -> usize {
        self.cells.len()
    }

    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != NO_HOP).count()
    }

    /// Flat cell offset for `(from, to)`, `None` on the diagonal or out of range.
    pub fn cell_index(&self, from: u32, to: u32) -> Option<usize> {
        let (from, to) = (from as usize, to as usize);
        if from == to || from >= self.node_count || to >= self.node_count {
            return None;
        }
        let column = if to < from { to } else { to - 1 };
        Some(from * (self.node_count - 1) + column)
    }

    pub fn next_hop(&self, from: u32, to: u32) -> Option<u32> {
        self.cell_index(from, to)
            .map(|i| self.cells[i])
            .filter(|&hop| hop != NO_HOP)
    }

    pub(crate) fn cell(&self, from: u32, to: u32) -> Option<u32> {
        self.cell_index(from, to).map(|i| self.cells[i])
    }

    /// Fills `(from, to)` only when it is still empty. Returns whether it wrote.
    pub(crate) fn fill(&mut self, from: u32, to: u32, hop: u32) -> bool {
        match self.cell_index(from, to) {
            Some(i) if self.cells[i] == NO_HOP => {
                self.cells[i] = hop;
                true
            }
            _ => false,
        }
    }

    /// Rows in persisted form, one `Vec` of `N - 1` hops per waypoint.
    pub fn to_rows(&self) -> Vec<Vec<u32>> {
        if self.node_count < 2 {
            return vec![Vec::new(); self.node_count];
        }
        self.cells
            .chunks(self.node_count - 1)
            .map(|row| row.to_vec())
            .collect()
    }

    pub fn from_rows(rows: Vec<Vec<u32>>) -> NavResult<Self> {
        let node_count = rows.len();
        let width = node_count.saturating_sub(1);
        let mut cells = Vec::with_capacity(node_count * width);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(NavError::InvalidTable(format!(
                    "row {} has {} cells, expected {}",
                    i,
                    row.len(),
                    width
                )));
            }
            cells.extend(row);
        }
        Ok(Self { node_count, cells })
    }

    /// Every cell must name a neighbour of its row waypoint.
    pub fn validate(&self, graph: &NavGraph) -> NavResult<()> {
        if self.node_count != graph.len() {
            return Err(NavError::InvalidTable(format!(
                "table has {} rows but graph has {} waypoints",
                self.node_count,
                graph.len()
            )));
        }
        for from in 0..self.node_count as u32 {
            for to in 0..self.node_count as u32 {
                let Some(hop) = self.cell(from, to) else {
                    continue;
                };
                if hop == NO_HOP {
                    return Err(NavError::InvalidTable(format!("cell ({}, {}) is empty", from, to)));
                }
                if !graph.has_edge(from, hop) {
                    return Err(NavError::InvalidTable(format!(
                        "cell ({}, {}) names {} which is not a neighbour of {}",
                        from, to, hop, from
                    )));
                }
            }
        }
        Ok(())
    }

    /// Follows next hops from `from` until `to`. Stops early on an empty,
    /// self-referential or out-of-range cell, on a revisit, or after `N` hops.
    pub fn walk(&self, from: u32, to: u32) -> HopWalk {
        let mut hops = vec![from];
        if from == to {
            return HopWalk { hops, complete: true };
        }
        let mut visited = vec![false; self.node_count];
        if let Some(v) = visited.get_mut(from as usize) {
            *v = true;
        }

        let mut current = from;
        while current != to {
            let next = match self.next_hop(current, to) {
                Some(next) if (next as usize) < self.node_count && next != current => next,
                _ => return HopWalk { hops, complete: false },
            };
            if visited[next as usize] || hops.len() > self.node_count {
                return HopWalk { hops, complete: false };
            }
            visited[next as usize] = true;
            hops.push(next);
            current = next;
        }
        HopWalk { hops, complete: true }
    }
}
