use crate::common::Point3;
use serde::{Deserialize, Serialize};

/// A node of the baked navigation graph. The index is its only identity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub index: u32,
    pub position: Point3,
}

/// Undirected, obstacle-free connection between two waypoints, stored with `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub a: u32,
    pub b: u32,
}

impl Edge {
    /// Normalizes the pair so that `a < b`. Returns `None` for self loops.
    pub fn new(a: u32, b: u32) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { a, b }),
            std::cmp::Ordering::Greater => Some(Self { a: b, b: a }),
            std::cmp::Ordering::Equal => None,
        }
    }
}

impl From<Edge> for (u32, u32) {
    fn from(edge: Edge) -> Self {
        (edge.a, edge.b)
    }
}

/// Classification of one sampled grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Open,
    Closed,
}
