//! Removal of waypoints that are not needed for obstacle avoidance.

use crate::common::{path_length, Point3};
use super::ports::LineOfSight;

pub struct StringPuller<'a, L: LineOfSight + ?Sized> {
    los: &'a L,
    clearance: f32,
    vertical_tolerance: f32,
}

impl<'a, L: LineOfSight + ?Sized> StringPuller<'a, L> {
    pub fn new(los: &'a L, clearance: f32, vertical_tolerance: f32) -> Self {
        Self {
            los,
            clearance,
            vertical_tolerance,
        }
    }

    /// Single greedy pass: from each point, drop the following point while the
    /// one after it is directly reachable at a similar height.
    pub fn pull(&self, points: &[Point3]) -> Vec<Point3> {
        let mut out = points.to_vec();
        let mut i = 0;
        while i + 2 < out.len() {
            let j = i + 2;
            // j is the next candidate; a removal shifts the following point into j - 1.
            if (out[i].y - out[j].y).abs() <= self.vertical_tolerance
                && self.los.line_of_sight(out[i], out[j], self.clearance)
            {
                out.remove(j - 1);
            } else {
                i += 1;
            }
        }
        out
    }

    /// Pulls the sequence forward and reversed and keeps the shorter result.
    /// The forward result wins ties.
    pub fn pull_bidirectional(&self, points: &[Point3]) -> Vec<Point3> {
        let forward = self.pull(points);
        let mut reversed: Vec<Point3> = points.iter().rev().copied().collect();
        reversed = self.pull(&reversed);
        reversed.reverse();

        if path_length(&reversed) < path_length(&forward) {
            reversed
        } else {
            forward
        }
    }
}
