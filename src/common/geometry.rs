use serde::{Deserialize, Serialize};
use std::ops::Sub;

/// Positions closer than this are treated as the same point.
pub const POINT_EPSILON: f32 = 1e-4;

/// World-space position. `y` is the vertical axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Point3) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    pub fn approx_eq(&self, other: &Point3) -> bool {
        self.distance_squared(other) <= POINT_EPSILON * POINT_EPSILON
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    fn axis(&self, axis: usize) -> f32 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

impl Sub for Point3 {
    type Output = Point3;

    fn sub(self, rhs: Point3) -> Point3 {
        Point3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Summed Euclidean length of a polyline.
pub fn path_length(points: &[Point3]) -> f32 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Axis-aligned box used for floors and obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Builds a box from two opposite corners in any order.
    pub fn from_corners(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Grows the footprint by `radius` in x and z. Height is left untouched.
    pub fn expanded_xz(&self, radius: f32) -> Self {
        Self {
            min: Point3::new(self.min.x - radius, self.min.y, self.min.z - radius),
            max: Point3::new(self.max.x + radius, self.max.y, self.max.z + radius),
        }
    }

    pub fn contains_xz(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    /// Slab test against the closed segment `a -> b`. Touching counts as a hit.
    pub fn intersects_segment(&self, a: Point3, b: Point3) -> bool {
        let dir = b - a;
        let mut t_enter = 0.0_f32;
        let mut t_exit = 1.0_f32;

        for axis in 0..3 {
            let origin = a.axis(axis);
            let d = dir.axis(axis);
            let lo = self.min.axis(axis);
            let hi = self.max.axis(axis);

            if d.abs() < f32::EPSILON {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - origin) * inv;
            let mut t1 = (hi - origin) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t_enter.max(t0);
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return false;
            }
        }

        true
    }
}
