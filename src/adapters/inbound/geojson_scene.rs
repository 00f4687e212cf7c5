//! Box-world scene description loaded from GeoJSON.
//!
//! Features live in the x/z plane. The `kind` property selects the role:
//! - `floor`: Polygon, walkable top surface at `height` (default 0)
//! - `obstacle`: Polygon, blocks between `min_y` (default 0) and `max_y` (default 3)
//! - `waypoint`: Point, authored free waypoint; an optional third coordinate is y
//!
//! Polygons are reduced to their axis-aligned bounds.

use crate::common::{Aabb, NavError, NavResult, Point3};
use crate::domains::navigation::ports::{GroundProbe, LineOfSight};
use geojson::{Feature, GeoJson, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub name: String,
    pub floors: Vec<Aabb>,
    pub obstacles: Vec<Aabb>,
    pub waypoints: Vec<Point3>,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Flat walkable slab covering `[min_x, max_x] x [min_z, max_z]` at `height`.
    pub fn with_floor(mut self, min_x: f32, min_z: f32, max_x: f32, max_z: f32, height: f32) -> Self {
        self.floors.push(Aabb::from_corners(
            Point3::new(min_x, height, min_z),
            Point3::new(max_x, height, max_z),
        ));
        self
    }

    pub fn with_obstacle(mut self, min: Point3, max: Point3) -> Self {
        self.obstacles.push(Aabb::from_corners(min, max));
        self
    }

    pub fn with_waypoint(mut self, point: Point3) -> Self {
        self.waypoints.push(point);
        self
    }

    pub fn from_geojson(name: impl Into<String>, source: &str) -> NavResult<Self> {
        let geojson: GeoJson = source
            .parse()
            .map_err(|e| NavError::Scene(format!("invalid GeoJSON: {}", e)))?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(NavError::Scene("expected a FeatureCollection".to_string()));
        };

        let mut scene = Scene::new(name);
        for (i, feature) in collection.features.iter().enumerate() {
            let kind = feature
                .property("kind")
                .and_then(|v| v.as_str())
                .ok_or_else(|| NavError::Scene(format!("feature {} has no kind", i)))?;
            match kind {
                "floor" => {
                    let (min_x, min_z, max_x, max_z) = polygon_bounds(feature, i)?;
                    let height = number(feature, "height", i)?.unwrap_or(0.0);
                    scene = scene.with_floor(min_x, min_z, max_x, max_z, height);
                }
                "obstacle" => {
                    let (min_x, min_z, max_x, max_z) = polygon_bounds(feature, i)?;
                    let min_y = number(feature, "min_y", i)?.unwrap_or(0.0);
                    let max_y = number(feature, "max_y", i)?.unwrap_or(3.0);
                    scene = scene.with_obstacle(
                        Point3::new(min_x, min_y, min_z),
                        Point3::new(max_x, max_y, max_z),
                    );
                }
                "waypoint" => {
                    let point = match feature.geometry.as_ref().map(|g| &g.value) {
                        Some(Value::Point(pos)) if pos.len() >= 2 => Point3::new(
                            finite(pos[0], i)?,
                            finite(pos.get(2).copied().unwrap_or(0.0), i)?,
                            finite(pos[1], i)?,
                        ),
                        _ => return Err(NavError::Scene(format!("waypoint feature {} is not a Point", i))),
                    };
                    scene = scene.with_waypoint(point);
                }
                other => {
                    return Err(NavError::Scene(format!("feature {} has unknown kind {:?}", i, other)));
                }
            }
        }
        Ok(scene)
    }
}

fn number(feature: &Feature, key: &str, i: usize) -> NavResult<Option<f32>> {
    feature
        .property(key)
        .and_then(|v| v.as_f64())
        .map(|v| finite(v, i))
        .transpose()
}

/// Narrows to `f32`, rejecting values that overflow it or are not numbers.
fn finite(value: f64, i: usize) -> NavResult<f32> {
    let narrowed = value as f32;
    if narrowed.is_finite() {
        Ok(narrowed)
    } else {
        Err(NavError::Scene(format!("feature {} has a non-finite coordinate {}", i, value)))
    }
}

fn polygon_bounds(feature: &Feature, i: usize) -> NavResult<(f32, f32, f32, f32)> {
    let Some(Value::Polygon(rings)) = feature.geometry.as_ref().map(|g| &g.value) else {
        return Err(NavError::Scene(format!("feature {} is not a Polygon", i)));
    };
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for pos in rings.iter().flatten() {
        if pos.len() < 2 {
            continue;
        }
        let (x, z) = (pos[0], pos[1]);
        bounds = Some(match bounds {
            None => (x, z, x, z),
            Some((a, b, c, d)) => (a.min(x), b.min(z), c.max(x), d.max(z)),
        });
    }
    let (min_x, min_z, max_x, max_z) =
        bounds.ok_or_else(|| NavError::Scene(format!("feature {} has an empty polygon", i)))?;
    Ok((finite(min_x, i)?, finite(min_z, i)?, finite(max_x, i)?, finite(max_z, i)?))
}

impl LineOfSight for Scene {
    /// The capsule is approximated by growing every obstacle footprint by the
    /// clearance radius and testing the centre segment.
    fn line_of_sight(&self, a: Point3, b: Point3, clearance: f32) -> bool {
        !self
            .obstacles
            .iter()
            .any(|o| o.expanded_xz(clearance.max(0.0)).intersects_segment(a, b))
    }
}

impl GroundProbe for Scene {
    /// Highest surface under `(x, z)` inside the band. Obstacle tops are not
    /// walkable, so a probe that lands on one reports nothing.
    fn ground_height(&self, x: f32, z: f32, band: (f32, f32)) -> Option<f32> {
        let (floor, ceiling) = band;
        let in_band = |y: f32| y >= floor && y <= ceiling;

        let best_floor = self
            .floors
            .iter()
            .filter(|f| f.contains_xz(x, z) && in_band(f.max.y))
            .map(|f| f.max.y)
            .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.max(y))));
        let blocked = self.obstacles.iter().any(|o| {
            o.contains_xz(x, z)
                && o.min.y <= ceiling
                && o.max.y >= floor
                && best_floor.map_or(true, |fy| o.max.y >= fy)
        });

        if blocked {
            None
        } else {
            best_floor
        }
    }
}
