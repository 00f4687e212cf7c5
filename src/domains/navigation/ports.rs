use crate::common::{NavResult, Point3};
use super::context::NavAsset;

/// Obstacle oracle: is the segment (or the capsule of radius `clearance` swept
/// along it) between `a` and `b` free of obstacles?
pub trait LineOfSight: Send + Sync {
    fn line_of_sight(&self, a: Point3, b: Point3, clearance: f32) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(Point3, Point3, f32) -> bool + Send + Sync,
{
    fn line_of_sight(&self, a: Point3, b: Point3, clearance: f32) -> bool {
        self(a, b, clearance)
    }
}

/// Vertical probe: height of the walkable surface under `(x, z)` inside the
/// `(floor, ceiling)` band, or `None` when nothing walkable is hit.
pub trait GroundProbe: Send + Sync {
    fn ground_height(&self, x: f32, z: f32, band: (f32, f32)) -> Option<f32>;
}

impl<F> GroundProbe for F
where
    F: Fn(f32, f32, (f32, f32)) -> Option<f32> + Send + Sync,
{
    fn ground_height(&self, x: f32, z: f32, band: (f32, f32)) -> Option<f32> {
        self(x, z, band)
    }
}

/// Port the application depends on for loading scene descriptions.
pub trait SceneSource: Send + Sync {
    fn load_geojson(&self, name: &str) -> NavResult<String>;
}

/// Port for storing and retrieving baked navigation assets, keyed by scene name.
pub trait RoutingTableStore: Send + Sync {
    fn save_asset(&self, scene: &str, asset: &NavAsset) -> NavResult<()>;
    fn load_asset(&self, scene: &str) -> NavResult<NavAsset>;
    fn delete_asset(&self, scene: &str) -> NavResult<()>;

    /// Stores the nine-float text rendition of a table. Stores without a text
    /// form ignore it.
    fn save_legacy_text(&self, _scene: &str, _text: &str) -> NavResult<()> {
        Ok(())
    }
}
