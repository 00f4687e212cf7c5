pub mod geojson_scene;

pub use geojson_scene::*;
