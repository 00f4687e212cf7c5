pub mod error;
pub mod event;
pub mod geometry;

pub use error::*;
pub use event::*;
pub use geometry::*;
