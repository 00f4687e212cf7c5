pub mod legacy_text;
pub mod loggers;
pub mod navigation_data;

pub use legacy_text::*;
pub use loggers::*;
pub use navigation_data::*;
