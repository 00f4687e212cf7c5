pub mod astar;
pub mod baker;
pub mod context;
pub mod events;
pub mod graph;
pub mod graph_builder;
pub mod ports;
pub mod query;
pub mod routing_table;
pub mod sampler;
pub mod string_pull;
pub mod types;

pub use astar::*;
pub use baker::*;
pub use context::*;
pub use events::*;
pub use graph::*;
pub use graph_builder::*;
pub use ports::*;
pub use query::*;
pub use routing_table::*;
pub use sampler::*;
pub use string_pull::*;
pub use types::*;
