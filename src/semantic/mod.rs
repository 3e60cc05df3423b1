pub mod definition;
pub mod join_graph;
pub mod model;
pub mod naming;

pub use definition::*;
pub use join_graph::*;
pub use model::*;
pub use naming::*;
