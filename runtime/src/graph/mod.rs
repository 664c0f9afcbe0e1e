pub mod assembler;
pub mod dot;
pub mod types;

pub use assembler::assemble;
pub use dot::render_dot;
pub use types::{EdgeKind, GraphEdge, GraphModel, GraphNode, NodeClass};
