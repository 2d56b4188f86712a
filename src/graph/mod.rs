//! Graph representation and traversal module

pub mod algorithms;
pub mod builder;
pub mod compressed;
pub mod model;

pub use compressed::CompressedGraph;
pub use model::{AttrValue, Attributes, Edge, Graph, Node};
