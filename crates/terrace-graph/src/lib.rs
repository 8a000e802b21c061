//! Graph container APIs used by the `terrace` layout engine.
//!
//! A deterministic, insertion-ordered multigraph over string node ids with
//! per-node adjacency lists. Nodes, edges, and the graph itself carry
//! caller-defined labels.

mod graph;

pub use graph::{EdgeKey, Graph, GraphOptions};
