//! Layered graph layout: network simplex ranking and Brandes-Koepf
//! coordinate assignment.
//!
//! The pipeline has two independently callable halves. [`rank`] assigns an
//! integer layer to every node of a connected DAG, minimizing total
//! weighted edge length subject to per-edge minimum lengths. Once an
//! external ordering pass has written an `order` per node, [`position`]
//! turns ranks and orders into final `x`/`y` coordinates with no
//! horizontal overlap within a rank.
//!
//! ```
//! use terrace::{LayoutGraph, rank};
//! use terrace_graph::{Graph, GraphOptions};
//!
//! let mut g: LayoutGraph = Graph::new(GraphOptions::default());
//! g.set_path(&["a", "b", "d"]);
//! g.set_path(&["a", "c", "d"]);
//! rank(&mut g)?;
//! assert_eq!(g.node("d").and_then(|n| n.rank), Some(2));
//! # Ok::<(), terrace::Error>(())
//! ```

pub use terrace_graph as graph;

mod error;
mod model;
pub mod position;
pub mod rank;

pub use error::{Error, Result};
pub use model::{EdgeAttrs, LabelSide, LayoutConfig, NodeAttrs, SweepDirection};
pub use position::position;
pub use rank::rank;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Graph type consumed by the layout passes: caller-facing attributes on
/// nodes and edges, layout tunables on the graph label.
pub type LayoutGraph = terrace_graph::Graph<NodeAttrs, EdgeAttrs, LayoutConfig>;
