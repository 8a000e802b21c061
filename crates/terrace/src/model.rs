//! Label types carried by layout graphs.
//!
//! Kept lightweight and `Clone`-friendly so scratch graphs (canonical copy,
//! spanning tree, block graph) can be built and discarded per call.

use serde::{Deserialize, Serialize};

/// Horizontal offset hint for a node that renders an edge label beside the
/// edge instead of centered on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelSide {
    #[default]
    Center,
    Left,
    Right,
}

/// One of the four Brandes-Koepf sweep combinations. `Up` scans layers
/// top-to-bottom aligning against predecessors, `Down` the reverse; `Left`
/// resolves ties leftward, `Right` mirrors the coordinate sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl SweepDirection {
    pub const ALL: [SweepDirection; 4] = [
        SweepDirection::UpLeft,
        SweepDirection::UpRight,
        SweepDirection::DownLeft,
        SweepDirection::DownRight,
    ];

    pub fn is_down(self) -> bool {
        matches!(self, SweepDirection::DownLeft | SweepDirection::DownRight)
    }

    pub fn is_right(self) -> bool {
        matches!(self, SweepDirection::UpRight | SweepDirection::DownRight)
    }
}

/// Per-node layout state. `rank` is written by the rank engine, `order` by
/// the external ordering pass, `x`/`y` by the position engine; the rest is
/// caller-supplied input.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttrs {
    pub width: f64,
    pub height: f64,
    /// Virtual routing node inserted for a multi-rank edge segment.
    pub fake: bool,
    pub label_side: LabelSide,
    pub rank: Option<i32>,
    pub order: Option<usize>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// Per-edge ranking constraints: `rank(w) - rank(v)` must be at least
/// `minlen`, and the simplex minimizes the weighted sum of rank spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeAttrs {
    pub weight: f64,
    pub minlen: i32,
}

impl Default for EdgeAttrs {
    fn default() -> Self {
        Self {
            weight: 1.0,
            minlen: 1,
        }
    }
}

/// Graph-level layout options, stored as the graph label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Minimum vertical gap between adjacent ranks.
    pub ranksep: f64,
    /// Minimum horizontal gap between two real nodes in a rank.
    pub nodesep: f64,
    /// Minimum horizontal gap when either node is fake.
    pub edgesep: f64,
    /// Skip balancing and use this sweep's coordinates verbatim.
    pub align: Option<SweepDirection>,
    /// When set, `rank` compresses empty rank slots, preserving empties at
    /// multiples of this factor.
    pub rank_factor: Option<i32>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            ranksep: 50.0,
            nodesep: 50.0,
            edgesep: 20.0,
            align: None,
            rank_factor: None,
        }
    }
}
