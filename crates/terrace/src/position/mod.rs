//! Position assignment.
//!
//! Y coordinates come straight from row heights: every rank is as tall as
//! its tallest node and consecutive ranks sit `ranksep` apart. X
//! coordinates are produced by the Brandes-Koepf scheme in [`bk`].
//!
//! Both passes read the `rank` and `order` attributes written by the
//! ranking and ordering stages and fail fast when one is missing.

pub mod bk;

use std::collections::BTreeMap;

use crate::LayoutGraph;
use crate::error::{Error, Result};

/// Writes final `x` and `y` coordinates onto every node.
pub fn position(g: &mut LayoutGraph) -> Result<()> {
    position_y(g)?;
    let xs = bk::position_x(g)?;
    for (v, x) in xs {
        if let Some(n) = g.node_mut(&v) {
            n.x = Some(x);
        }
    }
    tracing::debug!(nodes = g.node_count(), "position assignment finished");
    Ok(())
}

/// Groups nodes into rank layers, each ordered by `order`. Fails naming
/// the first node that lacks a rank or an order.
pub fn build_layers(g: &LayoutGraph) -> Result<Vec<Vec<String>>> {
    let mut layers: BTreeMap<i32, Vec<(usize, String)>> = BTreeMap::new();
    for (id, n) in g.nodes() {
        let rank = n.rank.ok_or_else(|| Error::MissingRank {
            node: id.to_string(),
        })?;
        let order = n.order.ok_or_else(|| Error::MissingOrder {
            node: id.to_string(),
        })?;
        layers.entry(rank).or_default().push((order, id.to_string()));
    }
    Ok(layers
        .into_values()
        .map(|mut layer| {
            layer.sort_by_key(|(order, _)| *order);
            layer.into_iter().map(|(_, id)| id).collect()
        })
        .collect())
}

/// Assigns `y` per rank: nodes sit on the rank's centerline, half the
/// rank's maximum height below the running offset.
pub fn position_y(g: &mut LayoutGraph) -> Result<()> {
    let layering = build_layers(g)?;
    let ranksep = g.graph().ranksep;
    let mut prev_y = 0.0;
    for layer in &layering {
        let max_height = layer
            .iter()
            .filter_map(|v| g.node(v))
            .map(|n| n.height)
            .fold(0.0_f64, f64::max);
        for v in layer {
            if let Some(n) = g.node_mut(v) {
                n.y = Some(prev_y + max_height / 2.0);
            }
        }
        prev_y += max_height + ranksep;
    }
    Ok(())
}
