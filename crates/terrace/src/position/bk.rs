//! Brandes-Koepf horizontal coordinate assignment.
//!
//! Four sweeps (up/down crossed with left/right) each gather nodes into
//! vertical alignment blocks, compact the blocks along a separation graph,
//! and the final x per node is the median of the four sweep results. After
//! Brandes and Koepf, "Fast and Simple Horizontal Coordinate Assignment".

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};
use terrace_graph::{Graph, GraphOptions};

use crate::LayoutGraph;
use crate::error::Result;
use crate::model::{LabelSide, SweepDirection};
use crate::position::build_layers;

/// Pairs of nodes that must not share an alignment block, symmetric and
/// ordered for deterministic iteration.
pub type Conflicts = BTreeMap<String, BTreeSet<String>>;

pub fn add_conflict(conflicts: &mut Conflicts, v: &str, w: &str) {
    let (v, w) = if v <= w { (v, w) } else { (w, v) };
    conflicts
        .entry(v.to_string())
        .or_default()
        .insert(w.to_string());
}

pub fn has_conflict(conflicts: &Conflicts, v: &str, w: &str) -> bool {
    let (v, w) = if v <= w { (v, w) } else { (w, v) };
    conflicts.get(v).is_some_and(|set| set.contains(w))
}

/// Marks edges that cross an inner segment (an edge between two routing
/// nodes): aligning such an edge would draw it through the routed chain.
///
/// For each layer, inner-segment endpoints split the layer into spans; a
/// predecessor whose order falls outside the span's bracket `[k0, k1]` in
/// the upper layer crosses the bracketing segment and is flagged, unless
/// both endpoints are routing nodes (that case is handled as type-2).
pub fn find_type1_conflicts(g: &LayoutGraph, layering: &[Vec<String>]) -> Conflicts {
    let mut conflicts = Conflicts::new();
    for i in 1..layering.len() {
        let prev_layer = &layering[i - 1];
        let layer = &layering[i];

        let mut k0 = 0usize;
        let mut scan_pos = 0usize;
        let prev_len = prev_layer.len();
        let last = layer.last().map(String::as_str);

        for (idx, v) in layer.iter().enumerate() {
            let w = inner_segment_partner(g, v);
            let k1 = w
                .as_deref()
                .and_then(|w| g.node(w))
                .and_then(|n| n.order)
                .unwrap_or(prev_len);

            if w.is_some() || last == Some(v.as_str()) {
                for scan_node in layer.iter().take(idx + 1).skip(scan_pos) {
                    let scan_fake = g.node(scan_node).map(|n| n.fake).unwrap_or(false);
                    for u in g.predecessors(scan_node) {
                        let Some(u_label) = g.node(u) else { continue };
                        let u_pos = u_label.order.unwrap_or(0);
                        if (u_pos < k0 || k1 < u_pos) && !(u_label.fake && scan_fake) {
                            add_conflict(&mut conflicts, u, scan_node);
                        }
                    }
                }
                scan_pos = idx + 1;
                k0 = k1;
            }
        }
    }
    conflicts
}

/// Marks inner segments that cross each other. Walking a layer left to
/// right, the upper endpoints of its inner segments must be ordered as
/// well; a segment whose upper endpoint sits left of an endpoint already
/// seen crosses an earlier segment and must not be aligned.
pub fn find_type2_conflicts(g: &LayoutGraph, layering: &[Vec<String>]) -> Conflicts {
    let mut conflicts = Conflicts::new();
    for layer in layering.iter().skip(1) {
        let mut max_upper: Option<usize> = None;
        for v in layer {
            let Some(u) = inner_segment_partner(g, v) else {
                continue;
            };
            let u_pos = g.node(&u).and_then(|n| n.order).unwrap_or(0);
            if let Some(m) = max_upper {
                if u_pos < m {
                    add_conflict(&mut conflicts, &u, v);
                    continue;
                }
            }
            max_upper = Some(u_pos);
        }
    }
    conflicts
}

/// The upper endpoint of an inner segment: a routing-node predecessor of a
/// routing node, when one exists.
fn inner_segment_partner(g: &LayoutGraph, v: &str) -> Option<String> {
    if !g.node(v).map(|n| n.fake).unwrap_or(false) {
        return None;
    }
    g.predecessors(v)
        .into_iter()
        .find(|u| g.node(u).map(|n| n.fake).unwrap_or(false))
        .map(str::to_string)
}

/// Block structure produced by one alignment sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Block root per node; nodes sharing a root share an x coordinate.
    pub root: FxHashMap<String, String>,
    /// Next node within the block, wrapping back to the root at the end.
    pub align: FxHashMap<String, String>,
}

/// Greedy median alignment for one sweep. Scanning each layer in order,
/// every node tries to join the block of the median of its `neighbors` in
/// the adjacent layer; neighbors already passed over in this layer and
/// pairs flagged in `conflicts` are skipped.
pub fn vertical_alignment<F>(
    layering: &[Vec<String>],
    conflicts: &Conflicts,
    neighbors: F,
) -> Alignment
where
    F: Fn(&str) -> Vec<String>,
{
    let mut root: FxHashMap<String, String> = FxHashMap::default();
    let mut align: FxHashMap<String, String> = FxHashMap::default();
    let mut pos: FxHashMap<String, usize> = FxHashMap::default();

    for layer in layering {
        for (order, v) in layer.iter().enumerate() {
            root.insert(v.clone(), v.clone());
            align.insert(v.clone(), v.clone());
            pos.insert(v.clone(), order);
        }
    }

    for layer in layering {
        let mut prev_idx: isize = -1;
        for v in layer {
            let mut ws = neighbors(v);
            if ws.is_empty() {
                continue;
            }
            ws.sort_by_key(|w| pos.get(w).copied().unwrap_or(usize::MAX));

            let mid = (ws.len() - 1) as f64 / 2.0;
            let lo = mid.floor() as usize;
            let hi = mid.ceil() as usize;

            for w in ws.iter().take(hi + 1).skip(lo) {
                let v_align = align.get(v).cloned().unwrap_or_else(|| v.clone());
                let w_pos = pos.get(w).copied().unwrap_or(usize::MAX) as isize;
                if v_align == *v && prev_idx < w_pos && !has_conflict(conflicts, v, w) {
                    align.insert(w.clone(), v.clone());
                    let w_root = root.get(w).cloned().unwrap_or_else(|| w.clone());
                    align.insert(v.clone(), w_root.clone());
                    root.insert(v.clone(), w_root);
                    prev_idx = w_pos;
                }
            }
        }
    }

    Alignment { root, align }
}

/// Separation constraints between blocks: one node per block root, one
/// edge per adjacent pair of roots within a layer, weighted with the
/// largest separation any member pair requires.
pub type BlockGraph = Graph<(), f64, ()>;

pub fn build_block_graph(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    root: &FxHashMap<String, String>,
    reverse_sep: bool,
) -> BlockGraph {
    let mut block_g: BlockGraph = Graph::new(GraphOptions::default());
    for layer in layering {
        let mut prev: Option<&str> = None;
        for v in layer {
            let v_root = root.get(v).cloned().unwrap_or_else(|| v.clone());
            block_g.ensure_node(v_root.clone());

            if let Some(u) = prev {
                let u_root = root.get(u).cloned().unwrap_or_else(|| u.to_string());
                let prev_max = block_g.edge(&u_root, &v_root, None).copied().unwrap_or(0.0);
                let gap = separation(g, v, u, reverse_sep);
                block_g.set_edge_with_label(u_root, v_root, gap.max(prev_max));
            }
            prev = Some(v);
        }
    }
    block_g
}

/// Longest-path solve over the block graph: a forward pass pushes each
/// block right of its predecessors by the required gap, then a backward
/// pass pulls blocks right up to the slack their successors leave. The
/// result is the most compact placement satisfying every separation.
pub fn solve_block_x(block_g: &BlockGraph) -> FxHashMap<String, f64> {
    let mut xs: FxHashMap<String, f64> = FxHashMap::default();

    {
        let mut set = |elem: &str| {
            let mut best = 0.0_f64;
            for key in block_g.in_edges(elem) {
                let gap = block_g.edge_by_key(&key).copied().unwrap_or(0.0);
                let x = xs.get(&key.v).copied().unwrap_or(0.0);
                best = best.max(x + gap);
            }
            xs.insert(elem.to_string(), best);
        };
        let next = |elem: &str| {
            block_g
                .predecessors(elem)
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        iterate(block_g, &mut set, next);
    }

    {
        let mut set = |elem: &str| {
            let mut min = f64::INFINITY;
            for key in block_g.out_edges(elem) {
                let gap = block_g.edge_by_key(&key).copied().unwrap_or(0.0);
                let x = xs.get(&key.w).copied().unwrap_or(0.0);
                min = min.min(x - gap);
            }
            if min.is_finite() {
                let cur = xs.get(elem).copied().unwrap_or(0.0);
                xs.insert(elem.to_string(), cur.max(min));
            }
        };
        let next = |elem: &str| {
            block_g
                .successors(elem)
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        iterate(block_g, &mut set, next);
    }

    xs
}

/// Depth-first worklist where a node is evaluated only after everything
/// `next_nodes` reaches from it: each node is pushed back on first sight
/// and evaluated when popped again.
fn iterate<F, N>(block_g: &BlockGraph, set_xs: &mut F, mut next_nodes: N)
where
    F: FnMut(&str),
    N: FnMut(&str) -> Vec<String>,
{
    let mut stack: Vec<String> = block_g.node_ids();
    let mut visited: FxHashSet<String> = FxHashSet::default();

    while let Some(elem) = stack.pop() {
        if visited.contains(&elem) {
            set_xs(&elem);
            continue;
        }
        visited.insert(elem.clone());
        stack.push(elem.clone());
        for next in next_nodes(&elem) {
            stack.push(next);
        }
    }
}

/// X per node for one sweep: solve the block graph, then every node
/// inherits the coordinate of its block root.
pub fn horizontal_compaction(
    g: &LayoutGraph,
    layering: &[Vec<String>],
    alignment: &Alignment,
    reverse_sep: bool,
) -> FxHashMap<String, f64> {
    let block_g = build_block_graph(g, layering, &alignment.root, reverse_sep);
    let block_x = solve_block_x(&block_g);

    let mut xs: FxHashMap<String, f64> = FxHashMap::default();
    for (v, root) in &alignment.root {
        xs.insert(v.clone(), block_x.get(root).copied().unwrap_or(0.0));
    }
    xs
}

/// The sweep whose drawing spans the least total width; ties keep the
/// earlier direction in `SweepDirection::ALL`.
pub fn find_smallest_width_alignment(
    g: &LayoutGraph,
    xss: &[FxHashMap<String, f64>; 4],
) -> FxHashMap<String, f64> {
    let mut best_width = f64::INFINITY;
    let mut best: FxHashMap<String, f64> = FxHashMap::default();
    for dir in SweepDirection::ALL {
        let xs = &xss[dir as usize];
        let mut max = f64::NEG_INFINITY;
        let mut min = f64::INFINITY;
        for (v, &x) in xs {
            let half = node_width(g, v) / 2.0;
            max = max.max(x + half);
            min = min.min(x - half);
        }
        let width = max - min;
        if width < best_width {
            best_width = width;
            best = xs.clone();
        }
    }
    best
}

/// Shifts each sweep's coordinates so its extent lines up with the
/// reference map: left sweeps match the reference minimum, right sweeps
/// the maximum.
pub fn align_coordinates(xss: &mut [FxHashMap<String, f64>; 4], align_to: &FxHashMap<String, f64>) {
    let to_min = align_to.values().copied().fold(f64::INFINITY, f64::min);
    let to_max = align_to.values().copied().fold(f64::NEG_INFINITY, f64::max);

    for dir in SweepDirection::ALL {
        let xs = &mut xss[dir as usize];
        if xs.is_empty() {
            continue;
        }
        let delta = if dir.is_right() {
            to_max - xs.values().copied().fold(f64::NEG_INFINITY, f64::max)
        } else {
            to_min - xs.values().copied().fold(f64::INFINITY, f64::min)
        };
        if delta != 0.0 {
            for x in xs.values_mut() {
                *x += delta;
            }
        }
    }
}

/// Per-node median of the four sweeps (the average of the two middle
/// values), or a single sweep verbatim when `align` requests one.
pub fn balance(
    xss: &[FxHashMap<String, f64>; 4],
    align: Option<SweepDirection>,
) -> FxHashMap<String, f64> {
    let ul = &xss[SweepDirection::UpLeft as usize];
    let mut out: FxHashMap<String, f64> = FxHashMap::default();

    if let Some(dir) = align {
        let xs = &xss[dir as usize];
        for v in ul.keys() {
            out.insert(v.clone(), xs.get(v).copied().unwrap_or(0.0));
        }
        return out;
    }

    for v in ul.keys() {
        let mut vals: Vec<f64> = xss.iter().filter_map(|xs| xs.get(v).copied()).collect();
        vals.sort_by(|a, b| a.total_cmp(b));
        if vals.len() >= 4 {
            out.insert(v.clone(), (vals[1] + vals[2]) / 2.0);
        }
    }
    out
}

/// X coordinate per node: four alignment sweeps, aligned to the narrowest
/// sweep and balanced per node.
pub fn position_x(g: &LayoutGraph) -> Result<FxHashMap<String, f64>> {
    let layering = build_layers(g)?;
    let mut conflicts = find_type1_conflicts(g, &layering);
    for (v, ws) in find_type2_conflicts(g, &layering) {
        for w in ws {
            add_conflict(&mut conflicts, &v, &w);
        }
    }

    let mut xss: [FxHashMap<String, f64>; 4] = [
        FxHashMap::default(),
        FxHashMap::default(),
        FxHashMap::default(),
        FxHashMap::default(),
    ];
    for dir in SweepDirection::ALL {
        let mut adjusted: Vec<Vec<String>> = if dir.is_down() {
            layering.iter().rev().cloned().collect()
        } else {
            layering.clone()
        };
        if dir.is_right() {
            for layer in &mut adjusted {
                layer.reverse();
            }
        }

        let alignment = vertical_alignment(&adjusted, &conflicts, |v| {
            let ws = if dir.is_down() {
                g.successors(v)
            } else {
                g.predecessors(v)
            };
            ws.into_iter().map(str::to_string).collect()
        });
        let mut xs = horizontal_compaction(g, &adjusted, &alignment, dir.is_right());
        if dir.is_right() {
            for x in xs.values_mut() {
                *x = -*x;
            }
        }
        xss[dir as usize] = xs;
    }

    let reference = find_smallest_width_alignment(g, &xss);
    align_coordinates(&mut xss, &reference);
    Ok(balance(&xss, g.graph().align))
}

/// Minimum distance between the centers of `v` and its left neighbor `u`:
/// half of each width plus `edgesep` when either is a routing node,
/// `nodesep` otherwise. A left/right edge-label hint shifts a node's box
/// within its slot; `reverse_sep` mirrors the shift for right-to-left
/// sweeps.
pub fn separation(g: &LayoutGraph, v: &str, u: &str, reverse_sep: bool) -> f64 {
    let v_label = g.node(v).cloned().unwrap_or_default();
    let u_label = g.node(u).cloned().unwrap_or_default();
    let cfg = g.graph();

    let mut sum = v_label.width / 2.0;
    let mut delta = match v_label.label_side {
        LabelSide::Left => -v_label.width / 2.0,
        LabelSide::Right => v_label.width / 2.0,
        LabelSide::Center => 0.0,
    };
    if delta != 0.0 {
        sum += if reverse_sep { delta } else { -delta };
    }

    sum += if v_label.fake || u_label.fake {
        cfg.edgesep
    } else {
        cfg.nodesep
    };

    sum += u_label.width / 2.0;
    delta = match u_label.label_side {
        LabelSide::Left => u_label.width / 2.0,
        LabelSide::Right => -u_label.width / 2.0,
        LabelSide::Center => 0.0,
    };
    if delta != 0.0 {
        sum += if reverse_sep { delta } else { -delta };
    }

    sum
}

fn node_width(g: &LayoutGraph, v: &str) -> f64 {
    g.node(v).map(|n| n.width).unwrap_or(0.0)
}
