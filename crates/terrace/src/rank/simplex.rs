//! Network simplex iterations.
//!
//! Starting from a tight spanning tree, the loop exchanges a tree edge
//! with negative cut value for the minimum-slack graph edge crossing the
//! induced cut, until no negative cut value remains. Every exchange
//! re-derives the DFS intervals, cut values and ranks from the new tree.

use rustc_hash::FxHashSet;
use terrace_graph::EdgeKey;

use crate::LayoutGraph;
use crate::error::Result;
use crate::rank::tree::{TreeGraph, init_low_lim, tight_tree};
use crate::rank::{canonicalize, initial_ranks, slack};

/// Runs the simplex ranking on a canonical copy of `g` and writes the
/// resulting ranks back. Ranks are length-optimal but not normalized.
pub fn run(g: &mut LayoutGraph) -> Result<()> {
    let mut canon = canonicalize(g);
    initial_ranks(&mut canon);
    let mut t = tight_tree(&mut canon)?;
    init_low_lim(&mut t, None);
    init_cut_values(&mut t, &canon);

    // Exchange counts are finite but can grow with V * E on adversarial
    // input; treat budget exhaustion as an approximation, not an error.
    let budget = canon
        .node_count()
        .saturating_mul(canon.edge_count())
        .saturating_add(64);
    let mut swaps = 0usize;
    while let Some(leave) = leave_edge(&t) {
        if swaps >= budget {
            tracing::warn!(
                swaps,
                "rank simplex exchange budget exhausted; keeping the current feasible ranking"
            );
            break;
        }
        let enter = enter_edge(&canon, &t, &leave);
        exchange_edges(&mut t, &mut canon, &leave, &enter);
        swaps += 1;
    }
    tracing::debug!(
        nodes = canon.node_count(),
        edges = canon.edge_count(),
        swaps,
        "rank simplex finished"
    );

    for id in g.node_ids() {
        let rank = canon.node(&id).and_then(|n| n.rank);
        if let Some(n) = g.node_mut(&id) {
            n.rank = rank;
        }
    }
    Ok(())
}

/// Computes cut values for every tree edge in one postorder pass. `lim` is
/// the postorder number, so sorting by it yields children before parents,
/// which is exactly the order the incremental formula needs.
pub fn init_cut_values(t: &mut TreeGraph, g: &LayoutGraph) {
    let mut vs: Vec<(i32, String)> = t
        .nodes()
        .map(|(id, label)| (label.lim, id.to_string()))
        .collect();
    vs.sort_by_key(|(lim, _)| *lim);
    vs.pop(); // the root has no parent edge

    for (_, v) in vs {
        assign_cut_value(t, g, &v);
    }
}

fn assign_cut_value(t: &mut TreeGraph, g: &LayoutGraph, child: &str) {
    let Some(parent) = t.node(child).and_then(|n| n.parent.clone()) else {
        return;
    };
    let cut = calc_cut_value(t, g, child);
    if let Some(edge) = t.edge_mut(child, &parent, None) {
        edge.cut = cut;
    }
}

/// Net weight of the graph edges crossing the cut induced by removing the
/// tree edge between `child` and its parent.
///
/// Starting from the graph edge joining the pair, every other edge
/// incident to `child` contributes its weight positively when it points
/// the same way as that edge and negatively otherwise. When the far
/// endpoint hangs off `child` by another tree edge, that edge's own cut
/// value already accounts for its subtree and is folded in with the
/// opposite sign.
pub fn calc_cut_value(t: &TreeGraph, g: &LayoutGraph, child: &str) -> f64 {
    let Some(parent) = t.node(child).and_then(|n| n.parent.clone()) else {
        return 0.0;
    };

    // True when the graph edge between child and parent runs child -> parent.
    let mut child_is_tail = true;
    let mut graph_weight = g.edge(child, &parent, None).map(|e| e.weight);
    if graph_weight.is_none() {
        child_is_tail = false;
        graph_weight = g.edge(&parent, child, None).map(|e| e.weight);
    }
    let mut cut = graph_weight.unwrap_or(0.0);

    for key in g.node_edges(child) {
        let is_out = key.v == child;
        let other = if is_out { key.w.as_str() } else { key.v.as_str() };
        if other == parent {
            continue;
        }

        let points_to_head = is_out == child_is_tail;
        let weight = g.edge_by_key(&key).map(|e| e.weight).unwrap_or(0.0);
        cut += if points_to_head { weight } else { -weight };

        if let Some(tree_edge) = t.edge(child, other, None) {
            cut += if points_to_head {
                -tree_edge.cut
            } else {
                tree_edge.cut
            };
        }
    }
    cut
}

/// First tree edge with a negative cut value, or `None` once the tree is
/// locally optimal.
pub fn leave_edge(t: &TreeGraph) -> Option<EdgeKey> {
    t.edges()
        .find(|(_, label)| label.cut < 0.0)
        .map(|(key, _)| key.clone())
}

/// Finds the minimum-slack graph edge that reconnects the two components
/// created by removing `leave`, oriented so the new tree stays feasible.
///
/// The deeper endpoint of `leave` (smaller `lim`) roots the cut-off
/// component; membership is the `low`/`lim` interval test. A candidate
/// must cross the components against the direction of the removed edge,
/// which the `flip` flag captures when the tree-child is the graph head.
pub fn enter_edge(g: &LayoutGraph, t: &TreeGraph, leave: &EdgeKey) -> EdgeKey {
    // Tree edges are stored undirected; recover the graph orientation.
    let (v, w) = if g.has_edge(&leave.v, &leave.w, None) {
        (leave.v.as_str(), leave.w.as_str())
    } else {
        (leave.w.as_str(), leave.v.as_str())
    };

    let v_label = t.node(v).cloned().unwrap_or_default();
    let w_label = t.node(w).cloned().unwrap_or_default();

    let (tail_low, tail_lim, flip) = if v_label.lim > w_label.lim {
        (w_label.low, w_label.lim, true)
    } else {
        (v_label.low, v_label.lim, false)
    };

    let in_tail = |id: &str| {
        t.node(id)
            .map(|n| tail_low <= n.lim && n.lim <= tail_lim)
            .unwrap_or(false)
    };

    let mut best: Option<(i32, EdgeKey)> = None;
    for (key, _) in g.edges() {
        let v_desc = in_tail(&key.v);
        let w_desc = in_tail(&key.w);
        if flip == v_desc && flip != w_desc {
            let s = slack(g, key);
            if best.as_ref().is_none_or(|(b, _)| s < *b) {
                best = Some((s, key.clone()));
            }
        }
    }
    best.map(|(_, key)| key).unwrap_or_else(|| leave.clone())
}

/// Replaces `leave` with `enter` in the tree and re-derives the DFS
/// labels, cut values and ranks implied by the new tree.
pub fn exchange_edges(t: &mut TreeGraph, g: &mut LayoutGraph, leave: &EdgeKey, enter: &EdgeKey) {
    t.remove_edge(&leave.v, &leave.w, None);
    t.set_edge(enter.v.clone(), enter.w.clone());
    init_low_lim(t, None);
    init_cut_values(t, g);
    update_ranks(t, g);
}

/// Recomputes every rank from the tree: each node sits exactly `minlen`
/// away from its parent, on the side the underlying graph edge dictates.
pub fn update_ranks(t: &TreeGraph, g: &mut LayoutGraph) {
    let root = t
        .nodes()
        .find(|(_, label)| label.parent.is_none())
        .map(|(id, _)| id.to_string());
    let Some(root) = root else { return };

    // Preorder, so a node's parent is ranked before the node itself.
    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut stack: Vec<String> = vec![root];
    while let Some(v) = stack.pop() {
        if !visited.insert(v.clone()) {
            continue;
        }
        let parent = t.node(&v).and_then(|n| n.parent.clone());
        if let Some(parent) = parent {
            let parent_rank = g.node(&parent).and_then(|n| n.rank).unwrap_or(0);
            let rank = if let Some(e) = g.edge(&v, &parent, None) {
                parent_rank - e.minlen
            } else if let Some(e) = g.edge(&parent, &v, None) {
                parent_rank + e.minlen
            } else {
                parent_rank
            };
            if let Some(n) = g.node_mut(&v) {
                n.rank = Some(rank);
            }
        }
        for child in t.neighbors(&v) {
            if !visited.contains(child) {
                stack.push(child.to_string());
            }
        }
    }
}
