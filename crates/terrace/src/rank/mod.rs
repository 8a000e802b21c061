//! Rank assignment.
//!
//! Ranks are integer layers: every edge `(v, w)` must satisfy
//! `rank(w) - rank(v) >= minlen`, and the ranker minimizes the total
//! weighted edge length `sum(weight * (rank(w) - rank(v)))` using the
//! network simplex method from Gansner, Koutsofios, North and Vo,
//! "A Technique for Drawing Directed Graphs".
//!
//! The input must be a connected DAG. Disconnected graphs are reported as
//! an error; cycles are not detected and make the initial ranking pass
//! loop forever.

pub mod simplex;
pub mod tree;

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use terrace_graph::{EdgeKey, Graph, GraphOptions};

use crate::LayoutGraph;
use crate::error::Result;
use crate::model::EdgeAttrs;

/// Assigns a rank to every node, shifts the result so the smallest rank is
/// zero, and, when the graph is configured with a `rank_factor`, compresses
/// empty rank slots.
pub fn rank(g: &mut LayoutGraph) -> Result<()> {
    simplex::run(g)?;
    normalize_ranks(g);
    if let Some(factor) = g.graph().rank_factor {
        compress_ranks(g, factor);
    }
    Ok(())
}

/// Collapses parallel edges into one edge per ordered pair, summing their
/// weights and keeping the largest `minlen`. Returns a fresh simple graph;
/// the input is untouched.
pub fn canonicalize(g: &LayoutGraph) -> LayoutGraph {
    let mut canon: LayoutGraph = Graph::new(GraphOptions {
        multigraph: false,
        directed: true,
    });
    canon.set_graph(g.graph().clone());
    for (id, attrs) in g.nodes() {
        canon.set_node(id, attrs.clone());
    }

    let mut merged: BTreeMap<(String, String), EdgeAttrs> = BTreeMap::new();
    for (key, attrs) in g.edges() {
        let entry = merged
            .entry((key.v.clone(), key.w.clone()))
            .or_insert(EdgeAttrs {
                weight: 0.0,
                minlen: 1,
            });
        entry.weight += attrs.weight;
        entry.minlen = entry.minlen.max(attrs.minlen.max(1));
    }
    for ((v, w), attrs) in merged {
        canon.set_edge_with_label(v, w, attrs);
    }
    canon
}

/// Computes a feasible ranking: every node gets the smallest rank
/// consistent with the ranks of its successors, and sinks get rank 0. The
/// result satisfies every `minlen` constraint but is not length-optimal.
///
/// Uses an explicit work stack, so deep graphs cannot overflow the call
/// stack. Nodes are visited twice: the first visit pushes unranked
/// successors, the second derives the rank from the now-ranked successors.
pub fn initial_ranks(g: &mut LayoutGraph) {
    let mut ranks: FxHashMap<String, i32> = FxHashMap::default();

    let mut stack: Vec<(String, bool)> =
        g.sources().into_iter().map(|s| (s, false)).collect();
    while let Some((v, expanded)) = stack.pop() {
        if ranks.contains_key(&v) {
            continue;
        }
        if expanded {
            let mut rank: Option<i32> = None;
            for key in g.out_edges(&v) {
                let Some(&w_rank) = ranks.get(key.w.as_str()) else {
                    continue;
                };
                let minlen = g.edge_by_key(&key).map(|e| e.minlen).unwrap_or(1);
                let candidate = w_rank - minlen;
                rank = Some(match rank {
                    Some(r) => r.min(candidate),
                    None => candidate,
                });
            }
            let rank = rank.unwrap_or(0);
            ranks.insert(v.clone(), rank);
            if let Some(n) = g.node_mut(&v) {
                n.rank = Some(rank);
            }
        } else {
            stack.push((v.clone(), true));
            for key in g.out_edges(&v) {
                if !ranks.contains_key(key.w.as_str()) {
                    stack.push((key.w, false));
                }
            }
        }
    }
}

/// Difference between the actual and the minimum length of `e`; zero means
/// the edge is tight.
pub fn slack(g: &LayoutGraph, e: &EdgeKey) -> i32 {
    let v_rank = g.node(&e.v).and_then(|n| n.rank).unwrap_or(0);
    let w_rank = g.node(&e.w).and_then(|n| n.rank).unwrap_or(0);
    let minlen = g.edge_by_key(e).map(|l| l.minlen).unwrap_or(1);
    w_rank - v_rank - minlen
}

/// Shifts all ranks so the smallest becomes zero.
pub fn normalize_ranks(g: &mut LayoutGraph) {
    let Some(min) = g.nodes().filter_map(|(_, n)| n.rank).min() else {
        return;
    };
    for (_, n) in g.nodes_mut() {
        if let Some(rank) = n.rank.as_mut() {
            *rank -= min;
        }
    }
}

/// Removes empty rank slots by sliding later ranks up. A positive `factor`
/// preserves empty slots whose index is a multiple of `factor`, keeping
/// room for virtual-node ranks inserted in fixed multiples; a factor of
/// zero (or less) closes every gap.
pub fn compress_ranks(g: &mut LayoutGraph, factor: i32) {
    let Some(min) = g.nodes().filter_map(|(_, n)| n.rank).min() else {
        return;
    };
    let max = g.nodes().filter_map(|(_, n)| n.rank).max().unwrap_or(min);

    let mut layers: BTreeMap<i32, Vec<String>> = BTreeMap::new();
    for (id, n) in g.nodes() {
        if let Some(rank) = n.rank {
            layers.entry(rank - min).or_default().push(id.to_string());
        }
    }

    let mut delta = 0;
    for i in 0..=(max - min) {
        match layers.get(&i) {
            None => {
                if !(factor > 0 && i % factor == 0) {
                    delta -= 1;
                }
            }
            Some(ids) if delta != 0 => {
                for id in ids {
                    if let Some(rank) = g.node_mut(id).and_then(|n| n.rank.as_mut()) {
                        *rank += delta;
                    }
                }
            }
            Some(_) => {}
        }
    }
}
