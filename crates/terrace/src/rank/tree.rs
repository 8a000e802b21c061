//! Tight spanning trees.
//!
//! The simplex loop works on an undirected spanning tree whose edges all
//! have zero slack. Tree nodes carry the `low`/`lim` DFS interval labels
//! used for the descendant test during edge exchanges.

use rustc_hash::FxHashSet;
use terrace_graph::{Graph, GraphOptions};

use crate::LayoutGraph;
use crate::error::{Error, Result};
use crate::rank::slack;

/// Spanning-tree node state. `w` is a descendant of `v` in the tree iff
/// `low(v) <= lim(w) <= lim(v)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeNode {
    pub low: i32,
    pub lim: i32,
    pub parent: Option<String>,
}

/// Spanning-tree edge state; the cut value is maintained by the simplex
/// loop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeEdge {
    pub cut: f64,
}

pub type TreeGraph = Graph<TreeNode, TreeEdge, ()>;

/// Builds a spanning tree in which every tree edge has zero slack,
/// adjusting ranks as it grows: each round adds all tight edges reachable
/// from the current tree, then shifts the tree's ranks by the minimum
/// slack of any edge leaving it so at least one more edge becomes tight.
///
/// Fails on disconnected input, naming one unreachable node.
pub fn tight_tree(g: &mut LayoutGraph) -> Result<TreeGraph> {
    let mut t: TreeGraph = Graph::new(GraphOptions {
        multigraph: false,
        directed: false,
    });
    let Some(start) = g.first_node() else {
        return Ok(t);
    };
    t.set_node(start.to_string(), TreeNode::default());

    let size = g.node_count();
    while grow_tight(&mut t, g) < size {
        match min_slack_edge(g, &t) {
            Some((edge_slack, tail_in_tree)) => {
                let delta = if tail_in_tree { edge_slack } else { -edge_slack };
                shift_tree_ranks(g, &t, delta);
            }
            None => {
                let node = g
                    .nodes()
                    .map(|(id, _)| id)
                    .find(|id| !t.has_node(id))
                    .unwrap_or_default()
                    .to_string();
                return Err(Error::Disconnected { node });
            }
        }
    }
    Ok(t)
}

/// Adds every node reachable from the current tree over zero-slack edges,
/// returning the new tree size.
fn grow_tight(t: &mut TreeGraph, g: &LayoutGraph) -> usize {
    let mut stack = t.node_ids();
    while let Some(v) = stack.pop() {
        for key in g.node_edges(&v) {
            let other = if key.v == v { &key.w } else { &key.v };
            if t.has_node(other) || slack(g, &key) != 0 {
                continue;
            }
            t.set_edge(v.clone(), other.clone());
            stack.push(other.clone());
        }
    }
    t.node_count()
}

/// Minimum slack over all edges with exactly one endpoint in the tree,
/// plus whether that endpoint is the tail. `None` when no edge leaves the
/// tree.
fn min_slack_edge(g: &LayoutGraph, t: &TreeGraph) -> Option<(i32, bool)> {
    let mut best: Option<(i32, bool)> = None;
    for (key, _) in g.edges() {
        let tail_in_tree = t.has_node(&key.v);
        if tail_in_tree == t.has_node(&key.w) {
            continue;
        }
        let s = slack(g, key);
        if best.is_none_or(|(b, _)| s < b) {
            best = Some((s, tail_in_tree));
        }
    }
    best
}

fn shift_tree_ranks(g: &mut LayoutGraph, t: &TreeGraph, delta: i32) {
    for id in t.node_ids() {
        if let Some(n) = g.node_mut(&id) {
            n.rank = Some(n.rank.unwrap_or(0) + delta);
        }
    }
}

/// Assigns `low`/`lim` DFS interval labels and parent pointers over the
/// tree, rooted at `root` (or the first tree node when absent). Iterative,
/// so tree depth is not limited by the call stack.
pub fn init_low_lim(tree: &mut TreeGraph, root: Option<&str>) {
    let root = match root {
        Some(r) => r.to_string(),
        None => match tree.first_node() {
            Some(r) => r.to_string(),
            None => return,
        },
    };

    struct Frame {
        v: String,
        parent: Option<String>,
        low: i32,
        children: Vec<String>,
        next: usize,
    }

    let mut visited: FxHashSet<String> = FxHashSet::default();
    let mut stack: Vec<Frame> = Vec::new();
    let mut next_lim = 1;

    visited.insert(root.clone());
    let children: Vec<String> = tree
        .neighbors(&root)
        .into_iter()
        .map(str::to_string)
        .collect();
    stack.push(Frame {
        v: root,
        parent: None,
        low: next_lim,
        children,
        next: 0,
    });

    loop {
        let Some(top) = stack.last_mut() else { break };
        match top.children.get(top.next).cloned() {
            Some(child) => {
                top.next += 1;
                let parent = top.v.clone();
                if visited.insert(child.clone()) {
                    let children: Vec<String> = tree
                        .neighbors(&child)
                        .into_iter()
                        .filter(|w| *w != parent)
                        .map(str::to_string)
                        .collect();
                    stack.push(Frame {
                        v: child,
                        parent: Some(parent),
                        low: next_lim,
                        children,
                        next: 0,
                    });
                }
            }
            None => {
                if let Some(frame) = stack.pop() {
                    if let Some(label) = tree.node_mut(&frame.v) {
                        label.low = frame.low;
                        label.lim = next_lim;
                        label.parent = frame.parent;
                    }
                    next_lim += 1;
                }
            }
        }
    }
}
