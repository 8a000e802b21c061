use terrace::rank::slack;
use terrace::rank::tree::tight_tree;
use terrace::{EdgeAttrs, Error, LayoutConfig, LayoutGraph, NodeAttrs};
use terrace_graph::{Graph, GraphOptions};

fn new_graph() -> LayoutGraph {
    let mut g: LayoutGraph = Graph::new(GraphOptions::default());
    g.set_graph(LayoutConfig::default());
    g
}

fn node_with_rank(rank: i32) -> NodeAttrs {
    NodeAttrs {
        rank: Some(rank),
        ..Default::default()
    }
}

fn edge(minlen: i32) -> EdgeAttrs {
    EdgeAttrs {
        minlen,
        ..Default::default()
    }
}

fn sorted_neighbors(t: &terrace::rank::tree::TreeGraph, v: &str) -> Vec<String> {
    let mut ns: Vec<String> = t.neighbors(v).into_iter().map(|s| s.to_string()).collect();
    ns.sort();
    ns
}

#[test]
fn tight_tree_creates_a_tree_for_a_trivial_input_graph() {
    let mut g = new_graph();
    g.set_node("a", node_with_rank(0));
    g.set_node("b", node_with_rank(1));
    g.set_edge_with_label("a", "b", edge(1));

    let tree = tight_tree(&mut g).unwrap();
    assert_eq!(
        g.node("b").unwrap().rank,
        Some(g.node("a").unwrap().rank.unwrap() + 1)
    );
    assert_eq!(tree.neighbors("a"), vec!["b"]);
}

#[test]
fn tight_tree_correctly_shortens_slack_by_pulling_a_node_up() {
    let mut g = new_graph();
    g.set_node("a", node_with_rank(0));
    g.set_node("b", node_with_rank(1));
    g.set_node("c", node_with_rank(2));
    g.set_node("d", node_with_rank(2));
    g.set_edge_with_label("a", "b", edge(1));
    g.set_edge_with_label("b", "c", edge(1));
    g.set_edge_with_label("a", "d", edge(1));

    let tree = tight_tree(&mut g).unwrap();
    assert_eq!(
        g.node("b").unwrap().rank,
        Some(g.node("a").unwrap().rank.unwrap() + 1)
    );
    assert_eq!(
        g.node("c").unwrap().rank,
        Some(g.node("b").unwrap().rank.unwrap() + 1)
    );
    assert_eq!(
        g.node("d").unwrap().rank,
        Some(g.node("a").unwrap().rank.unwrap() + 1)
    );

    assert_eq!(sorted_neighbors(&tree, "a"), vec!["b", "d"]);
    assert_eq!(sorted_neighbors(&tree, "b"), vec!["a", "c"]);
    assert_eq!(tree.neighbors("c"), vec!["b"]);
    assert_eq!(tree.neighbors("d"), vec!["a"]);
}

#[test]
fn tight_tree_correctly_shortens_slack_by_pulling_a_node_down() {
    let mut g = new_graph();
    g.set_node("a", node_with_rank(2));
    g.set_node("b", node_with_rank(0));
    g.set_node("c", node_with_rank(2));
    g.set_edge_with_label("b", "a", edge(1));
    g.set_edge_with_label("b", "c", edge(1));

    let tree = tight_tree(&mut g).unwrap();
    assert_eq!(
        g.node("a").unwrap().rank,
        Some(g.node("b").unwrap().rank.unwrap() + 1)
    );
    assert_eq!(
        g.node("c").unwrap().rank,
        Some(g.node("b").unwrap().rank.unwrap() + 1)
    );

    assert_eq!(sorted_neighbors(&tree, "a"), vec!["b"]);
    assert_eq!(sorted_neighbors(&tree, "b"), vec!["a", "c"]);
    assert_eq!(sorted_neighbors(&tree, "c"), vec!["b"]);
}

#[test]
fn tight_tree_spans_all_nodes_with_zero_slack_edges() {
    let mut g = new_graph();
    g.set_path(&["a", "b", "c", "d", "h"]);
    g.set_path(&["a", "e", "g", "h"]);
    g.set_path(&["a", "f", "g"]);
    terrace::rank::initial_ranks(&mut g);

    let tree = tight_tree(&mut g).unwrap();
    assert_eq!(tree.node_count(), g.node_count());
    assert_eq!(tree.edge_count(), g.node_count() - 1);
    for (key, _) in tree.edges() {
        let s = if g.has_edge(&key.v, &key.w, None) {
            slack(&g, key)
        } else {
            slack(
                &g,
                &terrace_graph::EdgeKey::new(key.w.clone(), key.v.clone(), None::<String>),
            )
        };
        assert_eq!(s, 0, "tree edge {} -- {} is not tight", key.v, key.w);
    }
}

#[test]
fn tight_tree_reports_a_disconnected_graph() {
    let mut g = new_graph();
    g.set_node("a", node_with_rank(0));
    g.set_node("b", node_with_rank(0));

    match tight_tree(&mut g) {
        Err(Error::Disconnected { node }) => assert_eq!(node, "b"),
        other => panic!("expected a disconnected error, got {other:?}"),
    }
}
