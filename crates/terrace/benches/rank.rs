use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;
use terrace::{EdgeAttrs, LayoutConfig, LayoutGraph, NodeAttrs, rank};
use terrace_graph::{Graph, GraphOptions};

#[derive(Debug, Clone)]
struct GraphSpec {
    node_ids: Vec<String>,
    edges: Vec<(usize, usize, i32, f64)>,
}

impl GraphSpec {
    fn build(&self) -> LayoutGraph {
        let mut g: LayoutGraph = Graph::new(GraphOptions {
            directed: true,
            multigraph: true,
        });
        g.set_graph(LayoutConfig::default());

        for id in &self.node_ids {
            g.set_node(id.clone(), NodeAttrs::default());
        }
        for &(from, to, minlen, weight) in &self.edges {
            if from >= self.node_ids.len() || to >= self.node_ids.len() || from == to {
                continue;
            }
            g.set_edge_with_label(
                self.node_ids[from].clone(),
                self.node_ids[to].clone(),
                EdgeAttrs { weight, minlen },
            );
        }
        g
    }
}

fn build_dag_spec(name: &str, node_count: usize, fanout: usize) -> GraphSpec {
    let node_ids: Vec<String> = (0..node_count).map(|i| format!("{name}_n{i}")).collect();
    let mut edges: Vec<(usize, usize, i32, f64)> = Vec::new();

    // A spine to guarantee connectivity.
    for i in 0..node_count.saturating_sub(1) {
        edges.push((i, i + 1, 1, 2.0));
    }

    // Extra forward edges to create slack variation.
    for i in 0..node_count {
        for k in 2..=(fanout + 1) {
            let to = i.saturating_add(k);
            if to >= node_count {
                break;
            }
            edges.push((i, to, 1, 1.0));
        }

        let to = i.saturating_add(10);
        if to < node_count {
            edges.push((i, to, 2, 0.5));
        }
    }

    GraphSpec { node_ids, edges }
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    group.measurement_time(Duration::from_secs(10));

    let cases = [
        ("dag_50_f3", 50usize, 3usize),
        ("dag_200_f4", 200usize, 4usize),
        ("dag_400_f4", 400usize, 4usize),
    ];

    for (name, nodes, fanout) in cases {
        let spec = build_dag_spec(name, nodes, fanout);
        group.bench_with_input(BenchmarkId::new("rank::simplex", name), &spec, |b, spec| {
            b.iter_batched(
                || spec.build(),
                |mut g| {
                    rank(black_box(&mut g)).unwrap();
                    black_box(g.node_count());
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
