//! Wall-clock benchmarks for the visualized structures
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench structure_perf
//!
//! # Only the graph workloads
//! cargo bench --bench structure_perf -- 'graph/'
//! ```
//!
//! Each workload runs twice: with before/after snapshots captured and without,
//! so the cost of snapshot capture is visible next to the bare operations.

use algoviz_core::{AvlTree, BinaryHeap, Graph, VisualizerConfig};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const SIZES: [u32; 3] = [256, 1024, 4096];

fn config(capture_snapshots: bool) -> VisualizerConfig {
    VisualizerConfig {
        capture_snapshots,
        ..VisualizerConfig::default()
    }
}

fn scrambled(n: u32) -> Vec<u32> {
    (0..n).map(|i| i.wrapping_mul(2_654_435_761) % n.next_power_of_two()).collect()
}

fn bench_avl(c: &mut Criterion) {
    let mut group = c.benchmark_group("avl");
    for &n in &SIZES {
        let keys = scrambled(n);
        for capture in [true, false] {
            let label = if capture { "insert_delete_snapshots" } else { "insert_delete" };
            group.bench_with_input(BenchmarkId::new(label, n), &keys, |b, keys| {
                b.iter(|| {
                    let mut tree = AvlTree::with_config(&config(capture));
                    for &key in keys {
                        let _ = tree.insert(key);
                    }
                    for &key in keys.iter().step_by(2) {
                        let _ = tree.delete(&key);
                    }
                    black_box(tree.len())
                });
            });
        }
    }
    group.finish();
}

fn bench_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap");
    for &n in &SIZES {
        let values = scrambled(n);
        for capture in [true, false] {
            let label = if capture { "insert_extract_snapshots" } else { "insert_extract" };
            group.bench_with_input(BenchmarkId::new(label, n), &values, |b, values| {
                b.iter(|| {
                    let mut heap = BinaryHeap::with_config(&config(capture));
                    for &value in values {
                        heap.insert(value);
                    }
                    while let Ok((value, _)) = heap.extract_root() {
                        black_box(value);
                    }
                });
            });
        }
    }
    group.finish();
}

fn grid(side: u32) -> Graph<u32> {
    let mut graph = Graph::with_config(&config(false));
    for v in 0..side * side {
        graph.add_vertex(v);
    }
    for x in 0..side {
        for y in 0..side {
            let v = x * side + y;
            // deterministic weights in 1..=9
            let weight = i64::from((x * 31 + y * 17) % 9 + 1);
            if x + 1 < side {
                let _ = graph.add_edge(&v, &(v + side), weight);
            }
            if y + 1 < side {
                let _ = graph.add_edge(&v, &(v + 1), weight);
            }
        }
    }
    graph
}

fn bench_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph");
    for side in [16u32, 32, 64] {
        let graph = grid(side);
        group.bench_with_input(BenchmarkId::new("bfs", side), &graph, |b, graph| {
            b.iter(|| black_box(graph.bfs(&0).map(|walk| walk.count())))
        });
        group.bench_with_input(BenchmarkId::new("dfs", side), &graph, |b, graph| {
            b.iter(|| black_box(graph.dfs(&0).map(|walk| walk.count())))
        });
        group.bench_with_input(BenchmarkId::new("dijkstra", side), &graph, |b, graph| {
            b.iter(|| black_box(graph.dijkstra(&0).map(|paths| paths.reachable())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_avl, bench_heap, bench_graph);
criterion_main!(benches);
