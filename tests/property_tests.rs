//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations and verify that the
//! structural invariants hold after every step.

use algoviz_core::avl::TreeSnapshot;
use algoviz_core::{AvlTree, BinaryHeap, Distance, Graph, HeapOrder, StructureError};
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Recomputes heights from the snapshot and checks balance and key order
fn check_avl(snapshot: &TreeSnapshot<i32>) -> Result<(), TestCaseError> {
    fn height(snapshot: &TreeSnapshot<i32>, index: Option<usize>) -> i32 {
        index.map_or(-1, |i| snapshot.nodes[i].height)
    }

    for node in &snapshot.nodes {
        let left = height(snapshot, node.left);
        let right = height(snapshot, node.right);
        prop_assert_eq!(node.height, 1 + left.max(right));
        prop_assert_eq!(node.balance, left - right);
        prop_assert!(node.balance.abs() <= 1, "unbalanced at {}", node.key);
        if let Some(l) = node.left {
            prop_assert!(snapshot.nodes[l].key < node.key);
        }
        if let Some(r) = node.right {
            prop_assert!(snapshot.nodes[r].key > node.key);
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn avl_stays_balanced_and_sorted(ops in prop::collection::vec((any::<bool>(), -50i32..50), 0..200)) {
        let mut tree = AvlTree::new();
        let mut model = BTreeSet::new();

        for (remove, key) in ops {
            if remove {
                let result = tree.delete(&key);
                prop_assert_eq!(result.is_ok(), model.remove(&key));
            } else {
                let result = tree.insert(key);
                prop_assert_eq!(result.is_ok(), model.insert(key));
            }
            check_avl(&tree.snapshot())?;
            prop_assert_eq!(tree.len(), model.len());
        }

        let keys: Vec<i32> = tree.in_order().copied().collect();
        let expected: Vec<i32> = model.iter().copied().collect();
        prop_assert_eq!(keys, expected);
        prop_assert_eq!(tree.min(), model.first());
        prop_assert_eq!(tree.max(), model.last());
    }

    #[test]
    fn avl_failed_operations_change_nothing(keys in prop::collection::btree_set(0i32..1000, 1..60), missing in 1000i32..2000) {
        let mut tree = AvlTree::new();
        for &key in &keys {
            tree.insert(key).unwrap();
        }
        let snapshot = tree.snapshot();
        let logged = tree.steps().len();

        prop_assert!(matches!(tree.delete(&missing), Err(StructureError::KeyNotFound(_))));
        let existing = *keys.iter().next().unwrap();
        prop_assert!(matches!(tree.insert(existing), Err(StructureError::DuplicateKey(_))));

        prop_assert_eq!(tree.snapshot(), snapshot);
        prop_assert_eq!(tree.steps().len(), logged);
    }

    #[test]
    fn avl_search_path_matches_height_bound(keys in prop::collection::btree_set(any::<i32>(), 1..300)) {
        let mut tree = AvlTree::new();
        for &key in &keys {
            tree.insert(key).unwrap();
        }
        // an AVL tree with n nodes has height below 1.45 log2(n + 2)
        let bound = (1.45 * ((keys.len() + 2) as f64).log2()).ceil() as i32;
        prop_assert!(tree.height() <= bound);
        for key in &keys {
            let visited = tree.search(key).count() as i32;
            prop_assert!(visited <= tree.height() + 1);
        }
    }

    #[test]
    fn heap_extracts_in_order(values in prop::collection::vec(any::<i32>(), 0..200), max in any::<bool>()) {
        let order = if max { HeapOrder::Max } else { HeapOrder::Min };
        let mut heap = BinaryHeap::new(order);
        for &value in &values {
            heap.insert(value);
            prop_assert!(heap.is_valid());
        }

        let mut expected = values.clone();
        expected.sort_unstable();
        if max {
            expected.reverse();
        }

        let mut extracted = Vec::with_capacity(values.len());
        while !heap.is_empty() {
            let (value, _) = heap.extract_root().unwrap();
            prop_assert!(heap.is_valid());
            extracted.push(value);
        }
        prop_assert_eq!(extracted, expected);
        prop_assert_eq!(heap.extract_root().map(|(v, _)| v), Err(StructureError::EmptyHeap));
    }

    #[test]
    fn heap_mixed_operations_match_sorted_model(ops in prop::collection::vec(prop::option::of(-100i32..100), 0..300)) {
        let mut heap = BinaryHeap::min();
        let mut model: Vec<i32> = Vec::new();

        for op in ops {
            match op {
                Some(value) => {
                    heap.insert(value);
                    model.push(value);
                }
                None => {
                    model.sort_unstable_by(|a, b| b.cmp(a));
                    let expected = model.pop();
                    let got = heap.extract_root().ok().map(|(v, _)| v);
                    prop_assert_eq!(got, expected);
                }
            }
            prop_assert_eq!(heap.peek().ok().copied(), model.iter().min().copied());
        }
    }

    #[test]
    fn dijkstra_matches_bellman_ford(
        n in 1usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12, 0i64..20), 0..40),
        directed in any::<bool>(),
    ) {
        let mut graph: Graph<usize> = if directed { Graph::directed() } else { Graph::undirected() };
        for v in 0..n {
            graph.add_vertex(v);
        }
        let edges: Vec<(usize, usize, i64)> = edges
            .into_iter()
            .filter(|&(u, v, _)| u < n && v < n)
            .collect();
        for &(u, v, w) in &edges {
            graph.add_edge(&u, &v, w).unwrap();
        }

        // relax every edge n times
        let mut expected: Vec<Option<i64>> = vec![None; n];
        expected[0] = Some(0);
        for _ in 0..n {
            for &(u, v, w) in &edges {
                let mut relax = |from: usize, to: usize| {
                    if let Some(d) = expected[from] {
                        if expected[to].map_or(true, |cur| d + w < cur) {
                            expected[to] = Some(d + w);
                        }
                    }
                };
                relax(u, v);
                if !directed {
                    relax(v, u);
                }
            }
        }

        let paths = graph.dijkstra(&0).unwrap();
        let relaxed = graph.bellman_ford(&0).unwrap();
        prop_assert_eq!(paths.len(), n);
        prop_assert_eq!(relaxed.len(), n);
        for (v, want) in expected.iter().enumerate() {
            prop_assert_eq!(paths.distance(&v), Some(Distance::from(*want)));
            prop_assert_eq!(relaxed.distance(&v), Some(Distance::from(*want)));
            if let Some(path) = paths.path_to(&v) {
                prop_assert_eq!(path.first(), Some(&0));
                prop_assert_eq!(path.last(), Some(&v));
            }
        }
    }

    #[test]
    fn bellman_ford_on_negative_dags(
        n in 1usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12, -20i64..20), 0..40),
    ) {
        // edges only point to higher vertices, so no cycle can form
        let mut graph: Graph<usize> = Graph::directed();
        for v in 0..n {
            graph.add_vertex(v);
        }
        let edges: Vec<(usize, usize, i64)> = edges
            .into_iter()
            .filter(|&(u, v, _)| u < v && v < n)
            .collect();
        for &(u, v, w) in &edges {
            graph.add_edge(&u, &v, w).unwrap();
        }

        // vertices in index order are already topologically sorted
        let mut expected: Vec<Option<i64>> = vec![None; n];
        expected[0] = Some(0);
        for u in 0..n {
            for &(from, to, w) in edges.iter().filter(|e| e.0 == u) {
                if let Some(d) = expected[from] {
                    if expected[to].map_or(true, |cur| d + w < cur) {
                        expected[to] = Some(d + w);
                    }
                }
            }
        }

        let paths = graph.bellman_ford(&0).unwrap();
        for (v, want) in expected.iter().enumerate() {
            prop_assert_eq!(paths.distance(&v), Some(Distance::from(*want)));
            if let Some(path) = paths.path_to(&v) {
                let cost: i64 = path
                    .windows(2)
                    .map(|hop| {
                        edges
                            .iter()
                            .filter(|e| e.0 == hop[0] && e.1 == hop[1])
                            .map(|e| e.2)
                            .min()
                            .unwrap()
                    })
                    .sum();
                prop_assert_eq!(Some(cost), *want);
            }
        }
    }

    #[test]
    fn traversals_agree_on_reachable_set(
        n in 1usize..15,
        edges in prop::collection::vec((0usize..15, 0usize..15), 0..40),
    ) {
        let mut graph: Graph<usize> = Graph::directed();
        for v in 0..n {
            graph.add_vertex(v);
        }
        for (u, v) in edges.into_iter().filter(|&(u, v)| u < n && v < n) {
            graph.add_unit_edge(&u, &v).unwrap();
        }

        let bfs: Vec<usize> = graph.bfs(&0).unwrap().copied().collect();
        let dfs: Vec<usize> = graph.dfs(&0).unwrap().copied().collect();
        let bfs_set: BTreeSet<usize> = bfs.iter().copied().collect();
        let dfs_set: BTreeSet<usize> = dfs.iter().copied().collect();

        prop_assert_eq!(bfs.len(), bfs_set.len());
        prop_assert_eq!(dfs.len(), dfs_set.len());
        prop_assert_eq!(&bfs_set, &dfs_set);
        prop_assert_eq!(bfs[0], 0);
        prop_assert_eq!(dfs[0], 0);

        let reachable = graph.dijkstra(&0).unwrap().reachable();
        prop_assert_eq!(reachable, bfs_set.len());
    }
}
