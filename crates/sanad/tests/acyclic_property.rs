//! Property tests: random insertion sequences never produce a cycle.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;
use sanad::domain::NewDependency;
use sanad::error::Error;
use sanad::manager::PropagationMode;
use std::collections::{HashMap, HashSet};

mod common;
use common::Graph;

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Stored,
    SelfLoop,
    Duplicate,
    Cycle,
}

/// True if `to` is reachable from `from` over `edges`.
fn reachable(edges: &HashSet<(usize, usize)>, from: usize, to: usize) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if seen.insert(node) {
            stack.extend(edges.iter().filter(|(a, _)| *a == node).map(|(_, b)| *b));
        }
    }
    false
}

fn expected_outcome(edges: &HashSet<(usize, usize)>, a: usize, b: usize) -> Outcome {
    if a == b {
        Outcome::SelfLoop
    } else if edges.contains(&(a, b)) {
        Outcome::Duplicate
    } else if reachable(edges, b, a) {
        Outcome::Cycle
    } else {
        Outcome::Stored
    }
}

fn insertion_sequence() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (2usize..8).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 1..40)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_stored_edges_stay_acyclic((n, pairs) in insertion_sequence()) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let graph = Graph::new(PropagationMode::Direct).await;
            let ids = graph.milestones(n).await;
            let mut model = HashSet::new();

            for (a, b) in pairs {
                let expected = expected_outcome(&model, a, b);
                let result = graph
                    .manager
                    .create_dependency(
                        &graph.user,
                        NewDependency::finish_to_start(ids[a].clone(), ids[b].clone()),
                    )
                    .await;
                let actual = match result {
                    Ok(_) => Outcome::Stored,
                    Err(Error::SelfDependency(_)) => Outcome::SelfLoop,
                    Err(Error::DuplicateDependency { .. }) => Outcome::Duplicate,
                    Err(Error::CycleDetected { .. }) => Outcome::Cycle,
                    Err(other) => panic!("unexpected error: {other}"),
                };
                assert_eq!(actual, expected, "inserting {a} -> {b}");
                if actual == Outcome::Stored {
                    model.insert((a, b));
                }
            }

            let view = graph
                .manager
                .project_dependencies(&graph.user, &graph.project)
                .await
                .unwrap();
            assert_eq!(view.dependencies.len(), model.len());

            let mut stored = DiGraph::<(), ()>::new();
            let mut nodes = HashMap::new();
            for id in &ids {
                nodes.insert(id.clone(), stored.add_node(()));
            }
            for dep in &view.dependencies {
                stored.add_edge(nodes[&dep.predecessor_id], nodes[&dep.successor_id], ());
            }
            assert!(!is_cyclic_directed(&stored));
        });
    }
}
