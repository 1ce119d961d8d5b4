//! Property tests for causeway-search: skeleton recovery, stable scheduling,
//! sepset soundness, closure of the rule engines.

use std::sync::Arc;

use proptest::prelude::*;

use causeway_core::config::{CausewayConfig, RuleSet};
use causeway_core::graph::Graph;
use causeway_core::knowledge::Knowledge;
use causeway_core::traits::IndependenceTest;
use causeway_search::orient::MeekRules;
use causeway_search::{CausalSearch, Fas};
use test_fixtures::DSeparationOracle;

/// DAG over `n` nodes, edge `i -> j` (i < j) wherever the flag is set.
fn build_dag(n: usize, flags: &[bool]) -> Graph {
    let mut g = Graph::from_names((0..n).map(|i| format!("X{i}"))).unwrap();
    let mut flag = flags.iter();
    for i in 0..n {
        for j in (i + 1)..n {
            if flag.next().copied().unwrap_or(false) {
                g.add_directed_edge(i, j).unwrap();
            }
        }
    }
    g
}

fn dag_strategy() -> impl Strategy<Value = Graph> {
    (3_usize..7).prop_flat_map(|n| {
        prop::collection::vec(prop::bool::weighted(0.4), n * (n - 1) / 2)
            .prop_map(move |flags| build_dag(n, &flags))
    })
}

fn same_adjacencies(a: &Graph, b: &Graph) -> bool {
    a.edge_pairs().collect::<Vec<_>>() == b.edge_pairs().collect::<Vec<_>>()
}

// =============================================================================
// Adjacency search: a faithful oracle yields the true skeleton, whatever the
// worker count, shrinking at every depth, with reproducible sepsets.
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fas_recovers_true_skeleton(truth in dag_strategy()) {
        let result = Fas::new(Arc::new(DSeparationOracle::new(&truth))).search().unwrap();
        prop_assert!(same_adjacencies(&result.graph, &truth));
        prop_assert!(result.stats.edge_counts.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn stable_fas_ignores_worker_count(truth in dag_strategy()) {
        let one = Fas::new(Arc::new(DSeparationOracle::new(&truth)))
            .with_parallelism(1)
            .search()
            .unwrap();
        let three = Fas::new(Arc::new(DSeparationOracle::new(&truth)))
            .with_parallelism(3)
            .search()
            .unwrap();
        prop_assert_eq!(one.graph, three.graph);
        prop_assert_eq!(one.sepsets.entries(), three.sepsets.entries());
    }

    #[test]
    fn recorded_sepsets_are_sound(truth in dag_strategy()) {
        let oracle = Arc::new(DSeparationOracle::new(&truth));
        let result = Fas::new(oracle.clone()).search().unwrap();
        for (pair, sepset) in result.sepsets.entries() {
            prop_assert!(!result.graph.is_adjacent(pair.first(), pair.second()));
            let verdict = oracle
                .check_independence(pair.first(), pair.second(), &sepset.nodes)
                .unwrap();
            prop_assert!(verdict.independent);
        }
    }
}

// =============================================================================
// Orientation: the pattern is acyclic, respects the truth's colliders and is
// a fixpoint of the Meek rules; FCI keeps the same adjacencies.
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pattern_is_a_meek_fixpoint(truth in dag_strategy()) {
        let outcome = CausalSearch::new(CausewayConfig::default())
            .unwrap()
            .run(Arc::new(DSeparationOracle::new(&truth)))
            .unwrap();
        prop_assert!(outcome.cycles.is_empty());
        prop_assert!(same_adjacencies(&outcome.graph, &truth));
        for (from, to) in outcome.graph.directed_edges() {
            prop_assert!(truth.is_directed_from_to(from, to));
        }

        let mut again = outcome.graph.clone();
        let report = MeekRules::new(&Knowledge::new()).orient_implied(&mut again).unwrap();
        prop_assert!(report.oriented.is_empty());
        prop_assert_eq!(again, outcome.graph);
    }

    #[test]
    fn pag_keeps_skeleton_and_collider_arrowheads(truth in dag_strategy()) {
        let mut config = CausewayConfig::default();
        config.orientation.rule_set = RuleSet::Fci;
        let outcome = CausalSearch::new(config)
            .unwrap()
            .run(Arc::new(DSeparationOracle::new(&truth)))
            .unwrap();
        prop_assert!(same_adjacencies(&outcome.graph, &outcome.skeleton));
        for triple in &outcome.colliders.colliders {
            prop_assert!(outcome.graph.is_def_collider(triple.x, triple.y, triple.z));
        }
    }
}
