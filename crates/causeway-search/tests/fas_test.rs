use std::sync::{Arc, Mutex};

use causeway_core::cancel::CancellationToken;
use causeway_core::config::PcHeuristic;
use causeway_core::errors::SearchError;
use causeway_core::graph::Graph;
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::SearchObserver;
use causeway_core::traits::{IndependenceTest, OracleError};
use causeway_search::fas::Fas;
use test_fixtures::{dag, edge_strings, id, skeleton, CountingOracle, DSeparationOracle, FailingOracle, ScriptedOracle};

/// A -> B <- C, D unrelated.
fn collider() -> Graph {
    dag(&["A", "B", "C", "D"], &[("A", "B"), ("C", "B")])
}

/// Eight variables with chains, forks, colliders and a shielded triple.
fn wide() -> Graph {
    dag(
        &["A", "B", "C", "D", "E", "F", "G", "H"],
        &[
            ("A", "C"),
            ("B", "C"),
            ("C", "D"),
            ("C", "E"),
            ("D", "F"),
            ("E", "F"),
            ("A", "G"),
            ("G", "H"),
            ("F", "H"),
            ("B", "E"),
        ],
    )
}

fn oracle(graph: &Graph) -> Arc<DSeparationOracle> {
    Arc::new(DSeparationOracle::new(graph))
}

#[derive(Default)]
struct Recorder {
    failures: Mutex<Vec<(String, String)>>,
    removed: Mutex<Vec<(String, String, Vec<String>)>>,
}

impl SearchObserver for Recorder {
    fn oracle_failed(&self, x: &str, y: &str, _error: &OracleError) {
        self.failures.lock().unwrap().push((x.to_string(), y.to_string()));
    }

    fn edge_removed(&self, x: &str, y: &str, sepset: &[&str], _depth: usize) {
        let set = sepset.iter().map(|s| s.to_string()).collect();
        self.removed.lock().unwrap().push((x.to_string(), y.to_string(), set));
    }
}

#[test]
fn collider_skeleton_and_empty_sepset() {
    let truth = collider();
    let result = Fas::new(oracle(&truth)).search().unwrap();
    assert_eq!(edge_strings(&result.graph), vec!["A --- B", "B --- C"]);
    let (a, c, d) = (id(&truth, "A"), id(&truth, "C"), id(&truth, "D"));
    assert_eq!(result.sepsets.sepset(a, c), Some(vec![]));
    assert_eq!(result.sepsets.sepset(a, d), Some(vec![]));
    assert_eq!(result.sepsets.sepset(a, id(&truth, "B")), None);
}

#[test]
fn chain_needs_depth_one() {
    let truth = dag(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let shallow = Fas::new(oracle(&truth)).with_depth(0).search().unwrap();
    assert_eq!(shallow.graph.edge_count(), 3);

    let full = Fas::new(oracle(&truth)).search().unwrap();
    assert_eq!(edge_strings(&full.graph), vec!["A --- B", "B --- C"]);
    assert_eq!(full.sepsets.sepset(0, 2), Some(vec![1]));
    assert_eq!(full.stats.depth_reached, 1);
}

#[test]
fn wide_graph_recovers_true_adjacencies() {
    let truth = wide();
    let result = Fas::new(oracle(&truth)).search().unwrap();
    let mut expected: Vec<String> = truth
        .edge_pairs()
        .map(|(a, b)| format!("{} --- {}", truth.name(a), truth.name(b)))
        .collect();
    expected.sort();
    assert_eq!(edge_strings(&result.graph), expected);
}

#[test]
fn edge_count_never_grows_between_depths() {
    let result = Fas::new(oracle(&wide())).search().unwrap();
    let counts = &result.stats.edge_counts;
    assert!(!counts.is_empty());
    assert!(counts.windows(2).all(|w| w[1] <= w[0]));
    assert_eq!(*counts.last().unwrap(), result.graph.edge_count());
}

#[test]
fn stable_search_ignores_thread_count() {
    let truth = wide();
    let one = Fas::new(oracle(&truth)).with_parallelism(1).search().unwrap();
    let four = Fas::new(oracle(&truth)).with_parallelism(4).search().unwrap();
    assert_eq!(one.graph, four.graph);
    assert_eq!(one.sepsets.entries(), four.sepsets.entries());
}

#[test]
fn single_threaded_live_search_is_reproducible() {
    let truth = wide();
    let run = || {
        Fas::new(oracle(&truth))
            .with_stable(false)
            .with_parallelism(1)
            .search()
            .unwrap()
    };
    let (first, second) = (run(), run());
    assert_eq!(first.graph, second.graph);
    assert_eq!(first.sepsets.entries(), second.sepsets.entries());
    // A faithful oracle yields the true skeleton either way.
    assert_eq!(first.graph.edge_count(), wide().edge_count());
}

#[test]
fn recorded_sepsets_reproduce_independence() {
    let truth = wide();
    let test = oracle(&truth);
    let result = Fas::new(test.clone()).search().unwrap();
    assert!(!result.sepsets.is_empty());
    for (pair, sepset) in result.sepsets.entries() {
        let verdict = test
            .check_independence(pair.first(), pair.second(), &sepset.nodes)
            .unwrap();
        assert!(verdict.independent, "{pair:?} given {:?}", sepset.nodes);
    }
}

#[test]
fn every_heuristic_finds_the_same_skeleton() {
    let truth = wide();
    let baseline = Fas::new(oracle(&truth)).search().unwrap();
    for heuristic in [
        PcHeuristic::SortVariables,
        PcHeuristic::SortEdgesByPValue,
        PcHeuristic::SortParentsByPValue,
    ] {
        let result = Fas::new(oracle(&truth)).with_heuristic(heuristic).search().unwrap();
        assert_eq!(edge_strings(&result.graph), edge_strings(&baseline.graph), "{heuristic:?}");
    }
}

#[test]
fn forbidden_both_ways_removes_with_empty_sepset() {
    let truth = collider();
    let mut knowledge = Knowledge::new();
    knowledge.set_forbidden("A", "B").unwrap();
    knowledge.set_forbidden("B", "A").unwrap();
    let recorder = Arc::new(Recorder::default());
    let result = Fas::new(oracle(&truth))
        .with_knowledge(knowledge)
        .with_observer(recorder.clone())
        .search()
        .unwrap();
    assert!(!result.graph.is_adjacent(0, 1));
    assert_eq!(result.sepsets.sepset(0, 1), Some(vec![]));
    assert_eq!(result.sepsets.get(0, 1).unwrap().p_value, None);
    let removed = recorder.removed.lock().unwrap();
    assert!(removed.contains(&("A".to_string(), "B".to_string(), vec![])));
}

#[test]
fn required_edge_is_never_removed() {
    let test = ScriptedOracle::new(&["A", "B", "C"]).independent("A", "B", &[], 0.8);
    let mut knowledge = Knowledge::new();
    knowledge.set_required("A", "B").unwrap();
    let result = Fas::new(Arc::new(test)).with_knowledge(knowledge).search().unwrap();
    assert!(result.graph.is_adjacent(0, 1));
    assert!(!result.sepsets.contains(0, 1));
}

#[test]
fn tiers_narrow_the_conditioning_sets() {
    // B -> C -> D, with A -> C. Putting C in a later tier than D forbids C
    // as a parent of D, so B and D cannot be separated by {C}.
    let truth = dag(&["A", "B", "C", "D"], &[("A", "C"), ("B", "C"), ("C", "D")]);
    let mut knowledge = Knowledge::new();
    knowledge.add_to_tier(0, "A").unwrap();
    knowledge.add_to_tier(0, "B").unwrap();
    knowledge.add_to_tier(0, "D").unwrap();
    knowledge.add_to_tier(1, "C").unwrap();
    let result = Fas::new(oracle(&truth)).with_knowledge(knowledge).search().unwrap();
    assert!(result.graph.is_adjacent(1, 3));
    assert!(!result.graph.is_adjacent(0, 1));
}

#[test]
fn oracle_failure_keeps_the_edge_and_reports_it() {
    let truth = collider();
    let test = FailingOracle::new(DSeparationOracle::new(&truth)).failing_pair(0, 2);
    let recorder = Arc::new(Recorder::default());
    let result = Fas::new(Arc::new(test))
        .with_observer(recorder.clone())
        .search()
        .unwrap();
    assert!(result.graph.is_adjacent(0, 2));
    assert!(result.stats.oracle_failures > 0);
    assert!(recorder
        .failures
        .lock()
        .unwrap()
        .contains(&("A".to_string(), "C".to_string())));
}

#[test]
fn every_test_failing_leaves_the_complete_graph() {
    let truth = collider();
    let test = FailingOracle::new(DSeparationOracle::new(&truth)).failing_everything();
    let result = Fas::new(Arc::new(test)).search().unwrap();
    assert_eq!(result.graph.edge_count(), 6);
    assert!(result.sepsets.is_empty());
}

#[test]
fn cancellation_aborts_the_search() {
    let truth = dag(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
    let token = CancellationToken::new();
    let test = CountingOracle::new(DSeparationOracle::new(&truth)).cancel_after(3, token.clone());
    let result = Fas::new(Arc::new(test))
        .with_parallelism(1)
        .with_cancellation(token)
        .search();
    assert!(matches!(result, Err(SearchError::Cancelled { .. })));
}

#[test]
fn negative_depth_other_than_unbounded_is_rejected() {
    let result = Fas::new(oracle(&collider())).with_depth(-2).search();
    assert!(matches!(result, Err(SearchError::InvalidConfiguration { .. })));
}

#[test]
fn search_from_prior_skeleton() {
    let truth = collider();
    let prior = skeleton(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("A", "C")]);
    let result = Fas::new(oracle(&truth)).search_from(&prior).unwrap();
    assert_eq!(edge_strings(&result.graph), vec!["A --- B", "B --- C"]);

    let stranger = skeleton(&["A", "Z"], &[("A", "Z")]);
    assert!(matches!(
        Fas::new(oracle(&truth)).search_from(&stranger),
        Err(SearchError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_counter_matches_oracle_calls() {
    let truth = wide();
    let test = Arc::new(CountingOracle::new(DSeparationOracle::new(&truth)));
    let result = Fas::new(test.clone()).search().unwrap();
    assert_eq!(result.stats.tests_run, test.calls());
}
