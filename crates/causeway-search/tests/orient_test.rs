use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use causeway_core::cancel::CancellationToken;
use causeway_core::config::{CausewayConfig, SepsetPolicy};
use causeway_core::errors::CausewayError;
use causeway_core::graph::Graph;
use causeway_core::knowledge::Knowledge;
use causeway_core::observe::SearchObserver;
use causeway_core::traits::{IndependenceTest, OracleError, SepsetDecision, SepsetProducer};
use causeway_search::orient::{MeekRule, MeekRules};
use causeway_search::{CausalSearch, ConservativeSepsets, MaxPMode, MaxPSepsets, SearchOutcome};
use test_fixtures::{
    dag, edge_strings, id, skeleton, CountingOracle, DSeparationOracle, FailingOracle, ScriptedOracle,
};

fn config(policy: SepsetPolicy) -> CausewayConfig {
    let mut config = CausewayConfig::default();
    config.orientation.sepset_policy = policy;
    config.fas.parallelism = 2;
    config
}

fn run(config: CausewayConfig, test: impl IndependenceTest + 'static) -> SearchOutcome {
    CausalSearch::new(config).unwrap().run(Arc::new(test)).unwrap()
}

fn collider_truth() -> Graph {
    dag(&["A", "B", "C", "D"], &[("A", "B"), ("C", "B")])
}

#[test]
fn collider_is_oriented_under_every_policy() {
    for policy in [
        SepsetPolicy::Fas,
        SepsetPolicy::Greedy,
        SepsetPolicy::MaxP,
        SepsetPolicy::Conservative,
    ] {
        let outcome = run(config(policy), DSeparationOracle::new(&collider_truth()));
        assert_eq!(edge_strings(&outcome.graph), vec!["A --> B", "C --> B"], "{policy:?}");
        assert_eq!(outcome.colliders.colliders.len(), 1);
        assert!(outcome.violations.is_empty());
        assert!(outcome.cycles.is_empty());
    }
}

#[test]
fn skeleton_is_kept_unoriented() {
    let outcome = run(config(SepsetPolicy::Fas), DSeparationOracle::new(&collider_truth()));
    assert_eq!(edge_strings(&outcome.skeleton), vec!["A --- B", "B --- C"]);
    assert_eq!(outcome.sepsets.sepset(0, 2), Some(vec![]));
}

#[test]
fn meek_r2_orients_the_shortcut() {
    // A --> B --> C already oriented, A --- C left.
    let mut g = skeleton(&["A", "B", "C"], &[("A", "C")]);
    g.add_directed_edge(0, 1).unwrap();
    g.add_directed_edge(1, 2).unwrap();
    let report = MeekRules::new(&Knowledge::new()).orient_implied(&mut g).unwrap();
    assert!(g.is_directed_from_to(0, 2));
    assert_eq!(report.count(MeekRule::R2), 1);
}

#[test]
fn chain_below_a_collider_is_propagated() {
    // A -> C <- B, C -> D -> E
    let truth = dag(
        &["A", "B", "C", "D", "E"],
        &[("A", "C"), ("B", "C"), ("C", "D"), ("D", "E")],
    );
    let outcome = run(config(SepsetPolicy::Fas), DSeparationOracle::new(&truth));
    assert_eq!(
        edge_strings(&outcome.graph),
        vec!["A --> C", "B --> C", "C --> D", "D --> E"]
    );
    let meek = outcome.meek.unwrap();
    assert_eq!(meek.count(MeekRule::R1), 2);
}

/// A _||_ C both unconditionally and given B; A _||_ D unconditionally.
fn split_oracle() -> ScriptedOracle {
    ScriptedOracle::new(&["A", "B", "C", "D"])
        .independent("A", "C", &[], 0.6)
        .independent("A", "C", &["B"], 0.4)
        .independent("A", "D", &[], 0.7)
}

#[test]
fn conservative_disagreement_marks_the_triple_ambiguous() {
    let outcome = run(config(SepsetPolicy::Conservative), split_oracle());
    let g = &outcome.graph;
    let (a, b, c, d) = (id(g, "A"), id(g, "B"), id(g, "C"), id(g, "D"));
    assert!(g.is_ambiguous_triple(a, b, c));
    assert!(g.is_def_collider(a, b, d));
    // R1 would orient B --> C from A --> B; the ambiguous triple stops it.
    assert!(g.is_undirected(b, c));
    assert!(g.is_undirected(c, d));
}

#[test]
fn fas_policy_decides_the_same_triple() {
    let outcome = run(config(SepsetPolicy::Fas), split_oracle());
    let g = &outcome.graph;
    assert!(g.is_def_collider(id(g, "A"), id(g, "B"), id(g, "C")));
    assert_eq!(g.ambiguous_triples().count(), 0);
}

fn close_call_oracle() -> ScriptedOracle {
    ScriptedOracle::new(&["A", "B", "C"])
        .independent("A", "C", &[], 0.50)
        .independent("A", "C", &["B"], 0.52)
}

#[test]
fn greedy_and_max_p_disagree_on_a_close_call() {
    let greedy = run(config(SepsetPolicy::Greedy), close_call_oracle());
    assert!(greedy.graph.is_def_collider(0, 1, 2));

    let max_p = run(config(SepsetPolicy::MaxP), close_call_oracle());
    assert!(max_p.graph.is_undirected(0, 1));
    assert!(max_p.graph.is_underline_triple(0, 1, 2));
}

#[test]
fn max_p_margin_turns_close_calls_ambiguous() {
    let mut cfg = config(SepsetPolicy::MaxP);
    cfg.orientation.max_p_margin = 0.05;
    let outcome = run(cfg, close_call_oracle());
    assert!(outcome.graph.is_ambiguous_triple(0, 1, 2));
    assert_eq!(outcome.colliders.ambiguous.len(), 1);
}

/// Counts oracle failures reported to it.
#[derive(Default)]
struct FailureCounter(AtomicUsize);

impl SearchObserver for FailureCounter {
    fn oracle_failed(&self, _x: &str, _y: &str, _error: &OracleError) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}

#[test]
fn re_searching_producers_report_oracle_failures() {
    // A - B - C with every A, C test failing: {} and {B} each error once.
    let g = skeleton(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let failing = || {
        Arc::new(FailingOracle::new(DSeparationOracle::new(&collider_truth())).failing_pair(0, 2))
    };

    let counter = Arc::new(FailureCounter::default());
    let max_p = MaxPSepsets::new(failing(), -1, MaxPMode::MaxP).with_observer(counter.clone());
    assert_eq!(max_p.decide(&g, 0, 1, 2), SepsetDecision::NoDecision);
    assert_eq!(counter.0.load(Ordering::Relaxed), 2);

    let counter = Arc::new(FailureCounter::default());
    let conservative = ConservativeSepsets::new(failing(), -1).with_observer(counter.clone());
    assert_eq!(conservative.decide(&g, 0, 1, 2), SepsetDecision::NoDecision);
    assert_eq!(counter.0.load(Ordering::Relaxed), 2);
}

#[test]
fn conservative_failure_on_one_set_is_reported() {
    // {} separates A and C; the {B} test errors instead of answering.
    struct FailsGivenB(DSeparationOracle);

    impl IndependenceTest for FailsGivenB {
        fn variables(&self) -> &[causeway_core::graph::Node] {
            self.0.variables()
        }

        fn check_independence(
            &self,
            x: usize,
            y: usize,
            z: &[usize],
        ) -> Result<causeway_core::traits::IndependenceResult, OracleError> {
            if z == [1] {
                return Err(OracleError::Failed("no answer".to_string()));
            }
            self.0.check_independence(x, y, z)
        }
    }

    let g = skeleton(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let counter = Arc::new(FailureCounter::default());
    let oracle = Arc::new(FailsGivenB(DSeparationOracle::new(&collider_truth())));
    let producer = ConservativeSepsets::new(oracle, -1).with_observer(counter.clone());
    assert_eq!(producer.decide(&g, 0, 1, 2), SepsetDecision::Independent(vec![]));
    assert_eq!(counter.0.load(Ordering::Relaxed), 1);
}

#[test]
fn rerunning_meek_changes_nothing() {
    let truth = dag(
        &["A", "B", "C", "D", "E", "F"],
        &[("A", "C"), ("B", "C"), ("C", "D"), ("D", "E"), ("B", "E"), ("E", "F")],
    );
    let outcome = run(config(SepsetPolicy::Fas), DSeparationOracle::new(&truth));
    let mut again = outcome.graph.clone();
    let report = MeekRules::new(&Knowledge::new()).orient_implied(&mut again).unwrap();
    assert!(report.oriented.is_empty());
    assert_eq!(again, outcome.graph);
}

#[test]
fn required_edge_orients_an_equivalence_class() {
    let truth = dag(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let plain = run(config(SepsetPolicy::Fas), DSeparationOracle::new(&truth));
    assert_eq!(edge_strings(&plain.graph), vec!["A --- B", "B --- C"]);

    let mut knowledge = Knowledge::new();
    knowledge.set_required("A", "B").unwrap();
    let outcome = CausalSearch::new(config(SepsetPolicy::Fas))
        .unwrap()
        .with_knowledge(knowledge)
        .run(Arc::new(DSeparationOracle::new(&truth)))
        .unwrap();
    assert_eq!(edge_strings(&outcome.graph), vec!["A --> B", "B --> C"]);
    assert_eq!(outcome.knowledge.oriented, 1);
    assert!(outcome.violations.is_empty());
}

#[test]
fn forbidden_direction_is_never_produced() {
    let truth = dag(&["A", "B", "C"], &[("A", "B"), ("B", "C")]);
    let toml = r#"
[knowledge]
forbidden = [{ from = "C", to = "B" }]
"#;
    let config = CausewayConfig::from_toml(toml).unwrap();
    let outcome = run(config, DSeparationOracle::new(&truth));
    let g = &outcome.graph;
    assert!(g.is_directed_from_to(1, 2));
    assert!(outcome.violations.is_empty());
}

#[test]
fn pair_forbidden_both_ways_still_yields_a_collider() {
    let mut knowledge = Knowledge::new();
    knowledge.set_forbidden("A", "C").unwrap();
    knowledge.set_forbidden("C", "A").unwrap();
    let outcome = CausalSearch::new(config(SepsetPolicy::Fas))
        .unwrap()
        .with_knowledge(knowledge)
        .run(Arc::new(DSeparationOracle::new(&collider_truth())))
        .unwrap();
    assert_eq!(edge_strings(&outcome.graph), vec!["A --> B", "C --> B"]);
    assert!(outcome.colliders.ambiguous.is_empty());
    assert_eq!(outcome.sepsets.sepset(0, 2), Some(vec![]));
}

#[test]
fn tier_forbidden_within_still_yields_a_collider() {
    let truth = dag(&["X1", "X2", "Z"], &[("X1", "Z"), ("X2", "Z")]);
    let toml = r#"
[knowledge]
tiers = [["X1", "X2"], ["Z"]]
forbidden_within_tiers = [0]
"#;
    let outcome = run(CausewayConfig::from_toml(toml).unwrap(), DSeparationOracle::new(&truth));
    assert_eq!(edge_strings(&outcome.graph), vec!["X1 --> Z", "X2 --> Z"]);
    assert_eq!(outcome.colliders.colliders.len(), 1);
    assert!(outcome.colliders.ambiguous.is_empty());
}

#[test]
fn knowledge_refusing_a_collider_is_reported() {
    let mut knowledge = Knowledge::new();
    knowledge.set_forbidden("A", "B").unwrap();
    let outcome = CausalSearch::new(config(SepsetPolicy::Fas))
        .unwrap()
        .with_knowledge(knowledge)
        .run(Arc::new(DSeparationOracle::new(&collider_truth())))
        .unwrap();
    assert_eq!(outcome.colliders.rejected.len(), 1);
    assert!(!outcome.graph.is_directed_from_to(0, 1));
    assert!(outcome.violations.is_empty());
}

#[test]
fn cancelled_pipeline_reports_cancellation() {
    let truth = dag(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C"), ("C", "D")]);
    let token = CancellationToken::new();
    let test = CountingOracle::new(DSeparationOracle::new(&truth)).cancel_after(2, token.clone());
    let mut cfg = config(SepsetPolicy::Fas);
    cfg.fas.parallelism = 1;
    let result = CausalSearch::new(cfg)
        .unwrap()
        .with_cancellation(token)
        .run(Arc::new(test));
    match result {
        Err(e) => assert!(e.is_cancelled(), "{e}"),
        Ok(_) => panic!("search should have been cancelled"),
    }
}

#[test]
fn conflicting_knowledge_in_config_is_rejected() {
    let toml = r#"
[knowledge]
forbidden = [{ from = "A", to = "B" }]
required = [{ from = "A", to = "B" }]
"#;
    let config = CausewayConfig::from_toml(toml).unwrap();
    assert!(matches!(CausalSearch::new(config), Err(CausewayError::Knowledge(_))));
}
