use causeway_core::config::*;
use causeway_core::errors::ConfigError;
use causeway_core::knowledge::Knowledge;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = CausewayConfig::from_toml("").unwrap();

    // FAS defaults
    assert_eq!(config.fas.depth, -1);
    assert!(config.fas.stable);
    assert_eq!(config.fas.parallelism, 0);
    assert_eq!(config.fas.heuristic, PcHeuristic::None);

    // Orientation defaults
    assert_eq!(config.orientation.rule_set, RuleSet::Meek);
    assert_eq!(config.orientation.sepset_policy, SepsetPolicy::Fas);
    assert_eq!(config.orientation.sepset_depth, -1);
    assert_eq!(config.orientation.conflict_rule, ConflictRule::Priority);
    assert!(config.orientation.complete_rule_set);
    assert_eq!(config.orientation.max_path_length, -1);
    assert!(!config.orientation.aggressive_cycle_prevention);
    assert_eq!(config.orientation.max_p_margin, 0.0);

    // Knowledge defaults
    assert!(config.knowledge.tiers.is_empty());
    assert!(config.knowledge.required.is_empty());
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[fas]
depth = 3
stable = false
heuristic = "sort_edges_by_p_value"

[orientation]
rule_set = "fci"
sepset_policy = "max_p"
conflict_rule = "bidirected"
max_path_length = 6
max_p_margin = 0.01
"#;
    let config = CausewayConfig::from_toml(toml).unwrap();
    assert_eq!(config.fas.depth, 3);
    assert!(!config.fas.stable);
    assert_eq!(config.fas.parallelism, 0);
    assert_eq!(config.fas.heuristic, PcHeuristic::SortEdgesByPValue);
    assert_eq!(config.orientation.rule_set, RuleSet::Fci);
    assert_eq!(config.orientation.sepset_policy, SepsetPolicy::MaxP);
    assert_eq!(config.orientation.conflict_rule, ConflictRule::Bidirected);
    assert_eq!(config.orientation.max_path_length, 6);
    assert!(config.orientation.complete_rule_set);
}

#[test]
fn invalid_values_are_rejected() {
    for toml in [
        "[fas]\ndepth = -2",
        "[orientation]\nsepset_depth = -5",
        "[orientation]\nmax_path_length = 3",
        "[orientation]\nmax_p_margin = -0.1",
    ] {
        assert!(
            matches!(CausewayConfig::from_toml(toml), Err(ConfigError::Invalid { .. })),
            "{toml} should be invalid"
        );
    }
}

#[test]
fn malformed_toml_is_a_parse_error() {
    assert!(matches!(
        CausewayConfig::from_toml("[fas\ndepth = 1"),
        Err(ConfigError::Parse(_))
    ));
    assert!(matches!(
        CausewayConfig::from_toml("[orientation]\nrule_set = \"pc\""),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn knowledge_section_builds_knowledge() {
    let toml = r#"
[knowledge]
tiers = [["X1", "X2"], ["X3"]]
forbidden_within_tiers = [0]
forbidden = [{ from = "X3", to = "X4" }]
required = [{ from = "X1", to = "X3" }]
"#;
    let config = CausewayConfig::from_toml(toml).unwrap();
    let knowledge = Knowledge::try_from(&config.knowledge).unwrap();
    assert!(knowledge.is_forbidden("X3", "X1"));
    assert!(knowledge.is_forbidden("X1", "X2"));
    assert!(knowledge.is_forbidden("X3", "X4"));
    assert!(knowledge.is_required("X1", "X3"));
    assert!(!knowledge.is_forbidden("X1", "X3"));
}

#[test]
fn contradictory_knowledge_section_fails_conversion() {
    let toml = r#"
[knowledge]
tiers = [["A"], ["B"]]
required = [{ from = "B", to = "A" }]
"#;
    let config = CausewayConfig::from_toml(toml).unwrap();
    assert!(Knowledge::try_from(&config.knowledge).is_err());
}

#[test]
fn config_toml_roundtrip() {
    let mut config = CausewayConfig::default();
    config.fas.depth = 2;
    config.orientation.rule_set = RuleSet::Fci;
    let text = config.to_toml().unwrap();
    let back = CausewayConfig::from_toml(&text).unwrap();
    assert_eq!(back.fas.depth, 2);
    assert_eq!(back.orientation.rule_set, RuleSet::Fci);
}
