//! Property tests for causeway-core: endpoint monotonicity, enumeration order, tiers.

use proptest::prelude::*;

use causeway_core::combinatorics::{binomial, Combinations};
use causeway_core::graph::{Endpoint, Graph, GraphRecord};
use causeway_core::knowledge::Knowledge;

fn endpoint_strategy() -> impl Strategy<Value = Endpoint> {
    prop_oneof![
        Just(Endpoint::Tail),
        Just(Endpoint::Arrow),
        Just(Endpoint::Circle),
    ]
}

/// Complete graph over `n` nodes with every edge `o-o` or `---`.
fn start_graph(n: usize, circles: bool) -> Graph {
    let mut g = Graph::from_names((0..n).map(|i| format!("X{i}"))).unwrap();
    for a in 0..n {
        for b in (a + 1)..n {
            if circles {
                g.add_nondirected_edge(a, b).unwrap();
            } else {
                g.add_undirected_edge(a, b).unwrap();
            }
        }
    }
    g
}

// =============================================================================
// Monotonic endpoints: a committed tail or arrow never becomes a circle, and
// an arrow never becomes a tail, whatever sequence of writes is attempted.
// =============================================================================
proptest! {
    #[test]
    fn endpoints_escalate_monotonically(
        circles in any::<bool>(),
        ops in prop::collection::vec((0_usize..5, 0_usize..5, endpoint_strategy()), 0..80)
    ) {
        let mut g = start_graph(5, circles);
        for (a, b, mark) in ops {
            if a == b {
                continue;
            }
            let before = g.endpoint(a, b).unwrap();
            let result = g.set_endpoint(a, b, mark);
            let after = g.endpoint(a, b).unwrap();
            if result.is_err() {
                prop_assert_eq!(before, after);
            }
            if before != Endpoint::Circle {
                prop_assert_ne!(after, Endpoint::Circle);
            }
            if before == Endpoint::Arrow {
                prop_assert_eq!(after, Endpoint::Arrow);
            }
        }
    }
}

// =============================================================================
// Enumeration: C(n, k) distinct subsets, strictly increasing in lexicographic order.
// =============================================================================
proptest! {
    #[test]
    fn combinations_are_complete_and_ordered(n in 0_usize..10, k in 0_usize..6) {
        let all: Vec<Vec<usize>> = Combinations::new(n, k).collect();
        prop_assert_eq!(all.len() as u128, binomial(n, k));
        for subset in &all {
            prop_assert_eq!(subset.len(), k);
            prop_assert!(subset.windows(2).all(|w| w[0] < w[1]));
            prop_assert!(subset.iter().all(|&i| i < n));
        }
        prop_assert!(all.windows(2).all(|w| w[0] < w[1]));
    }
}

// =============================================================================
// Tiers: forbidden exactly when the source sits in a strictly later tier.
// =============================================================================
proptest! {
    #[test]
    fn tier_order_forbids_backwards_edges(tiers in prop::collection::vec(0_usize..4, 2..8)) {
        let mut k = Knowledge::new();
        for (i, &t) in tiers.iter().enumerate() {
            k.add_to_tier(t, &format!("V{i}")).unwrap();
        }
        for (i, &ti) in tiers.iter().enumerate() {
            for (j, &tj) in tiers.iter().enumerate() {
                if i == j {
                    continue;
                }
                let forbidden = k.is_forbidden(&format!("V{i}"), &format!("V{j}"));
                prop_assert_eq!(forbidden, ti > tj);
            }
        }
    }
}

// =============================================================================
// Records: removing any subset of edges survives a JSON round trip.
// =============================================================================
proptest! {
    #[test]
    fn record_roundtrip_after_removals(removals in prop::collection::vec((0_usize..6, 0_usize..6), 0..12)) {
        let mut g = start_graph(6, true);
        for (a, b) in removals {
            g.remove_edge(a, b);
        }
        let json = g.to_record().to_json().unwrap();
        let back = Graph::from_record(&GraphRecord::from_json(&json).unwrap()).unwrap();
        prop_assert_eq!(back, g);
    }
}
