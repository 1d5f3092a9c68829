use common::numeric_kernel::RATE_TOLERANCE;
use fx_arb_core::cycle::extract_cycle;
use fx_arb_core::traits::ShortestPathSolver;
use fx_arb_core::{
    Analyzer, BellmanFordSolver, DuplicatePolicy, GraphBuilder, RateGraph, Relaxation, Report,
};
use proptest::prelude::*;
use proptest::strategy::Strategy;

const NUM_CURRENCIES_STRATEGY: std::ops::Range<usize> = 3usize..9;

fn symbols(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("C{}", i)).collect()
}

/// Arbitrary (possibly inconsistent) quotes between `n` currencies.
fn quotes_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>)> {
    NUM_CURRENCIES_STRATEGY.prop_flat_map(|n| {
        let quote = (0usize..n, 0usize..n, 0.01f64..100.0);
        (Just(n), prop::collection::vec(quote, 0..40))
    })
}

/// One value (in a common unit) per currency; quoting at the ratio of values
/// makes every loop's rate product exactly 1 in real arithmetic.
fn mids_strategy() -> impl Strategy<Value = Vec<f64>> {
    NUM_CURRENCIES_STRATEGY.prop_flat_map(|n| prop::collection::vec(0.01f64..1000.0, n))
}

fn graph_from_quotes(
    n: usize,
    quotes: &[(usize, usize, f64)],
    policy: DuplicatePolicy,
) -> RateGraph {
    let names = symbols(n);
    let mut builder = GraphBuilder::new(names.clone());
    for &(u, v, rate) in quotes {
        builder.add_quote(&names[u], &names[v], rate).unwrap();
    }
    builder.finish(policy)
}

/// Every pair quoted once at the consistent rate `mid[u] / mid[v]`, except
/// `0 -> 1`, which is boosted by `1 + boost`.
fn consistent_graph(mids: &[f64], boost: f64) -> RateGraph {
    let n = mids.len();
    let names = symbols(n);
    let mut builder = GraphBuilder::new(names.clone());
    for u in 0..n {
        for v in (u + 1)..n {
            let mut rate = mids[u] / mids[v];
            if (u, v) == (0, 1) {
                rate *= 1.0 + boost;
            }
            builder.add_quote(&names[u], &names[v], rate).unwrap();
        }
    }
    builder.finish(DuplicatePolicy::LastWriteWins)
}

proptest! {
    /// Property: for every stored edge the reverse edge exists and their weights cancel.
    #[test]
    fn reciprocal_identity((n, quotes) in quotes_strategy()) {
        for policy in [DuplicatePolicy::LastWriteWins, DuplicatePolicy::KeepAll] {
            let graph = graph_from_quotes(n, &quotes, policy);
            for edge in graph.edges() {
                prop_assert_ne!(edge.from, edge.to);
                let reverse = graph.edge_weight(edge.to, edge.from);
                prop_assert!(reverse.is_some());
                if policy == DuplicatePolicy::LastWriteWins {
                    prop_assert!((edge.weight + reverse.unwrap()).abs() <= RATE_TOLERANCE);
                }
            }
        }
    }

    /// Property: last-write-wins leaves at most one edge per ordered pair.
    #[test]
    fn last_write_wins_has_no_duplicate_pairs((n, quotes) in quotes_strategy()) {
        let graph = graph_from_quotes(n, &quotes, DuplicatePolicy::LastWriteWins);
        let mut pairs: Vec<_> = graph.edges().iter().map(|e| (e.from, e.to)).collect();
        let stored = pairs.len();
        pairs.sort();
        pairs.dedup();
        prop_assert_eq!(pairs.len(), stored);
    }

    /// Property: consistent quotes never report a negative cycle, from any source.
    #[test]
    fn no_false_positive(mids in mids_strategy(), source_seed in 0usize..64) {
        let graph = consistent_graph(&mids, 0.0);
        let source = source_seed % graph.num_vertices();

        let result = BellmanFordSolver::default().run(&graph, source).unwrap();
        prop_assert!(matches!(result, Relaxation::Converged { .. }), "{:?}", result);
    }

    /// Property: a planted profitable loop is found from every source, and its
    /// multiplier matches the planted product.
    #[test]
    fn planted_cycle_is_detected_and_priced(
        mids in mids_strategy(),
        boost in 0.001f64..0.5,
        source_seed in 0usize..64,
    ) {
        let graph = consistent_graph(&mids, boost);
        let source = source_seed % graph.num_vertices();

        let relaxation = BellmanFordSolver::default().run(&graph, source).unwrap();
        prop_assert!(
            matches!(relaxation, Relaxation::NegativeCycleDetected { .. }),
            "{:?}",
            relaxation
        );

        let analysis = Analyzer::<BellmanFordSolver>::default().analyze(&graph, source);
        let Some(Report::Arbitrage(report)) = analysis.report() else {
            return Err(TestCaseError::fail(format!("no arbitrage report: {:?}", analysis.outcome)));
        };

        prop_assert!(report.cycle.contains(0) && report.cycle.contains(1));
        prop_assert!(report.is_profitable());
        prop_assert!((report.value_multiplier - (1.0 + boost)).abs() < 1e-6);
    }

    /// Property: a 3-vertex cycle behind a lead-in of any length is extracted
    /// exactly, wherever the witness lands.
    #[test]
    fn extraction_skips_any_lead_in(
        (n, lead_in, entry, witness_seed) in (4usize..16).prop_flat_map(|n| {
            (Just(n), 0usize..=(n - 3), 0usize..3, 0usize..64)
        })
    ) {
        // Cycle 0 -> 1 -> 2 -> 0; lead-in chain entry -> 3 -> 4 -> ... -> 2 + lead_in.
        let mut parents = vec![None; n];
        parents[0] = Some(2);
        parents[1] = Some(0);
        parents[2] = Some(1);
        for k in 3..3 + lead_in {
            parents[k] = Some(if k == 3 { entry } else { k - 1 });
        }

        let witness = witness_seed % (3 + lead_in);
        let cycle = extract_cycle(&parents, witness, n).unwrap();

        let rotated = cycle.rotated_to(0);
        prop_assert_eq!(rotated.vertices(), &[0, 1, 2, 0]);
    }

    /// Property: identical graph and source give identical results.
    #[test]
    fn runs_are_deterministic((n, quotes) in quotes_strategy(), source_seed in 0usize..64) {
        let graph = graph_from_quotes(n, &quotes, DuplicatePolicy::LastWriteWins);
        let source = source_seed % n;
        let solver = BellmanFordSolver::default();

        prop_assert_eq!(solver.run(&graph, source), solver.run(&graph, source));

        let analyzer = Analyzer::<BellmanFordSolver>::default();
        prop_assert_eq!(analyzer.analyze(&graph, source), analyzer.analyze(&graph, source));
    }
}
