//! End-to-end search: adjacency search, then orientation under either rule set.

use std::sync::Arc;
use std::time::Instant;

use causeway_core::cancel::CancellationToken;
use causeway_core::config::{CausewayConfig, RuleSet, SepsetPolicy};
use causeway_core::errors::CausewayResult;
use causeway_core::graph::{Graph, NodeId};
use causeway_core::knowledge::{Knowledge, KnowledgeEdge};
use causeway_core::observe::{NoopObserver, SearchObserver};
use causeway_core::sepset_map::SepsetMap;
use causeway_core::traits::{IndependenceTest, SepsetProducer};

use crate::fas::{Fas, FasResult, FasStats};
use crate::orient::{
    find_directed_cycles, orient_required, ColliderOrienter, ColliderReport, FciOrient, FciReport,
    KnowledgeReport, MeekReport, MeekRules,
};
use crate::sepsets::{ConservativeSepsets, FasSepsets, MaxPMode, MaxPSepsets};

/// Everything a search produced.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// The oriented graph: a pattern under Meek rules, a PAG under FCI rules.
    pub graph: Graph,
    /// The undirected adjacency search result.
    pub skeleton: Graph,
    pub sepsets: SepsetMap,
    pub stats: FasStats,
    pub knowledge: KnowledgeReport,
    pub colliders: ColliderReport,
    pub meek: Option<MeekReport>,
    pub fci: Option<FciReport>,
    /// Knowledge constraints the output contradicts.
    pub violations: Vec<KnowledgeEdge>,
    /// Directed cycles left in the output.
    pub cycles: Vec<Vec<NodeId>>,
}

pub struct CausalSearch {
    config: CausewayConfig,
    knowledge: Knowledge,
    observer: Arc<dyn SearchObserver>,
    cancel: CancellationToken,
}

impl CausalSearch {
    /// Validates `config` and builds its knowledge section.
    pub fn new(config: CausewayConfig) -> CausewayResult<Self> {
        config.validate()?;
        let knowledge = Knowledge::try_from(&config.knowledge)?;
        Ok(Self {
            config,
            knowledge,
            observer: Arc::new(NoopObserver),
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the knowledge built from the config.
    pub fn with_knowledge(mut self, knowledge: Knowledge) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn SearchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &CausewayConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &Knowledge {
        &self.knowledge
    }

    pub fn run(&self, test: Arc<dyn IndependenceTest>) -> CausewayResult<SearchOutcome> {
        let started = Instant::now();
        let FasResult {
            graph: skeleton,
            sepsets,
            stats,
        } = Fas::from_config(Arc::clone(&test), &self.config.fas)
            .with_knowledge(self.knowledge.clone())
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancel.clone())
            .search()?;

        let mut graph = skeleton.clone();
        let orientation = {
            let producer = self.producer(&test, &sepsets);
            match self.config.orientation.rule_set {
                RuleSet::Meek => self.orient_pattern(producer.as_ref(), &mut graph)?,
                RuleSet::Fci => self.orient_pag(producer.as_ref(), &mut graph)?,
            }
        };

        let violations = self.knowledge.violations(&graph);
        let cycles = find_directed_cycles(&graph);
        if !violations.is_empty() || !cycles.is_empty() {
            tracing::warn!(
                violations = violations.len(),
                cycles = cycles.len(),
                "search output contradicts knowledge or contains directed cycles"
            );
        }
        tracing::info!(
            rule_set = %self.config.orientation.rule_set,
            edges = graph.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search complete"
        );

        Ok(SearchOutcome {
            graph,
            skeleton,
            sepsets,
            stats,
            knowledge: orientation.knowledge,
            colliders: orientation.colliders,
            meek: orientation.meek,
            fci: orientation.fci,
            violations,
            cycles,
        })
    }

    fn producer<'s>(
        &self,
        test: &Arc<dyn IndependenceTest>,
        sepsets: &'s SepsetMap,
    ) -> Box<dyn SepsetProducer + 's> {
        let orientation = &self.config.orientation;
        let depth = orientation.sepset_depth;
        match orientation.sepset_policy {
            SepsetPolicy::Fas => Box::new(FasSepsets::new(sepsets)),
            SepsetPolicy::Greedy => Box::new(
                MaxPSepsets::new(Arc::clone(test), depth, MaxPMode::Greedy)
                    .with_observer(Arc::clone(&self.observer)),
            ),
            SepsetPolicy::MaxP => Box::new(
                MaxPSepsets::new(Arc::clone(test), depth, MaxPMode::MaxP)
                    .with_margin(orientation.max_p_margin)
                    .with_observer(Arc::clone(&self.observer)),
            ),
            SepsetPolicy::Conservative => Box::new(
                ConservativeSepsets::new(Arc::clone(test), depth)
                    .with_observer(Arc::clone(&self.observer)),
            ),
        }
    }

    fn orient_pattern(
        &self,
        producer: &dyn SepsetProducer,
        graph: &mut Graph,
    ) -> CausewayResult<Orientation> {
        let _span = causeway_core::orientation_span!(RuleSet::Meek).entered();
        let orientation = &self.config.orientation;
        let knowledge = orient_required(graph, &self.knowledge, self.observer.as_ref());
        let colliders = ColliderOrienter::new(producer, &self.knowledge)
            .with_conflict_rule(orientation.conflict_rule)
            .with_parallelism(self.config.fas.parallelism)
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancel.clone())
            .orient(graph)?;
        let meek = MeekRules::new(&self.knowledge)
            .with_aggressive_cycle_prevention(orientation.aggressive_cycle_prevention)
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancel.clone())
            .orient_implied(graph)?;
        Ok(Orientation {
            knowledge,
            colliders,
            meek: Some(meek),
            fci: None,
        })
    }

    fn orient_pag(&self, producer: &dyn SepsetProducer, graph: &mut Graph) -> CausewayResult<Orientation> {
        let fci = FciOrient::from_config(producer, &self.knowledge, &self.config.orientation)
            .with_parallelism(self.config.fas.parallelism)
            .with_observer(Arc::clone(&self.observer))
            .with_cancellation(self.cancel.clone())
            .orient(graph)?;
        Ok(Orientation {
            knowledge: fci.knowledge.clone(),
            colliders: fci.colliders.clone(),
            meek: None,
            fci: Some(fci),
        })
    }
}

struct Orientation {
    knowledge: KnowledgeReport,
    colliders: ColliderReport,
    meek: Option<MeekReport>,
    fci: Option<FciReport>,
}
