//! The detection engine: one call per article of text.

use std::collections::BTreeMap;
use std::sync::Arc;

use hourei_cache::{CacheKey, CacheStatistics, ReferenceCache};
use hourei_core::{AbbreviationEntry, AbbreviationRegistry, ProvisionId, Reference, ReferenceKind, meta};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::DetectorConfig;
use crate::context::ContextTracker;
use crate::error::EngineError;
use crate::normalize::normalize;
use crate::patterns::{Collector, Scan, default_collectors, mentions_indirect};
use crate::preprocess::split_parallel_citations;
use crate::resolver::ConflictResolver;

/// Version stamped on cache entries; results from any other version are
/// never served.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Observability-only counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineStatistics {
    pub detections: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    /// Returned references per kind name.
    pub references_by_kind: BTreeMap<String, u64>,
    pub context_resets: u64,
}

/// Detects cross-references in the articles of one law at a time.
///
/// The engine owns its [`ContextTracker`], so one engine serves one caller
/// walking one law in order. Process laws in parallel with one engine
/// each; engines may share a cache through [`DetectionEngine::with_cache`].
pub struct DetectionEngine {
    registry: Arc<AbbreviationRegistry>,
    collectors: Vec<Box<dyn Collector>>,
    resolver: ConflictResolver,
    context: ContextTracker,
    cache: Option<Arc<ReferenceCache>>,
    config: DetectorConfig,
    stats: EngineStatistics,
}

impl DetectionEngine {
    /// An engine with the built-in collectors and, if enabled, its own cache.
    pub fn new(registry: Arc<AbbreviationRegistry>, config: DetectorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let cache = config.cache_enabled.then(|| {
            Arc::new(ReferenceCache::new(
                config.cache_capacity,
                config.cache_ttl(),
                ENGINE_VERSION,
            ))
        });
        Ok(Self::assemble(registry, config, cache))
    }

    /// An engine using a cache shared with other engines.
    pub fn with_cache(
        registry: Arc<AbbreviationRegistry>,
        config: DetectorConfig,
        cache: Arc<ReferenceCache>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::assemble(registry, config, Some(cache)))
    }

    /// Built-in registry, default configuration.
    pub fn builtin() -> Result<Self, EngineError> {
        let registry = Arc::new(AbbreviationRegistry::builtin()?);
        Self::new(registry, DetectorConfig::default())
    }

    fn assemble(
        registry: Arc<AbbreviationRegistry>,
        config: DetectorConfig,
        cache: Option<Arc<ReferenceCache>>,
    ) -> Self {
        let collectors = default_collectors();
        info!(
            collectors = collectors.len(),
            cache = cache.is_some(),
            version = ENGINE_VERSION,
            "detection engine ready"
        );
        Self {
            registry,
            collectors,
            resolver: ConflictResolver::new(),
            context: ContextTracker::new(),
            cache,
            config,
            stats: EngineStatistics::default(),
        }
    }

    /// Append a collector. It runs after the built-in ones, which only
    /// matters for ties between equal-priority candidates.
    pub fn register_collector(&mut self, collector: Box<dyn Collector>) {
        debug!(name = collector.name(), "collector registered");
        self.collectors.push(collector);
    }

    /// Detect the references in `text`.
    ///
    /// `current_article` (`第五条`, `第五条第二項`) advances the context
    /// first; relative citations resolve against it. Never fails: input
    /// that matches nothing yields an empty list.
    pub fn detect(&mut self, text: &str, current_article: Option<&str>) -> Vec<Reference> {
        self.stats.detections += 1;
        if let Some(id) = current_article {
            match ProvisionId::parse(id) {
                Some(provision) => self.context.advance(provision),
                None => warn!(article = id, "unrecognised current article ignored"),
            }
        }
        if text.is_empty() {
            return Vec::new();
        }

        let key = self.cache_key(text);
        if let Some(cache) = &self.cache {
            if let Some(references) = cache.get(&key) {
                self.stats.cache_hits += 1;
                debug!(count = references.len(), "served from cache");
                self.record(&references);
                return references;
            }
            self.stats.cache_misses += 1;
        }

        let references = self.run(text);
        if let Some(cache) = &self.cache {
            cache.set(key, &references);
        }
        self.record(&references);
        references
    }

    /// Position, law, and registry revision always select the entry. Text
    /// with an indirect phrase also depends on the most recently cited law.
    fn cache_key(&self, text: &str) -> CacheKey {
        let mut discriminator =
            format!("{}|r{}", self.context.discriminator(), self.registry.revision());
        if mentions_indirect(text) {
            discriminator.push_str("|l");
            discriminator.push_str(self.context.most_recent_law().unwrap_or(""));
        }
        CacheKey::new(text, &discriminator)
    }

    fn run(&self, text: &str) -> Vec<Reference> {
        let prepared = split_parallel_citations(text);
        let scan = Scan {
            text: &prepared,
            registry: &self.registry,
            context: &self.context,
            config: &self.config,
        };

        let mut candidates = Vec::new();
        for (index, collector) in self.collectors.iter().enumerate() {
            let found = collector.collect(&scan);
            trace!(collector = collector.name(), count = found.len(), "collected");
            candidates.extend(found.into_iter().enumerate().map(|(emitted, mut c)| {
                c.order = (index, emitted);
                c.with_meta(meta::COLLECTOR, collector.name())
            }));
        }
        let total = candidates.len();
        let resolved = self.resolver.resolve(candidates);
        debug!(candidates = total, kept = resolved.len(), "conflicts resolved");
        normalize(text, resolved, &self.registry, self.config.min_confidence)
    }

    /// Remember cited laws for later indirect citations and tally kinds.
    fn record(&mut self, references: &[Reference]) {
        for r in references {
            *self
                .stats
                .references_by_kind
                .entry(r.kind.as_str().to_string())
                .or_default() += 1;
            if matches!(r.kind, ReferenceKind::External | ReferenceKind::PreAmendment) {
                if let Some(name) = &r.target_law_name {
                    self.context.note_law(name);
                }
            }
        }
    }

    /// Set the law being processed, e.g. its e-Gov id.
    pub fn set_current_law(&mut self, law_id: Option<String>) {
        self.context.set_law(law_id);
    }

    /// Forget position and detected laws before moving to another law.
    pub fn reset_context(&mut self) {
        self.context.reset();
        self.stats.context_resets += 1;
    }

    pub fn context(&self) -> &ContextTracker {
        &self.context
    }

    pub fn registry(&self) -> &AbbreviationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Extend this engine's registry. A registry shared with other engines
    /// is copied first, so they keep their own view. Cached results keyed
    /// under the previous registry revision stop matching.
    pub fn add_custom_abbreviation(&mut self, entry: AbbreviationEntry) -> Result<(), EngineError> {
        let key = entry.abbreviation.clone();
        if let Err(err) = Arc::make_mut(&mut self.registry).add_custom_abbreviation(entry) {
            warn!(abbreviation = %key, error = %err, "custom abbreviation rejected");
            return Err(err.into());
        }
        info!(abbreviation = %key, revision = self.registry.revision(), "custom abbreviation added");
        Ok(())
    }

    pub fn statistics(&self) -> &EngineStatistics {
        &self.stats
    }

    pub fn cache_statistics(&self) -> Option<CacheStatistics> {
        self.cache.as_ref().map(|c| c.statistics())
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}
