//! Pattern collectors: one per reference category.
//!
//! A collector reads the (preprocessed) text plus read-only context and
//! proposes candidates. Collectors never see each other's output; the
//! conflict resolver reconciles overlaps afterwards. New categories are
//! added by registering another collector, not by editing existing ones.

pub mod guards;
pub mod provision;

mod abbreviation;
mod application;
mod composite;
mod deleted;
mod external;
mod indirect;
mod internal;
mod law_type;
mod listed;
mod range;
mod relative;
mod structure;

pub use abbreviation::AbbreviationCollector;
pub use application::ApplicationCollector;
pub use composite::CompositeCollector;
pub use deleted::{DeletedCollector, PreAmendmentCollector};
pub use external::{ExternalCollector, SameLawCollector};
pub use indirect::IndirectCollector;
pub(crate) use indirect::mentions_indirect;
pub use internal::InternalCollector;
pub use law_type::LawTypeCollector;
pub use listed::ListedCollector;
pub use range::RangeCollector;
pub use relative::RelativeCollector;
pub use structure::{ConditionalCollector, NestedCollector, SpecialStructureCollector, StructuralCollector};

use hourei_core::AbbreviationRegistry;

use crate::candidate::Candidate;
use crate::config::DetectorConfig;
use crate::context::ContextTracker;

/// Everything a collector may look at for one detection call.
pub struct Scan<'a> {
    pub text: &'a str,
    pub registry: &'a AbbreviationRegistry,
    pub context: &'a ContextTracker,
    pub config: &'a DetectorConfig,
}

pub trait Collector: Send + Sync {
    /// Stable name, recorded in candidate metadata and logs.
    fn name(&self) -> &'static str;

    fn collect(&self, scan: &Scan<'_>) -> Vec<Candidate>;
}

/// The built-in collectors in registration order. Order only breaks ties
/// between equal-priority candidates.
pub fn default_collectors() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(ExternalCollector),
        Box::new(AbbreviationCollector),
        Box::new(SameLawCollector),
        Box::new(PreAmendmentCollector),
        Box::new(LawTypeCollector),
        Box::new(CompositeCollector),
        Box::new(DeletedCollector),
        Box::new(RangeCollector),
        Box::new(ApplicationCollector),
        Box::new(ListedCollector),
        Box::new(RelativeCollector),
        Box::new(StructuralCollector),
        Box::new(InternalCollector),
        Box::new(NestedCollector),
        Box::new(SpecialStructureCollector),
        Box::new(ConditionalCollector),
        Box::new(IndirectCollector),
    ]
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::LazyLock;

    pub static REGISTRY: LazyLock<AbbreviationRegistry> =
        LazyLock::new(|| AbbreviationRegistry::builtin().unwrap());

    /// Run one collector with an optional current provision.
    pub fn run(collector: &dyn Collector, text: &str, current: Option<&str>) -> Vec<Candidate> {
        let mut context = ContextTracker::new();
        if let Some(id) = current {
            context.advance(hourei_core::ProvisionId::parse(id).unwrap());
        }
        run_with(collector, text, &context)
    }

    pub fn run_with(collector: &dyn Collector, text: &str, context: &ContextTracker) -> Vec<Candidate> {
        let config = DetectorConfig::default();
        let scan = Scan {
            text,
            registry: &REGISTRY,
            context,
            config: &config,
        };
        collector.collect(&scan)
    }

    pub fn articles(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().filter_map(|c| c.target_article()).collect()
    }
}
