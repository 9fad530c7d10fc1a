//! Cross-reference detection for Japanese statutory text.
//!
//! [`DetectionEngine::detect`] takes the text of one article and returns
//! every citation it finds: bare and qualified articles, other laws by
//! title or abbreviation, relative citations (前条, 次項), ranges, lists,
//! applications (準用), and structural references. Collectors propose
//! candidates independently; a resolver settles overlaps.

pub mod candidate;
pub mod config;
pub mod context;
pub mod engine;
pub mod normalize;
pub mod patterns;
pub mod preprocess;
pub mod resolver;

mod error;
pub use error::{ConfigError, EngineError};

pub use candidate::Candidate;
pub use config::DetectorConfig;
pub use context::{ContextTracker, RelativeUnit, Resolution};
pub use engine::{DetectionEngine, ENGINE_VERSION, EngineStatistics};
pub use normalize::{Relation, classify_relation};
pub use patterns::{Collector, Scan};
pub use resolver::ConflictResolver;
