pub mod fragments;
pub mod law;
pub mod numeral;
pub mod reference;
pub mod registry;

mod error;
pub use error::RegistryError;

pub use law::{Era, LawKind, LawNumber};
pub use numeral::{
    ArticleNumber, ProvisionId, arabic_to_kanji, arabic_to_kanji_article, kanji_to_arabic,
};
pub use reference::{Metadata, Reference, ReferenceEdge, ReferenceKind, Span, meta};
pub use registry::{AbbreviationEntry, AbbreviationMatch, AbbreviationRegistry, LawMention, LawRecord};
