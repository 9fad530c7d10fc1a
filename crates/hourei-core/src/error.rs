use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("abbreviation key is empty")]
    EmptyKey,

    #[error("abbreviation key already registered: {0}")]
    DuplicateKey(String),

    #[error("full name is empty for abbreviation {0}")]
    EmptyFullName(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}
