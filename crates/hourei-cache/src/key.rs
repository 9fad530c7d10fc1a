use std::fmt;

use ring::digest;

/// Inputs whose text plus context discriminator fit in this many bytes are
/// keyed literally; longer ones by SHA-256.
pub const SHORT_KEY_LIMIT: usize = 64;

/// Cache key derived from the detected text and a context discriminator.
///
/// The text is keyed verbatim: cached spans are byte offsets into it, so
/// two inputs that differ only in whitespace must not share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(text: &str, context: &str) -> Self {
        if text.len() + context.len() <= SHORT_KEY_LIMIT {
            return Self(format!("L:{context}\u{1f}{text}"));
        }
        let mut ctx = digest::Context::new(&digest::SHA256);
        ctx.update(context.as_bytes());
        ctx.update(&[0x1f]);
        ctx.update(text.as_bytes());
        Self(format!("H:{}", hex::encode(ctx.finish())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_hashed(&self) -> bool {
        self.0.starts_with("H:")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
