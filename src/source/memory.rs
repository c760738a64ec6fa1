//! In-memory source.

use super::{ConfigSource, Pairs, SourceError};

/// A fixed set of pairs held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    pairs: Pairs,
}

impl MemorySource {
    pub fn new(pairs: Pairs) -> Self {
        Self {
            name: "memory".to_string(),
            pairs,
        }
    }

    /// Builds a source from any iterator of key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl ConfigSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        Ok(self.pairs.clone())
    }
}
