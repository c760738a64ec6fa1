//! Ordered stack of sources.

use super::{ConfigSource, Pairs, SourceError};

/// Merges several sources; later layers override earlier ones key by key.
#[derive(Default)]
pub struct LayeredSource {
    name: String,
    layers: Vec<Box<dyn ConfigSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, source: impl ConfigSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self.name = self
            .layers
            .iter()
            .map(|l| l.name())
            .collect::<Vec<_>>()
            .join("+");
        self
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl ConfigSource for LayeredSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        let mut merged = Pairs::new();
        for layer in &self.layers {
            merged.extend(layer.fetch()?);
        }
        Ok(merged)
    }
}
