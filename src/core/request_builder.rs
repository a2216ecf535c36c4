use crate::core::registry::AdapterRegistry;
use crate::domain::model::{GenerationParameters, InferenceRequest};
use crate::utils::error::Result;
use std::sync::Arc;

/// Builds endpoint payloads from a query and its classification.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    registry: Arc<AdapterRegistry>,
    generation: GenerationParameters,
}

impl RequestBuilder {
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            generation: GenerationParameters::default(),
        }
    }

    pub fn with_generation(mut self, generation: GenerationParameters) -> Self {
        self.generation = generation;
        self
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn generation(&self) -> &GenerationParameters {
        &self.generation
    }

    pub fn build(&self, text: &str, language: &str, domain: &str) -> Result<InferenceRequest> {
        let adapter_name = self.registry.resolve(language, domain)?;
        Ok(InferenceRequest::new(
            text,
            adapter_name,
            self.generation.clone(),
        ))
    }
}
