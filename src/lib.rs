pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliArgs;

pub use adapters::http::HttpTransport;
pub use config::{lambda::LambdaConfig, RouterConfig};
pub use core::{
    classifier::QueryClassifier, invocation::InvocationClient, registry::AdapterRegistry,
    request_builder::RequestBuilder, router::SupportRouter,
};
pub use domain::model::{ClassificationResult, InferenceRequest, InferenceResult};
pub use utils::error::{Result, RouterError};

use std::sync::Arc;

/// Builds the HTTP-backed router from a validated configuration.
pub fn build_http_router(config: &RouterConfig) -> Result<SupportRouter<HttpTransport>> {
    let transport = HttpTransport::from_config(&config.endpoint)?;
    let builder =
        RequestBuilder::new(Arc::new(config.registry())).with_generation(config.generation.clone());
    let client = InvocationClient::new(transport).with_deadline(config.endpoint.deadline());

    SupportRouter::checked(config.classifier(), builder, client)
}
