use crate::core::classifier::QueryClassifier;
use crate::core::invocation::InvocationClient;
use crate::core::request_builder::RequestBuilder;
use crate::domain::model::{ClassificationResult, InferenceRequest, InferenceResult};
use crate::domain::ports::InferenceTransport;
use crate::utils::error::Result;

/// Classify → build → invoke, folded into an `InferenceResult`.
///
/// `process` never returns an error: every failure becomes
/// `InferenceResult::Error`. The router holds no per-request state, so one
/// instance can serve concurrent `process` calls.
pub struct SupportRouter<T: InferenceTransport> {
    classifier: QueryClassifier,
    builder: RequestBuilder,
    client: InvocationClient<T>,
}

impl<T: InferenceTransport> SupportRouter<T> {
    /// Composes the pipeline as given. Keys missing from the registry are
    /// reported per request; use [`SupportRouter::checked`] to fail at startup.
    pub fn new(
        classifier: QueryClassifier,
        builder: RequestBuilder,
        client: InvocationClient<T>,
    ) -> Self {
        Self {
            classifier,
            builder,
            client,
        }
    }

    pub fn checked(
        classifier: QueryClassifier,
        builder: RequestBuilder,
        client: InvocationClient<T>,
    ) -> Result<Self> {
        classifier.validate_against(builder.registry())?;
        Ok(Self::new(classifier, builder, client))
    }

    pub fn client(&self) -> &InvocationClient<T> {
        &self.client
    }

    pub fn classify(&self, query: &str) -> ClassificationResult {
        self.classifier.classify(query)
    }

    /// Classifies and builds the payload without touching the network.
    pub fn prepare(&self, query: &str) -> (ClassificationResult, Result<InferenceRequest>) {
        let classification = self.classify(query);
        let request = self
            .builder
            .build(query, &classification.language, &classification.domain);
        (classification, request)
    }

    pub async fn process(&self, query: &str) -> InferenceResult {
        let (classification, request) = self.prepare(query);
        tracing::info!(
            "🔎 Detected language: {}, domain: {}",
            classification.language,
            classification.domain
        );

        let outcome = match request {
            Ok(request) => self
                .client
                .invoke(&request)
                .await
                .map(|response| (request.adapter_name().to_string(), response)),
            Err(e) => Err(e),
        };

        let ClassificationResult { language, domain } = classification;
        match outcome {
            Ok((adapter_name, response)) => {
                tracing::info!("✅ Query answered with adapter {}", adapter_name);
                InferenceResult::Success {
                    language,
                    domain,
                    adapter_name,
                    query: query.to_string(),
                    response,
                }
            }
            Err(e) => {
                tracing::error!(
                    "❌ Error processing query {:?} (language: {}, domain: {}, category: {:?}): {}",
                    query,
                    language,
                    domain,
                    e.category(),
                    e
                );
                InferenceResult::Error {
                    language,
                    domain,
                    query: query.to_string(),
                    error_message: e.to_string(),
                }
            }
        }
    }
}
