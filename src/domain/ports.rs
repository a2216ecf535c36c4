use crate::domain::model::InferenceRequest;
use crate::utils::error::Result;
use async_trait::async_trait;

/// One attempt against the remote inference endpoint.
///
/// Implementations perform exactly one network call and classify failures:
/// recoverable model-serving faults become `RouterError::TransientServing`,
/// everything else `RouterError::FatalInvocation`. Retrying is the caller's job.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    async fn send(&self, request: &InferenceRequest) -> Result<serde_json::Value>;

    /// 用於日誌的端點描述
    fn endpoint(&self) -> &str;
}
