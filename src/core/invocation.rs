use crate::domain::model::InferenceRequest;
use crate::domain::ports::InferenceTransport;
use crate::utils::error::{FailureKind, Result, RouterError};
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    GiveUp,
}

/// Fixed-interval retry policy: 3 attempts in total, 1 second apart,
/// transient serving errors only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// `attempts_made` counts the attempt that just failed.
    pub fn decide(&self, attempts_made: u32, error: &RouterError) -> RetryDecision {
        if error.is_transient() && attempts_made < self.max_attempts {
            RetryDecision::RetryAfter(self.delay)
        } else {
            RetryDecision::GiveUp
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay: RETRY_DELAY,
        }
    }
}

/// Sends requests through a transport under the retry policy and decodes
/// `generated_text` from the response.
pub struct InvocationClient<T: InferenceTransport> {
    transport: T,
    policy: RetryPolicy,
    deadline: Option<Duration>,
}

impl<T: InferenceTransport> InvocationClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: RetryPolicy::default(),
            deadline: None,
        }
    }

    /// Bounds one whole `invoke` call, retries and backoff included.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn invoke(&self, request: &InferenceRequest) -> Result<String> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.invoke_with_retry(request))
                .await
                .map_err(|_| {
                    tracing::error!(
                        "⏰ Deadline of {:?} exceeded invoking adapter {}",
                        deadline,
                        request.adapter_name()
                    );
                    RouterError::fatal(
                        FailureKind::DeadlineExceeded,
                        format!("no response within {:?}", deadline),
                    )
                })?,
            None => self.invoke_with_retry(request).await,
        }
    }

    async fn invoke_with_retry(&self, request: &InferenceRequest) -> Result<String> {
        let mut attempts_made = 0;

        loop {
            attempts_made += 1;
            tracing::debug!(
                "📡 Invoking {} with adapter {} (attempt {}/{})",
                self.transport.endpoint(),
                request.adapter_name(),
                attempts_made,
                self.policy.max_attempts()
            );

            let error = match self.attempt(request).await {
                Ok(text) => return Ok(text),
                Err(error) => error,
            };

            match self.policy.decide(attempts_made, &error) {
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        "⚠️ Model error on adapter {}. Retry {}/{}: {}",
                        request.adapter_name(),
                        attempts_made,
                        self.policy.max_attempts(),
                        error
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp => {
                    if error.is_transient() {
                        tracing::error!(
                            "❌ Model error on adapter {} persisted after {} attempts: {}",
                            request.adapter_name(),
                            attempts_made,
                            error
                        );
                    } else {
                        tracing::error!(
                            "❌ Error invoking model with adapter {} on attempt {}: {}",
                            request.adapter_name(),
                            attempts_made,
                            error
                        );
                    }
                    return Err(error);
                }
            }
        }
    }

    async fn attempt(&self, request: &InferenceRequest) -> Result<String> {
        let body = self.transport.send(request).await?;
        decode_generated_text(body)
    }
}

/// Extracts `generated_text` from a response body.
pub fn decode_generated_text(body: serde_json::Value) -> Result<String> {
    match body.get("generated_text") {
        Some(serde_json::Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(RouterError::fatal(
            FailureKind::Decode,
            format!("generated_text is not a string: {}", other),
        )),
        None => Err(RouterError::fatal(
            FailureKind::Decode,
            "response has no generated_text field",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::GenerationParameters;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    enum Step {
        Reply(serde_json::Value),
        Transient,
        Fatal(FailureKind),
        Hang(Duration),
    }

    struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceTransport for ScriptedTransport {
        async fn send(&self, _request: &InferenceRequest) -> Result<serde_json::Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front();
            match step {
                Some(Step::Reply(value)) => Ok(value),
                // 腳本用完後一律回傳暫時性錯誤
                Some(Step::Transient) | None => {
                    Err(RouterError::transient(Some(424), "model instance unavailable"))
                }
                Some(Step::Fatal(kind)) => Err(RouterError::fatal(kind, "scripted failure")),
                Some(Step::Hang(duration)) => {
                    tokio::time::sleep(duration).await;
                    Ok(json!({"generated_text": "too late"}))
                }
            }
        }

        fn endpoint(&self) -> &str {
            "scripted"
        }
    }

    fn request() -> InferenceRequest {
        InferenceRequest::new("Hola", "es-technical-support", GenerationParameters::default())
    }

    #[test]
    fn test_policy_decisions() {
        let policy = RetryPolicy::default();
        let transient = RouterError::transient(None, "busy");
        let fatal = RouterError::fatal(FailureKind::Transport, "refused");

        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay(), Duration::from_secs(1));
        assert_eq!(
            policy.decide(1, &transient),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(
            policy.decide(2, &transient),
            RetryDecision::RetryAfter(Duration::from_secs(1))
        );
        assert_eq!(policy.decide(3, &transient), RetryDecision::GiveUp);
        assert_eq!(policy.decide(1, &fatal), RetryDecision::GiveUp);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![Step::Reply(
            json!({"generated_text": "¿En qué puedo ayudarle?"}),
        )]));

        let text = client.invoke(&request()).await.unwrap();
        assert_eq!(text, "¿En qué puedo ayudarle?");
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_transient_makes_exactly_three_attempts() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![]));
        let start = Instant::now();

        let err = client.invoke(&request()).await.unwrap_err();

        assert!(err.is_transient());
        assert_eq!(client.transport().calls(), 3);
        assert_eq!(client.transport().calls(), client.policy().max_attempts());
        // 兩次 1 秒的間隔，最後一次失敗後不再等待
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_one_transient_failure() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![
            Step::Transient,
            Step::Reply(json!({"generated_text": "Bonjour"})),
            Step::Reply(json!({"generated_text": "never reached"})),
        ]));
        let start = Instant::now();

        let text = client.invoke(&request()).await.unwrap();

        assert_eq!(text, "Bonjour");
        assert_eq!(client.transport().calls(), 2);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![
            Step::Fatal(FailureKind::Authentication),
            Step::Reply(json!({"generated_text": "never reached"})),
        ]));
        let start = Instant::now();

        let err = client.invoke(&request()).await.unwrap_err();

        assert_eq!(err.failure_kind(), Some(FailureKind::Authentication));
        assert_eq!(client.transport().calls(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_after_transient_stops_immediately() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![
            Step::Transient,
            Step::Fatal(FailureKind::Transport),
        ]));

        let err = client.invoke(&request()).await.unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Transport));
        assert_eq!(client.transport().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_generated_text_is_fatal() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![
            Step::Reply(json!({"outputs": "wrong shape"})),
            Step::Reply(json!({"generated_text": "never reached"})),
        ]));

        let err = client.invoke(&request()).await.unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Decode));
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_bounds_whole_invoke() {
        let client = InvocationClient::new(ScriptedTransport::new(vec![Step::Hang(
            Duration::from_secs(30),
        )]))
        .with_deadline(Some(Duration::from_secs(5)));

        let err = client.invoke(&request()).await.unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::DeadlineExceeded));
        assert_eq!(client.transport().calls(), 1);
    }

    #[test]
    fn test_decode_generated_text() {
        assert_eq!(
            decode_generated_text(json!({"generated_text": "ok", "details": {}})).unwrap(),
            "ok"
        );
        assert!(decode_generated_text(json!({"generated_text": 42})).is_err());
        assert!(decode_generated_text(json!([{"generated_text": "list"}])).is_err());
    }
}
