use serde::{Deserialize, Serialize};

/// 查詢分類結果：一定會有語言與領域（找不到標記時使用預設值）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub language: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub do_sample: bool,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 512,
            temperature: 0.7,
            do_sample: true,
        }
    }
}

/// Payload sent to the inference endpoint.
///
/// Serializes to `{"inputs": ..., "parameters": {..., "adapter_name": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    pub inputs: String,
    pub parameters: RequestParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameters {
    #[serde(flatten)]
    pub generation: GenerationParameters,
    pub adapter_name: String,
}

impl InferenceRequest {
    pub fn new(
        prompt: impl Into<String>,
        adapter_name: impl Into<String>,
        generation: GenerationParameters,
    ) -> Self {
        Self {
            inputs: prompt.into(),
            parameters: RequestParameters {
                generation,
                adapter_name: adapter_name.into(),
            },
        }
    }

    pub fn prompt(&self) -> &str {
        &self.inputs
    }

    pub fn adapter_name(&self) -> &str {
        &self.parameters.adapter_name
    }

    pub fn generation(&self) -> &GenerationParameters {
        &self.parameters.generation
    }
}

/// Outcome envelope returned by the router; callers only branch on `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum InferenceResult {
    Success {
        language: String,
        domain: String,
        adapter_name: String,
        query: String,
        response: String,
    },
    Error {
        language: String,
        domain: String,
        query: String,
        error_message: String,
    },
}

impl InferenceResult {
    pub fn is_success(&self) -> bool {
        matches!(self, InferenceResult::Success { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            InferenceResult::Success { .. } => "success",
            InferenceResult::Error { .. } => "error",
        }
    }

    pub fn language(&self) -> &str {
        match self {
            InferenceResult::Success { language, .. } | InferenceResult::Error { language, .. } => {
                language
            }
        }
    }

    pub fn domain(&self) -> &str {
        match self {
            InferenceResult::Success { domain, .. } | InferenceResult::Error { domain, .. } => {
                domain
            }
        }
    }

    pub fn query(&self) -> &str {
        match self {
            InferenceResult::Success { query, .. } | InferenceResult::Error { query, .. } => query,
        }
    }

    pub fn response(&self) -> Option<&str> {
        match self {
            InferenceResult::Success { response, .. } => Some(response),
            InferenceResult::Error { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            InferenceResult::Error { error_message, .. } => Some(error_message),
            InferenceResult::Success { .. } => None,
        }
    }
}
