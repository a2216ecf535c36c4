pub mod classifier;
pub mod invocation;
pub mod registry;
pub mod request_builder;
pub mod router;

pub use crate::domain::model::{ClassificationResult, InferenceRequest, InferenceResult};
pub use crate::domain::ports::InferenceTransport;
pub use crate::utils::error::Result;
