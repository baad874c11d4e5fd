//! AI gateway: request shaping, model calls and strict response decoding.

use std::future::Future;

pub mod decode;
pub mod llm;
pub mod photo;
pub mod prompts;
pub mod request;
pub mod types;

pub use llm::{GatewaySettings, LlmGateway, Provider};
pub use photo::PhotoDataUri;
pub use request::diet_chart;
pub use types::*;

use crate::error::GatewayError;

/// Structured-prompt/structured-response service behind the AI features.
///
/// Each call is one request and one response: no streaming, no partial
/// results. Every failure is a single [`GatewayError`].
pub trait AiGateway: Send + Sync {
    fn analyze_food_image(
        &self,
        input: &FoodImageAnalysisInput,
    ) -> impl Future<Output = Result<AnalysisResult, GatewayError>> + Send;

    fn get_recommendations(
        &self,
        input: &RecommendationInput,
    ) -> impl Future<Output = Result<RecommendationSet, GatewayError>> + Send;
}
