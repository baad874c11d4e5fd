//! Scripted gateway for screen tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::oneshot;

use crate::error::GatewayError;
use crate::gateway::{
    AiGateway, AnalysisResult, FoodImageAnalysisInput, RecommendationInput, RecommendationSet,
};

enum Reply<T> {
    Ready(Result<T, GatewayError>),
    /// Resolves when the test sends on the paired sender
    Held(oneshot::Receiver<Result<T, GatewayError>>),
}

/// Plays back queued replies in order and records every call.
#[derive(Default)]
pub(crate) struct ScriptedGateway {
    analyses: Mutex<VecDeque<Reply<AnalysisResult>>>,
    recommendations: Mutex<VecDeque<Reply<RecommendationSet>>>,
    analysis_calls: Mutex<Vec<FoodImageAnalysisInput>>,
    recommendation_calls: Mutex<Vec<RecommendationInput>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_analysis(&self, reply: Result<AnalysisResult, GatewayError>) {
        self.analyses.lock().unwrap().push_back(Reply::Ready(reply));
    }

    pub(crate) fn push_recommendations(&self, reply: Result<RecommendationSet, GatewayError>) {
        self.recommendations
            .lock()
            .unwrap()
            .push_back(Reply::Ready(reply));
    }

    /// Queue a recommendation reply that stays pending until sent.
    pub(crate) fn hold_recommendations(
        &self,
    ) -> oneshot::Sender<Result<RecommendationSet, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.recommendations
            .lock()
            .unwrap()
            .push_back(Reply::Held(rx));
        tx
    }

    /// Queue an analysis reply that stays pending until sent.
    pub(crate) fn hold_analysis(&self) -> oneshot::Sender<Result<AnalysisResult, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.analyses.lock().unwrap().push_back(Reply::Held(rx));
        tx
    }

    pub(crate) fn analysis_calls(&self) -> Vec<FoodImageAnalysisInput> {
        self.analysis_calls.lock().unwrap().clone()
    }

    pub(crate) fn recommendation_calls(&self) -> Vec<RecommendationInput> {
        self.recommendation_calls.lock().unwrap().clone()
    }
}

async fn play<T>(reply: Option<Reply<T>>) -> Result<T, GatewayError> {
    match reply {
        Some(Reply::Ready(result)) => result,
        Some(Reply::Held(rx)) => rx.await.unwrap_or(Err(GatewayError::EmptyOutput)),
        None => Err(GatewayError::Precondition("no scripted reply".to_string())),
    }
}

impl AiGateway for ScriptedGateway {
    async fn analyze_food_image(
        &self,
        input: &FoodImageAnalysisInput,
    ) -> Result<AnalysisResult, GatewayError> {
        self.analysis_calls.lock().unwrap().push(input.clone());
        let reply = self.analyses.lock().unwrap().pop_front();
        play(reply).await
    }

    async fn get_recommendations(
        &self,
        input: &RecommendationInput,
    ) -> Result<RecommendationSet, GatewayError> {
        self.recommendation_calls.lock().unwrap().push(input.clone());
        let reply = self.recommendations.lock().unwrap().pop_front();
        play(reply).await
    }
}
