#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use fitfoodie::gateway::{
    AiGateway, AnalysisResult, FoodImageAnalysisInput, RecipeRecommendation, RecommendationInput,
    RecommendationSet, RestaurantRecommendation,
};
use fitfoodie::profile::{FitnessGoal, Profile};
use fitfoodie::GatewayError;
use tokio::sync::oneshot;

/// Gateway whose replies are fed by the test through oneshot channels, in
/// call order.
#[derive(Default)]
pub struct ChannelGateway {
    analyses: Mutex<VecDeque<oneshot::Receiver<Result<AnalysisResult, GatewayError>>>>,
    recommendations: Mutex<VecDeque<oneshot::Receiver<Result<RecommendationSet, GatewayError>>>>,
    pub analysis_calls: Mutex<Vec<FoodImageAnalysisInput>>,
    pub recommendation_calls: Mutex<Vec<RecommendationInput>>,
}

impl ChannelGateway {
    pub fn expect_recommendations(&self) -> oneshot::Sender<Result<RecommendationSet, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.recommendations.lock().unwrap().push_back(rx);
        tx
    }

    pub fn expect_analysis(&self) -> oneshot::Sender<Result<AnalysisResult, GatewayError>> {
        let (tx, rx) = oneshot::channel();
        self.analyses.lock().unwrap().push_back(rx);
        tx
    }

    pub fn recommendation_call_count(&self) -> usize {
        self.recommendation_calls.lock().unwrap().len()
    }

    pub fn analysis_call_count(&self) -> usize {
        self.analysis_calls.lock().unwrap().len()
    }
}

impl AiGateway for ChannelGateway {
    async fn analyze_food_image(
        &self,
        input: &FoodImageAnalysisInput,
    ) -> Result<AnalysisResult, GatewayError> {
        self.analysis_calls.lock().unwrap().push(input.clone());
        let rx = self.analyses.lock().unwrap().pop_front();
        match rx {
            Some(rx) => rx.await.unwrap_or(Err(GatewayError::EmptyOutput)),
            None => Err(GatewayError::Precondition("unexpected analysis call".into())),
        }
    }

    async fn get_recommendations(
        &self,
        input: &RecommendationInput,
    ) -> Result<RecommendationSet, GatewayError> {
        self.recommendation_calls.lock().unwrap().push(input.clone());
        let rx = self.recommendations.lock().unwrap().pop_front();
        match rx {
            Some(rx) => rx.await.unwrap_or(Err(GatewayError::EmptyOutput)),
            None => Err(GatewayError::Precondition("unexpected recommendation call".into())),
        }
    }
}

pub fn lose_weight_profile() -> Profile {
    Profile {
        protein: 150.0,
        carbs: 200.0,
        fat: 70.0,
        restrictions: None,
        fitness_goal: FitnessGoal::LoseWeight,
    }
}

pub fn recommendations(recipes: usize, restaurants: usize) -> RecommendationSet {
    RecommendationSet {
        recommended_recipes: (1..=recipes)
            .map(|i| RecipeRecommendation {
                recipe_id: format!("r{}", i),
                name: format!("Recipe {}", i),
                description: "Lean and simple".to_string(),
                ingredients: vec!["Chicken".to_string(), "Rice".to_string()],
                steps: vec!["Cook".to_string(), "Serve".to_string()],
                nutrition: "450 kcal".to_string(),
                reason: "High protein".to_string(),
            })
            .collect(),
        recommended_restaurants: (1..=restaurants)
            .map(|i| RestaurantRecommendation {
                restaurant_id: format!("s{}", i),
                name: format!("Restaurant {}", i),
                cuisine: "Mediterranean".to_string(),
                food_items: Vec::new(),
                reason: "Grilled options".to_string(),
            })
            .collect(),
    }
}

pub fn analysis(name: &str) -> AnalysisResult {
    AnalysisResult {
        food_name: name.to_string(),
        description: "A plate of food".to_string(),
        nutrition: "500 kcal".to_string(),
        recommendation: "Aligns with your goal.".to_string(),
    }
}
