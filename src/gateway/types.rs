//! Gateway inputs and outputs.
//!
//! Field names serialize in camelCase to match the schemas sent to the model.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::photo::PhotoDataUri;

/// Maximum entries shown per recommendation list.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Input for food photo analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodImageAnalysisInput {
    pub photo_data_uri: PhotoDataUri,
    /// Human-readable macro/restriction summary
    pub diet: String,
    pub fitness_goal: String,
}

/// Input for recipe and restaurant recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationInput {
    pub diet_chart: String,
    pub fitness_goals: String,
}

/// Model verdict on a photographed food item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub food_name: String,
    pub description: String,
    /// Estimated calories and macros, free text
    pub nutrition: String,
    /// "Aligns" / "Does Not Align" with a justification
    pub recommendation: String,
}

impl AnalysisResult {
    /// Whether the model judged the food to fit the user's goals.
    pub fn is_recommended(&self) -> bool {
        self.recommendation.to_lowercase().contains("aligns")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRecommendation {
    pub recipe_id: String,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub nutrition: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItemRecommendation {
    pub food_item_id: String,
    pub name: String,
    pub description: String,
    pub nutrition: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantRecommendation {
    pub restaurant_id: String,
    pub name: String,
    pub cuisine: String,
    pub food_items: Vec<FoodItemRecommendation>,
    pub reason: String,
}

/// Recipes and restaurants recommended for one profile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationSet {
    pub recommended_recipes: Vec<RecipeRecommendation>,
    pub recommended_restaurants: Vec<RestaurantRecommendation>,
}

impl RecommendationSet {
    /// Keep the first [`MAX_RECOMMENDATIONS`] of each list. Short lists are
    /// kept as they are.
    pub fn truncated(mut self) -> Self {
        self.recommended_recipes.truncate(MAX_RECOMMENDATIONS);
        self.recommended_restaurants.truncate(MAX_RECOMMENDATIONS);

        if self.recommended_recipes.len() < MAX_RECOMMENDATIONS
            || self.recommended_restaurants.len() < MAX_RECOMMENDATIONS
        {
            warn!(
                "Gateway returned fewer than {} recommendations: {} recipes, {} restaurants",
                MAX_RECOMMENDATIONS,
                self.recommended_recipes.len(),
                self.recommended_restaurants.len()
            );
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.recommended_recipes.is_empty() && self.recommended_restaurants.is_empty()
    }
}
