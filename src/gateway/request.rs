//! Pure mapping from a profile to gateway inputs.
//!
//! Callers gate on profile completeness before building a request.

use super::photo::PhotoDataUri;
use super::types::{FoodImageAnalysisInput, RecommendationInput};
use crate::profile::Profile;

/// Human-readable diet summary shared by both prompts, e.g.
/// `Macros: Protein 150g, Carbs 200g, Fat 70g. Restrictions: gluten-free`.
pub fn diet_chart(profile: &Profile) -> String {
    format!(
        "Macros: Protein {}g, Carbs {}g, Fat {}g. Restrictions: {}",
        profile.protein,
        profile.carbs,
        profile.fat,
        profile.restrictions_text().unwrap_or("None")
    )
}

impl FoodImageAnalysisInput {
    pub fn from_profile(profile: &Profile, photo: PhotoDataUri) -> Self {
        Self {
            photo_data_uri: photo,
            diet: diet_chart(profile),
            fitness_goal: profile.fitness_goal.as_str().to_string(),
        }
    }
}

impl RecommendationInput {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            diet_chart: diet_chart(profile),
            fitness_goals: profile.fitness_goal.as_str().to_string(),
        }
    }
}
