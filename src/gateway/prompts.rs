//! Prompts and output schemas for the nutrition model calls.

use super::types::{FoodImageAnalysisInput, RecommendationInput, MAX_RECOMMENDATIONS};

/// System instruction shared by every provider that accepts one.
pub const SYSTEM_PROMPT: &str = "You are a fitness and nutrition assistant. Always respond with valid JSON only, no markdown formatting or code blocks.";

/// JSON schema for the food photo analysis output.
pub fn analysis_result_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "foodName": {
                "type": "string",
                "description": "The name of the food item identified in the image."
            },
            "description": {
                "type": "string",
                "description": "A description of the food item identified."
            },
            "nutrition": {
                "type": "string",
                "description": "Estimated nutritional information (calories, protein, carbs, fat) for the food item."
            },
            "recommendation": {
                "type": "string",
                "description": "Whether the food item aligns with the user's diet and fitness goals, with a justification."
            }
        },
        "required": ["foodName", "description", "nutrition", "recommendation"],
        "additionalProperties": false
    })
}

/// JSON schema for the recommendation output.
pub fn recommendation_set_schema() -> serde_json::Value {
    let food_item = serde_json::json!({
        "type": "object",
        "properties": {
            "foodItemId": {"type": "string"},
            "name": {"type": "string"},
            "description": {"type": "string"},
            "nutrition": {"type": "string"},
            "reason": {"type": "string"}
        },
        "required": ["foodItemId", "name", "description", "nutrition", "reason"],
        "additionalProperties": false
    });

    serde_json::json!({
        "type": "object",
        "properties": {
            "recommendedRecipes": {
                "type": "array",
                "description": format!("An array of exactly {} recommended recipes.", MAX_RECOMMENDATIONS),
                "items": {
                    "type": "object",
                    "properties": {
                        "recipeId": {
                            "type": "string",
                            "description": "The ID of the recommended recipe (can be a placeholder like \"recipe-1\")."
                        },
                        "name": {"type": "string"},
                        "description": {"type": "string"},
                        "ingredients": {"type": "array", "items": {"type": "string"}},
                        "steps": {"type": "array", "items": {"type": "string"}},
                        "nutrition": {"type": "string"},
                        "reason": {
                            "type": "string",
                            "description": "Reason why this recipe is recommended based on the user input."
                        }
                    },
                    "required": ["recipeId", "name", "description", "ingredients", "steps", "nutrition", "reason"],
                    "additionalProperties": false
                }
            },
            "recommendedRestaurants": {
                "type": "array",
                "description": format!("An array of exactly {} recommended restaurants, each potentially including recommended food items.", MAX_RECOMMENDATIONS),
                "items": {
                    "type": "object",
                    "properties": {
                        "restaurantId": {
                            "type": "string",
                            "description": "The ID of the recommended restaurant (can be a placeholder like \"restaurant-1\")."
                        },
                        "name": {"type": "string"},
                        "cuisine": {"type": "string"},
                        "foodItems": {"type": "array", "items": food_item},
                        "reason": {
                            "type": "string",
                            "description": "Reason why this restaurant (and its items) are recommended based on the user input."
                        }
                    },
                    "required": ["restaurantId", "name", "cuisine", "foodItems", "reason"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["recommendedRecipes", "recommendedRestaurants"],
        "additionalProperties": false
    })
}

/// Build the food photo analysis prompt. The photo itself travels as a
/// separate image part.
pub fn build_food_analysis_prompt(input: &FoodImageAnalysisInput) -> String {
    format!(
        r#"You are a fitness and nutrition expert. Analyze the provided food image.

1. Identify the primary food item(s) in the image.
2. Provide a brief description of the food.
3. Estimate the nutritional information (calories, protein, carbohydrates, fat). Be concise.
4. Based on the estimated nutrition and the user's profile below, determine if the food aligns with their goals. Provide a clear recommendation ('Aligns' or 'Does Not Align') and a brief justification.

User Profile:
Diet: {diet}
Fitness Goal: {goal}

Respond with a JSON object with the fields foodName, description, nutrition and recommendation."#,
        diet = input.diet,
        goal = input.fitness_goal,
    )
}

/// Build the recipe/restaurant recommendation prompt.
pub fn build_recommendation_prompt(input: &RecommendationInput) -> String {
    format!(
        r#"You are a personal nutrition assistant.

Based on the user's diet chart and fitness goals, recommend recipes and restaurants with food items that align with their needs.

Diet Chart: {diet}
Fitness Goals: {goals}

Provide exactly {n} recommended recipes and exactly {n} recommended restaurants (which may include specific food items). Use placeholder IDs if actual IDs are not available.

Format your response as a JSON object with the fields recommendedRecipes and recommendedRestaurants. Be brief but descriptive, and always include the reason for each recommendation. Ensure the output strictly adheres to the schema, providing exactly {n} items in each array."#,
        diet = input.diet_chart,
        goals = input.fitness_goals,
        n = MAX_RECOMMENDATIONS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::photo::PhotoDataUri;

    #[test]
    fn test_analysis_schema_structure() {
        let schema = analysis_result_schema();
        assert_eq!(schema["type"], "object");
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, ["foodName", "description", "nutrition", "recommendation"]);
    }

    #[test]
    fn test_recommendation_schema_nested_items() {
        let schema = recommendation_set_schema();
        let restaurant = &schema["properties"]["recommendedRestaurants"]["items"];
        assert_eq!(restaurant["properties"]["foodItems"]["type"], "array");
        assert_eq!(
            restaurant["properties"]["foodItems"]["items"]["properties"]["foodItemId"]["type"],
            "string"
        );
        assert!(schema["properties"]["recommendedRecipes"]["description"]
            .as_str()
            .unwrap()
            .contains("exactly 5"));
    }

    #[test]
    fn test_food_analysis_prompt_includes_profile() {
        let input = FoodImageAnalysisInput {
            photo_data_uri: PhotoDataUri::parse("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            diet: "Macros: Protein 150g, Carbs 200g, Fat 70g. Restrictions: None".to_string(),
            fitness_goal: "maintain".to_string(),
        };
        let prompt = build_food_analysis_prompt(&input);
        assert!(prompt.contains("Diet: Macros: Protein 150g"));
        assert!(prompt.contains("Fitness Goal: maintain"));
        assert!(prompt.contains("'Aligns' or 'Does Not Align'"));
        // The image is never inlined into the text prompt
        assert!(!prompt.contains("base64"));
    }

    #[test]
    fn test_recommendation_prompt_includes_profile() {
        let input = RecommendationInput {
            diet_chart: "Macros: Protein 90g, Carbs 100g, Fat 30g. Restrictions: vegan".to_string(),
            fitness_goals: "lose weight".to_string(),
        };
        let prompt = build_recommendation_prompt(&input);
        assert!(prompt.contains("Diet Chart: Macros: Protein 90g"));
        assert!(prompt.contains("Restrictions: vegan"));
        assert!(prompt.contains("Fitness Goals: lose weight"));
        assert!(prompt.contains("exactly 5 recommended recipes"));
    }
}
