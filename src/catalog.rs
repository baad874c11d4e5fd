//! Recipe and restaurant lookups.
//!
//! Only a stub backend exists so far; it answers every query with the same
//! fixed records.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub recipe_id: String,
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub nutrition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub restaurant_id: String,
    pub name: String,
    pub cuisine: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub food_item_id: String,
    pub name: String,
    pub description: String,
    pub nutrition: String,
}

pub trait Catalog: Send + Sync {
    fn get_recipe(&self, recipe_id: &str) -> impl Future<Output = Recipe> + Send;

    fn get_restaurants_by_cuisine(
        &self,
        cuisine: &str,
    ) -> impl Future<Output = Vec<Restaurant>> + Send;

    fn get_food_item(
        &self,
        restaurant_id: &str,
        food_item_id: &str,
    ) -> impl Future<Output = FoodItem> + Send;
}

/// Fixed sample records, independent of the ids asked for.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubCatalog;

impl Catalog for StubCatalog {
    async fn get_recipe(&self, recipe_id: &str) -> Recipe {
        debug!("Stub catalog: recipe '{}'", recipe_id);
        Recipe {
            recipe_id: "1".to_string(),
            name: "Healthy Salad".to_string(),
            description: "A delicious and healthy salad.".to_string(),
            ingredients: vec!["Lettuce".into(), "Tomato".into(), "Cucumber".into()],
            steps: vec![
                "Cut vegetables".into(),
                "Mix vegetables".into(),
                "Add dressing".into(),
            ],
            nutrition: "Low in calories, high in vitamins.".to_string(),
        }
    }

    async fn get_restaurants_by_cuisine(&self, cuisine: &str) -> Vec<Restaurant> {
        debug!("Stub catalog: restaurants for cuisine '{}'", cuisine);
        [("1", "Delicious Delights"), ("2", "Flavorful Feast")]
            .into_iter()
            .map(|(id, name)| Restaurant {
                restaurant_id: id.to_string(),
                name: name.to_string(),
                cuisine: cuisine.to_string(),
            })
            .collect()
    }

    async fn get_food_item(&self, restaurant_id: &str, food_item_id: &str) -> FoodItem {
        debug!(
            "Stub catalog: food item '{}' at restaurant '{}'",
            food_item_id, restaurant_id
        );
        FoodItem {
            food_item_id: "1".to_string(),
            name: "Steak".to_string(),
            description: "A juicy steak.".to_string(),
            nutrition: "High in protein.".to_string(),
        }
    }
}
