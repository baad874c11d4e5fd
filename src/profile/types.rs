use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The user's fitness goal. Serialized with the exact strings shown to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FitnessGoal {
    #[serde(rename = "lose weight")]
    LoseWeight,
    #[serde(rename = "gain muscle")]
    GainMuscle,
    #[serde(rename = "maintain")]
    Maintain,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 3] = [
        FitnessGoal::LoseWeight,
        FitnessGoal::GainMuscle,
        FitnessGoal::Maintain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "lose weight",
            FitnessGoal::GainMuscle => "gain muscle",
            FitnessGoal::Maintain => "maintain",
        }
    }

    /// Label used by the profile form.
    pub fn label(&self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "Lose Weight",
            FitnessGoal::GainMuscle => "Gain Muscle",
            FitnessGoal::Maintain => "Maintain Weight",
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FitnessGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitnessGoal::ALL
            .into_iter()
            .find(|goal| goal.as_str() == s.trim())
            .ok_or_else(|| format!("Unknown fitness goal: '{}'", s))
    }
}

/// The user's daily macro targets, dietary restrictions and fitness goal.
///
/// Stored as one flat record; every save replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Daily protein target in grams
    pub protein: f64,
    /// Daily carbohydrate target in grams
    pub carbs: f64,
    /// Daily fat target in grams
    pub fat: f64,
    /// Free text, conventionally comma-separated (e.g. "gluten-free, dairy-free")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<String>,
    pub fitness_goal: FitnessGoal,
}

impl Profile {
    /// Restrictions text, or `None` when missing or blank.
    pub fn restrictions_text(&self) -> Option<&str> {
        self.restrictions
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    fn macros_non_negative(&self) -> bool {
        // NaN fails every comparison, so it never counts as non-negative.
        self.protein >= 0.0 && self.carbs >= 0.0 && self.fat >= 0.0
    }
}

/// Completeness gate for every AI-backed feature.
///
/// True iff a profile exists and all three macros are non-negative. The goal
/// is part of the type, so a present profile always has one.
pub fn is_complete(profile: Option<&Profile>) -> bool {
    profile.is_some_and(Profile::macros_non_negative)
}

/// Form fields, used to key validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProfileField {
    Protein,
    Carbs,
    Fat,
    Restrictions,
    FitnessGoal,
}

impl ProfileField {
    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::Protein => "Protein",
            ProfileField::Carbs => "Carbs",
            ProfileField::Fat => "Fat",
            ProfileField::Restrictions => "Restrictions",
            ProfileField::FitnessGoal => "Fitness goal",
        }
    }
}
