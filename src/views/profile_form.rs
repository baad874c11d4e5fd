//! Profile form: collects macro targets, restrictions and fitness goal.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use super::state::Notice;
use crate::error::ValidationErrors;
use crate::profile::{FitnessGoal, Profile, ProfileField, ProfileStore};

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileForm {
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub restrictions: String,
    pub fitness_goal: Option<String>,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            protein: "0".to_string(),
            carbs: "0".to_string(),
            fat: "0".to_string(),
            restrictions: String::new(),
            fitness_goal: None,
        }
    }
}

/// Parsed macros, checked by `validator`.
#[derive(Debug, Validate)]
struct MacroTargets {
    #[validate(range(min = 0.0, message = "Protein must be non-negative."))]
    protein: f64,
    #[validate(range(min = 0.0, message = "Carbs must be non-negative."))]
    carbs: f64,
    #[validate(range(min = 0.0, message = "Fat must be non-negative."))]
    fat: f64,
}

/// What a successful submit produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub profile: Profile,
    pub notice: Notice,
}

impl ProfileForm {
    /// Prefill the form from a stored profile, or use the empty defaults.
    pub fn from_profile(profile: Option<&Profile>) -> Self {
        match profile {
            Some(p) => Self {
                protein: p.protein.to_string(),
                carbs: p.carbs.to_string(),
                fat: p.fat.to_string(),
                restrictions: p.restrictions.clone().unwrap_or_default(),
                fitness_goal: Some(p.fitness_goal.as_str().to_string()),
            },
            None => Self::default(),
        }
    }

    /// Validate every field and build a profile, or report per-field messages.
    pub fn validate(&self) -> Result<Profile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let protein = parse_grams(&self.protein, ProfileField::Protein, &mut errors);
        let carbs = parse_grams(&self.carbs, ProfileField::Carbs, &mut errors);
        let fat = parse_grams(&self.fat, ProfileField::Fat, &mut errors);

        let targets = MacroTargets {
            protein: protein.unwrap_or(0.0),
            carbs: carbs.unwrap_or(0.0),
            fat: fat.unwrap_or(0.0),
        };
        if let Err(field_errors) = targets.validate() {
            for (name, errs) in field_errors.field_errors() {
                let field = match name.as_ref() {
                    "protein" => ProfileField::Protein,
                    "carbs" => ProfileField::Carbs,
                    _ => ProfileField::Fat,
                };
                if let Some(message) = errs.iter().find_map(|e| e.message.as_ref()) {
                    errors.insert(field, message.to_string());
                }
            }
        }

        let fitness_goal = match self.fitness_goal.as_deref().map(str::trim) {
            None | Some("") => {
                errors.insert(
                    ProfileField::FitnessGoal,
                    "You need to select a fitness goal.",
                );
                None
            }
            Some(raw) => match raw.parse::<FitnessGoal>() {
                Ok(goal) => Some(goal),
                Err(_) => {
                    errors.insert(
                        ProfileField::FitnessGoal,
                        "Fitness goal must be one of: lose weight, gain muscle, maintain.",
                    );
                    None
                }
            },
        };

        match fitness_goal {
            Some(fitness_goal) if errors.is_empty() => {
                let restrictions = self.restrictions.trim();
                Ok(Profile {
                    protein: targets.protein,
                    carbs: targets.carbs,
                    fat: targets.fat,
                    restrictions: (!restrictions.is_empty()).then(|| restrictions.to_string()),
                    fitness_goal,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate and commit to the store. Invalid input never reaches the store.
    ///
    /// A valid profile is always accepted; a failed device write only turns
    /// the confirmation into a warning.
    pub fn submit(&self, store: &ProfileStore) -> Result<SubmitOutcome, ValidationErrors> {
        let profile = self.validate().inspect_err(|errors| {
            info!("Profile form rejected: {}", errors);
        })?;

        let notice = match store.save(profile.clone()) {
            Ok(()) => Notice::info(
                "Profile Updated",
                "Your diet chart and fitness goals have been saved.",
            ),
            Err(e) => {
                warn!("Profile saved in memory only: {}", e);
                Notice::warning(
                    "Profile Not Persisted",
                    format!(
                        "Your profile is active for this session but could not be stored on this device: {}",
                        e
                    ),
                )
            }
        };

        Ok(SubmitOutcome { profile, notice })
    }
}

fn parse_grams(raw: &str, field: ProfileField, errors: &mut ValidationErrors) -> Option<f64> {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => {
            errors.insert(field, format!("{} must be a number.", field.label()));
            None
        }
    }
}
