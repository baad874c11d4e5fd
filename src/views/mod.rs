//! Headless screen controllers. Rendering is left to the host shell.

pub mod food_analysis;
pub mod profile_form;
pub mod recommendations;
pub mod state;

pub use food_analysis::FoodAnalysisView;
pub use profile_form::{ProfileForm, SubmitOutcome};
pub use recommendations::RecommendationView;
pub use state::{Notice, NoticeKind, RequestToken, Screen, ScreenState};
