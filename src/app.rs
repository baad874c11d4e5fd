//! Composition root: wires configuration, the profile store, the AI gateway
//! and the screens together.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::catalog::StubCatalog;
use crate::config::AppConfig;
use crate::error::{StorageError, ValidationErrors};
use crate::gateway::{AiGateway, LlmGateway};
use crate::profile::{MemoryDeviceStore, ProfileStore, SqliteDeviceStore};
use crate::views::{FoodAnalysisView, ProfileForm, RecommendationView, SubmitOutcome};

pub struct FitFoodie<G> {
    gateway: Arc<G>,
    profiles: Arc<ProfileStore>,
    recommendations: Arc<RecommendationView<G>>,
    food_analysis: Arc<FoodAnalysisView<G>>,
    catalog: StubCatalog,
}

impl FitFoodie<LlmGateway> {
    /// Build the application from `config`.
    ///
    /// An unusable device database degrades to an in-memory store: the
    /// profile works for the session but is not persisted.
    pub fn open(config: &AppConfig) -> Result<Self> {
        let gateway =
            LlmGateway::new(config.gateway_settings()).context("Failed to set up the AI gateway")?;

        let db_path = config.database_path();
        let profiles = match SqliteDeviceStore::open(&db_path) {
            Ok(device) => ProfileStore::load(device),
            Err(e) => {
                warn!("Profile will not be persisted this session: {}", e);
                ProfileStore::load(MemoryDeviceStore::new())
            }
        };

        info!("FitFoodie ready (data: {:?})", db_path);
        Ok(Self::with_parts(profiles, gateway))
    }
}

impl<G: AiGateway + 'static> FitFoodie<G> {
    pub fn with_parts(profiles: ProfileStore, gateway: G) -> Self {
        let gateway = Arc::new(gateway);
        Self {
            profiles: Arc::new(profiles),
            recommendations: Arc::new(RecommendationView::new(gateway.clone())),
            food_analysis: Arc::new(FoodAnalysisView::new(gateway.clone())),
            gateway,
            catalog: StubCatalog,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    pub fn recommendations(&self) -> &Arc<RecommendationView<G>> {
        &self.recommendations
    }

    pub fn food_analysis(&self) -> &Arc<FoodAnalysisView<G>> {
        &self.food_analysis
    }

    pub fn catalog(&self) -> &StubCatalog {
        &self.catalog
    }

    /// Form prefilled from the current profile.
    pub fn profile_form(&self) -> ProfileForm {
        ProfileForm::from_profile(self.profiles.profile().as_ref())
    }

    pub fn submit_profile(&self, form: &ProfileForm) -> Result<SubmitOutcome, ValidationErrors> {
        form.submit(&self.profiles)
    }

    pub fn clear_profile(&self) -> Result<(), StorageError> {
        self.profiles.clear()
    }

    /// Analyze the selected photo against the current profile.
    pub async fn analyze_food(&self) {
        let profile = self.profiles.profile();
        self.food_analysis.analyze(profile.as_ref()).await;
    }

    /// Start the background tasks that keep both screens in step with the
    /// profile. They stop when aborted or when the store is dropped.
    pub fn spawn_observers(&self) -> Vec<JoinHandle<()>> {
        let recommendations = self.recommendations.clone();
        let profiles = self.profiles.subscribe();
        let recommendations_task = tokio::spawn(async move {
            recommendations.follow(profiles).await;
        });

        let food_analysis = self.food_analysis.clone();
        let profiles = self.profiles.subscribe();
        let food_analysis_task = tokio::spawn(async move {
            food_analysis.follow(profiles).await;
        });

        vec![recommendations_task, food_analysis_task]
    }
}
