//! Recipe and restaurant recommendations screen.
//!
//! Fetches automatically whenever the profile changes and is complete.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info};

use super::state::{Notice, RequestToken, Screen, ScreenState};
use crate::gateway::{AiGateway, RecommendationInput, RecommendationSet};
use crate::profile::{is_complete, Profile};

pub const PROFILE_INCOMPLETE: &str =
    "Please complete your profile to see recommendations.";
pub const FETCH_FAILED: &str = "Failed to fetch recommendations. Please try again later.";

pub struct RecommendationView<G> {
    gateway: Arc<G>,
    screen: Screen<RecommendationSet>,
}

impl<G: AiGateway> RecommendationView<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            screen: Screen::new("recommendations"),
        }
    }

    pub fn state(&self) -> ScreenState<RecommendationSet> {
        self.screen.state()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.screen.notice()
    }

    pub fn dismiss_notice(&self) {
        self.screen.dismiss_notice();
    }

    /// Fetch recommendations for `profile`, replacing any previous result.
    ///
    /// An incomplete profile clears the screen without calling the gateway.
    /// Ignored while a fetch is already loading.
    pub async fn refresh(&self, profile: Option<&Profile>) {
        let Some(profile) = self.complete_or_reset(profile) else {
            return;
        };
        let Some(token) = self.screen.try_begin() else {
            debug!("Recommendations already loading, ignoring refresh");
            return;
        };
        self.fetch(token, profile).await;
    }

    /// Like `refresh`, but supersedes a fetch that is still loading. Its
    /// response is dropped when it arrives.
    async fn restart(&self, profile: Option<&Profile>) {
        let Some(profile) = self.complete_or_reset(profile) else {
            return;
        };
        let token = self.screen.begin();
        self.fetch(token, profile).await;
    }

    fn complete_or_reset<'a>(&self, profile: Option<&'a Profile>) -> Option<&'a Profile> {
        let complete = profile.filter(|p| is_complete(Some(*p)));
        if complete.is_none() {
            self.screen
                .reset(Some(Notice::info("Profile Incomplete", PROFILE_INCOMPLETE)));
        }
        complete
    }

    async fn fetch(&self, token: RequestToken, profile: &Profile) {
        let input = RecommendationInput::from_profile(profile);

        let outcome = self
            .gateway
            .get_recommendations(&input)
            .await
            .map(RecommendationSet::truncated)
            .map_err(|e| {
                error!("Error fetching recommendations: {}", e);
                Notice::error("Error", FETCH_FAILED)
            });

        if self.screen.finish(token, outcome) {
            info!("Recommendations screen updated");
        }
    }

    /// Follow profile changes until the store goes away.
    ///
    /// Each change starts a fresh fetch; a change that arrives mid-fetch
    /// abandons the in-flight call.
    pub async fn follow(&self, mut profiles: watch::Receiver<Option<Profile>>) {
        loop {
            let profile = profiles.borrow_and_update().clone();
            let fetch = self.restart(profile.as_ref());
            tokio::pin!(fetch);

            tokio::select! {
                _ = &mut fetch => {
                    if profiles.changed().await.is_err() {
                        break;
                    }
                }
                changed = profiles.changed() => {
                    if changed.is_err() {
                        fetch.await;
                        break;
                    }
                    info!("Profile changed during fetch, restarting recommendations");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::fixtures::recommendation_set;
    use crate::profile::{FitnessGoal, MemoryDeviceStore, ProfileStore};
    use crate::testing::ScriptedGateway;

    fn profile() -> Profile {
        Profile {
            protein: 150.0,
            carbs: 200.0,
            fat: 70.0,
            restrictions: None,
            fitness_goal: FitnessGoal::LoseWeight,
        }
    }

    #[tokio::test]
    async fn test_refresh_success_truncates() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_recommendations(Ok(recommendation_set(7, 5)));
        let view = RecommendationView::new(gateway.clone());

        view.refresh(Some(&profile())).await;

        let state = view.state();
        let set = state.result().unwrap();
        assert_eq!(set.recommended_recipes.len(), 5);
        assert_eq!(set.recommended_restaurants.len(), 5);
        assert_eq!(set.recommended_recipes[4].recipe_id, "recipe-5");

        let calls = gateway.recommendation_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].diet_chart,
            "Macros: Protein 150g, Carbs 200g, Fat 70g. Restrictions: None"
        );
        assert_eq!(calls[0].fitness_goals, "lose weight");
    }

    #[tokio::test]
    async fn test_refresh_incomplete_profile_skips_gateway() {
        let gateway = Arc::new(ScriptedGateway::new());
        let view = RecommendationView::new(gateway.clone());

        view.refresh(None).await;
        assert_eq!(view.state(), ScreenState::Idle);
        assert_eq!(view.notice().unwrap().message, PROFILE_INCOMPLETE);

        let mut negative = profile();
        negative.carbs = -10.0;
        view.refresh(Some(&negative)).await;
        assert_eq!(view.state(), ScreenState::Idle);
        assert!(gateway.recommendation_calls().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_failure_is_single_message() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_recommendations(Err(crate::error::GatewayError::EmptyOutput));
        let view = RecommendationView::new(gateway);

        view.refresh(Some(&profile())).await;
        assert_eq!(view.state().error(), Some(FETCH_FAILED));
        assert_eq!(view.notice().unwrap().message, FETCH_FAILED);

        view.dismiss_notice();
        assert!(view.notice().is_none());
    }

    #[tokio::test]
    async fn test_incomplete_profile_clears_previous_results() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_recommendations(Ok(recommendation_set(5, 5)));
        let view = RecommendationView::new(gateway);

        view.refresh(Some(&profile())).await;
        assert!(view.state().result().is_some());

        view.refresh(None).await;
        assert_eq!(view.state(), ScreenState::Idle);
    }

    #[tokio::test]
    async fn test_short_lists_are_accepted() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_recommendations(Ok(recommendation_set(3, 0)));
        let view = RecommendationView::new(gateway);

        view.refresh(Some(&profile())).await;
        let state = view.state();
        let set = state.result().unwrap();
        assert_eq!(set.recommended_recipes.len(), 3);
        assert!(set.recommended_restaurants.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let gateway = Arc::new(ScriptedGateway::new());
        let held = gateway.hold_recommendations();
        gateway.push_recommendations(Ok(recommendation_set(2, 2)));
        let view = RecommendationView::new(gateway.clone());

        let mut updated = profile();
        updated.fitness_goal = FitnessGoal::GainMuscle;

        let original = profile();
        let first = view.restart(Some(&original));
        let second = async {
            view.restart(Some(&updated)).await;
            // The older request answers last
            let _ = held.send(Ok(recommendation_set(5, 5)));
        };
        tokio::join!(first, second);

        let state = view.state();
        assert_eq!(state.result().unwrap().recommended_recipes.len(), 2);
        assert_eq!(gateway.recommendation_calls().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_refresh_while_loading_is_ignored() {
        let gateway = Arc::new(ScriptedGateway::new());
        let held = gateway.hold_recommendations();
        let view = RecommendationView::new(gateway.clone());

        let current = profile();
        let first = view.refresh(Some(&current));
        let second = async {
            while gateway.recommendation_calls().is_empty() {
                tokio::task::yield_now().await;
            }
            view.refresh(Some(&current)).await;
            assert_eq!(gateway.recommendation_calls().len(), 1);
            assert!(view.state().is_loading());
            let _ = held.send(Ok(recommendation_set(4, 4)));
        };
        tokio::join!(first, second);

        assert_eq!(gateway.recommendation_calls().len(), 1);
        assert_eq!(view.state().result().unwrap().recommended_recipes.len(), 4);
    }

    #[tokio::test]
    async fn test_follow_fetches_until_store_is_gone() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_recommendations(Ok(recommendation_set(5, 5)));
        let view = RecommendationView::new(gateway.clone());

        let store = ProfileStore::load(MemoryDeviceStore::new());
        store.save(profile()).unwrap();
        let profiles = store.subscribe();
        drop(store);

        view.follow(profiles).await;
        assert!(view.state().result().is_some());
        assert_eq!(gateway.recommendation_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_restarts_on_profile_change() {
        let gateway = Arc::new(ScriptedGateway::new());
        let _held = gateway.hold_recommendations();
        gateway.push_recommendations(Ok(recommendation_set(3, 3)));
        let view = RecommendationView::new(gateway.clone());

        let store = ProfileStore::load(MemoryDeviceStore::new());
        store.save(profile()).unwrap();
        let profiles = store.subscribe();

        let edit = async {
            while gateway.recommendation_calls().is_empty() {
                tokio::task::yield_now().await;
            }
            let mut updated = profile();
            updated.fat = 50.0;
            store.save(updated).unwrap();
            drop(store);
        };
        tokio::join!(view.follow(profiles), edit);

        let calls = gateway.recommendation_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[1].diet_chart.contains("Fat 50g"));
        assert_eq!(view.state().result().unwrap().recommended_recipes.len(), 3);
    }
}
