//! Food photo analysis screen.
//!
//! Only runs on explicit user action, after a photo has been chosen.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::{Notice, Screen, ScreenState};
use crate::error::GatewayError;
use crate::gateway::{AiGateway, AnalysisResult, FoodImageAnalysisInput, PhotoDataUri};
use crate::profile::{is_complete, Profile};

pub const NO_IMAGE: &str = "Please select an image first.";
pub const PROFILE_INCOMPLETE: &str = "Please complete your profile before analyzing food.";
pub const IMAGE_UNREADABLE: &str = "Failed to read the image file.";

pub struct FoodAnalysisView<G> {
    gateway: Arc<G>,
    photo: Mutex<Option<PhotoDataUri>>,
    screen: Screen<AnalysisResult>,
}

impl<G: AiGateway> FoodAnalysisView<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            photo: Mutex::new(None),
            screen: Screen::new("food_analysis"),
        }
    }

    pub fn state(&self) -> ScreenState<AnalysisResult> {
        self.screen.state()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.screen.notice()
    }

    pub fn dismiss_notice(&self) {
        self.screen.dismiss_notice();
    }

    pub fn photo(&self) -> Option<PhotoDataUri> {
        self.photo_slot().clone()
    }

    /// Use a picked photo (already encoded as a data URI). Any previous
    /// result is cleared.
    pub fn select_image(&self, data_uri: &str) -> Result<(), GatewayError> {
        match PhotoDataUri::parse(data_uri) {
            Ok(photo) => {
                self.set_photo(photo);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected selected image: {}", e);
                *self.photo_slot() = None;
                self.screen
                    .reset(Some(Notice::error("Error", IMAGE_UNREADABLE)));
                Err(e)
            }
        }
    }

    /// Use raw image bytes; they are downscaled and encoded as JPEG.
    pub fn select_image_bytes(&self, image_bytes: &[u8]) -> Result<(), GatewayError> {
        match PhotoDataUri::from_image_bytes(image_bytes) {
            Ok(photo) => {
                self.set_photo(photo);
                Ok(())
            }
            Err(e) => {
                warn!("Rejected selected image: {}", e);
                *self.photo_slot() = None;
                self.screen
                    .reset(Some(Notice::error("Error", IMAGE_UNREADABLE)));
                Err(e)
            }
        }
    }

    pub fn clear_image(&self) {
        *self.photo_slot() = None;
        self.screen.reset(None);
    }

    /// The analyze action is available once a photo is chosen and no
    /// analysis is running.
    pub fn can_analyze(&self) -> bool {
        self.photo_slot().is_some() && !self.screen.state().is_loading()
    }

    /// Analyze the selected photo against `profile`.
    ///
    /// Missing photo or incomplete profile only raise a notice; the gateway
    /// is not called. Ignored while an analysis is already running.
    pub async fn analyze(&self, profile: Option<&Profile>) {
        let Some(photo) = self.photo() else {
            self.screen.set_notice(Notice::error("Error", NO_IMAGE));
            return;
        };
        let Some(profile) = profile.filter(|p| is_complete(Some(*p))) else {
            self.screen
                .set_notice(Notice::warning("Profile Incomplete", PROFILE_INCOMPLETE));
            return;
        };

        let Some(token) = self.screen.try_begin() else {
            debug!("Analysis already running, ignoring request");
            return;
        };
        let input = FoodImageAnalysisInput::from_profile(profile, photo);

        let outcome = self.gateway.analyze_food_image(&input).await.map_err(|e| {
            error!("Error analyzing food image: {}", e);
            Notice::error(
                "Analysis Failed",
                format!(
                    "Failed to analyze the food image. Please try again. Details: {}",
                    e
                ),
            )
        });

        if self.screen.finish(token, outcome) {
            info!("Food analysis screen updated");
        }
    }

    /// React to a profile change.
    ///
    /// An incomplete profile clears results; any change supersedes an
    /// analysis still in flight.
    pub fn on_profile_changed(&self, profile: Option<&Profile>) {
        if !is_complete(profile) {
            self.screen.reset(None);
        } else if self.screen.state().is_loading() {
            info!("Profile changed during analysis, discarding in-flight result");
            self.screen.reset(None);
        }
    }

    /// Apply [`Self::on_profile_changed`] for every change until the store
    /// goes away.
    pub async fn follow(&self, mut profiles: watch::Receiver<Option<Profile>>) {
        while profiles.changed().await.is_ok() {
            let profile = profiles.borrow_and_update().clone();
            self.on_profile_changed(profile.as_ref());
        }
    }

    fn set_photo(&self, photo: PhotoDataUri) {
        info!("Selected photo ({})", photo.mime_type());
        *self.photo_slot() = Some(photo);
        self.screen.reset(None);
    }

    fn photo_slot(&self) -> MutexGuard<'_, Option<PhotoDataUri>> {
        self.photo.lock().unwrap_or_else(|e| e.into_inner())
    }
}
