use std::sync::{Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::device::DeviceStore;
use super::types::{is_complete, Profile};
use crate::error::StorageError;

/// Device store key holding the serialized profile.
pub const PROFILE_KEY: &str = "fitfoodie_profile";

/// Result of decoding the persisted profile record.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredProfile {
    Present(Profile),
    Absent,
    /// The entry exists but is not a valid profile.
    Corrupt(String),
}

impl StoredProfile {
    /// Strictly decode a raw device store value. Never fails.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return StoredProfile::Absent;
        };
        if raw.trim().is_empty() || raw.trim() == "null" {
            return StoredProfile::Absent;
        }
        match serde_json::from_str::<Profile>(raw) {
            Ok(profile) => StoredProfile::Present(profile),
            Err(e) => StoredProfile::Corrupt(e.to_string()),
        }
    }

    pub fn into_profile(self) -> Option<Profile> {
        match self {
            StoredProfile::Present(profile) => Some(profile),
            StoredProfile::Absent | StoredProfile::Corrupt(_) => None,
        }
    }
}

/// Single source of truth for the user's profile.
///
/// Writes are persisted synchronously and published to subscribers before
/// `save`/`clear` return, so the next completeness check or fetch sees them.
pub struct ProfileStore {
    device: Mutex<Box<dyn DeviceStore>>,
    current: watch::Sender<Option<Profile>>,
}

impl ProfileStore {
    /// Read the persisted profile and build the store.
    ///
    /// A missing entry, an unreadable store and a corrupt record all start
    /// the application with no profile.
    pub fn load(device: impl DeviceStore + 'static) -> Self {
        let loaded = match device.get(PROFILE_KEY) {
            Ok(raw) => match StoredProfile::decode(raw.as_deref()) {
                StoredProfile::Present(profile) => {
                    info!("Loaded stored profile (goal: {})", profile.fitness_goal);
                    Some(profile)
                }
                StoredProfile::Absent => {
                    debug!("No stored profile");
                    None
                }
                StoredProfile::Corrupt(reason) => {
                    warn!("Ignoring corrupt stored profile: {}", reason);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to load profile from device store: {}", e);
                None
            }
        };

        let (current, _) = watch::channel(loaded);
        Self {
            device: Mutex::new(Box::new(device)),
            current,
        }
    }

    /// Current profile snapshot.
    pub fn profile(&self) -> Option<Profile> {
        self.current.borrow().clone()
    }

    pub fn is_complete(&self) -> bool {
        is_complete(self.current.borrow().as_ref())
    }

    /// Observe profile changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Option<Profile>> {
        self.current.subscribe()
    }

    /// Replace the profile wholesale and persist it.
    ///
    /// The in-memory profile is replaced and subscribers are notified even
    /// when persisting fails; the error is a non-fatal warning.
    pub fn save(&self, profile: Profile) -> Result<(), StorageError> {
        let json = serde_json::to_string(&profile)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;

        self.current.send_replace(Some(profile));

        match self.device().set(PROFILE_KEY, &json) {
            Ok(()) => {
                info!("Saved profile ({} bytes)", json.len());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to save profile to device store: {}", e);
                Err(e)
            }
        }
    }

    /// Set the profile absent and remove the persisted entry.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.current.send_replace(None);

        match self.device().remove(PROFILE_KEY) {
            Ok(()) => {
                info!("Cleared stored profile");
                Ok(())
            }
            Err(e) => {
                warn!("Failed to remove profile from device store: {}", e);
                Err(e)
            }
        }
    }

    fn device(&self) -> MutexGuard<'_, Box<dyn DeviceStore>> {
        self.device.lock().unwrap_or_else(|e| e.into_inner())
    }
}
