//! User profile: macro targets, dietary restrictions and fitness goal.

pub mod device;
pub mod store;
pub mod types;

pub use device::{DeviceStore, MemoryDeviceStore, SqliteDeviceStore};
pub use store::{ProfileStore, StoredProfile, PROFILE_KEY};
pub use types::{is_complete, FitnessGoal, Profile, ProfileField};
