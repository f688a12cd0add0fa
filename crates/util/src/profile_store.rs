//! Persisted user profile for Ghostfill.
//!
//! The profile holds two values: a knowledge base mapping field names to
//! previously supplied values, and a free-text general-info string. The
//! suggestion engine reads it once at startup; only the settings surface writes
//! it. The JSON file lives in the standard configuration directory
//! (`~/.config/ghostfill/profile.json` on most platforms) unless overridden via
//! [`PROFILE_PATH_ENV`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use dirs_next::config_dir;
use ghostfill_types::Profile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::expand_tilde;

/// Environment variable allowing callers to override the profile file path.
pub const PROFILE_PATH_ENV: &str = "GHOSTFILL_PROFILE_PATH";

/// Default filename for the JSON payload.
pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Error surfaced when reading or writing the profile fails.
#[derive(Debug, Error)]
pub enum ProfileStoreError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("profile I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("profile serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shared trait implemented by profile persistence backends.
pub trait ProfileStore: Send + Sync {
    /// Read the stored profile; an absent profile yields [`Profile::default`].
    fn load(&self) -> Result<Profile, ProfileStoreError>;

    /// Replace the stored profile.
    fn save(&self, profile: &Profile) -> Result<(), ProfileStoreError>;
}

/// JSON-backed profile store persisted on disk.
#[derive(Debug)]
pub struct JsonProfileStore {
    path: PathBuf,
}

impl JsonProfileStore {
    /// Create a store at the provided path (or the default path when omitted).
    pub fn new<P: Into<Option<PathBuf>>>(path: P) -> Self {
        let path = match path.into() {
            Some(path) => expand_tilde(&path.to_string_lossy()),
            None => default_profile_path(),
        };
        Self { path }
    }

    /// Initialize a store at the default location.
    pub fn with_defaults() -> Self {
        Self::new(None::<PathBuf>)
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for JsonProfileStore {
    fn load(&self) -> Result<Profile, ProfileStoreError> {
        load_profile(&self.path)
    }

    fn save(&self, profile: &Profile) -> Result<(), ProfileStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, data)?;
        debug!(path = %self.path.display(), entries = profile.knowledge_base.len(), "profile saved");
        Ok(())
    }
}

/// In-memory profile store primarily used for unit testing and embedding.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profile: Mutex<Profile>,
}

impl InMemoryProfileStore {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile: Mutex::new(profile),
        }
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn load(&self) -> Result<Profile, ProfileStoreError> {
        Ok(self.profile.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, profile: &Profile) -> Result<(), ProfileStoreError> {
        *self.profile.lock().unwrap_or_else(PoisonError::into_inner) = profile.clone();
        Ok(())
    }
}

fn default_profile_path() -> PathBuf {
    if let Ok(path) = env::var(PROFILE_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ghostfill")
        .join(PROFILE_FILE_NAME)
}

fn load_profile(path: &Path) -> Result<Profile, ProfileStoreError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(profile) => Ok(profile),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse profile file; using an empty profile"
                );
                Ok(Profile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Profile::default()),
        Err(error) => Err(ProfileStoreError::Io(error)),
    }
}
