//! State management for managed resources
//!
//! Manages the `.safetorun/state.json` file which records what the last apply
//! left behind for each resource in the manifest.

use crate::data::ResourceData;
use crate::error::{ProviderError, Result};
use chrono::{DateTime, Utc};
use safetorun_config::PROJECT_DIR;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_VERSION: u32 = 1;
const STATE_FILE: &str = "state.json";
const STATE_BACKUP: &str = "state.json.backup";
const LOCK_FILE: &str = "lock.json";

/// Locks older than this many hours are considered abandoned
const LOCK_STALE_HOURS: i64 = 1;

/// Time a new lock file may stay empty before it counts as abandoned
const LOCK_WRITE_GRACE: std::time::Duration = std::time::Duration::from_secs(10);

/// All managed resources
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalState {
    /// State file version
    pub version: u32,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,

    /// Resources indexed by type.name
    pub resources: BTreeMap<String, ResourceState>,

    /// Last read of each data source, indexed by type.name
    #[serde(default)]
    pub data: BTreeMap<String, ResourceData>,
}

impl Default for GlobalState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: Utc::now(),
            resources: BTreeMap::new(),
            data: BTreeMap::new(),
        }
    }
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a resource
    pub fn set_resource(&mut self, key: String, state: ResourceState) {
        self.resources.insert(key, state);
        self.updated_at = Utc::now();
    }

    /// Remove a resource
    pub fn remove_resource(&mut self, key: &str) -> Option<ResourceState> {
        let result = self.resources.remove(key);
        if result.is_some() {
            self.updated_at = Utc::now();
        }
        result
    }

    /// Get a resource by key
    pub fn get_resource(&self, key: &str) -> Option<&ResourceState> {
        self.resources.get(key)
    }

    /// Get the last read of a data source by key
    pub fn get_data(&self, key: &str) -> Option<&ResourceData> {
        self.data.get(key)
    }
}

/// State of a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// Resource type
    pub resource_type: String,

    /// Identity and attributes after the last successful operation
    pub data: ResourceData,

    /// When the resource was created
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    pub fn new(resource_type: impl Into<String>, data: ResourceData) -> Self {
        let now = Utc::now();
        Self {
            resource_type: resource_type.into(),
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the data, keeping the creation time
    pub fn update(&mut self, data: ResourceData) {
        self.data = data;
        self.updated_at = Utc::now();
    }
}

/// State manager for reading/writing state files
pub struct StateManager {
    /// Project root directory
    project_root: PathBuf,
}

impl StateManager {
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
        }
    }

    /// Get the state directory path
    fn state_dir(&self) -> PathBuf {
        self.project_root.join(PROJECT_DIR)
    }

    /// Get the state file path
    pub fn state_path(&self) -> PathBuf {
        self.state_dir().join(STATE_FILE)
    }

    /// Get the backup file path
    fn backup_path(&self) -> PathBuf {
        self.state_dir().join(STATE_BACKUP)
    }

    /// Get the lock file path
    fn lock_path(&self) -> PathBuf {
        self.state_dir().join(LOCK_FILE)
    }

    /// Ensure the state directory exists
    async fn ensure_state_dir(&self) -> Result<()> {
        let dir = self.state_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir).await?;
            tracing::debug!("Created state directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load the current state
    pub async fn load(&self) -> Result<GlobalState> {
        let path = self.state_path();
        if !path.exists() {
            tracing::debug!("State file not found, returning empty state");
            return Ok(GlobalState::new());
        }

        let content = fs::read_to_string(&path).await?;
        let state: GlobalState = serde_json::from_str(&content)?;

        if state.version > STATE_VERSION {
            return Err(ProviderError::StateError(format!(
                "State file version {} is newer than supported version {}",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!("Loaded state with {} resources", state.resources.len());
        Ok(state)
    }

    /// Save the state, keeping the previous file as a backup
    pub async fn save(&self, state: &GlobalState) -> Result<()> {
        self.ensure_state_dir().await?;

        let path = self.state_path();
        let backup = self.backup_path();

        if path.exists() {
            if backup.exists() {
                fs::remove_file(&backup).await?;
            }
            fs::rename(&path, &backup).await?;
            tracing::debug!("Created state backup");
        }

        let content = serde_json::to_string_pretty(state)?;
        fs::write(&path, content).await?;

        tracing::debug!("Saved state with {} resources", state.resources.len());
        Ok(())
    }

    /// Acquire a lock for exclusive access
    ///
    /// The lock file is created atomically, so of two concurrent callers
    /// exactly one wins. Stale or unreadable locks are removed and creation is
    /// retried once.
    pub async fn acquire_lock(&self) -> Result<StateLock> {
        self.ensure_state_dir().await?;

        let lock_path = self.lock_path();
        let lock_info = LockInfo {
            holder: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "unknown".to_string()),
            acquired_at: Utc::now(),
        };
        let content = serde_json::to_string_pretty(&lock_info)?;

        for _ in 0..2 {
            let created = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&lock_path)
                .await;

            match created {
                Ok(mut file) => {
                    let lock = StateLock {
                        lock_path,
                        released: false,
                    };
                    file.write_all(content.as_bytes()).await?;
                    file.flush().await?;

                    tracing::debug!("Acquired state lock");
                    return Ok(lock);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    Self::clear_stale_lock(&lock_path).await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ProviderError::LockError(
            "State lock was taken by another process".to_string(),
        ))
    }

    /// Remove an existing lock file if it is stale, fail if it is held
    async fn clear_stale_lock(lock_path: &Path) -> Result<()> {
        let content = match fs::read_to_string(lock_path).await {
            Ok(content) => content,
            // Released in the meantime
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<LockInfo>(&content) {
            Ok(lock_info) => {
                let age = Utc::now().signed_duration_since(lock_info.acquired_at);
                if age.num_hours() < LOCK_STALE_HOURS {
                    return Err(ProviderError::LockError(format!(
                        "State is locked by {} since {}",
                        lock_info.holder, lock_info.acquired_at
                    )));
                }
                tracing::warn!("Removing stale lock from {}", lock_info.holder);
            }
            Err(e) => {
                // A lock that was just created may not be written yet
                let modified = fs::metadata(lock_path).await?.modified()?;
                let age = modified.elapsed().unwrap_or_default();
                if age < LOCK_WRITE_GRACE {
                    return Err(ProviderError::LockError(
                        "State lock is being acquired by another process".to_string(),
                    ));
                }
                tracing::warn!("Removing unreadable lock file: {}", e);
            }
        }

        match fs::remove_file(lock_path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Lock information
#[derive(Debug, Serialize, Deserialize)]
struct LockInfo {
    holder: String,
    acquired_at: DateTime<Utc>,
}

/// RAII guard for state lock
pub struct StateLock {
    lock_path: PathBuf,
    released: bool,
}

impl StateLock {
    /// Release the lock
    pub async fn release(mut self) -> Result<()> {
        if !self.released {
            if self.lock_path.exists() {
                fs::remove_file(&self.lock_path).await?;
                tracing::debug!("Released state lock");
            }
            self.released = true;
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released && self.lock_path.exists() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
