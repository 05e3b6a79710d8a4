//! In-memory user store seeded at start-up.
//!
//! Records are held in registration order. A seed file is a JSON array of
//! [`UserRecord`] values read through `cap_std`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use pagination::Page;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::UserRecord;
use crate::domain::ports::{UserListRequest, UserStore, UserStoreError};

/// Errors raised while loading a user seed file.
#[derive(Debug, Error)]
pub enum UserSeedError {
    #[error("failed to read user seed at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid user seed at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Process-local [`UserStore`].
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new(mut users: Vec<UserRecord>) -> Self {
        users.sort_by_key(UserRecord::registered_at);
        Self {
            users: RwLock::new(users),
        }
    }

    /// Load records from a JSON array at `path`.
    ///
    /// # Errors
    /// Returns [`UserSeedError`] when the file cannot be read or does not hold
    /// valid user records.
    pub fn from_json_file(path: &Path) -> Result<Self, UserSeedError> {
        let read_error = |source: std::io::Error| UserSeedError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "user seed path must be a file",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let payload = dir.read(Path::new(file_name)).map_err(read_error)?;
        let users: Vec<UserRecord> =
            serde_json::from_slice(&payload).map_err(|source| UserSeedError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(users))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self, request: &UserListRequest) -> Result<Page<UserRecord>, UserStoreError> {
        let users = self.users.read().await;
        let matching: Vec<&UserRecord> = match &request.search {
            Some(search) => users
                .iter()
                .filter(|user| user.username().matches(search))
                .collect(),
            None => users.iter().collect(),
        };
        let items = request
            .page
            .slice(&matching)
            .iter()
            .map(|user| (*user).clone())
            .collect();
        Ok(Page::new(items, &request.page, matching.len() as u64))
    }
}
