//! Navigation state kept between sessions.
//!
//! On disk it is a single JSON document `{ "currImageId", "currCommentPage" }`
//! where an unselected image is written as `-1`.

use crate::error::{ClientError, ClientResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use wg_core::models::ImageId;

const NO_IMAGE: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredState", into = "StoredState")]
pub struct ClientState {
    pub curr_image_id: Option<ImageId>,
    pub curr_comment_page: u32,
}

impl ClientState {
    /// Switches to another image (or none), starting over at its first comment page.
    pub fn select(&mut self, image_id: Option<ImageId>) {
        self.curr_image_id = image_id;
        self.curr_comment_page = 0;
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredImageId {
    Id(ImageId),
    Sentinel(i64),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    curr_image_id: StoredImageId,
    #[serde(default)]
    curr_comment_page: u32,
}

impl From<StoredState> for ClientState {
    fn from(stored: StoredState) -> Self {
        let curr_image_id = match stored.curr_image_id {
            StoredImageId::Id(id) => Some(id),
            StoredImageId::Sentinel(_) => None,
        };
        ClientState {
            curr_image_id,
            curr_comment_page: stored.curr_comment_page,
        }
    }
}

impl From<ClientState> for StoredState {
    fn from(state: ClientState) -> Self {
        StoredState {
            curr_image_id: state
                .curr_image_id
                .map_or(StoredImageId::Sentinel(NO_IMAGE), StoredImageId::Id),
            curr_comment_page: state.curr_comment_page,
        }
    }
}

/// Where the client keeps its [`ClientState`].
pub trait StateStore: Send + Sync {
    /// The saved state, or the initial one if nothing was saved yet.
    fn load(&self) -> ClientResult<ClientState>;
    fn save(&self, state: &ClientState) -> ClientResult<()>;
}

/// A JSON file on disk.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> ClientResult<ClientState> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ClientState::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, state: &ClientState) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec(state)?)?;
        log::debug!("saved client state to {}", self.path.display());
        Ok(())
    }
}

/// Process-local state, for tests and embedded use.
#[derive(Default)]
pub struct MemoryStateStore {
    state: Mutex<ClientState>,
}

impl MemoryStateStore {
    pub fn new(state: ClientState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> ClientResult<ClientState> {
        self.state
            .lock()
            .map(|state| *state)
            .map_err(|_| ClientError::State("state lock poisoned".into()))
    }

    fn save(&self, state: &ClientState) -> ClientResult<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| ClientError::State("state lock poisoned".into()))?;
        *guard = *state;
        Ok(())
    }
}
