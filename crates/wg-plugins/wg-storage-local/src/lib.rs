//! # wg-storage-local
//! webgallery/crates/wg-plugins/wg-storage-local/src/lib.rs
//! Local filesystem implementation of `MediaStore`.
//! Features: directory sharding, path confinement, empty-directory pruning.

use anyhow::{bail, Context};
use async_trait::async_trait;
use bytes::BytesMut;
use futures_util::stream;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncReadExt;
use uuid::Uuid;
use wg_core::traits::{MediaStore, MediaStream};

/// Read size for streamed files.
const CHUNK_BYTES: usize = 64 * 1024;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./uploads")
    root_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root_path: root }
    }

    /// Generates a sharded relative path: "ab/cd/abcd..."
    ///
    /// Every upload gets a fresh random name, so two identical uploads never
    /// share a file and deleting one image cannot break another.
    fn new_sharded_path() -> String {
        let name = Uuid::new_v4().simple().to_string();
        format!("{}/{}/{}", &name[0..2], &name[2..4], name)
    }

    /// Resolves a stored path under the root, refusing anything that could escape it.
    fn resolve(&self, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(path);
        if path.is_empty() || !relative.components().all(|c| matches!(c, Component::Normal(_))) {
            bail!("refusing to access media path {:?}", path);
        }
        Ok(self.root_path.join(relative))
    }

    /// Removes now-empty shard directories up to (but excluding) the root.
    async fn prune_empty_parents(&self, file: &Path) {
        let mut current = file.parent().map(Path::to_path_buf);
        while let Some(dir) = current {
            if dir == self.root_path || !dir.starts_with(&self.root_path) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk
            if fs::remove_dir(&dir).await.is_err() {
                break;
            }
            current = dir.parent().map(Path::to_path_buf);
        }
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        let relative = Self::new_sharded_path();
        let target_path = self.resolve(&relative)?;

        // 1. Ensure directory exists
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating upload directory {}", parent.display()))?;
        }

        // 2. Write the file
        fs::write(&target_path, &data)
            .await
            .with_context(|| format!("writing upload {}", target_path.display()))?;

        log::debug!("stored {} bytes of {} at {}", data.len(), content_type, relative);
        Ok(relative)
    }

    async fn open(&self, path: &str) -> anyhow::Result<MediaStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .with_context(|| format!("opening media {}", full_path.display()))?;

        let chunks = stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(CHUNK_BYTES);
            if file.read_buf(&mut buf).await? == 0 {
                return Ok(None);
            }
            Ok::<_, std::io::Error>(Some((buf.freeze(), file)))
        });
        Ok(Box::pin(chunks))
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => {
                self.prune_empty_parents(&full_path).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing media {}", full_path.display())),
        }
    }
}
