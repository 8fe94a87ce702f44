//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::models::{Comment, CommentId, Image, ImageId};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;

/// A stored file, chunk by chunk.
pub type MediaStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Data persistence contract for images and comments.
#[async_trait]
pub trait GalleryRepo: Send + Sync {
    // Image Operations
    async fn insert_image(&self, image: &Image) -> anyhow::Result<()>;
    async fn get_image(&self, id: ImageId) -> anyhow::Result<Option<Image>>;
    /// Every image, newest first. Equal timestamps fall back to insertion order.
    async fn list_images(&self) -> anyhow::Result<Vec<Image>>;
    /// Removes an image together with its comments in one unit of work.
    /// Returns the removed image and the number of comments removed with it.
    async fn delete_image_cascade(&self, id: ImageId) -> anyhow::Result<Option<(Image, u64)>>;

    // Comment Operations
    async fn insert_comment(&self, comment: &Comment) -> anyhow::Result<()>;
    async fn get_comment(&self, id: CommentId) -> anyhow::Result<Option<Comment>>;
    /// Comments of one image, newest first.
    async fn list_comments_paginated(&self, image_id: ImageId, limit: i64, offset: i64) -> anyhow::Result<Vec<Comment>>;
    async fn count_comments(&self, image_id: ImageId) -> anyhow::Result<u64>;
    async fn delete_comment(&self, id: CommentId) -> anyhow::Result<Option<Comment>>;
}

/// Storage contract for uploaded picture files.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes and returns the path to record in `Picture::path`.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
    /// Opens a stored file for streaming. Fails up front if it cannot be opened.
    async fn open(&self, path: &str) -> anyhow::Result<MediaStream>;
    /// Removes a stored file. Removing a file that is already gone succeeds.
    async fn remove(&self, path: &str) -> anyhow::Result<()>;
}
