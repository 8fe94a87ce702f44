//! # Domain Models
//!
//! These structs represent the core entities of WebGallery.
//! Field names on the wire follow the gallery's JSON contract (`_id`, `imageId`, `date`).
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ImageId = Uuid;
pub type CommentId = Uuid;

/// Creation time at the precision the record store keeps (microseconds).
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Reference to the uploaded file backing an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    /// Path of the stored file, relative to the MediaStore root
    pub path: String,
    pub mimetype: String,
    /// Size in bytes
    pub size: u64,
    /// Filename supplied by the uploader, if any
    #[serde(rename = "originalname", default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
}

/// A gallery entry: metadata plus its stored picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    #[serde(rename = "_id")]
    pub id: ImageId,
    pub title: String,
    pub author: String,
    pub picture: Picture,
    /// The sole ordering key of the gallery
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl Image {
    /// Stamps a fresh id and creation time.
    pub fn new(title: String, author: String, picture: Picture) -> Self {
        Self {
            id: Uuid::now_v7(),
            title,
            author,
            picture,
            created_at: now(),
        }
    }
}

/// A remark attached to exactly one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: CommentId,
    #[serde(rename = "imageId")]
    pub image_id: ImageId,
    pub author: String,
    pub content: String,
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(image_id: ImageId, author: String, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            image_id,
            author,
            content,
            created_at: now(),
        }
    }
}
