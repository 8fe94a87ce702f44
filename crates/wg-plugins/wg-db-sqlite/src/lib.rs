//! # wg-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `wg-core` domain models.
//!
//! Timestamps are stored as integer microseconds so that ordering in SQL is
//! exact. Every row also carries an autoincrement `seq` used as the secondary
//! sort key when two records share a timestamp.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use uuid::Uuid;
use wg_core::models::{Comment, CommentId, Image, ImageId, Picture};
use wg_core::traits::GalleryRepo;

const IMAGE_COLUMNS: &str =
    "id, title, author, picture_path, picture_mimetype, picture_size, picture_name, created_at";
const COMMENT_COLUMNS: &str = "id, image_id, author, content, created_at";

pub struct SqliteGalleryRepo {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    title: String,
    author: String,
    picture_path: String,
    picture_mimetype: String,
    picture_size: i64,
    picture_name: Option<String>,
    created_at: i64,
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    image_id: Uuid,
    author: String,
    content: String,
    created_at: i64,
}

// Helpers for timestamp conversion
fn to_micros(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_micros()
}

fn from_micros(micros: i64) -> anyhow::Result<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
        .with_context(|| format!("timestamp {} out of range", micros))
}

impl TryFrom<ImageRow> for Image {
    type Error = anyhow::Error;

    fn try_from(row: ImageRow) -> anyhow::Result<Self> {
        Ok(Image {
            id: row.id,
            title: row.title,
            author: row.author,
            picture: Picture {
                path: row.picture_path,
                mimetype: row.picture_mimetype,
                size: u64::try_from(row.picture_size)
                    .with_context(|| format!("negative picture size {}", row.picture_size))?,
                original_name: row.picture_name,
            },
            created_at: from_micros(row.created_at)?,
        })
    }
}

impl TryFrom<CommentRow> for Comment {
    type Error = anyhow::Error;

    fn try_from(row: CommentRow) -> anyhow::Result<Self> {
        Ok(Comment {
            id: row.id,
            image_id: row.image_id,
            author: row.author,
            content: row.content,
            created_at: from_micros(row.created_at)?,
        })
    }
}

impl SqliteGalleryRepo {
    /// Opens (or creates) the database at `url` and applies the schema.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        Self::connect(url, 5).await
    }

    /// Opens the database with an explicit pool size.
    ///
    /// # Developer Note
    /// An in-memory database lives only as long as its connection, and every
    /// pooled connection would get its own empty database. In-memory URLs
    /// therefore get exactly one connection that is never recycled.
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {}", url))?
            .create_if_missing(true)
            .foreign_keys(true);

        let in_memory = url.contains(":memory:") || url.contains("mode=memory");
        if !in_memory {
            if let Some(parent) = options.clone().get_filename().parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating database directory {}", parent.display()))?;
                }
            }
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options.connect_with(options).await?;
        let repo = Self { pool };
        repo.migrate().await?;
        Ok(repo)
    }

    /// A private, empty database. Used by tests.
    pub async fn in_memory() -> anyhow::Result<Self> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id BLOB NOT NULL UNIQUE,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                picture_path TEXT NOT NULL,
                picture_mimetype TEXT NOT NULL,
                picture_size INTEGER NOT NULL,
                picture_name TEXT,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id BLOB NOT NULL UNIQUE,
                image_id BLOB NOT NULL REFERENCES images(id),
                author TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_images_created ON images(created_at, seq)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_image ON comments(image_id, created_at, seq)")
            .execute(&self.pool)
            .await?;

        log::debug!("sqlite schema ready");
        Ok(())
    }
}

#[async_trait]
impl GalleryRepo for SqliteGalleryRepo {
    async fn insert_image(&self, image: &Image) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO images (id, title, author, picture_path, picture_mimetype, picture_size, picture_name, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)")
            .bind(image.id)
            .bind(&image.title)
            .bind(&image.author)
            .bind(&image.picture.path)
            .bind(&image.picture.mimetype)
            .bind(i64::try_from(image.picture.size)?)
            .bind(&image.picture.original_name)
            .bind(to_micros(image.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_image(&self, id: ImageId) -> anyhow::Result<Option<Image>> {
        let row = sqlx::query_as::<_, ImageRow>(&format!("SELECT {} FROM images WHERE id = ?", IMAGE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Image::try_from).transpose()
    }

    async fn list_images(&self) -> anyhow::Result<Vec<Image>> {
        sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {} FROM images ORDER BY created_at DESC, seq DESC",
            IMAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Image::try_from)
        .collect()
    }

    /// Deletes the image row and its comment rows atomically.
    ///
    /// # Developer Note
    /// Using a Transaction (tx) ensures we never end up with orphaned comments
    /// pointing at an image that no longer exists. The picture file lives
    /// outside the database and is the caller's to remove afterwards.
    async fn delete_image_cascade(&self, id: ImageId) -> anyhow::Result<Option<(Image, u64)>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ImageRow>(&format!("SELECT {} FROM images WHERE id = ?", IMAGE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        let image = match row {
            Some(row) => Image::try_from(row)?,
            None => return Ok(None),
        };

        // 1. Remove dependent comments
        let removed = sqlx::query("DELETE FROM comments WHERE image_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // 2. Remove the image itself
        sqlx::query("DELETE FROM images WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((image, removed)))
    }

    async fn insert_comment(&self, comment: &Comment) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO comments (id, image_id, author, content, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(comment.id)
            .bind(comment.image_id)
            .bind(&comment.author)
            .bind(&comment.content)
            .bind(to_micros(comment.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_comment(&self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(&format!("SELECT {} FROM comments WHERE id = ?", COMMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Comment::try_from).transpose()
    }

    async fn list_comments_paginated(&self, image_id: ImageId, limit: i64, offset: i64) -> anyhow::Result<Vec<Comment>> {
        sqlx::query_as::<_, CommentRow>(&format!(
            "SELECT {} FROM comments WHERE image_id = ? ORDER BY created_at DESC, seq DESC LIMIT ? OFFSET ?",
            COMMENT_COLUMNS
        ))
        .bind(image_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Comment::try_from)
        .collect()
    }

    async fn count_comments(&self, image_id: ImageId) -> anyhow::Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE image_id = ?")
            .bind(image_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count)?)
    }

    async fn delete_comment(&self, id: CommentId) -> anyhow::Result<Option<Comment>> {
        let Some(comment) = self.get_comment(id).await? else {
            return Ok(None);
        };

        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        // A concurrent delete may have won the race
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(comment))
    }
}
