//! # wg-api Handlers
//!
//! This module coordinates the flow between HTTP requests and Core traits.

use crate::error::ApiResult;
use crate::upload;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wg_core::models::{Comment, Image, Picture};
use wg_core::traits::{GalleryRepo, MediaStore};
use wg_core::{AppError, CommentPage, Timeline};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repo: Box<dyn GalleryRepo>,
    pub store: Box<dyn MediaStore>,
    /// Largest accepted picture, in bytes
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub image_id: String,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OldestStatus {
    pub is_oldest_image: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestStatus {
    pub is_latest_image: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPageStatus {
    pub is_last_page: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

fn image_missing(raw: &str) -> AppError {
    AppError::NotFound(format!("Image id #{} does not exist", raw))
}

/// Loads every image, newest first, for navigation queries.
async fn load_timeline(data: &AppState) -> ApiResult<Vec<Image>> {
    Ok(data.repo.list_images().await?)
}

pub async fn health_check() -> web::Json<HealthResponse> {
    web::Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Stores the uploaded picture, then the image record.
pub async fn create_image(data: web::Data<AppState>, payload: Multipart) -> ApiResult<web::Json<Image>> {
    // 1. Parse and validate the form
    let form = upload::read_image_form(payload, data.max_upload_bytes).await?;
    let size = form.picture.len() as u64;

    // 2. Media: persist the file
    let path = data.store.save_upload(form.picture, &form.mimetype).await?;

    // 3. Persistence: save the record, dropping the file again if that fails
    let image = Image::new(
        form.title,
        form.author,
        Picture {
            path,
            mimetype: form.mimetype,
            size,
            original_name: form.original_name,
        },
    );
    if let Err(err) = data.repo.insert_image(&image).await {
        if let Err(cleanup) = data.store.remove(&image.picture.path).await {
            log::warn!("orphaned upload {}: {:#}", image.picture.path, cleanup);
        }
        return Err(err.into());
    }

    log::info!("created image {} ({:?} by {:?})", image.id, image.title, image.author);
    Ok(web::Json(image))
}

/// Every image, newest first.
pub async fn list_images(data: web::Data<AppState>) -> ApiResult<web::Json<Vec<Image>>> {
    Ok(web::Json(load_timeline(&data).await?))
}

pub async fn get_image(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<Image>> {
    let raw = path.into_inner();
    let id = parse_id(&raw).ok_or_else(|| image_missing(&raw))?;
    let image = data.repo.get_image(id).await?.ok_or_else(|| image_missing(&raw))?;
    Ok(web::Json(image))
}

/// Streams the stored picture with its recorded MIME type.
pub async fn get_picture(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let missing = || AppError::NotFound(format!("Image:{} does not exist", raw));

    let id = parse_id(&raw).ok_or_else(missing)?;
    let image = data.repo.get_image(id).await?.ok_or_else(missing)?;
    let stream = data.store.open(&image.picture.path).await?;

    Ok(HttpResponse::Ok()
        .content_type(image.picture.mimetype.as_str())
        .streaming(stream))
}

pub async fn is_oldest(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<OldestStatus>> {
    let images = load_timeline(&data).await?;
    let timeline = Timeline::new(&images);
    let is_oldest_image = parse_id(&path).is_some_and(|id| timeline.is_oldest(id));
    Ok(web::Json(OldestStatus { is_oldest_image }))
}

pub async fn is_latest(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<LatestStatus>> {
    let images = load_timeline(&data).await?;
    let timeline = Timeline::new(&images);
    let is_latest_image = parse_id(&path).is_some_and(|id| timeline.is_latest(id));
    Ok(web::Json(LatestStatus { is_latest_image }))
}

/// The image created directly after this one.
pub async fn previous_image(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<Image>> {
    let raw = path.into_inner();
    let id = parse_id(&raw).ok_or_else(|| image_missing(&raw))?;
    let images = load_timeline(&data).await?;
    let previous = Timeline::new(&images).previous(id)?;
    Ok(web::Json(previous.clone()))
}

/// The image created directly before this one.
pub async fn next_image(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<Image>> {
    let raw = path.into_inner();
    let id = parse_id(&raw).ok_or_else(|| image_missing(&raw))?;
    let images = load_timeline(&data).await?;
    let next = Timeline::new(&images).next(id)?;
    Ok(web::Json(next.clone()))
}

/// Removes the image and its comments, then its stored file.
///
/// # Developer Note
/// The records go in one transaction. The file is removed afterwards on a
/// best-effort basis: a leftover file is logged, never a half-deleted record.
pub async fn delete_image(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<Image>> {
    let raw = path.into_inner();
    let missing = || AppError::NotFound(format!("Image id #{} does not exists", raw));

    let id = parse_id(&raw).ok_or_else(missing)?;
    let (image, comments_removed) = data.repo.delete_image_cascade(id).await?.ok_or_else(missing)?;

    if let Err(err) = data.store.remove(&image.picture.path).await {
        log::warn!("image {} deleted but its file {} remains: {:#}", image.id, image.picture.path, err);
    }

    log::info!("deleted image {} with {} comment(s)", image.id, comments_removed);
    Ok(web::Json(image))
}

/// Attaches a comment to an existing image.
pub async fn create_comment(
    data: web::Data<AppState>,
    body: web::Json<NewCommentRequest>,
) -> ApiResult<web::Json<Comment>> {
    let req = body.into_inner();
    let missing = || AppError::NotFound(format!("Image with ID:{} does not exist", req.image_id));

    let image_id = parse_id(&req.image_id).ok_or_else(missing)?;
    if data.repo.get_image(image_id).await?.is_none() {
        return Err(missing().into());
    }

    let author = req.author.trim();
    let content = req.content.trim();
    if author.is_empty() || content.is_empty() {
        return Err(AppError::Validation("Comment author and content are required".into()).into());
    }

    let comment = Comment::new(image_id, author.to_string(), content.to_string());
    data.repo.insert_comment(&comment).await?;
    Ok(web::Json(comment))
}

pub async fn delete_comment(data: web::Data<AppState>, path: web::Path<String>) -> ApiResult<web::Json<Comment>> {
    let raw = path.into_inner();
    let missing = || AppError::NotFound(format!("Comment id #{} does not exists", raw));

    let id = parse_id(&raw).ok_or_else(missing)?;
    let comment = data.repo.delete_comment(id).await?.ok_or_else(missing)?;
    Ok(web::Json(comment))
}

/// One page of an image's comments, newest first.
/// An unknown image simply has no comments.
pub async fn comments_page(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<Vec<Comment>>> {
    let (image_id, page) = path.into_inner();
    let page = CommentPage::parse(&page)?;

    let comments = match parse_id(&image_id) {
        // offset is at most u32::MAX * 10, well inside i64
        Some(id) => {
            data.repo
                .list_comments_paginated(id, page.limit() as i64, page.offset() as i64)
                .await?
        }
        None => Vec::new(),
    };
    Ok(web::Json(comments))
}

pub async fn is_last_page(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<LastPageStatus>> {
    let (image_id, page) = path.into_inner();
    let page = CommentPage::parse(&page)?;

    // Always a fresh count: comments may have been added since the last page view
    let total = match parse_id(&image_id) {
        Some(id) => data.repo.count_comments(id).await?,
        None => 0,
    };
    Ok(web::Json(LastPageStatus {
        is_last_page: page.is_last(total),
    }))
}
