//! Typed access to the gallery's HTTP API.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wg_core::models::{Comment, CommentId, Image, ImageId};

/// A picture about to be uploaded.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub title: String,
    pub author: String,
    pub file_name: String,
    /// Left to the server to work out when `None`
    pub mimetype: Option<String>,
    pub data: Vec<u8>,
}

/// One call per gallery endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GalleryApi: Send + Sync {
    async fn list_images(&self) -> ClientResult<Vec<Image>>;
    async fn get_image(&self, id: ImageId) -> ClientResult<Image>;
    async fn get_picture(&self, id: ImageId) -> ClientResult<Bytes>;
    async fn is_oldest(&self, id: ImageId) -> ClientResult<bool>;
    async fn is_latest(&self, id: ImageId) -> ClientResult<bool>;
    async fn previous_image(&self, id: ImageId) -> ClientResult<Image>;
    async fn next_image(&self, id: ImageId) -> ClientResult<Image>;
    async fn create_image(&self, upload: NewImage) -> ClientResult<Image>;
    async fn delete_image(&self, id: ImageId) -> ClientResult<Image>;
    async fn create_comment(&self, image_id: ImageId, author: String, content: String) -> ClientResult<Comment>;
    async fn delete_comment(&self, id: CommentId) -> ClientResult<Comment>;
    async fn comments_page(&self, image_id: ImageId, page: u32) -> ClientResult<Vec<Comment>>;
    async fn is_last_page(&self, image_id: ImageId, page: u32) -> ClientResult<bool>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewComment {
    image_id: ImageId,
    author: String,
    content: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OldestStatus {
    is_oldest_image: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LatestStatus {
    is_latest_image: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LastPageStatus {
    is_last_page: bool,
}

/// [`GalleryApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGalleryApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGalleryApi {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self.client.get(self.url(path)).send().await?;
        decode(resp).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let resp = self.client.delete(self.url(path)).send().await?;
        decode(resp).await
    }
}

/// Anything but a 200 becomes [`ClientError::Api`] carrying the raw body.
async fn ensure_ok(resp: Response) -> ClientResult<Response> {
    let status = resp.status();
    if status == StatusCode::OK {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    log::debug!("gallery api answered {}: {}", status, body);
    Err(ClientError::Api {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> ClientResult<T> {
    Ok(ensure_ok(resp).await?.json().await?)
}

#[async_trait]
impl GalleryApi for HttpGalleryApi {
    async fn list_images(&self) -> ClientResult<Vec<Image>> {
        self.get("/images/").await
    }

    async fn get_image(&self, id: ImageId) -> ClientResult<Image> {
        self.get(&format!("/images/{}/", id)).await
    }

    async fn get_picture(&self, id: ImageId) -> ClientResult<Bytes> {
        let resp = self.client.get(self.url(&format!("/images/{}/picture/", id))).send().await?;
        Ok(ensure_ok(resp).await?.bytes().await?)
    }

    async fn is_oldest(&self, id: ImageId) -> ClientResult<bool> {
        let status: OldestStatus = self.get(&format!("/images/{}/status/isOldest/", id)).await?;
        Ok(status.is_oldest_image)
    }

    async fn is_latest(&self, id: ImageId) -> ClientResult<bool> {
        let status: LatestStatus = self.get(&format!("/images/{}/status/isLatest/", id)).await?;
        Ok(status.is_latest_image)
    }

    async fn previous_image(&self, id: ImageId) -> ClientResult<Image> {
        self.get(&format!("/images/{}/previous", id)).await
    }

    async fn next_image(&self, id: ImageId) -> ClientResult<Image> {
        self.get(&format!("/images/{}/next", id)).await
    }

    async fn create_image(&self, upload: NewImage) -> ClientResult<Image> {
        let mut picture = Part::bytes(upload.data).file_name(upload.file_name);
        if let Some(mimetype) = upload.mimetype.as_deref() {
            picture = picture.mime_str(mimetype)?;
        }
        let form = Form::new()
            .text("title", upload.title)
            .text("author", upload.author)
            .part("picture", picture);

        let resp = self.client.post(self.url("/images/")).multipart(form).send().await?;
        decode(resp).await
    }

    async fn delete_image(&self, id: ImageId) -> ClientResult<Image> {
        self.delete(&format!("/images/{}/", id)).await
    }

    async fn create_comment(&self, image_id: ImageId, author: String, content: String) -> ClientResult<Comment> {
        let body = NewComment {
            image_id,
            author,
            content,
        };
        let resp = self.client.post(self.url("/comments/")).json(&body).send().await?;
        decode(resp).await
    }

    async fn delete_comment(&self, id: CommentId) -> ClientResult<Comment> {
        self.delete(&format!("/comments/{}/", id)).await
    }

    async fn comments_page(&self, image_id: ImageId, page: u32) -> ClientResult<Vec<Comment>> {
        self.get(&format!("/comments/{}/{}/", image_id, page)).await
    }

    async fn is_last_page(&self, image_id: ImageId, page: u32) -> ClientResult<bool> {
        let status: LastPageStatus = self.get(&format!("/comments/{}/{}/isLastPage/", image_id, page)).await?;
        Ok(status.is_last_page)
    }
}
