//! Multipart parsing for image uploads.
//!
//! Expected fields: `title`, `author` (text) and `picture` (file).

use actix_multipart::{Field, Multipart};
use futures_util::TryStreamExt;
use mime::Mime;
use wg_core::AppError;

/// Upper bound for a single text field.
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// A fully read and validated upload.
#[derive(Debug)]
pub struct ImageForm {
    pub title: String,
    pub author: String,
    pub picture: Vec<u8>,
    pub mimetype: String,
    pub original_name: Option<String>,
}

fn invalid(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

/// Reads a field into memory, failing once it grows past `limit` bytes.
async fn read_field(field: &mut Field, limit: usize, what: &str) -> Result<Vec<u8>, AppError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| invalid(format!("Failed to read {}: {}", what, e)))?
    {
        if buf.len() + chunk.len() > limit {
            return Err(invalid(format!("{} exceeds the {} byte limit", what, limit)));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_text(field: &mut Field, name: &str) -> Result<String, AppError> {
    let raw = read_field(field, MAX_TEXT_BYTES, name).await?;
    String::from_utf8(raw).map_err(|_| invalid(format!("{} must be valid UTF-8", name)))
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(invalid(format!("Missing required field: {}", name))),
    }
}

/// Works out the picture's MIME type.
///
/// The declared part type wins unless it is missing or the generic
/// `application/octet-stream`; then the filename extension is tried, and
/// finally the leading bytes are sniffed.
pub fn resolve_mimetype(declared: Option<&Mime>, file_name: Option<&str>, data: &[u8]) -> Option<String> {
    if let Some(declared) = declared {
        if *declared != mime::APPLICATION_OCTET_STREAM {
            return Some(declared.essence_str().to_string());
        }
    }
    if let Some(guessed) = file_name.and_then(|name| mime_guess::from_path(name).first()) {
        if guessed.type_() == mime::IMAGE {
            return Some(guessed.essence_str().to_string());
        }
    }
    image::guess_format(data)
        .ok()
        .map(|format| format.to_mime_type().to_string())
}

/// Drains the multipart stream into an [`ImageForm`].
pub async fn read_image_form(mut payload: Multipart, max_upload_bytes: usize) -> Result<ImageForm, AppError> {
    let mut title = None;
    let mut author = None;
    let mut picture: Option<(Vec<u8>, Option<Mime>, Option<String>)> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| invalid(format!("Failed to process multipart: {}", e)))?
    {
        let disposition = field.content_disposition().clone();
        match disposition.get_name().unwrap_or_default() {
            "title" => title = Some(read_text(&mut field, "title").await?),
            "author" => author = Some(read_text(&mut field, "author").await?),
            "picture" => {
                let declared = field.content_type().cloned();
                let data = read_field(&mut field, max_upload_bytes, "picture").await?;
                picture = Some((data, declared, disposition.get_filename().map(str::to_owned)));
            }
            other => {
                log::debug!("ignoring unexpected multipart field {:?}", other);
                read_field(&mut field, max_upload_bytes, "field").await?;
            }
        }
    }

    let title = required(title, "title")?;
    let author = required(author, "author")?;
    let (data, declared, original_name) = picture.ok_or_else(|| invalid("Missing required field: picture"))?;
    if data.is_empty() {
        return Err(invalid("Uploaded picture is empty"));
    }

    let mimetype = resolve_mimetype(declared.as_ref(), original_name.as_deref(), &data)
        .filter(|m| m.starts_with("image/"))
        .ok_or_else(|| invalid("Uploaded picture is not an image"))?;

    Ok(ImageForm {
        title,
        author,
        picture: data,
        mimetype,
        original_name,
    })
}
