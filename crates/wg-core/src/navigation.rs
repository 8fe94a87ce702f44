//! # Navigation
//!
//! Resolves an image's position in the gallery. The canonical sequence is
//! newest first: the gallery's first image is the latest one and its last
//! image is the oldest.
//!
//! Moving to the *previous* image steps toward the front of the sequence
//! (a newer image, index `i - 1`); moving to the *next* image steps toward
//! the back (an older image, index `i + 1`).

use crate::error::AppError;
use crate::models::{Image, ImageId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("No previous image")]
    NoPrevious,

    #[error("No next image")]
    NoNext,

    #[error("Image id #{0} does not exist")]
    UnknownImage(ImageId),
}

impl From<NavigationError> for AppError {
    fn from(err: NavigationError) -> Self {
        AppError::NotFound(err.to_string())
    }
}

/// A view over every image, ordered newest first.
///
/// Ties on `created_at` must already be broken by the caller (the record
/// store orders by insertion sequence as a secondary key).
#[derive(Debug, Clone, Copy)]
pub struct Timeline<'a> {
    images: &'a [Image],
}

impl<'a> Timeline<'a> {
    pub fn new(images: &'a [Image]) -> Self {
        debug_assert!(
            images.windows(2).all(|w| w[0].created_at >= w[1].created_at),
            "timeline must be ordered newest first"
        );
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn latest(&self) -> Option<&'a Image> {
        self.images.first()
    }

    pub fn oldest(&self) -> Option<&'a Image> {
        self.images.last()
    }

    /// False for an empty gallery.
    pub fn is_latest(&self, id: ImageId) -> bool {
        self.latest().is_some_and(|image| image.id == id)
    }

    /// False for an empty gallery.
    pub fn is_oldest(&self, id: ImageId) -> bool {
        self.oldest().is_some_and(|image| image.id == id)
    }

    fn position(&self, id: ImageId) -> Result<usize, NavigationError> {
        self.images
            .iter()
            .position(|image| image.id == id)
            .ok_or(NavigationError::UnknownImage(id))
    }

    /// The image created directly after `id`.
    pub fn previous(&self, id: ImageId) -> Result<&'a Image, NavigationError> {
        match self.position(id)? {
            0 => Err(NavigationError::NoPrevious),
            i => Ok(&self.images[i - 1]),
        }
    }

    /// The image created directly before `id`.
    pub fn next(&self, id: ImageId) -> Result<&'a Image, NavigationError> {
        let i = self.position(id)?;
        self.images.get(i + 1).ok_or(NavigationError::NoNext)
    }
}
