//! HTML rendering for the gallery page.
//!
//! Every user-supplied string goes through askama's HTML escaping.

use askama::Template;
use wg_core::models::{Comment, Image};

/// Everything the gallery page shows at one point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryView {
    /// `None` when nothing is selected or the gallery is empty
    pub image: Option<Image>,
    pub is_first_image: bool,
    pub is_last_image: bool,
    pub comments: Vec<Comment>,
    pub comment_page: u32,
    pub is_first_comments_page: bool,
    pub is_last_comments_page: bool,
}

#[derive(Template)]
#[template(path = "gallery.html")]
pub struct GalleryTemplate<'a> {
    pub image: Option<&'a Image>,
    pub is_first_image: bool,
    pub is_last_image: bool,
    pub comments: &'a [Comment],
    pub comment_page: u32,
    pub is_first_comments_page: bool,
    pub is_last_comments_page: bool,
}

impl<'a> From<&'a GalleryView> for GalleryTemplate<'a> {
    fn from(view: &'a GalleryView) -> Self {
        Self {
            image: view.image.as_ref(),
            is_first_image: view.is_first_image,
            is_last_image: view.is_last_image,
            comments: &view.comments,
            comment_page: view.comment_page,
            is_first_comments_page: view.is_first_comments_page,
            is_last_comments_page: view.is_last_comments_page,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub message: &'a str,
}

pub fn render_gallery(view: &GalleryView) -> Result<String, askama::Error> {
    GalleryTemplate::from(view).render()
}

/// The error banner, showing the raw error text.
pub fn render_error(message: &str) -> Result<String, askama::Error> {
    ErrorTemplate { message }.render()
}
