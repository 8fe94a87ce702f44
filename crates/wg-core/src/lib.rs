//! webgallery/crates/wg-core/src/lib.rs
//!
//! The central domain logic and interface definitions for WebGallery.

pub mod error;
pub mod models;
pub mod navigation;
pub mod pagination;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use navigation::{NavigationError, Timeline};
pub use pagination::{CommentPage, COMMENTS_PER_PAGE};
pub use traits::*;
