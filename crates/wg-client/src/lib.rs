//! # wg-client
//!
//! The gallery's client side: navigation state that survives restarts, a
//! typed client for the HTTP API and the controller tying both to the view.

pub mod api;
pub mod error;
pub mod gallery;
pub mod state;

pub use api::{GalleryApi, HttpGalleryApi, NewImage};
pub use error::{ClientError, ClientResult};
pub use gallery::Gallery;
pub use state::{ClientState, FileStateStore, MemoryStateStore, StateStore};
pub use wg_ui::GalleryView;
