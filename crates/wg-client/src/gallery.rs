//! The client-side gallery controller.
//!
//! Every action reads the persisted state, talks to the API and writes the
//! state back, so a restarted client resumes where it stopped.

use crate::api::{GalleryApi, NewImage};
use crate::error::{ClientError, ClientResult};
use crate::state::{ClientState, StateStore};
use wg_core::models::{Comment, CommentId, Image, ImageId};
use wg_core::CommentPage;
use wg_ui::GalleryView;

pub struct Gallery<A, S> {
    api: A,
    store: S,
}

impl<A: GalleryApi, S: StateStore> Gallery<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self { api, store }
    }

    pub fn state(&self) -> ClientResult<ClientState> {
        self.store.load()
    }

    fn update<F: FnOnce(&mut ClientState)>(&self, change: F) -> ClientResult<ClientState> {
        let mut state = self.store.load()?;
        change(&mut state);
        self.store.save(&state)?;
        Ok(state)
    }

    fn current_id(&self) -> ClientResult<ImageId> {
        self.store.load()?.curr_image_id.ok_or(ClientError::NoImageSelected)
    }

    pub async fn current_image(&self) -> ClientResult<Option<Image>> {
        match self.store.load()?.curr_image_id {
            Some(id) => Ok(Some(self.api.get_image(id).await?)),
            None => Ok(None),
        }
    }

    /// Whether the current image is the newest one.
    pub async fn is_first_image(&self) -> ClientResult<bool> {
        match self.store.load()?.curr_image_id {
            Some(id) => self.api.is_latest(id).await,
            None => Ok(false),
        }
    }

    /// Whether the current image is the oldest one.
    pub async fn is_last_image(&self) -> ClientResult<bool> {
        match self.store.load()?.curr_image_id {
            Some(id) => self.api.is_oldest(id).await,
            None => Ok(false),
        }
    }

    pub fn select_image(&self, id: Option<ImageId>) -> ClientResult<()> {
        self.update(|state| state.select(id))?;
        Ok(())
    }

    /// Moves one image towards the newest.
    pub async fn previous_image(&self) -> ClientResult<Image> {
        let image = self.api.previous_image(self.current_id()?).await?;
        self.select_image(Some(image.id))?;
        Ok(image)
    }

    /// Moves one image towards the oldest.
    pub async fn next_image(&self) -> ClientResult<Image> {
        let image = self.api.next_image(self.current_id()?).await?;
        self.select_image(Some(image.id))?;
        Ok(image)
    }

    /// Uploads a picture and makes it the current image.
    pub async fn add_image(&self, upload: NewImage) -> ClientResult<Image> {
        let image = self.api.create_image(upload).await?;
        self.select_image(Some(image.id))?;
        Ok(image)
    }

    /// Deletes the current image after moving the selection off it.
    ///
    /// The only image leaves nothing selected; the newest image hands over to
    /// the one after it; any other image hands over to the one before it.
    pub async fn delete_image(&self) -> ClientResult<Image> {
        let id = self.current_id()?;
        let is_first = self.is_first_image().await?;
        let is_last = self.is_last_image().await?;

        match (is_first, is_last) {
            (true, true) => self.select_image(None)?,
            (true, false) => {
                self.next_image().await?;
            }
            (false, _) => {
                self.previous_image().await?;
            }
        }

        let deleted = self.api.delete_image(id).await?;
        log::info!("deleted image {}", deleted.id);
        Ok(deleted)
    }

    /// Comments on the current image.
    pub async fn add_comment(&self, author: String, content: String) -> ClientResult<Comment> {
        let id = self.current_id()?;
        self.api.create_comment(id, author, content).await
    }

    pub async fn delete_comment(&self, id: CommentId) -> ClientResult<Comment> {
        self.api.delete_comment(id).await
    }

    /// The current page of the current image's comments.
    pub async fn comments_page(&self) -> ClientResult<Vec<Comment>> {
        let state = self.store.load()?;
        match state.curr_image_id {
            Some(id) => self.api.comments_page(id, state.curr_comment_page).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn next_comments_page(&self) -> ClientResult<Vec<Comment>> {
        self.update(|state| {
            state.curr_comment_page = CommentPage::new(state.curr_comment_page).next().number();
        })?;
        self.comments_page().await
    }

    /// Never goes below the first page.
    pub async fn previous_comments_page(&self) -> ClientResult<Vec<Comment>> {
        self.update(|state| {
            state.curr_comment_page = CommentPage::new(state.curr_comment_page).previous().number();
        })?;
        self.comments_page().await
    }

    pub fn is_first_comments_page(&self) -> ClientResult<bool> {
        Ok(CommentPage::new(self.store.load()?.curr_comment_page).is_first())
    }

    /// Asks the server, which recounts the comments every time.
    pub async fn is_last_comments_page(&self) -> ClientResult<bool> {
        let state = self.store.load()?;
        match state.curr_image_id {
            Some(id) => self.api.is_last_page(id, state.curr_comment_page).await,
            None => Ok(true),
        }
    }

    /// Collects everything the page shows for the current state.
    pub async fn view(&self) -> ClientResult<GalleryView> {
        let image = match self.current_image().await? {
            Some(image) => image,
            None => return Ok(GalleryView::default()),
        };

        Ok(GalleryView {
            is_first_image: self.is_first_image().await?,
            is_last_image: self.is_last_image().await?,
            comments: self.comments_page().await?,
            comment_page: self.store.load()?.curr_comment_page,
            is_first_comments_page: self.is_first_comments_page()?,
            is_last_comments_page: self.is_last_comments_page().await?,
            image: Some(image),
        })
    }

    /// The page as HTML, or the error banner when any call fails.
    pub async fn render(&self) -> ClientResult<String> {
        match self.view().await {
            Ok(view) => Ok(wg_ui::render_gallery(&view)?),
            Err(err) => {
                log::error!("[error] {}", err);
                Ok(wg_ui::render_error(&err.to_string())?)
            }
        }
    }
}
