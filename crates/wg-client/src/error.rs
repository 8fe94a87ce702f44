use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Any non-200 answer; shown to the user verbatim.
    #[error("[{status}]{body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Client state unavailable: {0}")]
    State(String),

    #[error("No image selected")]
    NoImageSelected,

    #[error("Render failed: {0}")]
    Render(#[from] askama::Error),
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::State(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::State(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
