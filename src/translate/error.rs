use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("GOOGLE_API_KEY is not set")]
    MissingApiKey,

    #[error("Translator request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Translator API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Translator returned no text")]
    EmptyResponse,

    #[error("Could not decode translator response: {0}")]
    Decode(#[from] serde_json::Error),
}
