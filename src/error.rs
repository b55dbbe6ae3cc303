use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vision API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Cannot read image {path}: {reason}")]
    ImageAccess { path: String, reason: String },

    #[error("Unsupported image type: {0}")]
    UnsupportedImage(String),

    #[error("Could not read receipt data from the response: {0}")]
    ParseResponse(String),

    #[error("No items found on the receipt")]
    EmptyExtraction,

    #[error("No vision API key configured (set TALLY_API_KEY or run `tally config set-api --key`)")]
    MissingApiKey,

    #[error("Stored value under '{key}' is not valid: {reason}")]
    CorruptValue { key: String, reason: String },

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown transaction: {0}")]
    UnknownTransaction(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
