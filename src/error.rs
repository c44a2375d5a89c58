use thiserror::Error;

#[derive(Error, Debug)]
pub enum Rc4Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key: key must contain at least one byte")]
    InvalidKey,

    #[error("Invalid hex key: {0}")]
    InvalidKeyHex(String),

    #[error("Invalid box size: {0}. Must be at least 1")]
    InvalidBoxSize(usize),

    #[error("Box size {0} exceeds the byte range. Encryption requires a box size of at most 256")]
    BoxSizeExceedsByte(usize),

    #[error("Unsupported test: {0}")]
    UnsupportedTest(String),
}

pub type Result<T> = std::result::Result<T, Rc4Error>;
