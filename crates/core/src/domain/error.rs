// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image encode failed: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
