//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.
//! Every variant renders to a single human-readable message suitable for
//! showing directly to the user.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("File size too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Failed to upload image: {0}")]
    Staging(String),

    #[error("Uploaded image did not become available after {attempts} checks")]
    AvailabilityTimeout { attempts: usize },

    #[error("Conversion service rate limited: {0}")]
    RateLimited(String),

    #[error("Failed to convert image: {0}")]
    Conversion(String),

    #[error("Invalid response from conversion service: {0}")]
    InvalidResponse(String),

    #[error("A conversion is already in progress")]
    Busy,

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
