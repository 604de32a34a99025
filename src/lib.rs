//! Ghiblify - converts uploaded photos into Studio Ghibli-style artwork
//!
//! This library resizes an input photo, stages it in S3-compatible object
//! storage, waits for the staged copy to become publicly fetchable, then asks
//! a remote image-generation endpoint to reimagine it and returns the result
//! URLs.

pub mod app;
pub mod cdn;
pub mod convert;
pub mod error;
pub mod image;
pub mod models;
pub mod progress;

pub use error::{Error, Result};
