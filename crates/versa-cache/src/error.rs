//! Cache error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection failed: {reason}")]
    Connection { reason: String },

    #[error("cache operation failed: {reason}")]
    Backend { reason: String },

    #[error("cached value is not a counter: {value}")]
    NotACounter { value: String },
}

pub type CacheResult<T> = Result<T, CacheError>;
