//! VERSA Core — domain models, error taxonomy, and store query
//! contracts shared by every crate in the workspace.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{CoreError, CoreResult};
