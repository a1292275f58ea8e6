pub mod api;
pub mod attachment;
pub mod catalog_sync;
pub mod database_sqlx;
pub mod error;
pub mod extraction;
pub mod models;
pub mod persistence;
pub mod pipeline;
pub mod utils;

pub use error::{IngestError, Result};
