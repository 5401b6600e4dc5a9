mod client;
mod error;

pub use client::{ApiClient, RequestOptions};
pub use error::ApiError;
