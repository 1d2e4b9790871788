//! todosearch_client - CLI client for the todosearch search endpoint.

pub mod cli;
pub mod client;
pub mod error;
pub mod output;

pub use client::SearchClient;
pub use error::{ClientError, Result};
