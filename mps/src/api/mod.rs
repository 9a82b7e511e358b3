//! Typed client for the MPS API (version 2019-06-12)

pub mod client;
pub mod common;
pub mod error;
pub mod pool;
pub mod schedules;
pub mod signer;
pub mod stream_link;
pub mod tasks;
pub mod templates;

pub use client::{Client, ClientConfig};
pub use error::ApiError;
pub use signer::Credential;
