//! Client for the ApeWisdom mention-count API.

pub mod client;
pub mod error;
pub mod types;

pub use client::ApeWisdomClient;
pub use error::FetchError;
pub use types::parse_mentions;
