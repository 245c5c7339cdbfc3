//! HTTP implementation of the FSC [`StorageClient`] trait.
//!
//! Talks JSON to a share-based storage endpoint. Credentials (shared key or
//! SAS token) are attached as default headers by the builder; the core
//! console never sees them.

mod client;

pub use client::{FscClient, FscClientBuilder};

pub use fsc_sdk::StorageClient;
