//! Networking layer for the shell.
//!
//! This crate handles:
//! - The HTTPS client used for the OAuth token exchange
//! - The `TokenTransport` seam the OAuth bridge posts through

pub mod client;
pub mod transport;

pub use client::{ClientConfig, ClientError, HttpClient};
pub use transport::{TokenTransport, TransportResponse};
