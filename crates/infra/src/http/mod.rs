//! HTTP executor and pagination decoding

pub mod client;
pub mod pagination;

pub use client::{HttpClient, HttpClientBuilder};
