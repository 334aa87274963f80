//! External service integrations

pub mod shopify;
