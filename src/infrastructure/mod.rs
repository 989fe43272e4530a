//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatTransport).

pub mod matrix;

#[cfg(test)]
pub mod fake;
