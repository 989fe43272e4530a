//! # Domain Layer
//!
//! Core definitions, types, and traits that define the menu bot's business domain.
//! Independent of the chat platform, serving as the contract for other layers.

pub mod config;
pub mod errors;
pub mod traits;
pub mod types;
