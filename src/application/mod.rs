//! # Application Layer
//!
//! The dispatch pipeline: session lifecycle, event normalization, command
//! routing, conversation state and reply emission.

pub mod ingest;
pub mod reply;
pub mod router;
pub mod session;
pub mod state;
