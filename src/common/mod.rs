//! Shared types, traits and error handling

pub mod errors;
pub mod retry;
pub mod traits;
pub mod types;
