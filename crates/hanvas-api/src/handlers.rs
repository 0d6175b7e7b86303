//! API handlers.

pub mod health;
pub mod posts;

pub use health::health;
