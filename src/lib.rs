//! Bookshelf application library
//!
//! Books CRUD over SQLite and a stateless URL normalizer, packaged as
//! modules for the bookshelf kernel.

pub mod app;
pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
