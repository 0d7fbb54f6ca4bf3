//! Utility functions

pub mod crypto;
pub mod text;

pub use crypto::hash_files;
pub use text::{round_to, truncate_chars};
