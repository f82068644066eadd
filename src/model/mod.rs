pub mod config;
pub mod format;
pub mod lost;
pub mod node;
