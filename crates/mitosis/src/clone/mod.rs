//! The cloning algorithm and its configuration.

mod cloner;
mod config;

pub use cloner::Cloner;
pub use config::{CloneOptions, KeyConfig};
