//! # bikeshare
//!
//! The terminal side of Bikeshare: CLI parsing, configuration, prompts and
//! text rendering over the `bikeshare-core` pipeline.

pub mod cli;
pub mod config;
pub mod prompt;
pub mod render;
