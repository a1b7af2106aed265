//! Core domain + application logic for the Xiaohongshu copywriting bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and Gemini live
//! behind ports (traits) implemented in adapter crates.

pub mod commands;
pub mod config;
pub mod delivery;
pub mod domain;
pub mod errors;
pub mod generation;
pub mod history;
pub mod i18n;
pub mod ingest;
pub mod logging;
pub mod messaging;
pub mod prompts;
pub mod router;
pub mod session;
pub mod utils;

#[cfg(test)]
mod testing;

pub use errors::{Error, Result};
