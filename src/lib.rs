//! Browse selective search region proposals interactively.
//!
//! The proposal stage lives in [`selective_search`]; [`browser`] holds the
//! keyboard-driven view over its output.

pub mod browser;
mod colors;
pub mod error;
pub mod image_input;
pub mod pipeline;
pub mod region;
pub mod selective_search;

pub use error::{Error, Result};
