//! # TD Development Tools
//!
//! Command-line tools for development:
//! - Data validators
//! - Headless simulation runs

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod headless;
pub mod validate;

pub use error::ToolError;
