//! # touchline-core
//!
//! Core crate for Touchline. Contains the unified error system and the
//! configuration schemas shared by every other crate.
//!
//! This crate has **no** internal dependencies on other Touchline crates.

pub mod config;
pub mod error;
pub mod result;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
