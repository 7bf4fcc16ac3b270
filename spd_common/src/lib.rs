//! Speed-loop common library
//!
//! This crate provides the shared types, constants and configuration
//! loading utilities for all speed-loop workspace crates.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Reference scenario constants
//! - [`control`] - Continuous tuning and discrete coefficient types
//! - [`encoder`] - Encoder geometry and unit conversions
//! - [`registers`] - Peripheral register map and bit reinterpretation
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use spd_common::prelude::*;
//!
//! let tuning = PidTuning::default();
//! assert!(tuning.validate().is_ok());
//! ```

pub mod config;
pub mod consts;
pub mod control;
pub mod encoder;
pub mod prelude;
pub mod registers;
