//! CLI command implementations.
//!
//! # Command Modules
//!
//! - [`permission`] - Evaluate a mode against a grant level
//! - [`replay`] - Feed recorded sample batches through the service

pub mod common;
pub mod permission;
pub mod replay;
