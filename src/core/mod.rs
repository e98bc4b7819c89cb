//! Core building blocks for parti-forge
//!
//! - **config**: Forge configuration (forge.toml) parsing and validation
//! - **context**: Unified pipeline context for efficient data sharing across commands
//! - **error**: Comprehensive error types with contextual help messages
//! - **vcs**: Git operations abstraction (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
