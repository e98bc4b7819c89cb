//! CLI commands for parti-forge
//!
//! This module contains all user-facing command implementations:
//!
//! ## Setup & Inspection
//! - **init**: Create a starter forge.toml in the current repository
//! - **doctor**: Run health checks and validation
//! - **status**: Show artifact and run status for the current commit
//!
//! ## Pipeline
//! - **build**: Build the binary for one platform target
//! - **run**: Full pipeline run (parallel builds, barrier, publish)
//! - **publish**: Create a release from the artifacts in the store
//!
//! All pipeline commands accept `&PipelineContext` to avoid redundant
//! config/git loads.

pub mod build;
pub mod doctor;
pub mod init;
pub mod publish;
pub mod run;
pub mod status;

pub use build::run_build;
pub use doctor::run_doctor;
pub use init::run_init;
pub use publish::run_publish;
pub use run::run_pipeline;
pub use status::run_status;
