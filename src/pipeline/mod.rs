//! Pipeline engine for parti-forge
//!
//! - **plan**: Build plans (ordered steps, dry-run rendering, content-hashed IDs)
//! - **builder**: Per-platform build jobs (fetch, install, generate, package, upload)
//! - **artifact**: Write-once artifact store shared between stages
//! - **publisher**: Barrier-gated release creation
//! - **graph**: Job dependency graph and stage derivation
//! - **run**: Run records and the per-run state machine

pub mod artifact;
pub mod builder;
pub mod graph;
pub mod plan;
pub mod publisher;
pub mod run;
