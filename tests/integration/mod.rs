//! Integration tests for parti-forge
//!
//! These exercise the CLI end-to-end against throwaway git workspaces. They
//! stick to the dry-run and inspection paths so no Python toolchain or
//! release host is needed on the test machine.

mod helpers;

mod test_build;
mod test_doctor;
mod test_init;
mod test_publish;
mod test_run;
mod test_status;
