//! Gets or provisions an Azure ML compute cluster ahead of a pipeline job

pub mod args;
mod libs;

pub use libs::providers::{ComputeProvider, Resolution};
pub use libs::Provisioner;

// these are only for tests
#[cfg(feature = "test-utilities")]
pub use libs::providers::dry_run::DryRun;
