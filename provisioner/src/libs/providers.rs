//! Abstracts the ways compute clusters can be resolved and created
//!
//! The real provider talks to the Azure control plane; the dry run provider
//! fakes it in memory for tests and `--dry_run` invocations.

use async_trait::async_trait;
use azureml::models::{ComputeResource, ComputeSpec};
use azureml::Error;

pub mod dry_run;
pub mod rest;

pub use dry_run::DryRun;
pub use rest::Rest;

/// The outcome of resolving a compute cluster by name
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A compute cluster with this name already exists
    Found(ComputeResource),
    /// The control plane definitively reported no cluster with this name
    Missing,
}

/// The methods required to act as a compute provider
#[async_trait]
pub trait ComputeProvider {
    /// Resolve a compute cluster by name
    ///
    /// Only a definitive not found maps to [`Resolution::Missing`]; transient
    /// failures must surface as errors so they are never mistaken for an
    /// absent cluster.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the cluster to resolve
    async fn resolve(&mut self, name: &str) -> Result<Resolution, Error>;

    /// Create a compute cluster and wait until it is ready
    ///
    /// # Arguments
    ///
    /// * `spec` - The spec to build the cluster from
    async fn create(&mut self, spec: &ComputeSpec) -> Result<ComputeResource, Error>;
}
