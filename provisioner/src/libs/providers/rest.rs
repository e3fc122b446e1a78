//! The compute provider backed by the Azure control plane

use async_trait::async_trait;
use azureml::models::{ComputeResource, ComputeSpec};
use azureml::{AzureMl, Error};

use super::{ComputeProvider, Resolution};

/// A compute provider that talks to the Azure control plane
pub struct Rest {
    /// The client to send requests with
    client: AzureMl,
}

impl Rest {
    /// Create a new rest backed compute provider
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send requests with
    #[must_use]
    pub fn new(client: AzureMl) -> Self {
        Rest { client }
    }
}

#[async_trait]
impl ComputeProvider for Rest {
    /// Resolve a compute cluster by name
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the cluster to resolve
    async fn resolve(&mut self, name: &str) -> Result<Resolution, Error> {
        match self.client.computes.get(name).await {
            Ok(found) => Ok(Resolution::Found(found)),
            // a definitive 404 means this cluster does not exist yet
            Err(err) if err.is_not_found() => Ok(Resolution::Missing),
            // transient failures are not evidence of absence
            Err(err) => Err(err),
        }
    }

    /// Create a compute cluster and wait until it is ready
    ///
    /// # Arguments
    ///
    /// * `spec` - The spec to build the cluster from
    async fn create(&mut self, spec: &ComputeSpec) -> Result<ComputeResource, Error> {
        // build the descriptor to submit from our spec
        let descriptor = spec.to_descriptor();
        // submit it and wait for the control plane to finish
        self.client
            .computes
            .create_or_update(&spec.name, &descriptor)
            .await
    }
}
