//! A dry run provider that fakes the compute control plane

use async_trait::async_trait;
use azureml::models::{ComputeResource, ComputeSpec, ProvisioningState};
use azureml::Error;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{event, Level};

use super::{ComputeProvider, Resolution};

/// The state of a pretend workspace
#[derive(Debug, Default)]
struct DryRunState {
    /// The computes in this workspace by name
    computes: HashMap<String, ComputeResource>,
    /// How many resolve calls this workspace has seen
    resolves: u64,
    /// Every descriptor that was submitted for creation
    created: Vec<ComputeResource>,
}

/// A compute provider over a pretend workspace
///
/// Clones share the same pretend workspace so tests can hold one handle
/// while the provisioner owns another.
#[derive(Debug, Clone, Default)]
pub struct DryRun {
    /// The shared state of our pretend workspace
    state: Arc<Mutex<DryRunState>>,
}

impl DryRun {
    /// Place an existing compute built from a spec into the pretend workspace
    ///
    /// # Arguments
    ///
    /// * `spec` - The spec to build the existing compute from
    pub fn seed(&self, spec: &ComputeSpec) {
        let mut state = self.state.lock().expect("Dry run state was poisoned");
        state
            .computes
            .insert(spec.name.clone(), Self::materialize(spec));
    }

    /// Get how many resolve calls the pretend workspace has seen
    #[must_use]
    pub fn resolves(&self) -> u64 {
        self.state.lock().expect("Dry run state was poisoned").resolves
    }

    /// Get every descriptor that was submitted for creation
    #[must_use]
    pub fn created(&self) -> Vec<ComputeResource> {
        self.state
            .lock()
            .expect("Dry run state was poisoned")
            .created
            .clone()
    }

    /// Build the ready compute the control plane would return for a spec
    ///
    /// # Arguments
    ///
    /// * `spec` - The spec to build a ready compute from
    fn materialize(spec: &ComputeSpec) -> ComputeResource {
        // start from the descriptor this spec would submit
        let mut resource = spec.to_descriptor();
        // fill in the fields the control plane owns
        resource.id = Some(format!("/dry-run/computes/{}", spec.name));
        resource.name = Some(spec.name.clone());
        resource.properties.provisioning_state = Some(ProvisioningState::Succeeded);
        resource
    }
}

#[async_trait]
impl ComputeProvider for DryRun {
    /// Resolve a compute cluster in the pretend workspace
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the cluster to resolve
    async fn resolve(&mut self, name: &str) -> Result<Resolution, Error> {
        let mut state = self.state.lock().expect("Dry run state was poisoned");
        // count this lookup
        state.resolves += 1;
        match state.computes.get(name) {
            Some(found) => Ok(Resolution::Found(found.clone())),
            None => Ok(Resolution::Missing),
        }
    }

    /// Create a compute cluster in the pretend workspace
    ///
    /// # Arguments
    ///
    /// * `spec` - The spec to build the cluster from
    async fn create(&mut self, spec: &ComputeSpec) -> Result<ComputeResource, Error> {
        let mut state = self.state.lock().expect("Dry run state was poisoned");
        // record the descriptor that would have been submitted
        state.created.push(spec.to_descriptor());
        // pretend the control plane built it instantly
        let resource = Self::materialize(spec);
        state.computes.insert(spec.name.clone(), resource.clone());
        event!(Level::INFO, compute = spec.name.as_str(), "Dry run created compute");
        Ok(resource)
    }
}
