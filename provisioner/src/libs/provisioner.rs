//! Gets or provisions a compute cluster ahead of a pipeline job

use azureml::client::DefaultCredential;
use azureml::models::{ComputeResource, ComputeSpec, Workspace};
use azureml::{AzureMl, Error};
use tracing::{event, instrument, Level};

use super::providers::{ComputeProvider, DryRun, Resolution, Rest};
use crate::args::Args;

/// Gets or provisions a compute cluster in an Azure ML workspace
pub struct Provisioner {
    /// The desired compute spec
    spec: ComputeSpec,
    /// The provider used to resolve and create computes
    provider: Box<dyn ComputeProvider + Send>,
}

impl Provisioner {
    /// Build a provisioner from command line args
    ///
    /// # Arguments
    ///
    /// * `args` - The command line args to build from
    pub async fn new(args: &Args) -> Result<Self, Error> {
        // build the desired spec from our args
        let spec = ComputeSpec::new(&args.cluster_name, &args.cluster_size, &args.cluster_region)
            .min_instances(args.min_instances)
            .max_instances(args.max_instances)
            .idle_time_before_scale_down(args.idle_time_before_scale_down);
        // use a pretend control plane on dry runs
        let provider: Box<dyn ComputeProvider + Send> = if args.dry_run {
            Box::new(DryRun::default())
        } else {
            // the workspace our cluster lives in
            let workspace = Workspace::new(
                &args.subscription_id,
                &args.resource_group_name,
                &args.workspace_name,
            );
            // discover credentials and authenticate
            let client = AzureMl::build(workspace)
                .endpoint(&args.endpoint)
                .credential(DefaultCredential::new())
                .build()
                .await?;
            Box::new(Rest::new(client))
        };
        Ok(Provisioner { spec, provider })
    }

    /// Build a provisioner on top of an explicit provider
    ///
    /// # Arguments
    ///
    /// * `spec` - The desired compute spec
    /// * `provider` - The provider to resolve and create computes with
    #[must_use]
    pub fn with_provider(spec: ComputeSpec, provider: Box<dyn ComputeProvider + Send>) -> Self {
        Provisioner { spec, provider }
    }

    /// Get the existing compute cluster or create it
    ///
    /// An existing cluster is reused as is even when its settings differ
    /// from the requested spec; the drift is logged but not converged.
    #[instrument(name = "Provisioner::get_or_create", skip(self), err(Debug))]
    pub async fn get_or_create(&mut self) -> Result<ComputeResource, Error> {
        // reject invalid specs before any network traffic
        self.spec.validate()?;
        // look for an existing compute with this name
        match self.provider.resolve(&self.spec.name).await? {
            Resolution::Found(existing) => {
                event!(
                    Level::INFO,
                    compute = self.spec.name.as_str(),
                    "Found existing compute target, so using it"
                );
                // warn when the existing cluster does not match our spec
                let drift = self.spec.drift(&existing);
                if !drift.is_empty() {
                    // fold the drift into one loggable field
                    let folded = drift.join(", ");
                    event!(
                        Level::WARN,
                        compute = self.spec.name.as_str(),
                        drift = folded.as_str(),
                        "Existing compute target does not match the requested spec"
                    );
                }
                Ok(existing)
            }
            Resolution::Missing => {
                event!(
                    Level::INFO,
                    compute = self.spec.name.as_str(),
                    "Compute target was not found, creating a new one"
                );
                // build a new cluster and wait for it to be ready
                let created = self.provider.create(&self.spec).await?;
                event!(
                    Level::INFO,
                    compute = self.spec.name.as_str(),
                    "A new cluster has been created"
                );
                Ok(created)
            }
        }
    }
}
