//! The computes handler for the Azure ML client

use tokio::time::{sleep, Duration};
use tracing::{event, instrument, Level};

use super::Error;
use crate::models::{ComputeResource, ProvisioningState, Workspace};
use crate::send_build;

/// The api version to send compute requests with
const API_VERSION: &str = "2024-04-01";

/// Computes handler for the Azure ML client
#[derive(Clone, Debug)]
pub struct Computes {
    /// The management endpoint requests are sent to
    host: String,
    /// The workspace our computes live in
    workspace: Workspace,
    /// The auth header to send with each request
    token: String,
    /// How long to wait between provisioning polls in seconds
    poll_interval: u64,
    /// reqwest client object
    client: reqwest::Client,
}

impl Computes {
    /// Creates a new computes handler
    ///
    /// Instead of directly creating this handler you likely want to simply
    /// create an `azureml::AzureMl` and use the handler within that instead.
    ///
    /// # Arguments
    ///
    /// * `host` - The management endpoint to send requests to
    /// * `token` - The auth header used for authentication
    /// * `client` - The reqwest client to use
    /// * `workspace` - The workspace our computes live in
    /// * `poll_interval` - How long to wait between provisioning polls
    #[must_use]
    pub fn new(
        host: &str,
        token: &str,
        client: &reqwest::Client,
        workspace: Workspace,
        poll_interval: u64,
    ) -> Self {
        // build computes route handler
        Computes {
            host: host.to_owned(),
            workspace,
            token: token.to_owned(),
            poll_interval,
            client: client.clone(),
        }
    }

    /// Build the url for a compute in our workspace
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the compute target
    fn url(&self, name: &str) -> String {
        format!("{}/{}", self.host, self.workspace.compute_path(name))
    }

    /// Gets a compute target by name
    ///
    /// A definitive not found surfaces as an error whose `is_not_found`
    /// is true; anything else is a real failure.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the compute target to get
    #[instrument(name = "Computes::get", skip(self), err(Debug))]
    pub async fn get(&self, name: &str) -> Result<ComputeResource, Error> {
        // build url for getting a compute target
        let url = self.url(name);
        // build request
        let req = self
            .client
            .get(&url)
            .header("authorization", &self.token)
            .query(&[("api-version", API_VERSION)]);
        // send this request and build a ComputeResource from the response
        send_build!(self.client, req, ComputeResource)
    }

    /// Submit a compute descriptor and wait for a terminal provisioning state
    ///
    /// Create-or-update is idempotent by name on the control plane side so
    /// racing callers converge on the same cluster. There is no local
    /// timeout; wrap the process externally if one is needed.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the compute target to create
    /// * `descriptor` - The descriptor to submit
    #[instrument(name = "Computes::create_or_update", skip(self, descriptor), err(Debug))]
    pub async fn create_or_update(
        &self,
        name: &str,
        descriptor: &ComputeResource,
    ) -> Result<ComputeResource, Error> {
        // build url for creating a compute target
        let url = self.url(name);
        // build request
        let req = self
            .client
            .put(&url)
            .header("authorization", &self.token)
            .query(&[("api-version", API_VERSION)])
            .json(descriptor);
        // submit; the control plane acks with the compute in a creating state
        let submitted = send_build!(self.client, req, ComputeResource)?;
        // block until the control plane is done provisioning
        self.wait(name, submitted).await
    }

    /// Poll a compute until the control plane reports a terminal state
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the compute target to poll
    /// * `current` - The most recently observed compute
    async fn wait(&self, name: &str, mut current: ComputeResource) -> Result<ComputeResource, Error> {
        loop {
            // check where the control plane is with this compute
            let state = current.state();
            match state {
                // the compute is ready for use
                ProvisioningState::Succeeded => return Ok(current),
                // the control plane gave up on this compute
                state if state.is_terminal() => {
                    return Err(Error::Provisioning {
                        name: name.to_owned(),
                        state,
                        errors: current.provisioning_errors(),
                    });
                }
                // the control plane is still working
                state => {
                    event!(
                        Level::INFO,
                        compute = name,
                        state = %state,
                        "Waiting for provisioning to complete"
                    );
                    sleep(Duration::from_secs(self.poll_interval)).await;
                }
            }
            // get the latest view of this compute
            current = self.get(name).await?;
        }
    }
}
