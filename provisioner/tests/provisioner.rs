//! Tests the compute provisioner against a dry run control plane

use azureml::client::TokenCredential;
use azureml::models::{AccessToken, ComputeSpec, ProvisioningState, Workspace};
use azureml::{AzureMl, Error};
use azureml_provisioner::{DryRun, Provisioner};

/// Build the spec used across these tests
fn spec() -> ComputeSpec {
    ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus")
        .min_instances(0)
        .max_instances(4)
        .idle_time_before_scale_down(600)
}

/// A credential that always rejects
struct Rejecting;

#[async_trait::async_trait]
impl TokenCredential for Rejecting {
    async fn token(&self, _client: &reqwest::Client, _scope: &str) -> Result<AccessToken, Error> {
        Err(Error::Auth("Credentials were rejected".to_owned()))
    }

    fn name(&self) -> &'static str {
        "Rejecting"
    }
}

#[tokio::test]
async fn existing_cluster_is_reused() -> Result<(), Error> {
    // seed a pretend workspace with our cluster
    let provider = DryRun::default();
    provider.seed(&spec());
    // get or create must hand back the existing cluster
    let mut provisioner = Provisioner::with_provider(spec(), Box::new(provider.clone()));
    let handle = provisioner.get_or_create().await?;
    assert_eq!(handle.name.as_deref(), Some("cluster-a"));
    assert_eq!(handle.state(), ProvisioningState::Succeeded);
    // the control plane must have seen zero create calls
    assert!(provider.created().is_empty());
    assert_eq!(provider.resolves(), 1);
    Ok(())
}

#[tokio::test]
async fn missing_cluster_is_created() -> Result<(), Error> {
    // start with an empty pretend workspace
    let provider = DryRun::default();
    let mut provisioner = Provisioner::with_provider(spec(), Box::new(provider.clone()));
    let handle = provisioner.get_or_create().await?;
    // the handle must carry the name we asked for
    assert_eq!(handle.name.as_deref(), Some("cluster-a"));
    assert_eq!(handle.state(), ProvisioningState::Succeeded);
    // exactly one descriptor must have been submitted
    let created = provider.created();
    assert_eq!(created.len(), 1);
    // and its fields must match the spec exactly
    let descriptor = &created[0];
    assert_eq!(descriptor.location, "eastus");
    assert_eq!(descriptor.vm_size(), Some("Standard_DS3_v2"));
    let scale = descriptor.scale_settings().unwrap();
    assert_eq!(scale.min_node_count, 0);
    assert_eq!(scale.max_node_count, 4);
    assert_eq!(scale.idle_seconds(), Some(600));
    Ok(())
}

#[tokio::test]
async fn second_call_finds_the_first_clusters_work() -> Result<(), Error> {
    // create a cluster in an empty pretend workspace
    let provider = DryRun::default();
    let mut first = Provisioner::with_provider(spec(), Box::new(provider.clone()));
    first.get_or_create().await?;
    // a second provisioner against the same workspace must reuse it
    let mut second = Provisioner::with_provider(spec(), Box::new(provider.clone()));
    second.get_or_create().await?;
    assert_eq!(provider.created().len(), 1);
    assert_eq!(provider.resolves(), 2);
    Ok(())
}

#[tokio::test]
async fn mismatched_existing_cluster_is_reused_as_is() -> Result<(), Error> {
    // seed a cluster whose sku and region differ from what we will request
    let provider = DryRun::default();
    provider.seed(&ComputeSpec::new("cluster-a", "Standard_NC6", "westus2"));
    let mut provisioner = Provisioner::with_provider(spec(), Box::new(provider.clone()));
    let handle = provisioner.get_or_create().await?;
    // the existing cluster is handed back without convergence
    assert_eq!(handle.vm_size(), Some("Standard_NC6"));
    assert_eq!(handle.location, "westus2");
    assert!(provider.created().is_empty());
    Ok(())
}

#[tokio::test]
async fn inverted_bounds_are_rejected_before_any_call() {
    // a spec whose autoscale bounds are inverted
    let bad = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus")
        .min_instances(8)
        .max_instances(4);
    let provider = DryRun::default();
    let mut provisioner = Provisioner::with_provider(bad, Box::new(provider.clone()));
    let err = provisioner.get_or_create().await.unwrap_err();
    assert_eq!(err.kind(), "InvalidSpec");
    // validation must fire before the provider is ever touched
    assert_eq!(provider.resolves(), 0);
    assert!(provider.created().is_empty());
}

#[tokio::test]
async fn bad_cluster_names_are_rejected_before_any_call() {
    let bad = ComputeSpec::new("not_a_valid_name", "Standard_DS3_v2", "eastus");
    let provider = DryRun::default();
    let mut provisioner = Provisioner::with_provider(bad, Box::new(provider.clone()));
    let err = provisioner.get_or_create().await.unwrap_err();
    assert_eq!(err.kind(), "InvalidSpec");
    assert_eq!(provider.resolves(), 0);
}

#[tokio::test]
async fn rejected_credentials_are_fatal() {
    // a client build with rejected credentials must fail before any
    // compute handler exists, so no lookup or create can be attempted
    let workspace = Workspace::new("sub1", "rg1", "ws1");
    let err = AzureMl::build(workspace)
        .credential(Rejecting)
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "Auth");
}

#[tokio::test]
async fn pre_issued_tokens_skip_credential_discovery() -> Result<(), Error> {
    // a client built from a pre-issued token needs no credential
    let workspace = Workspace::new("sub1", "rg1", "ws1");
    let client = AzureMl::build(workspace).token("token").build().await?;
    assert_eq!(client.endpoint, "https://management.azure.com");
    Ok(())
}
