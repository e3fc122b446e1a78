use azureml::LogLevel;
use clap::Parser;

/// The command line args to pass to the provisioner
#[derive(Parser, Debug, Clone)]
#[clap(version, author)]
pub struct Args {
    /// The Azure subscription id
    #[clap(long = "subscription_id")]
    pub subscription_id: String,
    /// The resource group the Azure ML workspace lives in
    #[clap(long = "resource_group_name")]
    pub resource_group_name: String,
    /// The Azure ML workspace name
    #[clap(long = "workspace_name")]
    pub workspace_name: String,
    /// The name of the compute cluster to get or create
    #[clap(long = "cluster_name")]
    pub cluster_name: String,
    /// The VM sku to build the cluster from
    #[clap(long = "cluster_size")]
    pub cluster_size: String,
    /// The region to build the cluster in
    #[clap(long = "cluster_region")]
    pub cluster_region: String,
    /// The fewest instances the cluster can scale down to
    #[clap(long = "min_instances", default_value_t = 0)]
    pub min_instances: u32,
    /// The most instances the cluster can scale up to
    #[clap(long = "max_instances", default_value_t = 4)]
    pub max_instances: u32,
    /// How long nodes may sit idle before they are scaled down in seconds
    #[clap(long = "idle_time_before_scale_down", default_value_t = 1800)]
    pub idle_time_before_scale_down: u64,
    /// Don't actually provision billable compute
    #[clap(long = "dry_run", default_value_t)]
    pub dry_run: bool,
    /// The management endpoint to send requests to
    #[clap(long = "endpoint", default_value = azureml::client::DEFAULT_ENDPOINT)]
    pub endpoint: String,
    /// The log level to emit logs at
    #[clap(long = "log_level", default_value_t)]
    pub log_level: LogLevel,
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    /// Build the required args for these tests
    fn required() -> Vec<&'static str> {
        vec![
            "azureml-provisioner",
            "--subscription_id",
            "sub1",
            "--resource_group_name",
            "rg1",
            "--workspace_name",
            "ws1",
            "--cluster_name",
            "cluster-a",
            "--cluster_size",
            "Standard_DS3_v2",
            "--cluster_region",
            "eastus",
        ]
    }

    /// The pipeline surface defaults must stay pinned
    ///
    /// The idle default here intentionally differs from the library default
    /// of 600 seconds; deployed pipelines depend on both values.
    #[test]
    fn defaults() {
        let args = Args::try_parse_from(required()).unwrap();
        assert_eq!(args.min_instances, 0);
        assert_eq!(args.max_instances, 4);
        assert_eq!(args.idle_time_before_scale_down, 1800);
        assert!(!args.dry_run);
    }

    /// The autoscale args override their defaults
    #[test]
    fn overrides() {
        let mut raw = required();
        raw.extend([
            "--min_instances",
            "2",
            "--max_instances",
            "8",
            "--idle_time_before_scale_down",
            "600",
            "--dry_run",
        ]);
        let args = Args::try_parse_from(raw).unwrap();
        assert_eq!(args.min_instances, 2);
        assert_eq!(args.max_instances, 8);
        assert_eq!(args.idle_time_before_scale_down, 600);
        assert!(args.dry_run);
    }
}
