//! Models for compute clusters in an Azure ML workspace

use regex::Regex;
use std::fmt;

use super::errors::{CloudError, CloudErrorBody, InvalidSpec};

/// The default idle time before nodes are scaled down in seconds
pub const DEFAULT_IDLE_SECS: u64 = 600;

/// Helps serde default max instances to 4
fn default_max_instances() -> u32 {
    4
}

/// Helps serde default the idle scale down window
fn default_idle() -> u64 {
    DEFAULT_IDLE_SECS
}

/// The desired settings for an autoscaling compute cluster
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ComputeSpec {
    /// The name of this cluster within its workspace
    pub name: String,
    /// The VM sku to build this cluster from
    pub size: String,
    /// The region to build this cluster in
    pub region: String,
    /// The fewest instances this cluster can scale down to
    #[serde(default)]
    pub min_instances: u32,
    /// The most instances this cluster can scale up to
    #[serde(default = "default_max_instances")]
    pub max_instances: u32,
    /// How long nodes may sit idle before they are scaled down in seconds
    #[serde(default = "default_idle")]
    pub idle_time_before_scale_down: u64,
}

impl ComputeSpec {
    /// Create a new compute spec with default autoscale settings
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the cluster within its workspace
    /// * `size` - The VM sku to build the cluster from
    /// * `region` - The region to build the cluster in
    ///
    /// # Examples
    ///
    /// ```
    /// use azureml::models::ComputeSpec;
    ///
    /// let spec = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus")
    ///     .min_instances(0)
    ///     .max_instances(4);
    /// ```
    #[must_use]
    pub fn new<T: Into<String>>(name: T, size: T, region: T) -> Self {
        ComputeSpec {
            name: name.into(),
            size: size.into(),
            region: region.into(),
            min_instances: 0,
            max_instances: default_max_instances(),
            idle_time_before_scale_down: DEFAULT_IDLE_SECS,
        }
    }

    /// Set the fewest instances this cluster can scale down to
    ///
    /// # Arguments
    ///
    /// * `min` - The minimum instance count
    #[must_use]
    pub fn min_instances(mut self, min: u32) -> Self {
        self.min_instances = min;
        self
    }

    /// Set the most instances this cluster can scale up to
    ///
    /// # Arguments
    ///
    /// * `max` - The maximum instance count
    #[must_use]
    pub fn max_instances(mut self, max: u32) -> Self {
        self.max_instances = max;
        self
    }

    /// Set how long nodes may sit idle before they are scaled down
    ///
    /// # Arguments
    ///
    /// * `secs` - The idle window in seconds
    #[must_use]
    pub fn idle_time_before_scale_down(mut self, secs: u64) -> Self {
        self.idle_time_before_scale_down = secs;
        self
    }

    /// Validate this spec before any request is sent
    ///
    /// The control plane would reject these specs too but catching them
    /// locally avoids a round trip that can provision nothing.
    pub fn validate(&self) -> Result<(), InvalidSpec> {
        // the autoscale bounds must be ordered
        if self.min_instances > self.max_instances {
            return Err(InvalidSpec::new(format!(
                "min_instances ({}) must not exceed max_instances ({})",
                self.min_instances, self.max_instances
            )));
        }
        // cluster names must be 2-24 chars, alphanumeric or hyphen, start
        // with a letter and end alphanumeric
        let pattern = Regex::new(r"^[a-zA-Z][a-zA-Z0-9-]{0,22}[a-zA-Z0-9]$")
            .map_err(|err| InvalidSpec::new(err.to_string()))?;
        if !pattern.is_match(&self.name) {
            return Err(InvalidSpec::new(format!(
                "'{}' is not a valid compute cluster name",
                self.name
            )));
        }
        Ok(())
    }

    /// Build the descriptor to submit to the control plane
    #[must_use]
    pub fn to_descriptor(&self) -> ComputeResource {
        // build the autoscale settings for this cluster
        let scale = ScaleSettings {
            min_node_count: self.min_instances,
            max_node_count: self.max_instances,
            node_idle_time_before_scale_down: Some(to_iso8601(self.idle_time_before_scale_down)),
        };
        // wrap them in the compute envelope
        ComputeResource {
            id: None,
            name: None,
            location: self.region.clone(),
            properties: ComputeProperties {
                compute_type: "AmlCompute".to_owned(),
                provisioning_state: None,
                provisioning_errors: Vec::default(),
                properties: Some(AmlComputeProperties {
                    vm_size: Some(self.size.clone()),
                    scale_settings: Some(scale),
                }),
            },
        }
    }

    /// List the ways an existing compute differs from this spec
    ///
    /// An empty list means the existing compute already matches what was
    /// requested.
    ///
    /// # Arguments
    ///
    /// * `existing` - The existing compute to compare against
    #[must_use]
    pub fn drift(&self, existing: &ComputeResource) -> Vec<String> {
        let mut drift = Vec::default();
        // compare regions
        if !existing.location.eq_ignore_ascii_case(&self.region) {
            drift.push(format!("region {} != {}", existing.location, self.region));
        }
        // compare VM skus
        if let Some(size) = existing.vm_size() {
            if !size.eq_ignore_ascii_case(&self.size) {
                drift.push(format!("size {} != {}", size, self.size));
            }
        }
        // compare autoscale settings
        if let Some(scale) = existing.scale_settings() {
            if scale.min_node_count != self.min_instances {
                drift.push(format!(
                    "min {} != {}",
                    scale.min_node_count, self.min_instances
                ));
            }
            if scale.max_node_count != self.max_instances {
                drift.push(format!(
                    "max {} != {}",
                    scale.max_node_count, self.max_instances
                ));
            }
            // only compare idle windows the control plane reported
            if let Some(idle) = scale.idle_seconds() {
                if idle != self.idle_time_before_scale_down {
                    drift.push(format!(
                        "idle {} != {}",
                        idle, self.idle_time_before_scale_down
                    ));
                }
            }
        }
        drift
    }
}

/// The autoscale settings for a compute cluster
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSettings {
    /// The fewest nodes this cluster can scale down to
    pub min_node_count: u32,
    /// The most nodes this cluster can scale up to
    pub max_node_count: u32,
    /// How long nodes may idle before scale down as an ISO-8601 duration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_idle_time_before_scale_down: Option<String>,
}

impl ScaleSettings {
    /// Get the idle scale down window in seconds if one is set
    #[must_use]
    pub fn idle_seconds(&self) -> Option<u64> {
        self.node_idle_time_before_scale_down
            .as_deref()
            .and_then(parse_iso8601)
    }
}

/// The settings specific to AmlCompute clusters
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AmlComputeProperties {
    /// The VM sku this cluster is built from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vm_size: Option<String>,
    /// The autoscale settings for this cluster
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_settings: Option<ScaleSettings>,
}

/// The properties envelope around a compute target
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComputeProperties {
    /// The type of compute target
    pub compute_type: String,
    /// Where the control plane is in provisioning this compute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ProvisioningState>,
    /// Any errors the control plane hit while provisioning
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provisioning_errors: Vec<CloudError>,
    /// The settings specific to this compute type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AmlComputeProperties>,
}

/// A compute target in an Azure ML workspace
///
/// This is both the descriptor submitted on creation and the handle the
/// control plane returns. The id and name are set by the control plane.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ComputeResource {
    /// The full resource id of this compute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The name of this compute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The region this compute lives in
    pub location: String,
    /// The properties of this compute
    pub properties: ComputeProperties,
}

impl ComputeResource {
    /// Get the provisioning state of this compute
    #[must_use]
    pub fn state(&self) -> ProvisioningState {
        self.properties
            .provisioning_state
            .unwrap_or(ProvisioningState::Unknown)
    }

    /// Get the VM sku of this compute if the control plane reported one
    #[must_use]
    pub fn vm_size(&self) -> Option<&str> {
        self.properties
            .properties
            .as_ref()
            .and_then(|props| props.vm_size.as_deref())
    }

    /// Get the autoscale settings of this compute if any were reported
    #[must_use]
    pub fn scale_settings(&self) -> Option<&ScaleSettings> {
        self.properties
            .properties
            .as_ref()
            .and_then(|props| props.scale_settings.as_ref())
    }

    /// Get the errors the control plane recorded while provisioning
    #[must_use]
    pub fn provisioning_errors(&self) -> Vec<CloudErrorBody> {
        self.properties
            .provisioning_errors
            .iter()
            .map(|wrapped| wrapped.error.clone())
            .collect()
    }
}

/// The states the control plane moves a compute through
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// The compute is still being created
    #[serde(alias = "creating")]
    Creating,
    /// The compute is ready for use
    #[serde(alias = "succeeded")]
    Succeeded,
    /// The compute failed to provision
    #[serde(alias = "failed")]
    Failed,
    /// Provisioning was canceled
    #[serde(alias = "canceled")]
    Canceled,
    /// The compute is being updated
    #[serde(alias = "updating")]
    Updating,
    /// The compute is being deleted
    #[serde(alias = "deleting")]
    Deleting,
    /// The control plane reported a state we do not know about
    #[serde(other)]
    Unknown,
}

impl ProvisioningState {
    /// Whether the control plane is done acting on this compute
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProvisioningState::Succeeded | ProvisioningState::Failed | ProvisioningState::Canceled
        )
    }
}

impl fmt::Display for ProvisioningState {
    /// Display this state in a easily readable format
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProvisioningState::Creating => write!(f, "Creating"),
            ProvisioningState::Succeeded => write!(f, "Succeeded"),
            ProvisioningState::Failed => write!(f, "Failed"),
            ProvisioningState::Canceled => write!(f, "Canceled"),
            ProvisioningState::Updating => write!(f, "Updating"),
            ProvisioningState::Deleting => write!(f, "Deleting"),
            ProvisioningState::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Format a number of seconds as an ISO-8601 duration
///
/// # Arguments
///
/// * `secs` - The number of seconds to format
pub fn to_iso8601(secs: u64) -> String {
    format!("PT{secs}S")
}

/// Parse the subset of ISO-8601 durations the control plane emits
///
/// # Arguments
///
/// * `raw` - The raw duration to parse
pub fn parse_iso8601(raw: &str) -> Option<u64> {
    // the control plane emits days/hours/minutes/seconds durations
    let pattern = Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").ok()?;
    let captures = pattern.captures(raw)?;
    // pull out each unit of this duration
    let unit = |idx: usize| {
        captures
            .get(idx)
            .map_or(Some(0), |cap| cap.as_str().parse::<u64>().ok())
    };
    let (days, hours, mins, secs) = (unit(1)?, unit(2)?, unit(3)?, unit(4)?);
    // an empty duration is not a duration
    if captures.get(1).is_none() && captures.get(2).is_none() && captures.get(3).is_none() && captures.get(4).is_none() {
        return None;
    }
    Some(days * 86_400 + hours * 3_600 + mins * 60 + secs)
}

#[cfg(test)]
mod tests {
    use super::{parse_iso8601, ComputeResource, ComputeSpec, ProvisioningState, DEFAULT_IDLE_SECS};

    /// The library level idle default must stay pinned at 600 seconds
    ///
    /// The command line surface intentionally defaults to a different value.
    #[test]
    fn default_idle_window() {
        let spec = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus");
        assert_eq!(spec.idle_time_before_scale_down, 600);
        assert_eq!(DEFAULT_IDLE_SECS, 600);
        // the other autoscale defaults
        assert_eq!(spec.min_instances, 0);
        assert_eq!(spec.max_instances, 4);
    }

    #[test]
    fn descriptor_wire_format() {
        // build a descriptor for a concrete spec
        let spec = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus")
            .min_instances(1)
            .max_instances(6)
            .idle_time_before_scale_down(900);
        let raw = serde_json::to_value(spec.to_descriptor()).unwrap();
        // the descriptor must serialize to the control plane's camelCase shape
        assert_eq!(raw["location"], "eastus");
        assert_eq!(raw["properties"]["computeType"], "AmlCompute");
        let props = &raw["properties"]["properties"];
        assert_eq!(props["vmSize"], "Standard_DS3_v2");
        assert_eq!(props["scaleSettings"]["minNodeCount"], 1);
        assert_eq!(props["scaleSettings"]["maxNodeCount"], 6);
        assert_eq!(props["scaleSettings"]["nodeIdleTimeBeforeScaleDown"], "PT900S");
        // ids are owned by the control plane and must not be submitted
        assert!(raw.get("id").is_none());
        assert!(raw.get("name").is_none());
    }

    #[test]
    fn handle_wire_format() {
        // a handle as the control plane returns it
        let raw = r#"{
            "id": "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.MachineLearningServices/workspaces/ws1/computes/cluster-a",
            "name": "cluster-a",
            "location": "eastus",
            "properties": {
                "computeType": "AmlCompute",
                "provisioningState": "Succeeded",
                "properties": {
                    "vmSize": "STANDARD_DS3_V2",
                    "scaleSettings": {
                        "minNodeCount": 0,
                        "maxNodeCount": 4,
                        "nodeIdleTimeBeforeScaleDown": "PT30M"
                    }
                }
            }
        }"#;
        let handle: ComputeResource = serde_json::from_str(raw).unwrap();
        assert_eq!(handle.name.as_deref(), Some("cluster-a"));
        assert_eq!(handle.state(), ProvisioningState::Succeeded);
        // minute durations collapse to seconds
        assert_eq!(handle.scale_settings().unwrap().idle_seconds(), Some(1800));
    }

    #[test]
    fn unknown_states_are_tolerated() {
        // states we have never heard of must not fail deserialization
        let raw = r#"{"location": "eastus", "properties": {"computeType": "AmlCompute", "provisioningState": "Migrating"}}"#;
        let handle: ComputeResource = serde_json::from_str(raw).unwrap();
        assert_eq!(handle.state(), ProvisioningState::Unknown);
        assert!(!handle.state().is_terminal());
    }

    #[test]
    fn validation() {
        // a well formed spec passes
        let good = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus");
        good.validate().unwrap();
        // inverted autoscale bounds are rejected
        let inverted = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus")
            .min_instances(8)
            .max_instances(4);
        assert!(inverted.validate().is_err());
        // bad names are rejected
        for name in ["", "a", "9cluster", "under_score", "cluster-", "x".repeat(25).as_str()] {
            let bad = ComputeSpec::new(name, "Standard_DS3_v2", "eastus");
            assert!(bad.validate().is_err(), "{name} should be rejected");
        }
    }

    #[test]
    fn durations() {
        assert_eq!(parse_iso8601("PT600S"), Some(600));
        assert_eq!(parse_iso8601("PT30M"), Some(1800));
        assert_eq!(parse_iso8601("PT1H30M"), Some(5400));
        assert_eq!(parse_iso8601("P1DT2H"), Some(93_600));
        assert_eq!(parse_iso8601("tomorrow"), None);
        assert_eq!(parse_iso8601("P"), None);
    }

    #[test]
    fn drift_detection() {
        let spec = ComputeSpec::new("cluster-a", "Standard_DS3_v2", "eastus");
        // an exactly matching compute has no drift
        let mut existing = spec.to_descriptor();
        existing.properties.provisioning_state = Some(ProvisioningState::Succeeded);
        assert!(spec.drift(&existing).is_empty());
        // a different sku is reported as drift
        let other = ComputeSpec::new("cluster-a", "Standard_NC6", "westus2").to_descriptor();
        let drift = spec.drift(&other);
        assert_eq!(drift.len(), 2);
    }
}
