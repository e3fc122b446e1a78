//! The settings for the Azure ML client

/// Helps serde default the request timeout to 120 seconds
fn default_timeout() -> u64 {
    120
}

/// Helps serde default the provisioning poll interval to 15 seconds
fn default_poll_interval() -> u64 {
    15
}

/// The settings to build an Azure ML client with
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// How long each request may take in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// How long to wait between provisioning polls in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Whether to trust invalid certificates
    #[serde(default)]
    pub invalid_certs: bool,
    /// Whether to trust certs with invalid hostnames
    #[serde(default)]
    pub invalid_hostnames: bool,
}

impl Default for ClientSettings {
    /// Build default client settings
    fn default() -> Self {
        ClientSettings {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
            invalid_certs: false,
            invalid_hostnames: false,
        }
    }
}
