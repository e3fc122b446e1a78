//! The coordinates of an Azure ML workspace

/// The coordinates of an Azure ML workspace
///
/// These are pass through identifiers validated by the control plane and not
/// locally.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    /// The Azure subscription id this workspace is billed under
    pub subscription: String,
    /// The resource group this workspace lives in
    pub resource_group: String,
    /// The name of this workspace
    pub name: String,
}

impl Workspace {
    /// Create a new workspace coordinate
    ///
    /// # Arguments
    ///
    /// * `subscription` - The Azure subscription id
    /// * `resource_group` - The resource group the workspace lives in
    /// * `name` - The name of the workspace
    ///
    /// # Examples
    ///
    /// ```
    /// use azureml::models::Workspace;
    ///
    /// let workspace = Workspace::new("sub1", "rg1", "ws1");
    /// ```
    #[must_use]
    pub fn new<T: Into<String>>(subscription: T, resource_group: T, name: T) -> Self {
        Workspace {
            subscription: subscription.into(),
            resource_group: resource_group.into(),
            name: name.into(),
        }
    }

    /// Build the resource path for a compute in this workspace
    ///
    /// # Arguments
    ///
    /// * `compute` - The name of the compute target
    #[must_use]
    pub fn compute_path(&self, compute: &str) -> String {
        format!(
            "subscriptions/{}/resourceGroups/{}/providers/Microsoft.MachineLearningServices/workspaces/{}/computes/{}",
            self.subscription, self.resource_group, self.name, compute
        )
    }
}

impl std::fmt::Display for Workspace {
    /// Display this workspace in a easily readable format
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.subscription, self.resource_group, self.name)
    }
}
