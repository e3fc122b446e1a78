//! Error bodies returned by the Azure control plane and local validation errors

/// The error envelope Azure wraps failed operations in
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CloudError {
    /// The actual error body
    pub error: CloudErrorBody,
}

/// An error body from the Azure control plane
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudErrorBody {
    /// The short error code for this error
    pub code: String,
    /// The human readable message for this error
    pub message: String,
}

impl std::fmt::Display for CloudErrorBody {
    /// Display this error body in a easily readable format
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A compute spec that failed local validation before any request was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSpec {
    /// Why this spec was rejected
    pub msg: String,
}

impl InvalidSpec {
    /// Create a new invalid spec error
    ///
    /// # Arguments
    ///
    /// * `msg` - Why this spec was rejected
    pub fn new<T: Into<String>>(msg: T) -> Self {
        InvalidSpec { msg: msg.into() }
    }
}

impl std::fmt::Display for InvalidSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl std::error::Error for InvalidSpec {}
