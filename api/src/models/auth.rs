//! Tokens used to authenticate to the Azure control plane

use chrono::{DateTime, Utc};

/// A bearer token for the Azure control plane
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// The raw bearer token
    pub token: String,
    /// When this token expires if known
    pub expires: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Create a new access token
    ///
    /// # Arguments
    ///
    /// * `token` - The raw bearer token
    /// * `expires` - When this token expires if known
    #[must_use]
    pub fn new<T: Into<String>>(token: T, expires: Option<DateTime<Utc>>) -> Self {
        AccessToken {
            token: token.into(),
            expires,
        }
    }
}
