//! An asynchronous client for the Azure ML compute surface

use chrono::{DateTime, Utc};

use crate::models::Workspace;

mod computes;
mod conf;
mod credentials;
mod error;
mod helpers;

pub use computes::Computes;
pub use conf::ClientSettings;
pub use credentials::{
    ClientSecretCredential, DefaultCredential, ManagedIdentityCredential, StaticCredential,
    TokenCredential,
};
pub use error::Error;

/// The public cloud management endpoint
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Builds the Azure ML client
pub struct AzureMlBuilder {
    /// The workspace this client will operate on
    workspace: Workspace,
    /// The management endpoint to send requests to
    endpoint: String,
    /// The credential to authenticate with
    credential: Option<Box<dyn TokenCredential>>,
    /// A pre-issued token to use instead of a credential
    token: Option<String>,
    /// The settings for this client
    pub settings: ClientSettings,
}

impl AzureMlBuilder {
    /// Set the management endpoint to send requests to
    ///
    /// This is only needed for sovereign clouds or tests.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The management endpoint to use
    #[must_use]
    pub fn endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the credential used to acquire a bearer token
    ///
    /// # Arguments
    ///
    /// * `credential` - The credential to authenticate with
    ///
    /// # Examples
    ///
    /// ```
    /// use azureml::client::DefaultCredential;
    /// use azureml::models::Workspace;
    /// use azureml::AzureMl;
    ///
    /// AzureMl::build(Workspace::new("sub1", "rg1", "ws1"))
    ///     .credential(DefaultCredential::new());
    /// ```
    #[must_use]
    pub fn credential<C: TokenCredential + 'static>(mut self, credential: C) -> Self {
        self.credential = Some(Box::new(credential));
        self
    }

    /// Set a pre-issued bearer token to use instead of a credential
    ///
    /// # Arguments
    ///
    /// * `token` - The token to authenticate with
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the settings for this client
    ///
    /// # Arguments
    ///
    /// * `settings` - The settings to build the client with
    #[must_use]
    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Build a client with the configured auth settings
    ///
    /// Authentication failures surface here before any compute handler
    /// exists, so a client that fails to build can never reach the control
    /// plane.
    pub async fn build(self) -> Result<AzureMl, Error> {
        // make sure our endpoint is a well formed url
        url::Url::parse(&self.endpoint)?;
        // build a reqwest client
        let client = helpers::build_reqwest_client(&self.settings)?;
        // get a token if one was not handed to us directly
        let (token, expires) = match self.token {
            Some(token) => (token, None),
            None => {
                // without a token a credential must be set
                let credential = self.credential.ok_or_else(|| {
                    Error::Auth("Either a token or a credential must be set".to_owned())
                })?;
                // ask the credential for a management plane token
                let scope = format!("{}/.default", self.endpoint);
                let fetched = credential.token(&client, &scope).await?;
                (fetched.token, fetched.expires)
            }
        };
        // build the auth header all handlers will send
        let auth_str = format!("Bearer {token}");
        // build handlers
        let computes = Computes::new(
            &self.endpoint,
            &auth_str,
            &client,
            self.workspace.clone(),
            self.settings.poll_interval,
        );
        // build the Azure ML client
        Ok(AzureMl {
            computes,
            endpoint: self.endpoint,
            workspace: self.workspace,
            expires,
        })
    }
}

/// An asynchronous client for Azure ML
#[derive(Clone, Debug)]
pub struct AzureMl {
    /// Handles compute routes
    pub computes: Computes,
    /// The management endpoint requests are sent to
    pub endpoint: String,
    /// The workspace this client operates on
    pub workspace: Workspace,
    /// When our token expires if known
    pub expires: Option<DateTime<Utc>>,
}

impl AzureMl {
    /// Create a new Azure ML client builder
    ///
    /// # Arguments
    ///
    /// * `workspace` - The workspace this client will operate on
    ///
    /// # Examples
    ///
    /// ```
    /// use azureml::models::Workspace;
    /// use azureml::AzureMl;
    ///
    /// AzureMl::build(Workspace::new("sub1", "rg1", "ws1"))
    ///     .token("token");
    /// ```
    #[must_use]
    pub fn build(workspace: Workspace) -> AzureMlBuilder {
        AzureMlBuilder {
            workspace,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            credential: None,
            token: None,
            settings: ClientSettings::default(),
        }
    }
}
