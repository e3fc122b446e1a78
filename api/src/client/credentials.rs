//! Credential providers for the Azure ML client
//!
//! Credentials are injected into the client builder instead of discovered
//! from ambient process state so tests can substitute their own.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::{event, Level};

use super::Error;
use crate::models::AccessToken;

/// The environment variable holding the service principal tenant
const TENANT_ENV: &str = "AZURE_TENANT_ID";

/// The environment variable holding the service principal client id
const CLIENT_ID_ENV: &str = "AZURE_CLIENT_ID";

/// The environment variable holding the service principal secret
const SECRET_ENV: &str = "AZURE_CLIENT_SECRET";

/// The public cloud token authority
const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// The instance metadata service token endpoint
const DEFAULT_IMDS: &str = "http://169.254.169.254/metadata/identity/oauth2/token";

/// The wire response from the token authority
#[derive(Deserialize)]
struct TokenResponse {
    /// The bearer token that was granted
    access_token: String,
    /// How many seconds this token is valid for
    #[serde(default)]
    expires_in: Option<i64>,
}

/// The wire response from the instance metadata service
#[derive(Deserialize)]
struct ImdsTokenResponse {
    /// The bearer token that was granted
    access_token: String,
    /// The unix timestamp this token expires at
    #[serde(default)]
    expires_on: Option<String>,
}

/// The methods required to act as a token credential
#[async_trait]
pub trait TokenCredential: Send + Sync {
    /// Get a bearer token for a scope
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send token requests with
    /// * `scope` - The scope to request a token for
    async fn token(&self, client: &reqwest::Client, scope: &str) -> Result<AccessToken, Error>;

    /// The name of this credential for logs
    fn name(&self) -> &'static str;
}

/// A service principal credential using the client credentials grant
pub struct ClientSecretCredential {
    /// The tenant to authenticate against
    pub tenant: String,
    /// The client id of the service principal
    pub client_id: String,
    /// The secret of the service principal
    secret: String,
    /// The token authority to authenticate against
    authority: String,
}

impl ClientSecretCredential {
    /// Create a new service principal credential
    ///
    /// # Arguments
    ///
    /// * `tenant` - The tenant to authenticate against
    /// * `client_id` - The client id of the service principal
    /// * `secret` - The secret of the service principal
    #[must_use]
    pub fn new<T: Into<String>>(tenant: T, client_id: T, secret: T) -> Self {
        ClientSecretCredential {
            tenant: tenant.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            authority: DEFAULT_AUTHORITY.to_owned(),
        }
    }

    /// Build a service principal credential from the environment if one is set
    #[must_use]
    pub fn from_env() -> Option<Self> {
        // all three service principal variables must be set
        let tenant = std::env::var(TENANT_ENV).ok()?;
        let client_id = std::env::var(CLIENT_ID_ENV).ok()?;
        let secret = std::env::var(SECRET_ENV).ok()?;
        Some(ClientSecretCredential::new(tenant, client_id, secret))
    }

    /// Set the token authority to authenticate against
    ///
    /// # Arguments
    ///
    /// * `authority` - The token authority to use
    #[must_use]
    pub fn authority<T: Into<String>>(mut self, authority: T) -> Self {
        self.authority = authority.into();
        self
    }
}

#[async_trait]
impl TokenCredential for ClientSecretCredential {
    /// Get a bearer token with the client credentials grant
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send token requests with
    /// * `scope` - The scope to request a token for
    async fn token(&self, client: &reqwest::Client, scope: &str) -> Result<AccessToken, Error> {
        // build the url for our tenants token endpoint
        let url = format!("{}/{}/oauth2/v2.0/token", self.authority, self.tenant);
        // build the client credentials form
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.secret.as_str()),
            ("scope", scope),
            ("grant_type", "client_credentials"),
        ];
        // send our token request
        let resp = client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|err| Error::Auth(format!("Token request failed: {err}")))?;
        // a rejection here means our credentials are invalid
        if !resp.status().is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!("Token request was rejected: {raw}")));
        }
        // cast the granted token
        let cast: TokenResponse = resp
            .json()
            .await
            .map_err(|err| Error::Auth(format!("Failed to parse token response: {err}")))?;
        // track when this token expires
        let expires = cast.expires_in.map(|secs| Utc::now() + Duration::seconds(secs));
        Ok(AccessToken::new(cast.access_token, expires))
    }

    fn name(&self) -> &'static str {
        "ClientSecret"
    }
}

/// A credential backed by the instance metadata service
pub struct ManagedIdentityCredential {
    /// The instance metadata endpoint to get tokens from
    endpoint: String,
    /// The client id of a user assigned identity if one should be used
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    /// Set the client id of a user assigned identity
    ///
    /// # Arguments
    ///
    /// * `client_id` - The client id of the identity to use
    #[must_use]
    pub fn client_id<T: Into<String>>(mut self, client_id: T) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the instance metadata endpoint to get tokens from
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The endpoint to use
    #[must_use]
    pub fn endpoint<T: Into<String>>(mut self, endpoint: T) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

impl Default for ManagedIdentityCredential {
    /// Build a managed identity credential against the standard endpoint
    fn default() -> Self {
        ManagedIdentityCredential {
            endpoint: DEFAULT_IMDS.to_owned(),
            client_id: None,
        }
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    /// Get a bearer token from the instance metadata service
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send token requests with
    /// * `scope` - The scope to request a token for
    async fn token(&self, client: &reqwest::Client, scope: &str) -> Result<AccessToken, Error> {
        // the metadata service takes a resource instead of a scope
        let resource = scope.trim_end_matches("/.default");
        // build our token request
        let mut req = client
            .get(&self.endpoint)
            .header("Metadata", "true")
            .query(&[("api-version", "2018-02-01"), ("resource", resource)]);
        // ask for a specific user assigned identity if one was set
        if let Some(client_id) = &self.client_id {
            req = req.query(&[("client_id", client_id.as_str())]);
        }
        // send our token request
        let resp = req
            .send()
            .await
            .map_err(|err| Error::Auth(format!("Metadata service is unreachable: {err}")))?;
        // a rejection here means no identity is assigned
        if !resp.status().is_success() {
            let raw = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "Metadata service rejected our token request: {raw}"
            )));
        }
        // cast the granted token
        let cast: ImdsTokenResponse = resp
            .json()
            .await
            .map_err(|err| Error::Auth(format!("Failed to parse token response: {err}")))?;
        // the metadata service reports expiry as a unix timestamp string
        let expires = cast
            .expires_on
            .and_then(|raw| raw.parse::<i64>().ok())
            .and_then(|stamp| DateTime::from_timestamp(stamp, 0));
        Ok(AccessToken::new(cast.access_token, expires))
    }

    fn name(&self) -> &'static str {
        "ManagedIdentity"
    }
}

/// A pre-issued bearer token used as a credential
pub struct StaticCredential {
    /// The token to hand out
    token: String,
}

impl StaticCredential {
    /// Create a new static credential
    ///
    /// # Arguments
    ///
    /// * `token` - The token to hand out
    #[must_use]
    pub fn new<T: Into<String>>(token: T) -> Self {
        StaticCredential {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenCredential for StaticCredential {
    /// Hand out our pre-issued token
    async fn token(&self, _client: &reqwest::Client, _scope: &str) -> Result<AccessToken, Error> {
        Ok(AccessToken::new(self.token.clone(), None))
    }

    fn name(&self) -> &'static str {
        "Static"
    }
}

/// A discovery chain over the other credentials
///
/// Service principal settings in the environment are preferred and the
/// managed identity endpoint is the fallback.
pub struct DefaultCredential {
    /// The credentials to try in order
    chain: Vec<Box<dyn TokenCredential>>,
}

impl DefaultCredential {
    /// Discover credentials from the environment
    #[must_use]
    pub fn new() -> Self {
        let mut chain: Vec<Box<dyn TokenCredential>> = Vec::with_capacity(2);
        // prefer an explicit service principal from the environment
        if let Some(secret) = ClientSecretCredential::from_env() {
            chain.push(Box::new(secret));
        }
        // fall back to the managed identity endpoint
        chain.push(Box::new(ManagedIdentityCredential::default()));
        DefaultCredential { chain }
    }
}

impl Default for DefaultCredential {
    fn default() -> Self {
        DefaultCredential::new()
    }
}

#[async_trait]
impl TokenCredential for DefaultCredential {
    /// Try each credential in our chain until one grants a token
    ///
    /// # Arguments
    ///
    /// * `client` - The client to send token requests with
    /// * `scope` - The scope to request a token for
    async fn token(&self, client: &reqwest::Client, scope: &str) -> Result<AccessToken, Error> {
        // track why each credential was skipped
        let mut skipped = Vec::with_capacity(self.chain.len());
        // try each credential in order
        for credential in &self.chain {
            match credential.token(client, scope).await {
                Ok(token) => {
                    // log which credential granted our token
                    event!(Level::DEBUG, credential = credential.name(), "Acquired token");
                    return Ok(token);
                }
                Err(err) => skipped.push(format!("{}: {}", credential.name(), err)),
            }
        }
        // no credential in our chain worked
        Err(Error::Auth(format!(
            "No credential in the discovery chain produced a token: {}",
            skipped.join("; ")
        )))
    }

    fn name(&self) -> &'static str {
        "Default"
    }
}
