//! An error from the Azure ML client

use reqwest::StatusCode;

use crate::models::{CloudError, CloudErrorBody, InvalidSpec, ProvisioningState};

/// An error from the Azure ML client
#[derive(Debug)]
pub enum Error {
    /// An error response from the Azure control plane
    Azure {
        code: StatusCode,
        error: Option<CloudErrorBody>,
    },
    /// A generic error with a message
    Generic(String),
    /// An error from discovering credentials or acquiring a token
    Auth(String),
    /// A compute spec that failed local validation
    InvalidSpec(InvalidSpec),
    /// A compute that reached a terminal failed state while provisioning
    Provisioning {
        name: String,
        state: ProvisioningState,
        errors: Vec<CloudErrorBody>,
    },
    /// An error from sending or receiving a request
    Reqwest(reqwest::Error),
    /// An IO Error
    IO(std::io::Error),
    /// An error from converting a value with serde
    Serde(serde_json::Error),
    /// An error from parsing a URL
    UrlParse(url::ParseError),
}

impl Error {
    /// Create a new generic error
    ///
    /// # Arguments
    ///
    /// * `msg` - The error message to set
    pub fn new<T: Into<String>>(msg: T) -> Self {
        Error::Generic(msg.into())
    }

    /// Build an error from an error response
    ///
    /// This parses the control plane's error envelope out of the body when
    /// one is present and keeps the raw body otherwise.
    ///
    /// # Arguments
    ///
    /// * `resp` - The error response to build an error from
    pub async fn from_response(resp: reqwest::Response) -> Self {
        // get this responses status
        let code = resp.status();
        // try to read the body of this response
        let raw = resp.text().await.ok().filter(|body| !body.is_empty());
        // try to parse the error envelope out of the body
        let error = raw.map(|raw| match serde_json::from_str::<CloudError>(&raw) {
            Ok(wrapped) => wrapped.error,
            // keep the raw body when its not a structured error
            Err(_) => CloudErrorBody {
                code: "Unknown".to_owned(),
                message: raw,
            },
        });
        Error::Azure { code, error }
    }

    /// Whether this error is a definitive not found from the control plane
    ///
    /// Transient failures never map to this so they can not be mistaken for
    /// an absent resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Azure { code, .. } => *code == StatusCode::NOT_FOUND,
            _ => false,
        }
    }

    /// Get the status code from this error if one exists
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        // get the status code from any error types that support it
        match self {
            Error::Azure { code, .. } => Some(code.to_owned()),
            Error::Reqwest(err) => err.status(),
            _ => None,
        }
    }

    /// Get the error message for this error if one exists
    #[must_use]
    pub fn msg(&self) -> Option<String> {
        // get the msg from any error types that support it
        match self {
            Error::Azure { error, .. } => error.as_ref().map(ToString::to_string),
            Error::Generic(msg) => Some(msg.clone()),
            Error::Auth(msg) => Some(msg.clone()),
            Error::InvalidSpec(err) => Some(err.msg.clone()),
            Error::Provisioning {
                name,
                state,
                errors,
            } => {
                // fold the control plane's recorded errors into one message
                let folded = errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<String>>()
                    .join("; ");
                Some(format!(
                    "Provisioning of {name} ended in state {state}: {folded}"
                ))
            }
            Error::Reqwest(err) => Some(err.to_string()),
            Error::IO(err) => Some(err.to_string()),
            Error::Serde(err) => Some(err.to_string()),
            Error::UrlParse(err) => Some(err.to_string()),
        }
    }

    /// Get the kind of error as a str
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Azure { .. } => "Azure",
            Error::Generic(_) => "Generic",
            Error::Auth(_) => "Auth",
            Error::InvalidSpec(_) => "InvalidSpec",
            Error::Provisioning { .. } => "Provisioning",
            Error::Reqwest(_) => "Reqwest",
            Error::IO(_) => "IO",
            Error::Serde(_) => "Serde",
            Error::UrlParse(_) => "UrlParse",
        }
    }
}

impl std::fmt::Display for Error {
    /// Display this error in a easy readable format
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.status(), self.msg()) {
            (Some(code), Some(msg)) => write!(f, "Code: {} Error: {}", code, msg),
            (None, Some(msg)) => write!(f, "Error: {}", msg),
            (Some(code), None) => write!(f, "Code: {}", code),
            (None, None) => write!(f, "Kind: {}", self.kind()),
        }
    }
}

// mark that this is an error struct
impl std::error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::Reqwest(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serde(error)
    }
}

impl From<url::ParseError> for Error {
    fn from(error: url::ParseError) -> Self {
        Error::UrlParse(error)
    }
}

impl From<InvalidSpec> for Error {
    fn from(error: InvalidSpec) -> Self {
        Error::InvalidSpec(error)
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use reqwest::StatusCode;

    /// Only a definitive 404 may look like an absent resource
    #[test]
    fn not_found_detection() {
        let missing = Error::Azure {
            code: StatusCode::NOT_FOUND,
            error: None,
        };
        assert!(missing.is_not_found());
        // transient failures must never be mistaken for absence
        let throttled = Error::Azure {
            code: StatusCode::TOO_MANY_REQUESTS,
            error: None,
        };
        assert!(!throttled.is_not_found());
        assert!(!Error::new("boom").is_not_found());
    }
}
