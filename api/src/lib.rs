//! Models, client, and credential providers for Azure ML compute clusters

#[macro_use]
extern crate serde_derive;

pub mod conf;
pub mod models;
pub mod utils;

// expose the client if that feature is enabled
#[cfg(feature = "client")]
pub mod client;
#[cfg(feature = "client")]
pub use client::{AzureMl, ClientSettings, DefaultCredential, Error, StaticCredential, TokenCredential};

pub use conf::LogLevel;
