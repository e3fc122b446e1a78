//! Utilities for the Azure ML provisioner

pub mod trace;
