//! Configuration module for SoundFlow
//!
//! This module contains the service settings, the hosted-backend connection
//! parameters and path management.

mod paths;
mod remote;
mod settings;

pub use paths::Paths;
pub use remote::RemoteConfig;
pub use settings::{LatencyProfile, Settings};
