//! Connection parameters of the hosted backend

use std::env;

/// Placeholder endpoint shipped in sample environment files
pub const PLACEHOLDER_URL: &str = "https://your-project.supabase.co";
/// Placeholder access key shipped in sample environment files
pub const PLACEHOLDER_ANON_KEY: &str = "your-anon-key";

const URL_VARS: [&str; 2] = ["SUPABASE_URL", "VITE_SUPABASE_URL"];
const KEY_VARS: [&str; 2] = ["SUPABASE_ANON_KEY", "VITE_SUPABASE_ANON_KEY"];

/// Endpoint and access key of the hosted backend
#[derive(Debug, Clone, Default)]
pub struct RemoteConfig {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl RemoteConfig {
    /// Read the connection parameters from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the connection parameters through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // blank values fall through to the next alias
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
        };
        Self {
            url: first(&URL_VARS).map(|url| url.trim().trim_end_matches('/').to_string()),
            anon_key: first(&KEY_VARS).map(|key| key.trim().to_string()),
        }
    }

    /// True only when both values are present and neither is a placeholder
    pub fn is_configured(&self) -> bool {
        match (self.url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) => {
                !url.is_empty()
                    && !key.is_empty()
                    && url != PLACEHOLDER_URL
                    && key != PLACEHOLDER_ANON_KEY
            }
            _ => false,
        }
    }
}
