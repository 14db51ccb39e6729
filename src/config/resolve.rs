//! Control Room settings lookup.
//!
//! Each key is tried against asset storage, then the process environment,
//! then a compiled-in default. A tier that errors or comes back empty hands
//! over to the next one.

use crate::assets::AssetStore;
use crate::error::{LauncherError, Result};
use std::collections::HashMap;
use std::fmt;

/// A setting name together with its last-resort value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigKey {
    pub name: &'static str,
    pub default: &'static str,
}

pub const CONTROL_ROOM_URL: ConfigKey = ConfigKey {
    name: "CONTROL_ROOM_URL",
    default: "https://cloud.robocorp.com/",
};

pub const CONTROL_ROOM_SUBDOMAIN: ConfigKey = ConfigKey {
    name: "CONTROL_ROOM_SUBDOMAIN",
    default: "eu1-acme",
};

pub const CONTROL_ROOM_PROCESS_NAME: ConfigKey = ConfigKey {
    name: "CONTROL_ROOM_PROCESS_NAME",
    default: "Demo",
};

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Asset,
    Env,
    Default,
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueSource::Asset => "asset",
            ValueSource::Env => "env",
            ValueSource::Default => "default",
        };
        f.write_str(s)
    }
}

/// Lookup order, first non-empty value wins.
const TIERS: [ValueSource; 3] = [ValueSource::Asset, ValueSource::Env, ValueSource::Default];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: ValueSource,
}

/// Environment variable lookup, swappable in tests.
pub trait EnvLookup: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// The three settings one run needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRoomSettings {
    pub url: String,
    pub subdomain: String,
    pub process_name: String,
}

pub struct Resolver<'a> {
    assets: Option<&'a dyn AssetStore>,
    env: &'a dyn EnvLookup,
}

impl<'a> Resolver<'a> {
    /// `assets` is `None` when asset storage is not configured for this run.
    pub fn new(assets: Option<&'a dyn AssetStore>, env: &'a dyn EnvLookup) -> Self {
        Self { assets, env }
    }

    pub async fn resolve(&self, key: &ConfigKey) -> Result<Resolved> {
        for source in TIERS {
            if let Some(value) = self.lookup(source, key).await {
                tracing::debug!("Resolved {} from {}", key.name, source);
                return Ok(Resolved { value, source });
            }
        }
        Err(LauncherError::ConfigFallbackExhausted(key.name))
    }

    async fn lookup(&self, source: ValueSource, key: &ConfigKey) -> Option<String> {
        let value = match source {
            ValueSource::Asset => {
                let assets = self.assets?;
                match assets.get_text(key.name).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::warn!("Asset lookup for {} failed, falling back: {}", key.name, e);
                        None
                    }
                }
            }
            ValueSource::Env => self.env.var(key.name),
            ValueSource::Default => Some(key.default.to_string()),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Resolve all three settings, each independently.
    pub async fn resolve_settings(&self) -> Result<ControlRoomSettings> {
        Ok(ControlRoomSettings {
            url: self.resolve(&CONTROL_ROOM_URL).await?.value,
            subdomain: self.resolve(&CONTROL_ROOM_SUBDOMAIN).await?.value,
            process_name: self.resolve(&CONTROL_ROOM_PROCESS_NAME).await?.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_env_value_falls_through() {
        let env: HashMap<String, String> =
            [("CONTROL_ROOM_SUBDOMAIN".to_string(), "  ".to_string())].into();
        let resolver = Resolver::new(None, &env);

        let resolved = resolver.resolve(&CONTROL_ROOM_SUBDOMAIN).await.unwrap();
        assert_eq!(resolved.source, ValueSource::Default);
        assert_eq!(resolved.value, "eu1-acme");
    }

    #[tokio::test]
    async fn test_empty_default_exhausts() {
        let env: HashMap<String, String> = HashMap::new();
        let resolver = Resolver::new(None, &env);
        let key = ConfigKey {
            name: "UNSET",
            default: "",
        };

        let err = resolver.resolve(&key).await.unwrap_err();
        assert!(matches!(err, LauncherError::ConfigFallbackExhausted("UNSET")));
    }
}
