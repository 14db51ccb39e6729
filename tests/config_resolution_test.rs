//! Asset → environment → default resolution for the Control Room settings.

use async_trait::async_trait;
use sso_launcher_lib::assets::AssetStore;
use sso_launcher_lib::config::{
    ConfigKey, ControlRoomSettings, Resolver, ValueSource, CONTROL_ROOM_PROCESS_NAME,
    CONTROL_ROOM_SUBDOMAIN, CONTROL_ROOM_URL,
};
use sso_launcher_lib::error::{LauncherError, Result};
use std::collections::HashMap;

const ALL_KEYS: [ConfigKey; 3] = [CONTROL_ROOM_URL, CONTROL_ROOM_SUBDOMAIN, CONTROL_ROOM_PROCESS_NAME];

/// Fixed asset map
struct MapAssets(HashMap<String, String>);

#[async_trait]
impl AssetStore for MapAssets {
    async fn get_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self.0.get(name).cloned())
    }
}

/// Store that cannot be reached
struct DownAssets;

#[async_trait]
impl AssetStore for DownAssets {
    async fn get_text(&self, _name: &str) -> Result<Option<String>> {
        Err(LauncherError::Asset("connection refused".to_string()))
    }
}

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_defaults_when_nothing_is_set() {
    let env: HashMap<String, String> = HashMap::new();
    let assets = MapAssets(HashMap::new());
    let resolver = Resolver::new(Some(&assets as &dyn AssetStore), &env);

    let settings = resolver.resolve_settings().await.unwrap();
    assert_eq!(
        settings,
        ControlRoomSettings {
            url: "https://cloud.robocorp.com/".to_string(),
            subdomain: "eu1-acme".to_string(),
            process_name: "Demo".to_string(),
        }
    );
}

#[tokio::test]
async fn test_asset_wins_over_env_and_default() {
    for key in ALL_KEYS {
        let env = map(&[(key.name, "from-env")]);
        let assets = MapAssets(map(&[(key.name, "from-asset")]));
        let resolver = Resolver::new(Some(&assets as &dyn AssetStore), &env);

        let resolved = resolver.resolve(&key).await.unwrap();
        assert_eq!(resolved.value, "from-asset", "{}", key.name);
        assert_eq!(resolved.source, ValueSource::Asset);
    }
}

#[tokio::test]
async fn test_env_used_when_asset_missing() {
    for key in ALL_KEYS {
        let env = map(&[(key.name, "from-env")]);
        let assets = MapAssets(HashMap::new());
        let resolver = Resolver::new(Some(&assets as &dyn AssetStore), &env);

        let resolved = resolver.resolve(&key).await.unwrap();
        assert_eq!(resolved.value, "from-env", "{}", key.name);
        assert_eq!(resolved.source, ValueSource::Env);
    }
}

#[tokio::test]
async fn test_env_used_when_store_unreachable() {
    for key in ALL_KEYS {
        let env = map(&[(key.name, "from-env")]);
        let resolver = Resolver::new(Some(&DownAssets as &dyn AssetStore), &env);

        let resolved = resolver.resolve(&key).await.unwrap();
        assert_eq!(resolved.value, "from-env", "{}", key.name);
    }
}

#[tokio::test]
async fn test_default_when_store_unreachable_and_env_unset() {
    let env: HashMap<String, String> = HashMap::new();
    let resolver = Resolver::new(Some(&DownAssets as &dyn AssetStore), &env);

    for key in ALL_KEYS {
        let resolved = resolver.resolve(&key).await.unwrap();
        assert_eq!(resolved.value, key.default);
        assert_eq!(resolved.source, ValueSource::Default);
    }
}

#[tokio::test]
async fn test_keys_resolve_independently() {
    let env = map(&[("CONTROL_ROOM_SUBDOMAIN", "us1-contoso")]);
    let assets = MapAssets(map(&[("CONTROL_ROOM_PROCESS_NAME", "Nightly")]));
    let resolver = Resolver::new(Some(&assets as &dyn AssetStore), &env);

    let settings = resolver.resolve_settings().await.unwrap();
    assert_eq!(settings.url, "https://cloud.robocorp.com/");
    assert_eq!(settings.subdomain, "us1-contoso");
    assert_eq!(settings.process_name, "Nightly");
}

#[tokio::test]
async fn test_without_asset_store_env_then_default() {
    let env = map(&[("CONTROL_ROOM_URL", "https://eu1.cloud.example.com/")]);
    let resolver = Resolver::new(None, &env);

    let url = resolver.resolve(&CONTROL_ROOM_URL).await.unwrap();
    assert_eq!(url.value, "https://eu1.cloud.example.com/");
    let name = resolver.resolve(&CONTROL_ROOM_PROCESS_NAME).await.unwrap();
    assert_eq!(name.value, "Demo");
}
