use super::*;
use crate::test_utils::arb_messy_string;
use proptest::prelude::*;

/// Generates an arbitrary Config
fn arb_config() -> impl Strategy<Value = Config> {
    (
        arb_messy_string(),
        arb_messy_string(),
        any::<u64>(),
        any::<u64>(),
        prop::option::of(arb_messy_string()),
    )
        .prop_map(|(database_url, nasa_api_key, cache_duration_secs, session_lifetime_minutes, cors_origin)| Config {
            database_url,
            nasa_api_key,
            cache_duration_secs,
            session_lifetime_minutes,
            cors_origin,
            ..base_config(None)
        })
}

/// Generates an arbitrary ConfigUpdate over a subset of fields
fn arb_config_update() -> impl Strategy<Value = ConfigUpdate> {
    (
        prop::option::of(arb_messy_string()),
        prop::option::of(arb_messy_string()),
        prop::option::of(any::<u64>()),
        prop::option::of(any::<u64>()),
        prop::option::of(arb_messy_string()),
    )
        .prop_map(|(database_url, nasa_api_key, cache_duration_secs, session_lifetime_minutes, cors_origin)| ConfigUpdate {
            database_url,
            nasa_api_key,
            cache_duration_secs,
            session_lifetime_minutes,
            cors_origin,
            ..Default::default()
        })
}

proptest! {
    /// Applying an empty update leaves the config unchanged
    #[test]
    fn prop_apply_default_is_identity(config in arb_config()) {
        let updated = config.clone().apply_update(ConfigUpdate::default());
        prop_assert_eq!(updated, config);
    }

    /// Applying the same update twice is the same as applying it once
    #[test]
    fn prop_apply_update_is_idempotent(config in arb_config(), update in arb_config_update()) {
        let once = config.clone().apply_update(update.clone());
        let twice = once.clone().apply_update(update);
        prop_assert_eq!(once, twice);
    }

    /// Every field set in an update wins over the existing value
    #[test]
    fn prop_update_fields_take_precedence(config in arb_config(), update in arb_config_update()) {
        let updated = config.clone().apply_update(update.clone());

        prop_assert_eq!(updated.database_url, update.database_url.unwrap_or(config.database_url));
        prop_assert_eq!(updated.nasa_api_key, update.nasa_api_key.unwrap_or(config.nasa_api_key));
        prop_assert_eq!(updated.cache_duration_secs, update.cache_duration_secs.unwrap_or(config.cache_duration_secs));
        prop_assert_eq!(updated.cors_origin, update.cors_origin.or(config.cors_origin));
    }

    /// A config written as TOML loads back as an update carrying the same values
    #[test]
    fn prop_toml_file_roundtrip(api_key in "[A-Za-z0-9]{1,40}", cache in 0u64..1_000_000) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, format!("nasa_api_key = \"{}\"\ncache_duration_secs = {}\n", api_key, cache)).unwrap();

        let update = config_from_file(Some(path)).unwrap();
        prop_assert_eq!(update.nasa_api_key, Some(api_key));
        prop_assert_eq!(update.cache_duration_secs, Some(cache));
    }
}
