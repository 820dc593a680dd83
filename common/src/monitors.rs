// Monitor configuration document loading and validation

use crate::errors::{ConfigError, ConfigParseError, ConfigValidationError};
use crate::models::{ConnectionConfig, MonitorConfig};
use serde::Deserialize;
use std::collections::HashSet;

/// Wire shape of the configuration document held in the external store.
#[derive(Debug, Deserialize)]
struct MonitorDocument {
    connection_config: ConnectionConfig,
    monitor_configs: Vec<MonitorConfig>,
}

/// Parse and validate a raw monitor configuration document.
///
/// Pure transformation: the `enabled` flag is surfaced verbatim for the
/// scheduler to filter on, nothing is filtered here. Failure modes split
/// into [`ConfigParseError`] for documents that are not well-formed JSON
/// and [`ConfigValidationError`] for well-formed documents that are
/// missing fields, mistyped, or violate an invariant.
pub fn load(raw: &str) -> Result<(ConnectionConfig, Vec<MonitorConfig>), ConfigError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| ConfigParseError(e.to_string()))?;

    let document: MonitorDocument = serde_json::from_value(value)
        .map_err(|e| ConfigValidationError::InvalidDocument(e.to_string()))?;

    validate(&document.connection_config, &document.monitor_configs)?;

    Ok((document.connection_config, document.monitor_configs))
}

fn validate(
    connection: &ConnectionConfig,
    monitors: &[MonitorConfig],
) -> Result<(), ConfigValidationError> {
    require_non_empty("connection_config.app_base_url", &connection.app_base_url)?;
    require_non_empty("connection_config.monitor_path", &connection.monitor_path)?;

    let mut enabled_collections = HashSet::new();

    for (index, monitor) in monitors.iter().enumerate() {
        let field = |name: &str| format!("monitor_configs[{index}].{name}");

        require_non_empty(&field("collection"), &monitor.collection)?;
        require_non_empty(&field("contract_address"), &monitor.contract_address)?;
        require_non_empty(&field("event_type"), &monitor.event_type)?;
        require_positive(&field("interval_ms"), monitor.interval_ms)?;
        require_positive(&field("events_limit_each_call"), monitor.events_limit_each_call)?;
        require_positive(&field("max_events_to_gather"), monitor.max_events_to_gather)?;

        // Enabled collections double as job identity, so they must be unique.
        // Disabled entries never become jobs and may repeat freely.
        if monitor.enabled && !enabled_collections.insert(monitor.collection.as_str()) {
            return Err(ConfigValidationError::DuplicateCollection(
                monitor.collection.clone(),
            ));
        }
    }

    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> Result<(), ConfigValidationError> {
    if value.trim().is_empty() {
        return Err(ConfigValidationError::InvalidFieldValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn require_positive<T: Into<u64> + Copy>(
    field: &str,
    value: T,
) -> Result<(), ConfigValidationError> {
    if value.into() == 0 {
        return Err(ConfigValidationError::InvalidFieldValue {
            field: field.to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn monitor_entry(collection: &str, enabled: bool) -> serde_json::Value {
        json!({
            "collection": collection,
            "contract_address": "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d",
            "event_type": "created",
            "interval_ms": 60_000,
            "events_limit_each_call": 50,
            "max_events_to_gather": 500,
            "discord_webhook_tokens": ["token-a", "token-b"],
            "enabled": enabled
        })
    }

    fn document(monitors: Vec<serde_json::Value>) -> String {
        json!({
            "connection_config": {
                "app_base_url": "svc.internal",
                "monitor_path": "api/v1"
            },
            "monitor_configs": monitors
        })
        .to_string()
    }

    #[test]
    fn test_load_valid_document() {
        let raw = document(vec![
            monitor_entry("bored-apes", true),
            monitor_entry("cool-cats", false),
        ]);

        let (connection, monitors) = load(&raw).unwrap();
        assert_eq!(connection.app_base_url, "svc.internal");
        assert_eq!(connection.monitor_path, "api/v1");
        assert_eq!(monitors.len(), 2);
        assert!(monitors[0].enabled);
        assert!(!monitors[1].enabled);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = load("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_field_is_validation_error() {
        let raw = json!({
            "connection_config": { "app_base_url": "svc.internal", "monitor_path": "api/v1" },
            "monitor_configs": [{ "collection": "bored-apes", "enabled": true }]
        })
        .to_string();

        let result = load(&raw);
        assert!(matches!(
            result,
            Err(ConfigError::Validation(ConfigValidationError::InvalidDocument(_)))
        ));
    }

    #[test]
    fn test_mistyped_field_is_validation_error() {
        let mut entry = monitor_entry("bored-apes", true);
        entry["interval_ms"] = json!("sixty seconds");
        let result = load(&document(vec![entry]));
        assert!(matches!(
            result,
            Err(ConfigError::Validation(ConfigValidationError::InvalidDocument(_)))
        ));
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut entry = monitor_entry("bored-apes", true);
        entry["interval_ms"] = json!(0);
        let result = load(&document(vec![entry]));
        match result {
            Err(ConfigError::Validation(ConfigValidationError::InvalidFieldValue {
                field, ..
            })) => assert_eq!(field, "monitor_configs[0].interval_ms"),
            other => panic!("expected invalid field value, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_limits_are_rejected() {
        for limit_field in ["events_limit_each_call", "max_events_to_gather"] {
            let mut entry = monitor_entry("bored-apes", true);
            entry[limit_field] = json!(0);
            let result = load(&document(vec![entry]));
            assert!(
                matches!(
                    result,
                    Err(ConfigError::Validation(
                        ConfigValidationError::InvalidFieldValue { .. }
                    ))
                ),
                "{limit_field} = 0 should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_collection_name_is_rejected() {
        let result = load(&document(vec![monitor_entry("  ", true)]));
        assert!(matches!(
            result,
            Err(ConfigError::Validation(
                ConfigValidationError::InvalidFieldValue { .. }
            ))
        ));
    }

    #[test]
    fn test_empty_base_url_is_rejected() {
        let raw = json!({
            "connection_config": { "app_base_url": "", "monitor_path": "api/v1" },
            "monitor_configs": []
        })
        .to_string();
        assert!(matches!(
            load(&raw),
            Err(ConfigError::Validation(
                ConfigValidationError::InvalidFieldValue { .. }
            ))
        ));
    }

    #[test]
    fn test_duplicate_enabled_collections_are_rejected() {
        let raw = document(vec![
            monitor_entry("bored-apes", true),
            monitor_entry("bored-apes", true),
        ]);
        let result = load(&raw);
        match result {
            Err(ConfigError::Validation(ConfigValidationError::DuplicateCollection(name))) => {
                assert_eq!(name, "bored-apes")
            }
            other => panic!("expected duplicate collection error, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_disabled_collections_are_allowed() {
        let raw = document(vec![
            monitor_entry("bored-apes", true),
            monitor_entry("bored-apes", false),
            monitor_entry("bored-apes", false),
        ]);
        assert!(load(&raw).is_ok());
    }

    #[test]
    fn test_empty_monitor_list_is_valid() {
        let raw = document(vec![]);
        let (_, monitors) = load(&raw).unwrap();
        assert!(monitors.is_empty());
    }
}
