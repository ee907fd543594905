use crate::config::types::{Config, DeliveryConfig, FeedGroup, StorageConfig};
use crate::ConfigError;
use std::collections::HashMap;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_delivery_config(&config.delivery)?;
    validate_storage_config(&config.storage)?;
    validate_feed_groups(&config.feeds)?;
    Ok(())
}

/// Validates delivery configuration
fn validate_delivery_config(config: &DeliveryConfig) -> Result<(), ConfigError> {
    if config.drop_dir.is_empty() {
        return Err(ConfigError::Validation(
            "drop_dir cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.contains(std::path::is_separator) {
        return Err(ConfigError::Validation(format!(
            "file_prefix must not contain a path separator, got '{}'",
            config.file_prefix
        )));
    }

    if config.max_write_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_write_attempts must be >= 1, got {}",
            config.max_write_attempts
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.snapshot_path.is_empty() {
        return Err(ConfigError::Validation(
            "snapshot_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates feed groups and rejects a URL bound to two different chats
fn validate_feed_groups(groups: &[FeedGroup]) -> Result<(), ConfigError> {
    let mut destinations: HashMap<&str, i64> = HashMap::new();

    for group in groups {
        if group.urls.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Feed group for chat {} must have at least one URL",
                group.chat
            )));
        }

        for feed_url in &group.urls {
            validate_feed_url(feed_url)?;

            match destinations.get(feed_url.as_str()) {
                Some(&first) if first != group.chat => {
                    return Err(ConfigError::ConflictingDestination {
                        url: feed_url.clone(),
                        first,
                        second: group.chat,
                    });
                }
                Some(_) => {}
                None => {
                    destinations.insert(feed_url, group.chat);
                }
            }
        }
    }

    Ok(())
}

/// Validates a single feed URL
fn validate_feed_url(feed_url: &str) -> Result<(), ConfigError> {
    let url = Url::parse(feed_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid feed URL '{}': {}", feed_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "Feed URL '{}' must use http or https, got '{}'",
            feed_url, other
        ))),
    }
}
