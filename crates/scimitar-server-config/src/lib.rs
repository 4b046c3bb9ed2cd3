// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the scimitar provisioning service.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`SCIMITAR_SERVER_*`)
//!
//! # Usage
//!
//! ```ignore
//! use scimitar_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("SCIM resources served under {}", config.scim.base_url);
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::{debug, info};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub store: StoreConfig,
	pub scim: ScimConfig,
	pub logging: LoggingConfig,
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`SCIMITAR_SERVER_*`)
/// 2. Config file (`/etc/scimitar/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let mut merged = ServerConfigLayer::default();
	merged.merge(EnvSource.load()?);
	finalize(merged)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let store = layer.store.unwrap_or_default().finalize();
	let scim = layer.scim.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&scim)?;

	info!(
		store_uri = %store.uri,
		database = %store.database,
		base_url = %scim.base_url,
		max_results = scim.max_results,
		bulk_max_operations = scim.bulk_max_operations,
		log_format = %logging.format,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		store,
		scim,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(scim: &ScimConfig) -> Result<(), ConfigError> {
	if scim.default_count > scim.max_results {
		return Err(ConfigError::Validation(format!(
			"scim.default_count ({}) exceeds scim.max_results ({})",
			scim.default_count, scim.max_results
		)));
	}
	if scim.bulk_max_operations == 0 {
		return Err(ConfigError::Validation(
			"scim.bulk_max_operations must be at least 1".to_string(),
		));
	}

	Ok(())
}
