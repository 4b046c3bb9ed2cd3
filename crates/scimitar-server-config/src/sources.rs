// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{LogFormat, LoggingConfigLayer, ScimConfigLayer, StoreConfigLayer};

/// Default location of the system configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/scimitar/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new(SYSTEM_CONFIG_PATH)
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: SCIMITAR_SERVER_<SECTION>_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			store: Some(load_store_from_env()),
			scim: Some(load_scim_from_env()?),
			logging: Some(load_logging_from_env()?),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_u32(name: &str) -> Result<Option<u32>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u32 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid u64 value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_store_from_env() -> StoreConfigLayer {
	StoreConfigLayer {
		uri: env_var("SCIMITAR_SERVER_STORE_URI"),
		database: env_var("SCIMITAR_SERVER_STORE_DATABASE"),
	}
}

fn load_scim_from_env() -> Result<ScimConfigLayer, ConfigError> {
	Ok(ScimConfigLayer {
		base_url: env_var("SCIMITAR_SERVER_BASE_URL"),
		max_results: env_u64("SCIMITAR_SERVER_SCIM_MAX_RESULTS")?,
		default_count: env_u64("SCIMITAR_SERVER_SCIM_DEFAULT_COUNT")?,
		bulk_max_operations: env_u32("SCIMITAR_SERVER_SCIM_BULK_MAX_OPERATIONS")?,
		bulk_max_payload_size: env_u64("SCIMITAR_SERVER_SCIM_BULK_MAX_PAYLOAD_SIZE")?,
	})
}

fn load_logging_from_env() -> Result<LoggingConfigLayer, ConfigError> {
	let format = match env_var("SCIMITAR_SERVER_LOG_FORMAT") {
		Some(v) => Some(v.parse::<LogFormat>().map_err(|message| {
			ConfigError::InvalidValue {
				key: "SCIMITAR_SERVER_LOG_FORMAT".to_string(),
				message,
			}
		})?),
		None => None,
	};
	Ok(LoggingConfigLayer {
		level: env_var("SCIMITAR_SERVER_LOG_LEVEL"),
		format,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Environment > Precedence::ConfigFile);
		assert!(Precedence::ConfigFile > Precedence::Defaults);
	}

	#[test]
	fn test_defaults_source_returns_empty_layer() {
		let layer = DefaultsSource.load().unwrap();
		assert!(layer.store.is_none());
		assert!(layer.scim.is_none());
	}

	#[test]
	fn test_toml_source_missing_file_returns_empty() {
		let layer = TomlSource::new("/nonexistent/server.toml").load().unwrap();
		assert!(layer.scim.is_none());
	}

	#[test]
	fn test_toml_source_reads_sections() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			r#"
[store]
database = "directory"

[scim]
base_url = "https://scim.example.com"
max_results = 250

[logging]
level = "debug"
format = "json"
"#
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		assert_eq!(
			layer.store.unwrap().database.as_deref(),
			Some("directory")
		);
		let scim = layer.scim.unwrap();
		assert_eq!(scim.base_url.as_deref(), Some("https://scim.example.com"));
		assert_eq!(scim.max_results, Some(250));
		let logging = layer.logging.unwrap();
		assert_eq!(logging.format, Some(LogFormat::Json));
	}

	#[test]
	fn test_toml_source_parse_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "[scim\nmax_results = ").unwrap();
		let result = TomlSource::new(file.path()).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_env_u64_rejects_garbage() {
		std::env::set_var("SCIMITAR_TEST_ENV_U64_GARBAGE", "lots");
		let result = env_u64("SCIMITAR_TEST_ENV_U64_GARBAGE");
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
		std::env::remove_var("SCIMITAR_TEST_ENV_U64_GARBAGE");
	}

	#[test]
	fn test_env_var_ignores_empty() {
		std::env::set_var("SCIMITAR_TEST_ENV_EMPTY", "");
		assert!(env_var("SCIMITAR_TEST_ENV_EMPTY").is_none());
		std::env::remove_var("SCIMITAR_TEST_ENV_EMPTY");
	}
}
