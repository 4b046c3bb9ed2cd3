// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `scimitar` - inspect SCIM filter compilation and PATCH application offline.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scimitar_scim::{
	apply_patch, compile_filter, normalize_roles_primary, Document, PatchOperation, PatchRequest,
};
use scimitar_server_config::{LogFormat, ServerConfig};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "scimitar", about = "SCIM filter and PATCH tooling", version)]
struct Args {
	/// Server configuration file. Defaults to /etc/scimitar/server.toml when present.
	#[arg(long, global = true, env = "SCIMITAR_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Print the store query document a filter compiles to
	Filter {
		/// Filter expression, e.g. `userName eq "bjensen"`
		expression: String,
	},
	/// Apply PATCH operations to a resource document and print the result
	Patch {
		/// JSON file holding the resource document
		#[arg(long)]
		document: PathBuf,
		/// JSON file holding a PatchOp request or a bare array of operations
		#[arg(long)]
		operations: PathBuf,
	},
	/// Show version information
	Version,
}

fn main() -> Result<()> {
	let args = Args::parse();

	if let Command::Version = args.command {
		println!("scimitar {}", env!("CARGO_PKG_VERSION"));
		return Ok(());
	}

	let config = match &args.config {
		Some(path) => scimitar_server_config::load_config_with_file(path),
		None => scimitar_server_config::load_config(),
	}
	.context("failed to load configuration")?;
	init_tracing(&config);

	match args.command {
		Command::Filter { expression } => {
			let predicate = compile_filter(Some(&expression));
			tracing::debug!(filter = %expression, ?predicate, "compiled filter");
			println!(
				"{}",
				serde_json::to_string_pretty(&predicate.to_query_document())?
			);
		}
		Command::Patch {
			document,
			operations,
		} => {
			let patched = patch_file(&document, &operations)?;
			println!("{}", serde_json::to_string_pretty(&patched)?);
		}
		Command::Version => {}
	}
	Ok(())
}

fn init_tracing(config: &ServerConfig) {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	match config.logging.format {
		LogFormat::Json => registry
			.with(
				tracing_subscriber::fmt::layer()
					.json()
					.with_writer(std::io::stderr),
			)
			.init(),
		LogFormat::Pretty => registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init(),
	}
}

fn read_json(path: &Path) -> Result<Value> {
	let raw = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read {}", path.display()))?;
	serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn patch_file(document: &Path, operations: &Path) -> Result<Value> {
	let Value::Object(mut resource) = read_json(document)? else {
		bail!("{} must contain a JSON object", document.display());
	};
	let operations = parse_operations(&read_json(operations)?)?;
	apply_and_normalize(&mut resource, &operations);
	Ok(Value::Object(resource))
}

fn parse_operations(body: &Value) -> Result<Vec<PatchOperation>> {
	if body.is_array() {
		return serde_json::from_value(body.clone()).context("invalid patch operation");
	}
	Ok(PatchRequest::from_value(body)?.operations)
}

fn apply_and_normalize(resource: &mut Document, operations: &[PatchOperation]) {
	apply_patch(resource, operations);
	normalize_roles_primary(resource);
	tracing::info!(operations = operations.len(), "applied patch");
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use std::io::Write;

	fn write_json(value: &Value) -> tempfile::NamedTempFile {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		write!(file, "{value}").unwrap();
		file
	}

	#[test]
	fn test_args_parse() {
		let args = Args::parse_from(["scimitar", "filter", "userName eq \"bjensen\""]);
		assert!(matches!(args.command, Command::Filter { .. }));

		let args = Args::parse_from([
			"scimitar",
			"--config",
			"/tmp/server.toml",
			"patch",
			"--document",
			"user.json",
			"--operations",
			"ops.json",
		]);
		assert_eq!(args.config, Some(PathBuf::from("/tmp/server.toml")));
		assert!(matches!(args.command, Command::Patch { .. }));
	}

	#[test]
	fn test_parse_operations_accepts_both_shapes() {
		let bare = json!([{"op": "add", "path": "title", "value": "Dr"}]);
		assert_eq!(parse_operations(&bare).unwrap().len(), 1);

		let request = json!({"Operations": [{"op": "remove", "path": "title"}]});
		assert_eq!(parse_operations(&request).unwrap().len(), 1);

		assert!(parse_operations(&json!({"Operations": 3})).is_err());
		assert!(parse_operations(&json!([{"op": "move"}])).is_err());
	}

	#[test]
	fn test_patch_file() {
		let document = write_json(&json!({
			"userName": "bjensen",
			"roles": [{"value": "a", "primary": true}]
		}));
		let operations = write_json(&json!({
			"Operations": [
				{"op": "add", "path": "roles", "value": {"value": "b", "primary": "true"}},
				{"op": "replace", "path": "title", "value": "Tour Guide"}
			]
		}));

		let patched = patch_file(document.path(), operations.path()).unwrap();
		assert_eq!(patched["title"], "Tour Guide");
		assert_eq!(patched["roles"][0]["primary"], true);
		assert_eq!(patched["roles"][1]["primary"], false);
	}

	#[test]
	fn test_patch_file_rejects_non_object_document() {
		let document = write_json(&json!([1, 2, 3]));
		let operations = write_json(&json!([]));
		assert!(patch_file(document.path(), operations.path()).is_err());
	}
}
