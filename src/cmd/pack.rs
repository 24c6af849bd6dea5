use std::path::PathBuf;

use nestpack::{PackOptions, pack_with};

use crate::cmd::json::value_from_json;
use crate::cmd::{CliError, Result};

#[derive(clap::Args)]
pub struct Args {
	pub input: PathBuf,
	pub output: PathBuf,
	#[arg(long = "no-compression")]
	pub no_compression: bool,
	#[arg(long)]
	pub level: Option<i32>,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Read a JSON document and pack it into `output`.
pub fn run(args: Args) -> Result<()> {
	let Args {
		input,
		output,
		no_compression,
		level,
		max_depth,
	} = args;

	let raw = std::fs::read(&input).map_err(|source| CliError::Read {
		path: input.display().to_string(),
		source,
	})?;
	let json: serde_json::Value = serde_json::from_slice(&raw).map_err(|source| CliError::Json {
		path: input.display().to_string(),
		source,
	})?;

	let defaults = PackOptions::default();
	let options = PackOptions {
		compression: !no_compression,
		compression_level: level.unwrap_or(defaults.compression_level),
		max_depth: max_depth.unwrap_or(defaults.max_depth),
	};
	pack_with(&value_from_json(&json), &output, &options)?;

	println!("wrote: {}", output.display());
	Ok(())
}
