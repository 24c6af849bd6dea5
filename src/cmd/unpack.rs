use std::path::PathBuf;

use nestpack::{UnpackOptions, unpack_with};

use crate::cmd::Result;
use crate::cmd::json::value_to_json;
use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long = "max-depth")]
	pub max_depth: Option<u32>,
}

/// Decode a container and print its value as JSON.
pub fn run(args: Args) -> Result<()> {
	let mut options = UnpackOptions::default();
	if let Some(max_depth) = args.max_depth {
		options.max_depth = max_depth;
	}

	let value = unpack_with(&args.path, &options)?;
	emit_json(&value_to_json(&value));
	Ok(())
}
