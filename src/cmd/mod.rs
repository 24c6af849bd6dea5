use nestpack::store::StoreError;
use nestpack::{DecodeError, EncodeError};

/// Container listing with header and node counts.
pub mod info;
/// JSON document to value conversion and back.
pub mod json;
/// JSON to container command.
pub mod pack;
/// Node tree listing.
pub mod tree;
/// Container to JSON command.
pub mod unpack;
/// Shared output helpers.
pub mod util;

/// Result alias for command entry points.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failures surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
	/// Packing failed.
	#[error(transparent)]
	Encode(#[from] EncodeError),
	/// Unpacking failed.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Container could not be opened.
	#[error(transparent)]
	Store(#[from] StoreError),
	/// Input document could not be read.
	#[error("cannot read {path}: {source}")]
	Read {
		/// Input path.
		path: String,
		/// IO failure.
		source: std::io::Error,
	},
	/// Input document is not valid JSON.
	#[error("invalid JSON in {path}: {source}")]
	Json {
		/// Input path.
		path: String,
		/// Parse failure.
		source: serde_json::Error,
	},
}
