use thiserror::Error;

use crate::codec::TypeTag;
use crate::codec::keys::IndexSetError;
use crate::store::StoreError;

/// Errors produced while packing a value.
#[derive(Debug, Error)]
pub enum EncodeError {
	/// A value kind is not allowed at this position.
	#[error("unsupported {tag} value at {path}: {reason}")]
	UnsupportedType {
		/// Node path.
		path: String,
		/// Tag of the offending value.
		tag: TypeTag,
		/// What the position requires.
		reason: &'static str,
	},
	/// Mapping keys of different types cannot be sorted together.
	#[error("cannot order {left} key against {right} key at {path}")]
	AmbiguousKeyOrder {
		/// Node path.
		path: String,
		/// Tag of the first key.
		left: TypeTag,
		/// Tag of the key that does not order against it.
		right: TypeTag,
	},
	/// Two mapping keys map to the same node name.
	#[error("duplicate key {name:?} at {path}")]
	DuplicateKey {
		/// Node path.
		path: String,
		/// Encoded key name.
		name: String,
	},
	/// Value nesting is deeper than allowed.
	#[error("nesting deeper than {max_depth} at {path}")]
	DepthExceeded {
		/// Node path.
		path: String,
		/// Configured limit.
		max_depth: u32,
	},
	/// Container construction or file write failed.
	#[error("store error at {path}: {source}")]
	Store {
		/// Node path, or file path for write failures.
		path: String,
		/// Underlying storage error.
		#[source]
		source: StoreError,
	},
}

/// Errors produced while unpacking a container.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// A type attribute names a tag outside the registry.
	#[error("unknown type tag {tag:?} at {path}")]
	UnknownTypeTag {
		/// Node path.
		path: String,
		/// Tag text as stored.
		tag: String,
	},
	/// Stored structure does not match the layout its attributes declare.
	#[error("malformed container at {path}: {reason}")]
	MalformedContainer {
		/// Node path.
		path: String,
		/// What was wrong.
		reason: String,
	},
	/// Heterogeneous sequence children are not `0..n`.
	#[error("invalid sequence index at {path}: {reason}")]
	InvalidIndex {
		/// Node path.
		path: String,
		/// Offending name or gap.
		reason: IndexSetError,
	},
	/// Stored nesting is deeper than allowed.
	#[error("nesting deeper than {max_depth} at {path}")]
	DepthExceeded {
		/// Node path.
		path: String,
		/// Configured limit.
		max_depth: u32,
	},
	/// Container file could not be read.
	#[error("store error at {path}: {source}")]
	Store {
		/// File path.
		path: String,
		/// Underlying storage error.
		#[source]
		source: StoreError,
	},
}

impl DecodeError {
	pub(crate) fn malformed(path: String, reason: impl Into<String>) -> Self {
		Self::MalformedContainer {
			path,
			reason: reason.into(),
		}
	}
}
