use std::fs;
use std::path::Path;

use crate::store::bytes::{Cursor, Writer};
use crate::store::compression::decode_bytes;
use crate::store::record::{CODE_END, read_group, write_group};
use crate::store::{Compression, ContainerHeader, Group, Node, Result, StoreError};

/// Maximum group nesting accepted when parsing a container.
pub const DEFAULT_MAX_PARSE_DEPTH: u32 = 1024;

/// One hierarchical container: a file-level group plus header metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
	/// Header the container was read with (or will be written with).
	pub header: ContainerHeader,
	/// Whole-file compression detected on open.
	pub compression: Compression,
	root: Group,
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}

impl Container {
	/// Empty in-memory container.
	pub fn new() -> Self {
		Self {
			header: ContainerHeader::current(),
			compression: Compression::None,
			root: Group::new(),
		}
	}

	/// File-level group.
	pub fn root(&self) -> &Group {
		&self.root
	}

	/// Mutable file-level group.
	pub fn root_mut(&mut self) -> &mut Group {
		&mut self.root
	}

	/// Serialize header, record tree, and end marker.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut out = Writer::new();
		out.put_bytes(&ContainerHeader::current().to_bytes());
		write_group(&mut out, "", &self.root)?;
		out.put_bytes(&CODE_END);
		Ok(out.into_bytes())
	}

	/// Parse a container from raw or zstd-compressed bytes.
	pub fn from_bytes(raw: Vec<u8>, max_depth: u32) -> Result<Self> {
		let (compression, bytes) = decode_bytes(raw)?;
		let header = ContainerHeader::parse(&bytes)?;

		let body = bytes.get(header.header_size..).ok_or(StoreError::InvalidHeader)?;
		let mut cursor = Cursor::new(body);
		let (_, root) = read_group(&mut cursor, max_depth)?;

		if cursor.remaining() < 4 {
			return Err(StoreError::MissingEndRecord);
		}
		let at = header.header_size + cursor.pos();
		let code = cursor.read_code4()?;
		if code != CODE_END {
			return Err(StoreError::BadRecordCode { code, at });
		}
		if cursor.remaining() > 0 {
			return Err(StoreError::TrailingData { len: cursor.remaining() });
		}

		Ok(Self { header, compression, root })
	}

	/// Create or overwrite the file at `path`.
	pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
		let bytes = self.to_bytes()?;
		fs::write(path.as_ref(), &bytes)?;
		tracing::debug!(path = %path.as_ref().display(), bytes = bytes.len(), "container written");
		Ok(())
	}

	/// Read the file at `path`.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::open_with_depth(path, DEFAULT_MAX_PARSE_DEPTH)
	}

	/// Read the file at `path`, bounding group nesting by `max_depth`.
	pub fn open_with_depth(path: impl AsRef<Path>, max_depth: u32) -> Result<Self> {
		let raw = fs::read(path.as_ref())?;
		let container = Self::from_bytes(raw, max_depth)?;
		tracing::debug!(path = %path.as_ref().display(), compression = container.compression.as_str(), "container opened");
		Ok(container)
	}

	/// Count groups and datasets below the file-level group.
	pub fn stats(&self) -> ContainerStats {
		let mut stats = ContainerStats::default();
		count_nodes(&self.root, 0, &mut stats);
		stats
	}
}

/// Node counts of a container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerStats {
	/// Groups below the file-level group.
	pub group_count: usize,
	/// Datasets anywhere in the tree.
	pub dataset_count: usize,
	/// Deepest nesting level (file-level children are depth 1).
	pub max_depth: usize,
}

fn count_nodes(group: &Group, depth: usize, stats: &mut ContainerStats) {
	for (_, child) in group.children() {
		stats.max_depth = stats.max_depth.max(depth + 1);
		match child {
			Node::Group(item) => {
				stats.group_count += 1;
				count_nodes(item, depth + 1, stats);
			}
			Node::Dataset(_) => stats.dataset_count += 1,
		}
	}
}
