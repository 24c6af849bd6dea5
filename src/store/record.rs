//! Record-level encoding of the container tree.
//!
//! ```text
//! GRUP: code[4] name:str attrs child_count:u32 child*
//! DSET: code[4] name:str attrs dtype:u8 rank:u32 dims:u64[rank]
//!       filter:u8 payload_len:u64 payload[payload_len]
//! ENDB: code[4]
//!
//! str   = len:u32 bytes[len]
//! attrs = count:u32 (key:str kind:u8 value)*   kind 0 = text (str), 1 = bool (u8)
//! ```
//!
//! Dataset payloads are raw little-endian elements for numeric dtypes, one
//! `str` per element for byte strings, and nothing for empty buffers. The
//! filter code says whether the payload went through zstd.

use crate::store::bytes::{Cursor, Writer};
use crate::store::compression::{compress, decompress};
use crate::store::{Attr, Attrs, Buffer, Dataset, DatasetOptions, Dtype, Group, Node, Result, StoreError};

pub const CODE_GROUP: [u8; 4] = *b"GRUP";
pub const CODE_DATASET: [u8; 4] = *b"DSET";
pub const CODE_END: [u8; 4] = *b"ENDB";

const DTYPE_EMPTY: u8 = 0;
const DTYPE_STRINGS: u8 = 0xFF;

const FILTER_NONE: u8 = 0;
const FILTER_ZSTD: u8 = 1;

const ATTR_TEXT: u8 = 0;
const ATTR_BOOL: u8 = 1;

/// Serialize `group` and its subtree as one record named `name`.
pub fn write_group(out: &mut Writer, name: &str, group: &Group) -> Result<()> {
	out.put_bytes(&CODE_GROUP);
	out.put_prefixed(name.as_bytes());
	write_attrs(out, group.attrs());
	out.put_u32_le(group.len() as u32);
	for (child_name, child) in group.children() {
		match child {
			Node::Group(item) => write_group(out, child_name, item)?,
			Node::Dataset(item) => write_dataset(out, child_name, item)?,
		}
	}
	Ok(())
}

fn write_dataset(out: &mut Writer, name: &str, dataset: &Dataset) -> Result<()> {
	out.put_bytes(&CODE_DATASET);
	out.put_prefixed(name.as_bytes());
	write_attrs(out, dataset.attrs());

	let (dtype_code, raw) = match dataset.buffer() {
		Buffer::Empty => (DTYPE_EMPTY, Vec::new()),
		Buffer::Numeric { dtype, bytes } => (dtype.code(), bytes.clone()),
		Buffer::Strings(items) => {
			let mut payload = Writer::new();
			for item in items {
				payload.put_prefixed(item);
			}
			(DTYPE_STRINGS, payload.into_bytes())
		}
	};
	out.put_u8(dtype_code);

	out.put_u32_le(dataset.shape().len() as u32);
	for dim in dataset.shape() {
		out.put_u64_le(*dim as u64);
	}

	let (filter, payload) = match dataset.options().compression {
		Some(level) if !raw.is_empty() => (FILTER_ZSTD, compress(&raw, level)?),
		_ => (FILTER_NONE, raw),
	};
	tracing::trace!(name, filter, len = payload.len(), "write dataset record");
	out.put_u8(filter);
	out.put_u64_le(payload.len() as u64);
	out.put_bytes(&payload);
	Ok(())
}

fn write_attrs(out: &mut Writer, attrs: &Attrs) {
	out.put_u32_le(attrs.len() as u32);
	for (key, value) in attrs.iter() {
		out.put_prefixed(key.as_bytes());
		match value {
			Attr::Text(text) => {
				out.put_u8(ATTR_TEXT);
				out.put_prefixed(text.as_bytes());
			}
			Attr::Bool(flag) => {
				out.put_u8(ATTR_BOOL);
				out.put_u8(u8::from(*flag));
			}
		}
	}
}

/// Parse one `GRUP` record and its subtree, returning `(name, group)`.
pub fn read_group(cursor: &mut Cursor<'_>, max_depth: u32) -> Result<(String, Group)> {
	let at = cursor.pos();
	let code = cursor.read_code4()?;
	if code != CODE_GROUP {
		return Err(StoreError::BadRecordCode { code, at });
	}
	read_group_body(cursor, 0, max_depth)
}

fn read_group_body(cursor: &mut Cursor<'_>, depth: u32, max_depth: u32) -> Result<(String, Group)> {
	if depth >= max_depth {
		return Err(StoreError::DepthExceeded { max_depth });
	}

	let name = cursor.read_prefixed_str()?.to_owned();
	let mut group = Group::new();
	for (key, value) in read_attrs(cursor)? {
		group.set_attr(&key, value);
	}

	let child_count = cursor.read_u32_le()?;
	for _ in 0..child_count {
		let at = cursor.pos();
		let code = cursor.read_code4()?;
		let (child_name, node) = match code {
			CODE_GROUP => {
				let (child_name, child) = read_group_body(cursor, depth + 1, max_depth)?;
				(child_name, Node::Group(child))
			}
			CODE_DATASET => {
				let (child_name, child) = read_dataset_body(cursor)?;
				(child_name, Node::Dataset(child))
			}
			_ => return Err(StoreError::BadRecordCode { code, at }),
		};
		group.insert(&child_name, node)?;
	}

	Ok((name, group))
}

fn read_dataset_body(cursor: &mut Cursor<'_>) -> Result<(String, Dataset)> {
	let name = cursor.read_prefixed_str()?.to_owned();
	let attrs = read_attrs(cursor)?;

	let dtype_at = cursor.pos();
	let dtype_code = cursor.read_u8()?;

	let rank = cursor.read_u32_le()?;
	let mut shape = Vec::new();
	for _ in 0..rank {
		shape.push(cursor.read_len_u64()?);
	}

	let filter_at = cursor.pos();
	let filter = cursor.read_u8()?;
	let payload_len = cursor.read_len_u64()?;
	let stored = cursor.read_exact(payload_len)?;
	let (raw, options) = match filter {
		FILTER_NONE => (stored.to_vec(), DatasetOptions::default()),
		FILTER_ZSTD => (
			decompress(stored)?,
			DatasetOptions {
				compression: Some(zstd::DEFAULT_COMPRESSION_LEVEL),
			},
		),
		code => return Err(StoreError::UnknownFilter { code, at: filter_at }),
	};
	tracing::trace!(name = name.as_str(), filter, len = raw.len(), "read dataset record");

	let buffer = match dtype_code {
		DTYPE_EMPTY => Buffer::Empty,
		DTYPE_STRINGS => {
			let count = shape.iter().fold(1_usize, |acc, dim| acc.saturating_mul(*dim));
			let mut payload = Cursor::new(&raw);
			let mut items = Vec::with_capacity(count.min(payload.remaining()));
			while payload.remaining() > 0 {
				items.push(payload.read_prefixed_bytes()?.to_vec());
			}
			Buffer::Strings(items)
		}
		code => {
			let dtype = Dtype::from_code(code).ok_or(StoreError::UnknownDtype { code, at: dtype_at })?;
			Buffer::Numeric { dtype, bytes: raw }
		}
	};

	let mut dataset = Dataset::new(&name, shape, buffer, options)?;
	for (key, value) in attrs {
		dataset.set_attr(&key, value);
	}
	Ok((name, dataset))
}

fn read_attrs(cursor: &mut Cursor<'_>) -> Result<Vec<(String, Attr)>> {
	let count = cursor.read_u32_le()?;
	let mut out = Vec::new();
	for _ in 0..count {
		let key = cursor.read_prefixed_str()?.to_owned();
		let at = cursor.pos();
		let value = match cursor.read_u8()? {
			ATTR_TEXT => Attr::Text(cursor.read_prefixed_str()?.to_owned()),
			ATTR_BOOL => Attr::Bool(cursor.read_u8()? != 0),
			code => return Err(StoreError::UnknownAttr { code, at }),
		};
		out.push((key, value));
	}
	Ok(out)
}
