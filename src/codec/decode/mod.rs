use std::collections::HashSet;
use std::path::Path;

use crate::codec::classify::tag_of;
use crate::codec::keys::{decode_key, encode_index, encode_key, validate_index_set};
use crate::codec::layout::{ATTR_COLLECTION_TYPE, ATTR_DATA_TYPE, ATTR_HOMOGENEOUS, ENTRY_VALUE, KEYS, ROOT_NAME, VALS};
use crate::codec::registry::ElementStorage;
use crate::codec::scope::Scope;
use crate::codec::{DecodeError, Element, F16, Float, Int, Mapping, NdArray, SeqKind, TypeTag, Value};
use crate::store::{Attr, Attrs, Buffer, Container, Dataset, Group, Node};

/// Unpacking controls.
#[derive(Debug, Clone)]
pub struct UnpackOptions {
	/// Maximum container nesting depth below the file root.
	pub max_depth: u32,
}

impl Default for UnpackOptions {
	fn default() -> Self {
		Self { max_depth: 128 }
	}
}

/// Read the container file at `path` back into a value.
pub fn unpack(path: impl AsRef<Path>) -> Result<Value, DecodeError> {
	unpack_with(path, &UnpackOptions::default())
}

/// Read the container file at `path` using explicit options.
pub fn unpack_with(path: impl AsRef<Path>, options: &UnpackOptions) -> Result<Value, DecodeError> {
	let path = path.as_ref();
	// The file-level group sits one level above `root`.
	let container = Container::open_with_depth(path, options.max_depth.saturating_add(1)).map_err(|source| DecodeError::Store {
		path: path.display().to_string(),
		source,
	})?;
	let value = decode(container.root(), options)?;
	tracing::info!(path = %path.display(), compression = container.compression.as_str(), "unpacked value");
	Ok(value)
}

/// Rebuild the value stored as the `root` child of `parent`.
pub fn decode(parent: &Group, options: &UnpackOptions) -> Result<Value, DecodeError> {
	let scope = Scope::root(ROOT_NAME);
	let node = parent
		.child(ROOT_NAME)
		.ok_or_else(|| DecodeError::malformed(scope.path(), "missing top-level node"))?;
	Decoder { max_depth: options.max_depth }.value(node, &scope)
}

struct Decoder {
	max_depth: u32,
}

impl Decoder {
	fn value(&self, node: &Node, scope: &Scope<'_>) -> Result<Value, DecodeError> {
		if scope.depth() > self.max_depth {
			return Err(DecodeError::DepthExceeded {
				path: scope.path(),
				max_depth: self.max_depth,
			});
		}

		let attrs = node.attrs();
		match attrs.get(ATTR_COLLECTION_TYPE) {
			Some(attr) => {
				let collection = parse_tag(Some(attr), ATTR_COLLECTION_TYPE, scope)?;
				let homogeneous = attrs
					.get(ATTR_HOMOGENEOUS)
					.and_then(Attr::as_bool)
					.ok_or_else(|| DecodeError::malformed(scope.path(), "collection without a boolean homogeneous flag"))?;
				self.collection(node, scope, collection, homogeneous)
			}
			None => primitive(node, scope),
		}
	}

	fn collection(&self, node: &Node, scope: &Scope<'_>, collection: TypeTag, homogeneous: bool) -> Result<Value, DecodeError> {
		let seq_kind = match collection {
			TypeTag::List => Some(SeqKind::List),
			TypeTag::Tuple => Some(SeqKind::Tuple),
			TypeTag::Dict | TypeTag::Set => None,
			other => {
				return Err(DecodeError::malformed(scope.path(), format!("{other} is not a collection type")));
			}
		};
		tracing::debug!(path = %scope, %collection, homogeneous, "decode collection");

		match (seq_kind, homogeneous) {
			(Some(kind), true) => {
				let dataset = expect_dataset(node, scope)?;
				if dataset.shape().len() != 1 {
					return Err(DecodeError::malformed(scope.path(), format!("flat sequence has rank {}", dataset.shape().len())));
				}
				let tag = parse_tag(dataset.attrs().get(ATTR_DATA_TYPE), ATTR_DATA_TYPE, scope)?;
				Ok(Value::Sequence(kind, unpack_elements(dataset, tag, scope)?))
			}
			(Some(kind), false) => {
				let group = expect_group(node, scope)?;
				let len = validate_index_set(group.child_names()).map_err(|reason| DecodeError::InvalidIndex { path: scope.path(), reason })?;
				let mut items = Vec::with_capacity(len);
				for index in 0..len {
					let name = encode_index(index);
					let child = group
						.child(&name)
						.ok_or_else(|| DecodeError::malformed(scope.path(), format!("missing item {name}")))?;
					items.push(self.value(child, &scope.child(&name))?);
				}
				Ok(Value::Sequence(kind, items))
			}
			(None, true) => {
				let group = expect_group(node, scope)?;
				let keys = flat_keys(group, scope)?;
				unique_keys(&keys, scope)?;
				if collection == TypeTag::Set {
					return Ok(Value::Mapping(Mapping::Set(keys)));
				}

				let vals_scope = scope.child(VALS);
				let dataset = child_dataset(group, VALS, &vals_scope)?;
				let tag = parse_tag(dataset.attrs().get(ATTR_DATA_TYPE), ATTR_DATA_TYPE, &vals_scope)?;
				let vals = unpack_elements(dataset, tag, &vals_scope)?;
				if vals.len() != keys.len() {
					return Err(DecodeError::malformed(
						scope.path(),
						format!("{} keys but {} values", keys.len(), vals.len()),
					));
				}
				Ok(Value::Mapping(Mapping::Dict(keys.into_iter().zip(vals).collect())))
			}
			(None, false) => {
				let group = expect_group(node, scope)?;
				let mut keys = Vec::with_capacity(group.len());
				let mut entries = Vec::with_capacity(group.len());
				for (name, child) in group.children() {
					let entry_scope = scope.child(name);
					let entry = expect_group(child, &entry_scope)?;
					let key = entry_key(name, entry.attrs(), &entry_scope)?;
					let value_node = entry
						.child(ENTRY_VALUE)
						.ok_or_else(|| DecodeError::malformed(entry_scope.path(), "entry without a value node"))?;
					if collection == TypeTag::Set {
						keys.push(key);
					} else {
						entries.push((key, self.value(value_node, &entry_scope.child(ENTRY_VALUE))?));
					}
				}
				let mapping = if collection == TypeTag::Set { Mapping::Set(keys) } else { Mapping::Dict(entries) };
				unique_keys(mapping.keys(), scope)?;
				Ok(Value::Mapping(mapping))
			}
		}
	}
}

fn primitive(node: &Node, scope: &Scope<'_>) -> Result<Value, DecodeError> {
	let tag = parse_tag(node.attrs().get(ATTR_DATA_TYPE), ATTR_DATA_TYPE, scope)?;
	if tag.is_collection() {
		return Err(DecodeError::malformed(scope.path(), format!("{tag} node without {ATTR_COLLECTION_TYPE}")));
	}
	let dataset = expect_dataset(node, scope)?;

	if tag == TypeTag::Array {
		return match dataset.buffer() {
			Buffer::Numeric { dtype, bytes } => NdArray::new(*dtype, dataset.shape().to_vec(), bytes.clone())
				.map(Value::Array)
				.ok_or_else(|| DecodeError::malformed(scope.path(), "array payload does not fill its shape")),
			other => Err(DecodeError::malformed(
				scope.path(),
				format!("array over {} payload", other.type_label()),
			)),
		};
	}

	if !dataset.is_scalar() {
		return Err(DecodeError::malformed(
			scope.path(),
			format!("{tag} scalar stored with shape {:?}", dataset.shape()),
		));
	}
	unpack_elements(dataset, tag, scope)?
		.pop()
		.ok_or_else(|| DecodeError::malformed(scope.path(), "scalar without a payload"))
}

/// Read the `keys` buffer of a flat mapping.
fn flat_keys(group: &Group, scope: &Scope<'_>) -> Result<Vec<Value>, DecodeError> {
	let keys_scope = scope.child(KEYS);
	let dataset = child_dataset(group, KEYS, &keys_scope)?;
	let tag = parse_tag(dataset.attrs().get(ATTR_DATA_TYPE), ATTR_DATA_TYPE, &keys_scope)?;
	if !tag.is_key() {
		return Err(DecodeError::malformed(keys_scope.path(), format!("{tag} is not a key type")));
	}
	unpack_elements(dataset, tag, &keys_scope)
}

/// Reject a mapping that holds the same key twice.
fn unique_keys<'k>(keys: impl IntoIterator<Item = &'k Value>, scope: &Scope<'_>) -> Result<(), DecodeError> {
	let mut seen = HashSet::new();
	for key in keys {
		let name = encode_key(key).unwrap_or_default();
		if !seen.insert((tag_of(key), name.clone())) {
			return Err(DecodeError::malformed(scope.path(), format!("duplicate key {name:?}")));
		}
	}
	Ok(())
}

/// Rebuild an expanded entry's key from its name and declared key tag.
fn entry_key(name: &str, attrs: &Attrs, scope: &Scope<'_>) -> Result<Value, DecodeError> {
	let tag = parse_tag(attrs.get(ATTR_DATA_TYPE), ATTR_DATA_TYPE, scope)?;
	if !tag.is_key() {
		return Err(DecodeError::malformed(scope.path(), format!("{tag} is not a key type")));
	}
	decode_key(name, tag).ok_or_else(|| DecodeError::malformed(scope.path(), format!("entry name does not parse as {tag}")))
}

fn parse_tag(attr: Option<&Attr>, key: &str, scope: &Scope<'_>) -> Result<TypeTag, DecodeError> {
	let attr = attr.ok_or_else(|| DecodeError::malformed(scope.path(), format!("missing {key} attribute")))?;
	let text = attr
		.as_text()
		.ok_or_else(|| DecodeError::malformed(scope.path(), format!("{key} attribute is not text")))?;
	text.parse().map_err(|_| DecodeError::UnknownTypeTag {
		path: scope.path(),
		tag: text.to_owned(),
	})
}

fn expect_dataset<'n>(node: &'n Node, scope: &Scope<'_>) -> Result<&'n Dataset, DecodeError> {
	match node {
		Node::Dataset(dataset) => Ok(dataset),
		Node::Group(_) => Err(DecodeError::malformed(scope.path(), "expected a dataset, found a group")),
	}
}

fn expect_group<'n>(node: &'n Node, scope: &Scope<'_>) -> Result<&'n Group, DecodeError> {
	match node {
		Node::Group(group) => Ok(group),
		Node::Dataset(_) => Err(DecodeError::malformed(scope.path(), "expected a group, found a dataset")),
	}
}

fn child_dataset<'g>(group: &'g Group, name: &str, scope: &Scope<'_>) -> Result<&'g Dataset, DecodeError> {
	let node = group
		.child(name)
		.ok_or_else(|| DecodeError::malformed(scope.path(), "missing flat buffer"))?;
	expect_dataset(node, scope)
}

/// Convert every stored element to the declared scalar `tag`.
fn unpack_elements(dataset: &Dataset, tag: TypeTag, scope: &Scope<'_>) -> Result<Vec<Value>, DecodeError> {
	let storage = tag
		.element_storage()
		.ok_or_else(|| DecodeError::malformed(scope.path(), format!("{tag} elements cannot be stored flat")))?;

	match (storage, dataset.buffer()) {
		(ElementStorage::Empty, Buffer::Empty) => Ok(vec![Value::Null; dataset.len()]),
		(ElementStorage::Strings, Buffer::Strings(items)) => items
			.iter()
			.map(|item| {
				String::from_utf8(item.clone())
					.map(Value::String)
					.map_err(|_| DecodeError::malformed(scope.path(), "string element is not UTF-8"))
			})
			.collect(),
		(ElementStorage::Numeric(expected), Buffer::Numeric { dtype, bytes }) if expected == *dtype => bytes
			.chunks_exact(dtype.width())
			.map(|chunk| {
				element_from_le(tag, chunk).ok_or_else(|| DecodeError::malformed(scope.path(), format!("invalid {tag} element")))
			})
			.collect(),
		(_, buffer) => Err(DecodeError::malformed(
			scope.path(),
			format!("{tag} tag over {} payload", buffer.type_label()),
		)),
	}
}

fn element_from_le(tag: TypeTag, chunk: &[u8]) -> Option<Value> {
	let value = match tag {
		TypeTag::Bool => match chunk.first()? {
			0 => Value::Bool(false),
			1 => Value::Bool(true),
			_ => return None,
		},
		TypeTag::Int => Value::Int(Int::Native(i64::read_le(chunk))),
		TypeTag::Int8 => Value::Int(Int::I8(i8::read_le(chunk))),
		TypeTag::Int16 => Value::Int(Int::I16(i16::read_le(chunk))),
		TypeTag::Int32 => Value::Int(Int::I32(i32::read_le(chunk))),
		TypeTag::Int64 => Value::Int(Int::I64(i64::read_le(chunk))),
		TypeTag::Uint8 => Value::Int(Int::U8(u8::read_le(chunk))),
		TypeTag::Uint16 => Value::Int(Int::U16(u16::read_le(chunk))),
		TypeTag::Uint32 => Value::Int(Int::U32(u32::read_le(chunk))),
		TypeTag::Uint64 => Value::Int(Int::U64(u64::read_le(chunk))),
		TypeTag::Float => Value::Float(Float::Native(f64::read_le(chunk))),
		TypeTag::Float16 => Value::Float(Float::F16(F16::from_bits(u16::read_le(chunk)))),
		TypeTag::Float32 => Value::Float(Float::F32(f32::read_le(chunk))),
		TypeTag::Float64 => Value::Float(Float::F64(f64::read_le(chunk))),
		_ => return None,
	};
	Some(value)
}

#[cfg(test)]
mod tests;
