use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::path::Path;

use crate::codec::classify::tag_of;
use crate::codec::homogeneity::{is_homogeneous_mapping, uniformity};
use crate::codec::keys::{encode_index, encode_key, key_order};
use crate::codec::layout::{ATTR_COLLECTION_TYPE, ATTR_DATA_TYPE, ATTR_HOMOGENEOUS, ENTRY_VALUE, KEYS, ROOT_NAME, VALS};
use crate::codec::registry::ElementStorage;
use crate::codec::scope::Scope;
use crate::codec::{EncodeError, Int, Mapping, SeqKind, TypeTag, Value};
use crate::store::{Buffer, Container, DatasetOptions, Group, StoreError};

/// Packing controls.
#[derive(Debug, Clone)]
pub struct PackOptions {
	/// zstd-compress non-scalar datasets.
	pub compression: bool,
	/// zstd level used when `compression` is on.
	pub compression_level: i32,
	/// Maximum container nesting depth below the file root.
	pub max_depth: u32,
}

impl Default for PackOptions {
	fn default() -> Self {
		Self {
			compression: true,
			compression_level: zstd::DEFAULT_COMPRESSION_LEVEL,
			max_depth: 128,
		}
	}
}

impl PackOptions {
	/// Preset that stores every payload raw.
	pub fn uncompressed() -> Self {
		Self {
			compression: false,
			..Self::default()
		}
	}

	fn dataset_options(&self) -> DatasetOptions {
		DatasetOptions {
			compression: self.compression.then_some(self.compression_level),
		}
	}
}

/// Pack `value` into a new container file at `path`.
///
/// With `compression` on, array and flat-collection payloads go through zstd.
pub fn pack(value: &Value, path: impl AsRef<Path>, compression: bool) -> Result<(), EncodeError> {
	let options = if compression { PackOptions::default() } else { PackOptions::uncompressed() };
	pack_with(value, path, &options)
}

/// Pack `value` into a new container file at `path` using explicit options.
///
/// The tree is built in memory first; nothing is written when encoding fails.
pub fn pack_with(value: &Value, path: impl AsRef<Path>, options: &PackOptions) -> Result<(), EncodeError> {
	let path = path.as_ref();
	let mut container = Container::new();
	encode(value, container.root_mut(), options)?;
	container.write(path).map_err(|source| EncodeError::Store {
		path: path.display().to_string(),
		source,
	})?;

	let stats = container.stats();
	tracing::info!(
		path = %path.display(),
		groups = stats.group_count,
		datasets = stats.dataset_count,
		"packed value"
	);
	Ok(())
}

/// Write `value` as the `root` child of `parent`.
pub fn encode(value: &Value, parent: &mut Group, options: &PackOptions) -> Result<(), EncodeError> {
	let encoder = Encoder {
		max_depth: options.max_depth,
		dataset: options.dataset_options(),
	};
	encoder.value(parent, &Scope::root(ROOT_NAME), value)
}

struct Encoder {
	max_depth: u32,
	dataset: DatasetOptions,
}

impl Encoder {
	fn value(&self, parent: &mut Group, scope: &Scope<'_>, value: &Value) -> Result<(), EncodeError> {
		if scope.depth() > self.max_depth {
			return Err(EncodeError::DepthExceeded {
				path: scope.path(),
				max_depth: self.max_depth,
			});
		}

		match value {
			Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {
				let tag = tag_of(value);
				let buffer = pack_elements(tag, [value]).ok_or_else(|| not_scalar(scope, tag))?;
				let dataset = parent
					.create_dataset(scope.name(), Vec::new(), buffer, DatasetOptions::default())
					.map_err(|source| store_error(scope, source))?;
				dataset.set_attr(ATTR_DATA_TYPE, tag.as_str());
				Ok(())
			}
			Value::Array(array) => {
				let buffer = Buffer::Numeric {
					dtype: array.dtype(),
					bytes: array.bytes().to_vec(),
				};
				let dataset = parent
					.create_dataset(scope.name(), array.shape().to_vec(), buffer, self.dataset)
					.map_err(|source| store_error(scope, source))?;
				dataset.set_attr(ATTR_DATA_TYPE, TypeTag::Array.as_str());
				Ok(())
			}
			Value::Sequence(kind, items) => self.sequence(parent, scope, *kind, items),
			Value::Mapping(mapping) => self.mapping(parent, scope, mapping),
		}
	}

	fn sequence(&self, parent: &mut Group, scope: &Scope<'_>, kind: SeqKind, items: &[Value]) -> Result<(), EncodeError> {
		let collection = match kind {
			SeqKind::List => TypeTag::List,
			SeqKind::Tuple => TypeTag::Tuple,
		};

		if let Some(tag) = uniformity(items).tag_or(TypeTag::Null) {
			tracing::debug!(path = %scope, %collection, element = %tag, len = items.len(), "flat sequence");
			let buffer = pack_elements(tag, items).ok_or_else(|| not_scalar(scope, tag))?;
			let dataset = parent
				.create_dataset(scope.name(), vec![items.len()], buffer, self.dataset)
				.map_err(|source| store_error(scope, source))?;
			dataset.set_attr(ATTR_COLLECTION_TYPE, collection.as_str());
			dataset.set_attr(ATTR_DATA_TYPE, tag.as_str());
			dataset.set_attr(ATTR_HOMOGENEOUS, true);
			return Ok(());
		}

		tracing::debug!(path = %scope, %collection, len = items.len(), "expanded sequence");
		let group = self.collection_group(parent, scope, collection, false)?;
		for (index, item) in items.iter().enumerate() {
			let name = encode_index(index);
			self.value(group, &scope.child(&name), item)?;
		}
		Ok(())
	}

	fn mapping(&self, parent: &mut Group, scope: &Scope<'_>, mapping: &Mapping) -> Result<(), EncodeError> {
		let collection = match mapping {
			Mapping::Dict(_) => TypeTag::Dict,
			Mapping::Set(_) => TypeTag::Set,
		};
		let names = key_names(scope, mapping)?;

		if is_homogeneous_mapping(mapping) {
			tracing::debug!(path = %scope, %collection, len = mapping.len(), "flat mapping");
			let group = self.collection_group(parent, scope, collection, true)?;
			return match mapping {
				Mapping::Dict(entries) => {
					let mut sorted: Vec<&(Value, Value)> = entries.iter().collect();
					sort_by_key_order(scope, &mut sorted, |(key, _)| key)?;
					self.flat(group, scope, KEYS, sorted.iter().map(|(key, _)| key), TypeTag::String)?;
					self.flat(group, scope, VALS, sorted.iter().map(|(_, value)| value), TypeTag::Null)
				}
				Mapping::Set(keys) => {
					let mut sorted: Vec<&Value> = keys.iter().collect();
					sort_by_key_order(scope, &mut sorted, |key| *key)?;
					self.flat(group, scope, KEYS, sorted, TypeTag::String)
				}
			};
		}

		tracing::debug!(path = %scope, %collection, len = mapping.len(), "expanded mapping");
		let group = self.collection_group(parent, scope, collection, false)?;
		let placeholder = Value::Int(Int::Native(0));
		let entries: Box<dyn Iterator<Item = (&Value, &Value)>> = match mapping {
			Mapping::Dict(entries) => Box::new(entries.iter().map(|(key, value)| (key, value))),
			Mapping::Set(keys) => Box::new(keys.iter().map(|key| (key, &placeholder))),
		};
		for ((key, value), name) in entries.zip(&names) {
			let entry_scope = scope.child(name);
			let entry = group.create_group(name).map_err(|source| store_error(&entry_scope, source))?;
			entry.set_attr(ATTR_DATA_TYPE, tag_of(key).as_str());
			self.value(entry, &entry_scope.child(ENTRY_VALUE), value)?;
		}
		Ok(())
	}

	fn collection_group<'g>(
		&self,
		parent: &'g mut Group,
		scope: &Scope<'_>,
		collection: TypeTag,
		homogeneous: bool,
	) -> Result<&'g mut Group, EncodeError> {
		let group = parent.create_group(scope.name()).map_err(|source| store_error(scope, source))?;
		group.set_attr(ATTR_COLLECTION_TYPE, collection.as_str());
		group.set_attr(ATTR_DATA_TYPE, collection.as_str());
		group.set_attr(ATTR_HOMOGENEOUS, homogeneous);
		Ok(group)
	}

	/// One rank-1 buffer of uniform scalars; `empty` is the tag recorded for zero items.
	fn flat<'v>(
		&self,
		group: &mut Group,
		scope: &Scope<'_>,
		name: &str,
		items: impl IntoIterator<Item = &'v Value>,
		empty: TypeTag,
	) -> Result<(), EncodeError> {
		let items: Vec<&Value> = items.into_iter().collect();
		let tag = uniformity(items.iter().copied()).tag_or(empty).unwrap_or(empty);
		let child = scope.child(name);
		let buffer = pack_elements(tag, items.iter().copied()).ok_or_else(|| not_scalar(&child, tag))?;
		let dataset = group
			.create_dataset(name, vec![items.len()], buffer, self.dataset)
			.map_err(|source| store_error(&child, source))?;
		dataset.set_attr(ATTR_DATA_TYPE, tag.as_str());
		Ok(())
	}
}

/// Node names of every key, rejecting unsupported kinds and collisions.
fn key_names(scope: &Scope<'_>, mapping: &Mapping) -> Result<Vec<String>, EncodeError> {
	let mut seen = BTreeSet::new();
	let mut names = Vec::with_capacity(mapping.len());
	for key in mapping.keys() {
		let name = encode_key(key).ok_or_else(|| EncodeError::UnsupportedType {
			path: scope.path(),
			tag: tag_of(key),
			reason: "mapping keys must be int or string",
		})?;
		if !seen.insert(name.clone()) {
			return Err(EncodeError::DuplicateKey { path: scope.path(), name });
		}
		names.push(name);
	}
	Ok(names)
}

/// Sort entries by key, failing when any two keys are not mutually ordered.
pub(crate) fn sort_by_key_order<T>(scope: &Scope<'_>, entries: &mut [T], key: impl Fn(&T) -> &Value) -> Result<(), EncodeError> {
	if let Some((first, rest)) = entries.split_first() {
		let first = key(first);
		for other in rest {
			let other = key(other);
			if key_order(first, other).is_none() {
				return Err(EncodeError::AmbiguousKeyOrder {
					path: scope.path(),
					left: tag_of(first),
					right: tag_of(other),
				});
			}
		}
	}
	entries.sort_by(|left, right| key_order(key(left), key(right)).unwrap_or(Ordering::Equal));
	Ok(())
}

/// Pack uniform scalars of `tag` into one buffer.
///
/// `None` for non-scalar tags or when an item's tag differs from `tag`.
pub(crate) fn pack_elements<'v>(tag: TypeTag, items: impl IntoIterator<Item = &'v Value>) -> Option<Buffer> {
	let storage = tag.element_storage()?;
	let mut items = items.into_iter();
	let buffer = match storage {
		ElementStorage::Empty => {
			if !items.all(|item| matches!(item, Value::Null)) {
				return None;
			}
			Buffer::Empty
		}
		ElementStorage::Strings => Buffer::Strings(
			items
				.map(|item| match item {
					Value::String(text) => Some(text.as_bytes().to_vec()),
					_ => None,
				})
				.collect::<Option<_>>()?,
		),
		ElementStorage::Numeric(dtype) => {
			let mut bytes = Vec::new();
			for item in items {
				if tag_of(item) != tag {
					return None;
				}
				match item {
					Value::Bool(flag) => bytes.push(u8::from(*flag)),
					Value::Int(int) => int.put_le(&mut bytes),
					Value::Float(float) => float.put_le(&mut bytes),
					_ => return None,
				}
			}
			Buffer::Numeric { dtype, bytes }
		}
	};
	Some(buffer)
}

fn store_error(scope: &Scope<'_>, source: StoreError) -> EncodeError {
	EncodeError::Store { path: scope.path(), source }
}

fn not_scalar(scope: &Scope<'_>, tag: TypeTag) -> EncodeError {
	EncodeError::UnsupportedType {
		path: scope.path(),
		tag,
		reason: "only scalar kinds fit in a flat buffer",
	}
}
