use std::collections::BTreeMap;

use crate::store::{Result, StoreError};

/// Fixed-width element type of a numeric dataset buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dtype {
	/// One byte per element, `0` or `1`.
	Bool,
	/// Signed 8-bit integer.
	I8,
	/// Signed 16-bit integer.
	I16,
	/// Signed 32-bit integer.
	I32,
	/// Signed 64-bit integer.
	I64,
	/// Unsigned 8-bit integer.
	U8,
	/// Unsigned 16-bit integer.
	U16,
	/// Unsigned 32-bit integer.
	U32,
	/// Unsigned 64-bit integer.
	U64,
	/// IEEE-754 binary16, stored as raw bits.
	F16,
	/// IEEE-754 binary32.
	F32,
	/// IEEE-754 binary64.
	F64,
}

impl Dtype {
	const ALL: [Dtype; 12] = [
		Dtype::Bool,
		Dtype::I8,
		Dtype::I16,
		Dtype::I32,
		Dtype::I64,
		Dtype::U8,
		Dtype::U16,
		Dtype::U32,
		Dtype::U64,
		Dtype::F16,
		Dtype::F32,
		Dtype::F64,
	];

	/// Element width in bytes.
	pub fn width(self) -> usize {
		match self {
			Self::Bool | Self::I8 | Self::U8 => 1,
			Self::I16 | Self::U16 | Self::F16 => 2,
			Self::I32 | Self::U32 | Self::F32 => 4,
			Self::I64 | Self::U64 | Self::F64 => 8,
		}
	}

	/// On-disk type code.
	pub fn code(self) -> u8 {
		match self {
			Self::Bool => 1,
			Self::I8 => 2,
			Self::I16 => 3,
			Self::I32 => 4,
			Self::I64 => 5,
			Self::U8 => 6,
			Self::U16 => 7,
			Self::U32 => 8,
			Self::U64 => 9,
			Self::F16 => 10,
			Self::F32 => 11,
			Self::F64 => 12,
		}
	}

	/// Inverse of [`Dtype::code`].
	pub fn from_code(code: u8) -> Option<Self> {
		Self::ALL.into_iter().find(|dtype| dtype.code() == code)
	}

	/// Short lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Bool => "bool",
			Self::I8 => "i8",
			Self::I16 => "i16",
			Self::I32 => "i32",
			Self::I64 => "i64",
			Self::U8 => "u8",
			Self::U16 => "u16",
			Self::U32 => "u32",
			Self::U64 => "u64",
			Self::F16 => "f16",
			Self::F32 => "f32",
			Self::F64 => "f64",
		}
	}
}

/// Dataset payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
	/// No payload; every element is absent.
	Empty,
	/// Packed little-endian elements of one dtype.
	Numeric {
		/// Element type.
		dtype: Dtype,
		/// `element_count * dtype.width()` raw bytes.
		bytes: Vec<u8>,
	},
	/// One byte string per element.
	Strings(Vec<Vec<u8>>),
}

impl Buffer {
	/// Short label for listings.
	pub fn type_label(&self) -> &'static str {
		match self {
			Self::Empty => "empty",
			Self::Numeric { dtype, .. } => dtype.as_str(),
			Self::Strings(_) => "bytes",
		}
	}
}

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attr {
	/// UTF-8 text.
	Text(String),
	/// Boolean flag.
	Bool(bool),
}

impl Attr {
	/// Borrow as text.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Bool(_) => None,
		}
	}

	/// Read as boolean.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Self::Bool(flag) => Some(*flag),
			Self::Text(_) => None,
		}
	}
}

impl From<&str> for Attr {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl From<bool> for Attr {
	fn from(flag: bool) -> Self {
		Self::Bool(flag)
	}
}

/// Attribute set attached to a group or dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(BTreeMap<String, Attr>);

impl Attrs {
	/// Look up one attribute.
	pub fn get(&self, key: &str) -> Option<&Attr> {
		self.0.get(key)
	}

	/// Insert or replace one attribute.
	pub fn set(&mut self, key: &str, value: impl Into<Attr>) {
		self.0.insert(key.to_owned(), value.into());
	}

	/// Iterate attributes in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Attr)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Number of attributes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no attribute is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Per-dataset storage filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetOptions {
	/// zstd level applied to the payload on write; `None` stores it raw.
	pub compression: Option<i32>,
}

/// Leaf node holding a scalar or an n-dimensional buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
	attrs: Attrs,
	shape: Vec<usize>,
	buffer: Buffer,
	options: DatasetOptions,
}

impl Dataset {
	/// Build a dataset, checking that `buffer` holds exactly `product(shape)` elements.
	///
	/// An empty shape denotes a scalar (one element).
	pub fn new(name: &str, shape: Vec<usize>, buffer: Buffer, options: DatasetOptions) -> Result<Self> {
		let Some(count) = shape.iter().try_fold(1_usize, |acc, dim| acc.checked_mul(*dim)) else {
			return Err(StoreError::ShapeMismatch {
				name: name.to_owned(),
				shape,
				expected: usize::MAX,
				actual: 0,
			});
		};
		let (expected, actual) = match &buffer {
			Buffer::Empty => (count, count),
			Buffer::Numeric { dtype, bytes } => (count.saturating_mul(dtype.width()), bytes.len()),
			Buffer::Strings(items) => (count, items.len()),
		};
		if expected != actual {
			return Err(StoreError::ShapeMismatch {
				name: name.to_owned(),
				shape,
				expected,
				actual,
			});
		}

		// Scalars are never filtered.
		let options = if shape.is_empty() { DatasetOptions::default() } else { options };

		Ok(Self {
			attrs: Attrs::default(),
			shape,
			buffer,
			options,
		})
	}

	/// Dataset attributes.
	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	/// Insert or replace one attribute.
	pub fn set_attr(&mut self, key: &str, value: impl Into<Attr>) {
		self.attrs.set(key, value);
	}

	/// Dimensions; empty for a scalar.
	pub fn shape(&self) -> &[usize] {
		&self.shape
	}

	/// Number of stored elements.
	pub fn len(&self) -> usize {
		self.shape.iter().product()
	}

	/// Whether the dataset holds zero elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Whether the dataset is 0-dimensional.
	pub fn is_scalar(&self) -> bool {
		self.shape.is_empty()
	}

	/// Read the payload.
	pub fn buffer(&self) -> &Buffer {
		&self.buffer
	}

	/// Storage filters applied on write.
	pub fn options(&self) -> DatasetOptions {
		self.options
	}
}

/// Interior node holding named children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
	attrs: Attrs,
	children: BTreeMap<String, Node>,
}

impl Group {
	/// Empty group without attributes.
	pub fn new() -> Self {
		Self::default()
	}

	/// Group attributes.
	pub fn attrs(&self) -> &Attrs {
		&self.attrs
	}

	/// Insert or replace one attribute.
	pub fn set_attr(&mut self, key: &str, value: impl Into<Attr>) {
		self.attrs.set(key, value);
	}

	/// Create an empty child group named `name`.
	pub fn create_group(&mut self, name: &str) -> Result<&mut Group> {
		self.insert(name, Node::Group(Group::new()))?
			.as_group_mut()
			.ok_or_else(|| wrong_kind(name, "group"))
	}

	/// Create a child dataset named `name`.
	pub fn create_dataset(&mut self, name: &str, shape: Vec<usize>, buffer: Buffer, options: DatasetOptions) -> Result<&mut Dataset> {
		let dataset = Dataset::new(name, shape, buffer, options)?;
		self.insert(name, Node::Dataset(dataset))?
			.as_dataset_mut()
			.ok_or_else(|| wrong_kind(name, "dataset"))
	}

	/// Attach an already built child.
	pub fn insert(&mut self, name: &str, node: Node) -> Result<&mut Node> {
		use std::collections::btree_map::Entry;

		match self.children.entry(name.to_owned()) {
			Entry::Occupied(_) => Err(StoreError::NodeExists { name: name.to_owned() }),
			Entry::Vacant(slot) => Ok(slot.insert(node)),
		}
	}

	/// Look up one child.
	pub fn child(&self, name: &str) -> Option<&Node> {
		self.children.get(name)
	}

	/// Iterate children in name order.
	pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
		self.children.iter().map(|(name, node)| (name.as_str(), node))
	}

	/// Child names in name order.
	pub fn child_names(&self) -> impl Iterator<Item = &str> {
		self.children.keys().map(String::as_str)
	}

	/// Number of children.
	pub fn len(&self) -> usize {
		self.children.len()
	}

	/// Whether the group has no children.
	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}
}

/// Container tree position.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
	/// Named children.
	Group(Group),
	/// Scalar or buffer leaf.
	Dataset(Dataset),
}

impl Node {
	/// Attributes of either node kind.
	pub fn attrs(&self) -> &Attrs {
		match self {
			Self::Group(group) => group.attrs(),
			Self::Dataset(dataset) => dataset.attrs(),
		}
	}

	/// Mutable group view; `None` for a dataset.
	pub fn as_group_mut(&mut self) -> Option<&mut Group> {
		match self {
			Self::Group(group) => Some(group),
			Self::Dataset(_) => None,
		}
	}

	/// Mutable dataset view; `None` for a group.
	pub fn as_dataset_mut(&mut self) -> Option<&mut Dataset> {
		match self {
			Self::Dataset(dataset) => Some(dataset),
			Self::Group(_) => None,
		}
	}

	/// Stable lowercase label of the node kind.
	pub fn kind_label(&self) -> &'static str {
		match self {
			Self::Group(_) => "group",
			Self::Dataset(_) => "dataset",
		}
	}
}

fn wrong_kind(name: &str, expected: &'static str) -> StoreError {
	StoreError::WrongNodeKind {
		name: name.to_owned(),
		expected,
	}
}
