use std::fmt;
use std::str::FromStr;

use crate::store::Dtype;

/// Type identity as recorded in `data_type`/`collection_type` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
	/// `null`
	Null,
	/// `bool`
	Bool,
	/// `int` (native default integer)
	Int,
	/// `int8`
	Int8,
	/// `int16`
	Int16,
	/// `int32`
	Int32,
	/// `int64`
	Int64,
	/// `uint8`
	Uint8,
	/// `uint16`
	Uint16,
	/// `uint32`
	Uint32,
	/// `uint64`
	Uint64,
	/// `float` (native default float)
	Float,
	/// `float16`
	Float16,
	/// `float32`
	Float32,
	/// `float64`
	Float64,
	/// `string`
	String,
	/// `array`
	Array,
	/// `list`
	List,
	/// `tuple`
	Tuple,
	/// `dict`
	Dict,
	/// `set`
	Set,
}

static REGISTRY: [(TypeTag, &str); 21] = [
	(TypeTag::Null, "null"),
	(TypeTag::Bool, "bool"),
	(TypeTag::Int, "int"),
	(TypeTag::Int8, "int8"),
	(TypeTag::Int16, "int16"),
	(TypeTag::Int32, "int32"),
	(TypeTag::Int64, "int64"),
	(TypeTag::Uint8, "uint8"),
	(TypeTag::Uint16, "uint16"),
	(TypeTag::Uint32, "uint32"),
	(TypeTag::Uint64, "uint64"),
	(TypeTag::Float, "float"),
	(TypeTag::Float16, "float16"),
	(TypeTag::Float32, "float32"),
	(TypeTag::Float64, "float64"),
	(TypeTag::String, "string"),
	(TypeTag::Array, "array"),
	(TypeTag::List, "list"),
	(TypeTag::Tuple, "tuple"),
	(TypeTag::Dict, "dict"),
	(TypeTag::Set, "set"),
];

/// How elements of a scalar kind are laid out in a dataset buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementStorage {
	/// No payload.
	Empty,
	/// One byte string per element.
	Strings,
	/// Fixed-width numeric elements.
	Numeric(Dtype),
}

/// Tag text not present in the registry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type tag {0:?}")]
pub struct UnknownTag(pub String);

impl TypeTag {
	/// Registry text for this tag.
	pub fn as_str(self) -> &'static str {
		REGISTRY[self as usize].1
	}

	/// Every registered tag, in registry order.
	pub fn all() -> impl Iterator<Item = TypeTag> {
		REGISTRY.iter().map(|(tag, _)| *tag)
	}

	/// `list`, `tuple`, `dict`, or `set`.
	pub fn is_collection(self) -> bool {
		matches!(self, Self::List | Self::Tuple | Self::Dict | Self::Set)
	}

	/// Native or fixed-width integer tag.
	pub fn is_integer(self) -> bool {
		matches!(
			self,
			Self::Int | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64
		)
	}

	/// Tags allowed for mapping keys.
	pub fn is_key(self) -> bool {
		self.is_integer() || self == Self::String
	}

	/// Buffer layout for scalar tags; `None` for `array` and collections.
	pub fn element_storage(self) -> Option<ElementStorage> {
		let dtype = match self {
			Self::Null => return Some(ElementStorage::Empty),
			Self::String => return Some(ElementStorage::Strings),
			Self::Array | Self::List | Self::Tuple | Self::Dict | Self::Set => return None,
			Self::Bool => Dtype::Bool,
			Self::Int | Self::Int64 => Dtype::I64,
			Self::Int8 => Dtype::I8,
			Self::Int16 => Dtype::I16,
			Self::Int32 => Dtype::I32,
			Self::Uint8 => Dtype::U8,
			Self::Uint16 => Dtype::U16,
			Self::Uint32 => Dtype::U32,
			Self::Uint64 => Dtype::U64,
			Self::Float | Self::Float64 => Dtype::F64,
			Self::Float16 => Dtype::F16,
			Self::Float32 => Dtype::F32,
		};
		Some(ElementStorage::Numeric(dtype))
	}
}

impl FromStr for TypeTag {
	type Err = UnknownTag;

	fn from_str(text: &str) -> Result<Self, Self::Err> {
		REGISTRY
			.iter()
			.find(|(_, name)| *name == text)
			.map(|(tag, _)| *tag)
			.ok_or_else(|| UnknownTag(text.to_owned()))
	}
}

impl fmt::Display for TypeTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::{ElementStorage, TypeTag, UnknownTag};
	use crate::store::Dtype;

	#[test]
	fn registry_is_total_and_inverse() {
		let mut count = 0;
		for tag in TypeTag::all() {
			assert_eq!(tag.as_str().parse::<TypeTag>(), Ok(tag));
			count += 1;
		}
		assert_eq!(count, 21);
	}

	#[test]
	fn enum_order_matches_registry_rows() {
		assert_eq!(TypeTag::Null.as_str(), "null");
		assert_eq!(TypeTag::Uint64.as_str(), "uint64");
		assert_eq!(TypeTag::Float16.as_str(), "float16");
		assert_eq!(TypeTag::Set.as_str(), "set");
	}

	#[test]
	fn unknown_tag_is_rejected() {
		assert_eq!("ndarray".parse::<TypeTag>(), Err(UnknownTag("ndarray".to_owned())));
		assert_eq!("Int".parse::<TypeTag>(), Err(UnknownTag("Int".to_owned())));
	}

	#[test]
	fn native_kinds_share_storage_with_64_bit_subtypes() {
		assert_eq!(TypeTag::Int.element_storage(), Some(ElementStorage::Numeric(Dtype::I64)));
		assert_eq!(TypeTag::Float.element_storage(), Some(ElementStorage::Numeric(Dtype::F64)));
		assert_eq!(TypeTag::Bool.element_storage(), Some(ElementStorage::Numeric(Dtype::Bool)));
		assert_eq!(TypeTag::Array.element_storage(), None);
		assert_eq!(TypeTag::Dict.element_storage(), None);
	}

	#[test]
	fn key_tags_are_integers_or_strings() {
		let keys: Vec<TypeTag> = TypeTag::all().filter(|tag| tag.is_key()).collect();
		assert_eq!(keys.len(), 10);
		assert!(!TypeTag::Bool.is_key());
		assert!(!TypeTag::Float.is_key());
	}
}
